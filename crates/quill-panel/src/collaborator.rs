//! Host-supplied collaborators.
//!
//! The panels never talk to a network, a clipboard, or a dialog API
//! directly. The host implements these traits and hands them in as
//! `Arc<dyn Trait>`.

use async_trait::async_trait;

use quill_core::types::{CorrectionType, SubscriptionInfo};

use crate::error::CollaboratorError;

/// Grammar correction / style improvement service.
#[async_trait]
pub trait TextProcessor: Send + Sync {
    /// Return the processed text.
    ///
    /// Fails with [`CollaboratorError::DailyLimitReached`] when the service
    /// itself enforces the daily quota.
    async fn process_text(
        &self,
        text: &str,
        kind: CorrectionType,
    ) -> Result<String, CollaboratorError>;
}

/// Third-party translation lookup.
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str) -> Result<String, CollaboratorError>;
}

/// Billing backend.
#[async_trait]
pub trait SubscriptionService: Send + Sync {
    async fn subscription_info(&self) -> Result<SubscriptionInfo, CollaboratorError>;

    async fn cancel_subscription(&self) -> Result<(), CollaboratorError>;
}

/// System clipboard.
#[async_trait]
pub trait Clipboard: Send + Sync {
    async fn write_text(&self, text: &str) -> Result<(), CollaboratorError>;
}

/// Blocking confirm / notify prompts shown by the host.
pub trait UserPrompt: Send + Sync {
    /// Ask a yes/no question.
    fn confirm(&self, message: &str) -> bool;

    /// Show an acknowledgement.
    fn notify(&self, message: &str);
}
