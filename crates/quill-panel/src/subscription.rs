//! Subscription panel controller.
//!
//! Fetches the user's billing status and lets an active subscriber cancel.
//! All user-facing strings come from a flat [`SubscriptionTexts`] bundle.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use quill_core::config::{QuillConfig, DEFAULT_DATE_FORMAT};
use quill_core::types::{SubscriptionAction, SubscriptionInfo, SubscriptionStatus};

use crate::collaborator::{SubscriptionService, UserPrompt};
use crate::error::CollaboratorError;
use crate::state::{ActionOutcome, ActionStateMachine};

/// Localized strings for the subscription panel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubscriptionTexts {
    pub loading: String,
    pub fetch_error: String,
    pub cancel_confirmation: String,
    pub cancel_success: String,
    pub cancel_error: String,
    pub no_active_subscription: String,
    pub info: String,
    pub status: String,
    pub next_payment: String,
    pub cancel_button: String,
    /// Label per wire status (`active`, `cancelled`, `no_subscription`).
    pub status_types: HashMap<String, String>,
}

impl SubscriptionTexts {
    fn status_label(&self, status: &SubscriptionStatus) -> String {
        self.status_types
            .get(status.as_str())
            .cloned()
            .unwrap_or_else(|| status.as_str().to_string())
    }
}

/// What the panel should render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionView {
    Loading(String),
    Error(String),
    NoSubscription(String),
    Details {
        heading: String,
        status_line: String,
        next_payment_line: Option<String>,
        cancel_button: Option<String>,
    },
}

/// Controller for one subscription panel.
pub struct SubscriptionPanel {
    id: Uuid,
    service: Arc<dyn SubscriptionService>,
    is_user_logged_in: bool,
    texts: SubscriptionTexts,
    info: Option<SubscriptionInfo>,
    loading: bool,
    machine: ActionStateMachine<SubscriptionAction>,
    date_format: String,
}

impl SubscriptionPanel {
    pub fn new(
        service: Arc<dyn SubscriptionService>,
        is_user_logged_in: bool,
        texts: SubscriptionTexts,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            service,
            is_user_logged_in,
            texts,
            info: None,
            loading: true,
            machine: ActionStateMachine::new(),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }

    pub fn with_date_format(mut self, date_format: impl Into<String>) -> Self {
        self.date_format = date_format.into();
        self
    }

    /// Apply the `[ui]` section of a loaded config.
    pub fn with_config(self, config: &QuillConfig) -> Self {
        self.with_date_format(config.ui.date_format.clone())
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn info(&self) -> Option<&SubscriptionInfo> {
        self.info.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.machine.current().error()
    }

    /// Fetch the current subscription. Signed-out users are never queried.
    pub async fn refresh(&mut self) -> ActionOutcome {
        if !self.is_user_logged_in {
            self.loading = false;
            return ActionOutcome::Rejected;
        }

        let token = match self.machine.begin(SubscriptionAction::Fetch) {
            Ok(token) => token,
            Err(e) => {
                tracing::debug!(panel_id = %self.id, error = %e, "Subscription refresh skipped");
                return ActionOutcome::Rejected;
            }
        };

        let service = Arc::clone(&self.service);
        let result = service.subscription_info().await;
        self.loading = false;

        match result {
            Ok(info) => {
                tracing::info!(panel_id = %self.id, status = %info.status, "Subscription info loaded");
                self.info = Some(info);
                match self.machine.complete(token) {
                    Ok(_) => ActionOutcome::Completed,
                    Err(_) => ActionOutcome::Discarded,
                }
            }
            Err(e) => {
                tracing::warn!(panel_id = %self.id, error = %e, "Error fetching subscription info");
                let message = match e {
                    CollaboratorError::Failed(ref m) if !m.is_empty() => m.clone(),
                    _ => self.texts.fetch_error.clone(),
                };
                self.info = None;
                match self.machine.fail(token, message) {
                    Ok(_) => ActionOutcome::Failed,
                    Err(_) => ActionOutcome::Discarded,
                }
            }
        }
    }

    /// Cancel after the user confirms, then re-fetch.
    pub async fn cancel(&mut self, prompt: &dyn UserPrompt) -> ActionOutcome {
        if !prompt.confirm(&self.texts.cancel_confirmation) {
            return ActionOutcome::Rejected;
        }

        let token = match self.machine.begin(SubscriptionAction::Cancel) {
            Ok(token) => token,
            Err(e) => {
                tracing::debug!(panel_id = %self.id, error = %e, "Cancellation skipped");
                return ActionOutcome::Rejected;
            }
        };

        let service = Arc::clone(&self.service);
        match service.cancel_subscription().await {
            Ok(()) => {
                if self.machine.complete(token).is_err() {
                    return ActionOutcome::Discarded;
                }
                tracing::info!(panel_id = %self.id, "Subscription cancelled");
                prompt.notify(&self.texts.cancel_success);
                self.refresh().await;
                ActionOutcome::Completed
            }
            Err(e) => {
                tracing::error!(panel_id = %self.id, error = %e, "Error cancelling subscription");
                match self.machine.fail(token, self.texts.cancel_error.clone()) {
                    Ok(_) => ActionOutcome::Failed,
                    Err(_) => ActionOutcome::Discarded,
                }
            }
        }
    }

    pub fn view(&self) -> SubscriptionView {
        if self.loading {
            return SubscriptionView::Loading(self.texts.loading.clone());
        }
        if let Some(message) = self.error() {
            return SubscriptionView::Error(message.to_string());
        }
        let info = match &self.info {
            Some(info) if info.status != SubscriptionStatus::NoSubscription => info,
            _ => {
                return SubscriptionView::NoSubscription(self.texts.no_active_subscription.clone())
            }
        };

        let next_payment_line = info.next_payment().map(|ts| {
            format!(
                "{}: {}",
                self.texts.next_payment,
                ts.to_datetime().format(&self.date_format)
            )
        });
        let cancel_button = (info.status == SubscriptionStatus::Active)
            .then(|| self.texts.cancel_button.clone());

        SubscriptionView::Details {
            heading: self.texts.info.clone(),
            status_line: format!(
                "{}: {}",
                self.texts.status,
                self.texts.status_label(&info.status)
            ),
            next_payment_line,
            cancel_button,
        }
    }
}
