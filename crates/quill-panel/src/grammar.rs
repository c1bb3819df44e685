//! Grammar-correction panel controller.
//!
//! Owns the text being edited, the one-step revert snapshot, the action
//! state machine and the translation dialog. Every action is gated by the
//! tier policy before the host's collaborator is called.
//!
//! Actions come in two shapes. The async methods ([`GrammarPanel::correct`],
//! [`GrammarPanel::translate`]) call the injected collaborator and apply its
//! result. The `begin_*` / `finish_*` pairs let a host drive the collaborator
//! itself; there the request token decides whether a late result still
//! applies.

use std::sync::Arc;

use tokio::sync::watch;
use uuid::Uuid;

use quill_core::config::{QuillConfig, DEFAULT_DATE_FORMAT};
use quill_core::i18n::TextLookup;
use quill_core::policy::{char_count, TierPolicy};
use quill_core::types::{
    AccessContext, AccessTier, CorrectionType, LimitDecision, PanelAction, Timestamp,
};

use crate::collaborator::{TextProcessor, Translator};
use crate::dialog::Dialog;
use crate::error::{CollaboratorError, PanelError};
use crate::state::{ActionOutcome, ActionState, ActionStateMachine, RequestToken};
use crate::text_area::{TextAreaControls, TextAreaView};

/// An accepted correction request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrectionTicket {
    pub token: RequestToken,
    pub kind: CorrectionType,
    pub text: String,
}

/// An accepted translation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationTicket {
    pub token: RequestToken,
    pub text: String,
}

/// Status banners shown under the text area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Anonymous user hit the input limit.
    LimitReached { message: String },
    /// Premium user with a known end date.
    Premium { headline: String, features: String },
    /// Signed-in user without a paid plan.
    FreeAccount { headline: String, upgrade: String },
}

/// Controller for one grammar-correction panel.
pub struct GrammarPanel {
    id: Uuid,
    policy: TierPolicy,
    access: AccessContext,
    texts: Arc<dyn TextLookup>,
    processor: Arc<dyn TextProcessor>,
    translator: Arc<dyn Translator>,
    text: String,
    previous: Option<String>,
    machine: ActionStateMachine<PanelAction>,
    dialog: Dialog,
    limit_tx: watch::Sender<bool>,
    date_format: String,
}

impl GrammarPanel {
    /// Create a panel for an anonymous user with the default limits.
    pub fn new(
        processor: Arc<dyn TextProcessor>,
        translator: Arc<dyn Translator>,
        texts: Arc<dyn TextLookup>,
    ) -> Self {
        let (limit_tx, _) = watch::channel(false);
        Self {
            id: Uuid::new_v4(),
            policy: TierPolicy::default(),
            access: AccessContext::anonymous(),
            texts,
            processor,
            translator,
            text: String::new(),
            previous: None,
            machine: ActionStateMachine::new(),
            dialog: Dialog::new(),
            limit_tx,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }

    pub fn with_policy(mut self, policy: TierPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_date_format(mut self, date_format: impl Into<String>) -> Self {
        self.date_format = date_format.into();
        self
    }

    /// Apply the `[limits]` and `[ui]` sections of a loaded config.
    pub fn with_config(self, config: &QuillConfig) -> Self {
        self.with_policy(TierPolicy::from(&config.limits))
            .with_date_format(config.ui.date_format.clone())
    }

    pub fn with_access(mut self, access: AccessContext, now: Timestamp) -> Self {
        self.set_access(access, now);
        self
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn previous(&self) -> Option<&str> {
        self.previous.as_deref()
    }

    pub fn state(&self) -> &ActionState<PanelAction> {
        self.machine.current()
    }

    pub fn error(&self) -> Option<&str> {
        self.machine.current().error()
    }

    pub fn is_loading(&self) -> bool {
        self.machine.current().is_pending()
    }

    pub fn access(&self) -> &AccessContext {
        &self.access
    }

    pub fn tier(&self) -> AccessTier {
        self.access.tier()
    }

    pub fn dialog(&self) -> &Dialog {
        &self.dialog
    }

    pub fn char_count(&self) -> usize {
        char_count(&self.text)
    }

    pub fn char_limit(&self) -> usize {
        self.policy.effective_char_limit(self.tier())
    }

    // =========================================================================
    // Gate
    // =========================================================================

    pub fn decision(&self, now: Timestamp) -> LimitDecision {
        self.policy.decide_for(&self.access, self.char_count(), now)
    }

    pub fn is_limit_reached(&self, now: Timestamp) -> bool {
        self.policy
            .is_limit_reached_for(&self.access, self.char_count(), now)
    }

    /// Receiver for the limit-hit flag. Holds the current value immediately
    /// and changes only when the flag flips.
    pub fn subscribe_limit_hit(&self) -> watch::Receiver<bool> {
        self.limit_tx.subscribe()
    }

    fn publish_limit(&self, now: Timestamp) {
        let hit = self.is_limit_reached(now);
        let changed = self.limit_tx.send_if_modified(|current| {
            if *current == hit {
                false
            } else {
                *current = hit;
                true
            }
        });
        if changed {
            tracing::debug!(panel_id = %self.id, tier = %self.tier(), hit, "Limit flag changed");
        }
    }

    fn daily_limit_message(&self) -> String {
        self.texts.text(
            "grammarChecker.dailyLimitReached",
            &[("limit", self.policy.max_free_corrections().to_string())],
        )
    }

    /// Replace the host-owned access values and re-evaluate the gate.
    ///
    /// The current text is not re-clamped; the new limit applies from the
    /// next edit.
    pub fn set_access(&mut self, access: AccessContext, now: Timestamp) {
        self.access = access;
        self.publish_limit(now);
    }

    // =========================================================================
    // Editing
    // =========================================================================

    /// Apply a user edit. Input beyond the tier's char limit is cut off.
    pub fn edit(&mut self, new_text: &str, now: Timestamp) -> Result<(), PanelError> {
        if let Some(action) = self.machine.current().pending_action() {
            return Err(PanelError::Busy(action.to_string()));
        }
        self.text = self.policy.clamp_text(self.tier(), new_text);
        self.previous = None;
        self.machine.clear_error()?;
        self.publish_limit(now);
        Ok(())
    }

    /// Restore the text from before the last correction, once.
    pub fn revert(&mut self, now: Timestamp) -> Result<(), PanelError> {
        if let Some(action) = self.machine.current().pending_action() {
            return Err(PanelError::Busy(action.to_string()));
        }
        let previous = self.previous.take().ok_or(PanelError::NothingToRevert)?;
        self.text = previous;
        self.publish_limit(now);
        Ok(())
    }

    // =========================================================================
    // Correction
    // =========================================================================

    /// Gate and accept a correction request.
    ///
    /// When the gate refuses, the panel shows the daily-limit message and
    /// `PanelError::LimitReached` is returned; nothing should be sent to the
    /// text service.
    pub fn begin_correction(
        &mut self,
        kind: CorrectionType,
        now: Timestamp,
    ) -> Result<CorrectionTicket, PanelError> {
        if let Some(action) = self.machine.current().pending_action() {
            return Err(PanelError::Busy(action.to_string()));
        }
        if self.text.is_empty() {
            return Err(PanelError::EmptyText);
        }
        if self.is_limit_reached(now) {
            let message = self.daily_limit_message();
            tracing::info!(panel_id = %self.id, tier = %self.tier(), action = %kind, "Correction rejected by tier gate");
            self.machine.reject(message.clone())?;
            return Err(PanelError::LimitReached(message));
        }

        let token = self.machine.begin(kind.into())?;
        self.previous = Some(self.text.clone());
        tracing::debug!(panel_id = %self.id, action = %kind, token = %token, "Correction started");
        Ok(CorrectionTicket {
            token,
            kind,
            text: self.text.clone(),
        })
    }

    /// Apply the text service's answer for `token`.
    pub fn finish_correction(
        &mut self,
        token: RequestToken,
        result: Result<String, CollaboratorError>,
    ) -> ActionOutcome {
        if !self.machine.is_current(token) {
            tracing::warn!(panel_id = %self.id, token = %token, "Discarding stale correction result");
            return ActionOutcome::Discarded;
        }

        match result {
            Ok(processed) => {
                self.text = processed;
                match self.machine.complete(token) {
                    Ok(action) => {
                        tracing::info!(panel_id = %self.id, action = %action, token = %token, "Correction applied");
                        ActionOutcome::Completed
                    }
                    Err(_) => ActionOutcome::Discarded,
                }
            }
            Err(err) => {
                let message = match err {
                    CollaboratorError::DailyLimitReached => self.daily_limit_message(),
                    CollaboratorError::Failed(ref reason) => {
                        tracing::warn!(panel_id = %self.id, token = %token, error = %reason, "Correction failed");
                        self.texts.text("grammarChecker.error", &[])
                    }
                };
                match self.machine.fail(token, message) {
                    Ok(_) => ActionOutcome::Failed,
                    Err(_) => ActionOutcome::Discarded,
                }
            }
        }
    }

    /// Run a correction through the injected text service.
    ///
    /// Collaborator failures end up in the panel's error state. The `Err`
    /// side only reports requests the panel refused to start (busy or empty).
    pub async fn correct(
        &mut self,
        kind: CorrectionType,
        now: Timestamp,
    ) -> Result<ActionOutcome, PanelError> {
        let ticket = match self.begin_correction(kind, now) {
            Ok(ticket) => ticket,
            Err(PanelError::LimitReached(_)) => return Ok(ActionOutcome::Rejected),
            Err(e) => return Err(e),
        };
        let processor = Arc::clone(&self.processor);
        let result = processor.process_text(&ticket.text, ticket.kind).await;
        let outcome = self.finish_correction(ticket.token, result);
        self.publish_limit(now);
        Ok(outcome)
    }

    // =========================================================================
    // Translation
    // =========================================================================

    /// Accept a translation request. Translation is not gated.
    pub fn begin_translation(&mut self) -> Result<TranslationTicket, PanelError> {
        if let Some(action) = self.machine.current().pending_action() {
            return Err(PanelError::Busy(action.to_string()));
        }
        if self.text.is_empty() {
            return Err(PanelError::EmptyText);
        }
        let token = self.machine.begin(PanelAction::Translate)?;
        tracing::debug!(panel_id = %self.id, token = %token, "Translation started");
        Ok(TranslationTicket {
            token,
            text: self.text.clone(),
        })
    }

    /// Show the translation for `token` in the dialog, or the error text.
    pub fn finish_translation(
        &mut self,
        token: RequestToken,
        result: Result<String, CollaboratorError>,
    ) -> ActionOutcome {
        if !self.machine.is_current(token) {
            tracing::warn!(panel_id = %self.id, token = %token, "Discarding stale translation result");
            return ActionOutcome::Discarded;
        }

        match result {
            Ok(translated) if !translated.is_empty() => {
                if self.machine.complete(token).is_err() {
                    return ActionOutcome::Discarded;
                }
                let title = self.texts.text("grammarChecker.translation", &[]);
                self.dialog.open(title, translated);
                tracing::info!(panel_id = %self.id, token = %token, "Translation shown");
                ActionOutcome::Completed
            }
            other => {
                match other {
                    Err(e) => {
                        tracing::warn!(panel_id = %self.id, token = %token, error = %e, "Translation failed")
                    }
                    Ok(_) => {
                        tracing::warn!(panel_id = %self.id, token = %token, "No translation found in response")
                    }
                }
                let message = self.texts.text("grammarChecker.translationError", &[]);
                match self.machine.fail(token, message) {
                    Ok(_) => ActionOutcome::Failed,
                    Err(_) => ActionOutcome::Discarded,
                }
            }
        }
    }

    /// Translate the current text through the injected translator.
    pub async fn translate(&mut self) -> Result<ActionOutcome, PanelError> {
        let ticket = self.begin_translation()?;
        let translator = Arc::clone(&self.translator);
        let result = translator.translate(&ticket.text).await;
        Ok(self.finish_translation(ticket.token, result))
    }

    pub fn close_translation(&mut self) {
        self.dialog.close();
    }

    /// Stop waiting for the in-flight request. Its result will be discarded.
    pub fn discard_pending(&mut self) -> Option<PanelAction> {
        let action = self.machine.abandon()?;
        if matches!(action, PanelAction::Correct | PanelAction::Improve) {
            self.previous = None;
        }
        tracing::info!(panel_id = %self.id, action = %action, "Pending request discarded");
        Some(action)
    }

    // =========================================================================
    // View helpers
    // =========================================================================

    /// `"count/limit"`, or nothing while the text is empty.
    pub fn char_counter(&self) -> Option<String> {
        let count = self.char_count();
        if count == 0 {
            return None;
        }
        Some(format!("{}/{}", count, self.char_limit()))
    }

    /// Overlay text for the action in flight.
    pub fn loading_text(&self) -> Option<String> {
        let key = match self.machine.current().pending_action()? {
            PanelAction::Correct => "grammarChecker.correcting",
            PanelAction::Improve => "grammarChecker.improving",
            PanelAction::Translate => "grammarChecker.translating",
        };
        Some(self.texts.text(key, &[]))
    }

    /// Whether the correct / improve buttons accept a click.
    pub fn can_request_correction(&self) -> bool {
        !self.is_loading() && !self.text.is_empty()
    }

    pub fn controls(&self) -> TextAreaControls {
        let loading_text = self.loading_text();
        TextAreaControls::compute(&TextAreaView {
            value: &self.text,
            previous: self.previous.as_deref(),
            disabled: self.is_loading(),
            loading: self.is_loading(),
            loading_text: loading_text.as_deref(),
        })
    }

    /// Status banners for the current tier and usage.
    pub fn notices(&self, now: Timestamp) -> Vec<Notice> {
        let mut notices = Vec::new();

        if !self.access.is_user_logged_in && self.is_limit_reached(now) {
            notices.push(Notice::LimitReached {
                message: self.texts.text("grammarChecker.limitReached", &[]),
            });
        }

        let premium_limit = self
            .policy
            .effective_char_limit(AccessTier::Premium)
            .to_string();

        // The premium banner follows the flag alone, signed in or not.
        if self.access.has_premium_access {
            if let Some(until) = self.access.premium_until {
                let date = until.to_datetime().format(&self.date_format).to_string();
                notices.push(Notice::Premium {
                    headline: self
                        .texts
                        .text("grammarChecker.premiumAccess", &[("date", date)]),
                    features: self
                        .texts
                        .text("grammarChecker.premiumFeatures", &[("limit", premium_limit)]),
                });
            }
            return notices;
        }

        match self.tier() {
            AccessTier::Authorized => {
                let remaining = self.policy.remaining_uses(&self.access.usage, now);
                notices.push(Notice::FreeAccount {
                    headline: self.texts.text(
                        "grammarChecker.freeAccount",
                        &[
                            (
                                "limit",
                                self.policy
                                    .effective_char_limit(AccessTier::Authorized)
                                    .to_string(),
                            ),
                            ("remaining", remaining.to_string()),
                        ],
                    ),
                    upgrade: self
                        .texts
                        .text("grammarChecker.upgradeToPremium", &[("limit", premium_limit)]),
                });
            }
            AccessTier::Anonymous | AccessTier::Premium => {}
        }

        notices
    }
}
