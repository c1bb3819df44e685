//! End-to-end scenarios for the grammar panel driven through its public API.
//!
//! Each test builds its own panel with in-process collaborators. Time is
//! always passed explicitly so the usage-window cases are deterministic.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use tokio::sync::{oneshot, Mutex};

use quill_core::config::QuillConfig;
use quill_core::i18n::TextBundle;
use quill_core::policy::TierPolicy;
use quill_core::types::{AccessContext, CorrectionType, PanelAction, Timestamp, UsageWindow};
use quill_panel::{
    ActionOutcome, ActionState, CollaboratorError, GrammarPanel, PanelError, TextProcessor,
    Translator,
};

// =============================================================================
// Helpers
// =============================================================================

/// Counts calls and appends a marker to the text.
struct CountingProcessor {
    calls: AtomicUsize,
}

impl CountingProcessor {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextProcessor for CountingProcessor {
    async fn process_text(
        &self,
        text: &str,
        kind: CorrectionType,
    ) -> Result<String, CollaboratorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!("{} ({})", text, kind))
    }
}

/// Blocks until the test releases it through a oneshot channel.
struct GatedProcessor {
    release: Mutex<Option<oneshot::Receiver<String>>>,
}

#[async_trait]
impl TextProcessor for GatedProcessor {
    async fn process_text(
        &self,
        _text: &str,
        _kind: CorrectionType,
    ) -> Result<String, CollaboratorError> {
        let rx = self
            .release
            .lock()
            .await
            .take()
            .ok_or_else(|| CollaboratorError::Failed("already used".to_string()))?;
        rx.await
            .map_err(|_| CollaboratorError::Failed("sender dropped".to_string()))
    }
}

struct NoTranslation;

#[async_trait]
impl Translator for NoTranslation {
    async fn translate(&self, _text: &str) -> Result<String, CollaboratorError> {
        Err(CollaboratorError::Failed("Network response was not ok".to_string()))
    }
}

fn bundle() -> Arc<TextBundle> {
    let toml = r#"
[grammarChecker]
dailyLimitReached = "You have used all {{limit}} corrections for today"
error = "Could not process the text"
translationError = "Translation failed"
limitReached = "Sign in to check longer texts"
freeAccount = "Free account: up to {{limit}} characters, {{remaining}} corrections left today"
upgradeToPremium = "Upgrade to premium for {{limit}} characters"
"#;
    Arc::new(TextBundle::from_toml_str(toml).unwrap())
}

fn now() -> Timestamp {
    Timestamp::from_secs(1_750_000_000)
}

fn panel(processor: Arc<dyn TextProcessor>) -> GrammarPanel {
    GrammarPanel::new(processor, Arc::new(NoTranslation), bundle())
}

// =============================================================================
// Gate scenarios
// =============================================================================

#[tokio::test]
async fn anonymous_input_is_truncated_and_flags_limit() {
    let processor = CountingProcessor::new();
    let mut panel = panel(processor.clone());
    let limit_rx = panel.subscribe_limit_hit();

    panel.edit(&"x".repeat(60), now()).unwrap();

    assert_eq!(panel.text().chars().count(), 50);
    assert!(*limit_rx.borrow());
    assert!(panel.decision(now()).is_limit_reached);
    assert_eq!(panel.notices(now()).len(), 1);
}

#[tokio::test]
async fn authorized_user_over_daily_cap_is_rejected_locally() {
    let processor = CountingProcessor::new();
    let usage = UsageWindow::new(Some(now() - Duration::hours(1)), 5);
    let mut panel = panel(processor.clone()).with_access(AccessContext::authorized(usage), now());
    let limit_rx = panel.subscribe_limit_hit();
    assert!(*limit_rx.borrow());

    panel.edit("Their going to the store", now()).unwrap();
    let outcome = panel
        .correct(CorrectionType::Correct, now())
        .await
        .unwrap();

    assert_eq!(outcome, ActionOutcome::Rejected);
    assert_eq!(processor.calls(), 0);
    assert_eq!(
        panel.error(),
        Some("You have used all 5 corrections for today")
    );
}

#[tokio::test]
async fn window_expiry_reopens_quota() {
    let processor = CountingProcessor::new();
    let usage = UsageWindow::new(Some(now() - Duration::hours(25)), 5);
    let mut panel = panel(processor.clone()).with_access(AccessContext::authorized(usage), now());

    assert_eq!(panel.decision(now()).remaining_uses, 5);
    panel.edit("some text", now()).unwrap();
    let outcome = panel
        .correct(CorrectionType::Improve, now())
        .await
        .unwrap();

    assert_eq!(outcome, ActionOutcome::Completed);
    assert_eq!(processor.calls(), 1);
    assert_eq!(panel.text(), "some text (improve)");
}

#[tokio::test]
async fn host_usage_update_flips_limit_flag() {
    let processor = CountingProcessor::new();
    let mut panel = panel(processor).with_access(
        AccessContext::authorized(UsageWindow::new(Some(now()), 4)),
        now(),
    );
    let mut limit_rx = panel.subscribe_limit_hit();
    assert!(!*limit_rx.borrow_and_update());

    panel.set_access(
        AccessContext::authorized(UsageWindow::new(Some(now()), 5)),
        now() + Duration::minutes(1),
    );
    assert!(limit_rx.has_changed().unwrap());
    assert!(*limit_rx.borrow_and_update());

    // A day later the same counter no longer blocks.
    panel.set_access(
        AccessContext::authorized(UsageWindow::new(Some(now()), 5)),
        now() + Duration::hours(24),
    );
    assert!(!*limit_rx.borrow_and_update());
}

#[tokio::test]
async fn premium_user_is_never_gated() {
    let processor = CountingProcessor::new();
    let mut premium = AccessContext::premium(None);
    premium.usage = UsageWindow::new(Some(now()), 500);
    let mut panel = panel(processor.clone()).with_access(premium, now());

    panel.edit(&"y".repeat(1999), now()).unwrap();
    for _ in 0..3 {
        panel.edit(&"y".repeat(1999), now()).unwrap();
        let outcome = panel
            .correct(CorrectionType::Correct, now())
            .await
            .unwrap();
        assert_eq!(outcome, ActionOutcome::Completed);
    }
    assert_eq!(processor.calls(), 3);
}

#[tokio::test]
async fn configured_limits_flow_into_the_panel() {
    let mut config = QuillConfig::default();
    config.limits.anonymous_char_limit = 10;
    let mut panel = panel(CountingProcessor::new()).with_config(&config);

    panel.edit("0123456789abc", now()).unwrap();
    assert_eq!(panel.text(), "0123456789");
    assert_eq!(panel.char_counter().as_deref(), Some("10/10"));
}

#[tokio::test]
async fn configured_date_format_reaches_premium_notice() {
    let mut config = QuillConfig::default();
    config.ui.date_format = "%Y-%m-%d".to_string();
    let texts = Arc::new(
        TextBundle::new()
            .with("grammarChecker.premiumAccess", "Premium until {{date}}")
            .with("grammarChecker.premiumFeatures", "Up to {{limit}} characters"),
    );
    let until = Timestamp::from_secs(1_767_139_200);
    let panel = GrammarPanel::new(CountingProcessor::new(), Arc::new(NoTranslation), texts)
        .with_config(&config)
        .with_access(AccessContext::premium(Some(until)), now());

    assert_eq!(
        panel.notices(now()),
        vec![quill_panel::Notice::Premium {
            headline: "Premium until 2025-12-31".to_string(),
            features: "Up to 2000 characters".to_string(),
        }]
    );
}

#[test]
fn policy_from_config_matches_defaults() {
    let config = QuillConfig::default();
    assert_eq!(TierPolicy::from(&config.limits), TierPolicy::default());
}

// =============================================================================
// Async lifecycle
// =============================================================================

#[tokio::test]
async fn host_driven_request_survives_across_tasks() {
    let (tx, rx) = oneshot::channel();
    let processor = Arc::new(GatedProcessor {
        release: Mutex::new(Some(rx)),
    });
    let mut panel = panel(processor.clone());
    panel.edit("draft", now()).unwrap();

    let ticket = panel
        .begin_correction(CorrectionType::Correct, now())
        .unwrap();
    assert_eq!(panel.state(), &ActionState::Pending(PanelAction::Correct));

    let call = tokio::spawn({
        let processor = processor.clone();
        let text = ticket.text.clone();
        async move { processor.process_text(&text, CorrectionType::Correct).await }
    });

    // Second request while the first is in flight.
    assert!(matches!(
        panel.begin_correction(CorrectionType::Improve, now()),
        Err(PanelError::Busy(_))
    ));

    tx.send("Draft.".to_string()).unwrap();
    let result = call.await.unwrap();
    assert_eq!(
        panel.finish_correction(ticket.token, result),
        ActionOutcome::Completed
    );
    assert_eq!(panel.text(), "Draft.");
    assert_eq!(panel.previous(), Some("draft"));
}

#[tokio::test]
async fn late_result_after_discard_does_not_clobber_new_text() {
    let (tx, rx) = oneshot::channel();
    let processor = Arc::new(GatedProcessor {
        release: Mutex::new(Some(rx)),
    });
    let mut panel = panel(processor.clone());
    panel.edit("first draft", now()).unwrap();

    let ticket = panel
        .begin_correction(CorrectionType::Correct, now())
        .unwrap();
    let call = tokio::spawn({
        let processor = processor.clone();
        let text = ticket.text.clone();
        async move { processor.process_text(&text, CorrectionType::Correct).await }
    });

    panel.discard_pending();
    panel.edit("second draft", now()).unwrap();

    tx.send("First draft.".to_string()).unwrap();
    let result = call.await.unwrap();
    assert_eq!(
        panel.finish_correction(ticket.token, result),
        ActionOutcome::Discarded
    );
    assert_eq!(panel.text(), "second draft");
    assert_eq!(panel.error(), None);
}

#[tokio::test]
async fn panel_can_move_into_a_spawned_task() {
    let processor = CountingProcessor::new();
    let mut panel = panel(processor.clone());
    panel.edit("hello", now()).unwrap();

    let handle = tokio::spawn(async move {
        let outcome = panel.correct(CorrectionType::Correct, now()).await;
        (outcome, panel.text().to_string())
    });
    let (outcome, text) = handle.await.unwrap();
    assert_eq!(outcome, Ok(ActionOutcome::Completed));
    assert_eq!(text, "hello (correct)");
}

#[tokio::test]
async fn translation_failure_surfaces_localized_error() {
    let mut panel = panel(CountingProcessor::new());
    panel.edit("привет", now()).unwrap();
    let outcome = panel.translate().await.unwrap();

    assert_eq!(outcome, ActionOutcome::Failed);
    assert_eq!(panel.error(), Some("Translation failed"));
    assert!(!panel.dialog().is_open());

    panel.edit("привет!", now()).unwrap();
    assert_eq!(panel.error(), None);
}

#[tokio::test]
async fn free_account_notice_reports_remaining_uses() {
    let usage = UsageWindow::new(Some(now() - Duration::hours(3)), 2);
    let panel = panel(CountingProcessor::new()).with_access(AccessContext::authorized(usage), now());

    let notices = panel.notices(now());
    assert_eq!(notices.len(), 1);
    match &notices[0] {
        quill_panel::Notice::FreeAccount { headline, upgrade } => {
            assert_eq!(
                headline,
                "Free account: up to 500 characters, 3 corrections left today"
            );
            assert_eq!(upgrade, "Upgrade to premium for 2000 characters");
        }
        other => panic!("unexpected notice: {:?}", other),
    }
}
