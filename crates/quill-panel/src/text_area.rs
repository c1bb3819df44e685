//! Text-area control state.
//!
//! Computes which of the copy / revert / translate buttons are enabled and
//! whether the loading overlay is shown, and tracks the short-lived "copied"
//! indicator.

use chrono::Duration;

use quill_core::config::UiConfig;
use quill_core::types::Timestamp;

use crate::collaborator::Clipboard;

/// Inputs the text area renders from.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextAreaView<'a> {
    pub value: &'a str,
    pub previous: Option<&'a str>,
    pub disabled: bool,
    pub loading: bool,
    pub loading_text: Option<&'a str>,
}

/// Enabled state of each control plus the overlay text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextAreaControls {
    pub copy_enabled: bool,
    pub revert_enabled: bool,
    pub translate_enabled: bool,
    pub overlay: Option<String>,
}

impl TextAreaControls {
    pub fn compute(view: &TextAreaView<'_>) -> Self {
        let has_text = !view.value.is_empty();
        let revert_enabled = !view.disabled
            && match view.previous {
                Some(previous) => previous != view.value,
                None => false,
            };
        let overlay = if view.loading {
            view.loading_text
                .filter(|t| !t.is_empty())
                .map(str::to_string)
        } else {
            None
        };

        Self {
            copy_enabled: has_text && !view.disabled,
            revert_enabled,
            translate_enabled: has_text && !view.disabled,
            overlay,
        }
    }
}

/// Transient success indicator for the copy button.
#[derive(Debug, Clone)]
pub struct CopyFeedback {
    duration: Duration,
    copied_at: Option<Timestamp>,
}

impl Default for CopyFeedback {
    fn default() -> Self {
        Self::new(500)
    }
}

impl From<&UiConfig> for CopyFeedback {
    fn from(config: &UiConfig) -> Self {
        Self::new(config.copy_feedback_ms)
    }
}

impl CopyFeedback {
    pub fn new(duration_ms: u64) -> Self {
        Self {
            duration: Duration::milliseconds(i64::try_from(duration_ms).unwrap_or(i64::MAX)),
            copied_at: None,
        }
    }

    /// Write `text` to the clipboard and light the indicator on success.
    ///
    /// Clipboard failures are logged and leave the indicator off.
    pub async fn copy(&mut self, clipboard: &dyn Clipboard, text: &str, now: Timestamp) -> bool {
        match clipboard.write_text(text).await {
            Ok(()) => {
                tracing::debug!(text_len = text.len(), "Copied to clipboard");
                self.copied_at = Some(now);
                true
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to copy text");
                false
            }
        }
    }

    /// Whether the success indicator is lit at `now`.
    pub fn is_showing_success(&self, now: Timestamp) -> bool {
        match self.copied_at {
            Some(at) => now.since(at) < self.duration,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CollaboratorError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    fn view(value: &str) -> TextAreaView<'_> {
        TextAreaView {
            value,
            ..TextAreaView::default()
        }
    }

    #[test]
    fn test_copy_follows_value() {
        assert!(TextAreaControls::compute(&view("text")).copy_enabled);
        assert!(!TextAreaControls::compute(&view("")).copy_enabled);
    }

    #[test]
    fn test_revert_needs_different_previous() {
        let mut v = view("current");
        assert!(!TextAreaControls::compute(&v).revert_enabled);

        v.previous = Some("older");
        assert!(TextAreaControls::compute(&v).revert_enabled);

        v.previous = Some("current");
        assert!(!TextAreaControls::compute(&v).revert_enabled);
    }

    #[test]
    fn test_disabled_turns_everything_off() {
        let v = TextAreaView {
            value: "text",
            previous: Some("older"),
            disabled: true,
            ..TextAreaView::default()
        };
        let controls = TextAreaControls::compute(&v);
        assert!(!controls.copy_enabled);
        assert!(!controls.revert_enabled);
        assert!(!controls.translate_enabled);
    }

    #[test]
    fn test_translate_needs_text() {
        assert!(!TextAreaControls::compute(&view("")).translate_enabled);
        assert!(TextAreaControls::compute(&view("Some text")).translate_enabled);
    }

    #[test]
    fn test_overlay_only_while_loading() {
        let mut v = view("text");
        v.loading_text = Some("Correcting...");
        assert_eq!(TextAreaControls::compute(&v).overlay, None);

        v.loading = true;
        assert_eq!(
            TextAreaControls::compute(&v).overlay.as_deref(),
            Some("Correcting...")
        );

        v.loading_text = None;
        assert_eq!(TextAreaControls::compute(&v).overlay, None);
    }

    struct RecordingClipboard {
        written: Mutex<Vec<String>>,
        fail: bool,
    }

    #[async_trait]
    impl Clipboard for RecordingClipboard {
        async fn write_text(&self, text: &str) -> Result<(), CollaboratorError> {
            if self.fail {
                return Err(CollaboratorError::Failed("denied".to_string()));
            }
            self.written.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_copy_lights_indicator_for_500ms() {
        let clipboard = RecordingClipboard {
            written: Mutex::new(Vec::new()),
            fail: false,
        };
        let mut feedback = CopyFeedback::default();
        let t0 = Timestamp(1_000_000);

        assert!(!feedback.is_showing_success(t0));
        assert!(feedback.copy(&clipboard, "Test text", t0).await);
        assert_eq!(*clipboard.written.lock().unwrap(), vec!["Test text".to_string()]);

        assert!(feedback.is_showing_success(t0));
        assert!(feedback.is_showing_success(t0 + Duration::milliseconds(499)));
        assert!(!feedback.is_showing_success(t0 + Duration::milliseconds(500)));
    }

    #[tokio::test]
    async fn test_configured_duration() {
        let clipboard = RecordingClipboard {
            written: Mutex::new(Vec::new()),
            fail: false,
        };
        let config = UiConfig {
            copy_feedback_ms: 2000,
            ..UiConfig::default()
        };
        let mut feedback = CopyFeedback::from(&config);
        let t0 = Timestamp(0);
        feedback.copy(&clipboard, "x", t0).await;
        assert!(feedback.is_showing_success(t0 + Duration::milliseconds(1999)));
        assert!(!feedback.is_showing_success(t0 + Duration::milliseconds(2000)));
    }

    #[tokio::test]
    async fn test_copy_failure_leaves_indicator_off() {
        let clipboard = RecordingClipboard {
            written: Mutex::new(Vec::new()),
            fail: true,
        };
        let mut feedback = CopyFeedback::new(500);
        let t0 = Timestamp(0);
        assert!(!feedback.copy(&clipboard, "x", t0).await);
        assert!(!feedback.is_showing_success(t0));
    }
}
