use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{QuillError, Result};
use crate::policy::{
    ANONYMOUS_CHAR_LIMIT, AUTHORIZED_CHAR_LIMIT, MAX_FREE_CORRECTIONS_PER_DAY,
    PREMIUM_CHAR_LIMIT, USAGE_WINDOW_HOURS,
};

/// Day-first date format used when `[ui].date_format` is not set.
pub const DEFAULT_DATE_FORMAT: &str = "%d.%m.%Y";

/// Top-level configuration for Quill.
///
/// Loaded from `~/.quill/config.toml` by default. Every section is optional;
/// missing keys fall back to the built-in limits.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuillConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

impl QuillConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: QuillConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| QuillError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Character limits and the free-tier usage cap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    pub anonymous_char_limit: usize,
    pub authorized_char_limit: usize,
    pub premium_char_limit: usize,
    /// Corrections allowed per usage window for signed-in free users.
    pub max_free_corrections_per_day: u32,
    /// Usage window length in hours.
    pub window_hours: u32,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            anonymous_char_limit: ANONYMOUS_CHAR_LIMIT,
            authorized_char_limit: AUTHORIZED_CHAR_LIMIT,
            premium_char_limit: PREMIUM_CHAR_LIMIT,
            max_free_corrections_per_day: MAX_FREE_CORRECTIONS_PER_DAY,
            window_hours: USAGE_WINDOW_HOURS as u32,
        }
    }
}

/// Presentation settings shared by the panels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// How long the copy button shows success, in milliseconds.
    pub copy_feedback_ms: u64,
    /// `chrono` format string for dates shown to the user.
    pub date_format: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            copy_feedback_ms: 500,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limits() {
        let config = QuillConfig::default();
        assert_eq!(config.limits.anonymous_char_limit, 50);
        assert_eq!(config.limits.authorized_char_limit, 500);
        assert_eq!(config.limits.premium_char_limit, 2000);
        assert_eq!(config.limits.max_free_corrections_per_day, 5);
        assert_eq!(config.limits.window_hours, 24);
        assert_eq!(config.ui.copy_feedback_ms, 500);
        assert_eq!(config.general.log_level, "info");
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let toml_str = r#"
[limits]
anonymous_char_limit = 80
"#;
        let config: QuillConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.limits.anonymous_char_limit, 80);
        assert_eq!(config.limits.authorized_char_limit, 500);
        assert_eq!(config.ui, UiConfig::default());
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config: QuillConfig = toml::from_str("").unwrap();
        assert_eq!(config, QuillConfig::default());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = QuillConfig::default();
        config.limits.premium_char_limit = 4000;
        config.ui.date_format = "%Y-%m-%d".to_string();
        config.save(&path).unwrap();

        let loaded = QuillConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let err = QuillConfig::load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, QuillError::Io(_)));
    }

    #[test]
    fn test_load_or_default_on_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "limits = [[[").unwrap();
        assert_eq!(QuillConfig::load_or_default(&path), QuillConfig::default());
    }
}
