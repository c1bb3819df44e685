//! CLI argument definitions for the `quill` binary.
//!
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Quill: access-tier gate for the grammar-correction panel.
#[derive(Parser, Debug)]
#[command(name = "quill", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level", global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Evaluate the gate for one request and print the decision as JSON.
    Check(CheckArgs),
    /// Print the effective configuration as TOML.
    Config,
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct CheckArgs {
    /// The user is signed in.
    #[arg(long = "logged-in")]
    pub logged_in: bool,

    /// The user has a paid plan. Lifts the gate; the premium char limit
    /// also needs --logged-in.
    #[arg(long = "premium")]
    pub premium: bool,

    /// Input length in characters.
    #[arg(long = "length", default_value_t = 0)]
    pub length: usize,

    /// Corrections already used in the current window.
    #[arg(long = "uses", default_value_t = 0)]
    pub uses: u32,

    /// Hours since the first correction of the window. Omit if none yet.
    #[arg(long = "first-usage-hours-ago", value_parser = parse_hours)]
    pub first_usage_hours_ago: Option<f64>,
}

/// Accept a finite, non-negative number of hours.
fn parse_hours(s: &str) -> Result<f64, String> {
    let hours: f64 = s
        .parse()
        .map_err(|_| format!("`{}` is not a number of hours", s))?;
    if !hours.is_finite() || hours < 0.0 {
        return Err(format!("hours must be finite and not negative, got {}", s));
    }
    Ok(hours)
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > QUILL_CONFIG env var > ~/.quill/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("QUILL_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Resolve the log level.
    ///
    /// Priority: --log-level flag > config file value.
    pub fn resolve_log_level(&self, config_level: &str) -> String {
        self.log_level
            .clone()
            .unwrap_or_else(|| config_level.to_string())
    }
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".quill").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".quill").join("config.toml");
    }
    PathBuf::from("config.toml")
}
