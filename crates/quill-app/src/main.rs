//! Quill command-line binary.
//!
//! 1. Parse arguments and load configuration from TOML
//! 2. Initialize tracing
//! 3. Run the requested subcommand against the configured tier policy

mod cli;

use chrono::Duration;
use clap::Parser;

use quill_core::config::QuillConfig;
use quill_core::policy::TierPolicy;
use quill_core::types::{AccessContext, AccessTier, LimitDecision, Timestamp, UsageWindow};

use cli::{CheckArgs, CliArgs, Command};

/// Evaluate the gate for the request described by `args` at `now`.
fn evaluate(policy: &TierPolicy, args: &CheckArgs, now: Timestamp) -> LimitDecision {
    // Float to int casts saturate; NaN and negatives land on zero.
    let first_usage = args
        .first_usage_hours_ago
        .map(|hours| now - Duration::milliseconds((hours * 3_600_000.0).max(0.0) as i64));
    let access = AccessContext {
        is_user_logged_in: args.logged_in,
        has_premium_access: args.premium,
        premium_until: None,
        usage: UsageWindow::new(first_usage, args.uses),
    };
    policy.decide_for(&access, args.length, now)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();
    let config_file = args.resolve_config_path();
    let loaded = QuillConfig::load(&config_file);

    let level = match loaded {
        Ok(ref config) => args.resolve_log_level(&config.general.log_level),
        Err(_) => args.resolve_log_level("info"),
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&level)),
        )
        .init();

    tracing::debug!("Starting Quill v{}", env!("CARGO_PKG_VERSION"));

    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(path = %config_file.display(), error = %e, "Failed to load config. Using defaults.");
            QuillConfig::default()
        }
    };

    match args.command {
        Command::Check(check) => {
            let policy = TierPolicy::from(&config.limits);
            let decision = evaluate(&policy, &check, Timestamp::now());
            tracing::info!(
                tier = %AccessTier::from_flags(check.logged_in, check.premium),
                limit_reached = decision.is_limit_reached,
                "Gate evaluated"
            );
            println!("{}", serde_json::to_string_pretty(&decision)?);
        }
        Command::Config => {
            println!("{}", toml::to_string_pretty(&config)?);
        }
    }

    Ok(())
}
