//! Access-tier gate.
//!
//! Pure decision functions for character limits and the daily correction
//! cap. Nothing here reads the clock: every check takes `now` so the same
//! inputs always give the same answer.

use chrono::Duration;

use crate::config::LimitsConfig;
use crate::types::{AccessContext, AccessTier, LimitDecision, Timestamp, UsageWindow};

/// Character limit for users who are not signed in.
pub const ANONYMOUS_CHAR_LIMIT: usize = 50;
/// Character limit for signed-in users without a paid plan.
pub const AUTHORIZED_CHAR_LIMIT: usize = 500;
/// Character limit for premium users.
pub const PREMIUM_CHAR_LIMIT: usize = 2000;
/// Corrections a signed-in free user may run per usage window.
pub const MAX_FREE_CORRECTIONS_PER_DAY: u32 = 5;
/// Length of the usage window in hours.
pub const USAGE_WINDOW_HOURS: i64 = 24;

/// Limit table plus the usage window length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierPolicy {
    anonymous_char_limit: usize,
    authorized_char_limit: usize,
    premium_char_limit: usize,
    max_free_corrections: u32,
    window: Duration,
}

impl Default for TierPolicy {
    fn default() -> Self {
        Self {
            anonymous_char_limit: ANONYMOUS_CHAR_LIMIT,
            authorized_char_limit: AUTHORIZED_CHAR_LIMIT,
            premium_char_limit: PREMIUM_CHAR_LIMIT,
            max_free_corrections: MAX_FREE_CORRECTIONS_PER_DAY,
            window: Duration::hours(USAGE_WINDOW_HOURS),
        }
    }
}

impl From<&LimitsConfig> for TierPolicy {
    fn from(config: &LimitsConfig) -> Self {
        Self {
            anonymous_char_limit: config.anonymous_char_limit,
            authorized_char_limit: config.authorized_char_limit,
            premium_char_limit: config.premium_char_limit,
            max_free_corrections: config.max_free_corrections_per_day,
            window: Duration::hours(i64::from(config.window_hours)),
        }
    }
}

impl TierPolicy {
    pub fn max_free_corrections(&self) -> u32 {
        self.max_free_corrections
    }

    /// Maximum input length, in characters, for a tier.
    pub fn effective_char_limit(&self, tier: AccessTier) -> usize {
        match tier {
            AccessTier::Anonymous => self.anonymous_char_limit,
            AccessTier::Authorized => self.authorized_char_limit,
            AccessTier::Premium => self.premium_char_limit,
        }
    }

    /// Whether the window has run its course at `now`.
    ///
    /// A window with no first use is treated as expired. A first use in the
    /// future keeps the window open.
    fn window_expired(&self, usage: &UsageWindow, now: Timestamp) -> bool {
        match usage.first_usage {
            None => true,
            Some(first) => now.since(first) >= self.window,
        }
    }

    /// Whether the requested action must be refused.
    ///
    /// - Premium: never.
    /// - Anonymous: once the input reaches the anonymous char limit.
    /// - Authorized: once the uses in a still-open window reach the cap.
    ///   Expiry beats the count.
    pub fn is_limit_reached(
        &self,
        tier: AccessTier,
        input_length: usize,
        usage: &UsageWindow,
        now: Timestamp,
    ) -> bool {
        match tier {
            AccessTier::Premium => false,
            AccessTier::Anonymous => input_length >= self.anonymous_char_limit,
            AccessTier::Authorized => {
                if self.window_expired(usage, now) {
                    return false;
                }
                usage.uses_in_window >= self.max_free_corrections
            }
        }
    }

    /// Corrections left in the current window.
    pub fn remaining_uses(&self, usage: &UsageWindow, now: Timestamp) -> u32 {
        if self.window_expired(usage, now) {
            return self.max_free_corrections;
        }
        self.max_free_corrections
            .saturating_sub(usage.uses_in_window)
    }

    /// Both gate answers plus the char limit that applied.
    pub fn decide(
        &self,
        tier: AccessTier,
        input_length: usize,
        usage: &UsageWindow,
        now: Timestamp,
    ) -> LimitDecision {
        LimitDecision {
            is_limit_reached: self.is_limit_reached(tier, input_length, usage, now),
            remaining_uses: self.remaining_uses(usage, now),
            char_limit: self.effective_char_limit(tier),
        }
    }

    /// Gate check for everything the host knows about the user.
    ///
    /// The premium flag is checked before the session, so a premium user is
    /// never limited even while signed out. The char limit and usage rules
    /// otherwise follow [`AccessContext::tier`].
    pub fn is_limit_reached_for(
        &self,
        access: &AccessContext,
        input_length: usize,
        now: Timestamp,
    ) -> bool {
        if access.has_premium_access {
            return false;
        }
        self.is_limit_reached(access.tier(), input_length, &access.usage, now)
    }

    /// [`TierPolicy::decide`] with the premium-first gate of
    /// [`TierPolicy::is_limit_reached_for`].
    pub fn decide_for(
        &self,
        access: &AccessContext,
        input_length: usize,
        now: Timestamp,
    ) -> LimitDecision {
        LimitDecision {
            is_limit_reached: self.is_limit_reached_for(access, input_length, now),
            remaining_uses: self.remaining_uses(&access.usage, now),
            char_limit: self.effective_char_limit(access.tier()),
        }
    }

    /// Truncate `text` to the tier's limit, counting characters, not bytes.
    pub fn clamp_text(&self, tier: AccessTier, text: &str) -> String {
        let limit = self.effective_char_limit(tier);
        match text.char_indices().nth(limit) {
            Some((byte_idx, _)) => text[..byte_idx].to_string(),
            None => text.to_string(),
        }
    }
}

/// Character count as the gate sees it.
pub fn char_count(text: &str) -> usize {
    text.chars().count()
}
