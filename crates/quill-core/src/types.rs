use std::fmt;
use std::ops::{Add, Sub};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Enums
// =============================================================================

/// Access level of the current user.
///
/// Controls the character limit and whether the daily correction cap applies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessTier {
    /// Not signed in. Short inputs only.
    Anonymous,
    /// Signed in without a paid plan. Capped corrections per day.
    Authorized,
    /// Signed in with an active paid plan. No usage cap.
    Premium,
}

impl AccessTier {
    /// Derive the tier from the two flags the host knows about.
    ///
    /// The tier picks the char limit, and the premium limit needs a session.
    /// The premium exemption from the gate does not; see
    /// `TierPolicy::is_limit_reached_for`.
    pub fn from_flags(is_user_logged_in: bool, has_premium_access: bool) -> Self {
        match (is_user_logged_in, has_premium_access) {
            (false, _) => AccessTier::Anonymous,
            (true, false) => AccessTier::Authorized,
            (true, true) => AccessTier::Premium,
        }
    }
}

impl fmt::Display for AccessTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessTier::Anonymous => write!(f, "anonymous"),
            AccessTier::Authorized => write!(f, "authorized"),
            AccessTier::Premium => write!(f, "premium"),
        }
    }
}

impl std::str::FromStr for AccessTier {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "anonymous" => Ok(AccessTier::Anonymous),
            "authorized" => Ok(AccessTier::Authorized),
            "premium" => Ok(AccessTier::Premium),
            _ => Err(format!("Unknown access tier: {}", s)),
        }
    }
}

/// Kind of text processing requested from the correction service.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrectionType {
    Correct,
    Improve,
}

impl fmt::Display for CorrectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CorrectionType::Correct => write!(f, "correct"),
            CorrectionType::Improve => write!(f, "improve"),
        }
    }
}

/// Actions the grammar panel can have in flight.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelAction {
    Correct,
    Improve,
    Translate,
}

impl From<CorrectionType> for PanelAction {
    fn from(kind: CorrectionType) -> Self {
        match kind {
            CorrectionType::Correct => PanelAction::Correct,
            CorrectionType::Improve => PanelAction::Improve,
        }
    }
}

impl fmt::Display for PanelAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PanelAction::Correct => write!(f, "correct"),
            PanelAction::Improve => write!(f, "improve"),
            PanelAction::Translate => write!(f, "translate"),
        }
    }
}

/// Actions the subscription panel can have in flight.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionAction {
    Fetch,
    Cancel,
}

impl fmt::Display for SubscriptionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubscriptionAction::Fetch => write!(f, "fetch"),
            SubscriptionAction::Cancel => write!(f, "cancel"),
        }
    }
}

/// Billing status reported by the subscription service.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    Cancelled,
    NoSubscription,
}

impl SubscriptionStatus {
    /// Wire name, also used as the key into localized status labels.
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Cancelled => "cancelled",
            SubscriptionStatus::NoSubscription => "no_subscription",
        }
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SubscriptionStatus {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(SubscriptionStatus::Active),
            "cancelled" => Ok(SubscriptionStatus::Cancelled),
            "no_subscription" => Ok(SubscriptionStatus::NoSubscription),
            _ => Err(format!("Unknown subscription status: {}", s)),
        }
    }
}

// =============================================================================
// Value Objects
// =============================================================================

/// Unix timestamp in milliseconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub fn now() -> Self {
        Self(Utc::now().timestamp_millis())
    }

    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt.timestamp_millis())
    }

    pub fn from_secs(secs: i64) -> Self {
        Self(secs.saturating_mul(1000))
    }

    pub fn to_datetime(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.0).unwrap_or_default()
    }

    /// Time elapsed from `earlier` to `self`. Negative if `earlier` is later.
    ///
    /// Saturates at the range `chrono::Duration` can hold.
    pub fn since(&self, earlier: Timestamp) -> Duration {
        Duration::milliseconds(self.0.saturating_sub(earlier.0).max(-i64::MAX))
    }
}

impl Add<Duration> for Timestamp {
    type Output = Timestamp;
    fn add(self, rhs: Duration) -> Timestamp {
        Timestamp(self.0.saturating_add(rhs.num_milliseconds()))
    }
}

impl Sub<Duration> for Timestamp {
    type Output = Timestamp;
    fn sub(self, rhs: Duration) -> Timestamp {
        Timestamp(self.0.saturating_sub(rhs.num_milliseconds()))
    }
}

/// Rolling usage counter for signed-in users without a paid plan.
///
/// `uses_in_window` only means something while the window that opened at
/// `first_usage` is still running. Expiry is observed by the policy at read
/// time; resetting the stored counter is the owner's job.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageWindow {
    pub first_usage: Option<Timestamp>,
    pub uses_in_window: u32,
}

impl UsageWindow {
    pub fn new(first_usage: Option<Timestamp>, uses_in_window: u32) -> Self {
        Self {
            first_usage,
            uses_in_window,
        }
    }
}

/// Verdict of the tier gate for one set of inputs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitDecision {
    pub is_limit_reached: bool,
    pub remaining_uses: u32,
    pub char_limit: usize,
}

/// Everything the host knows about the current user's access.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessContext {
    pub is_user_logged_in: bool,
    pub has_premium_access: bool,
    pub premium_until: Option<Timestamp>,
    pub usage: UsageWindow,
}

impl AccessContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authorized(usage: UsageWindow) -> Self {
        Self {
            is_user_logged_in: true,
            usage,
            ..Self::default()
        }
    }

    pub fn premium(premium_until: Option<Timestamp>) -> Self {
        Self {
            is_user_logged_in: true,
            has_premium_access: true,
            premium_until,
            usage: UsageWindow::default(),
        }
    }

    pub fn tier(&self) -> AccessTier {
        AccessTier::from_flags(self.is_user_logged_in, self.has_premium_access)
    }
}

/// Subscription details returned by the billing service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionInfo {
    pub status: SubscriptionStatus,
    #[serde(default)]
    pub next_payment_epoch_seconds: Option<i64>,
}

impl SubscriptionInfo {
    pub fn next_payment(&self) -> Option<Timestamp> {
        self.next_payment_epoch_seconds.map(Timestamp::from_secs)
    }
}
