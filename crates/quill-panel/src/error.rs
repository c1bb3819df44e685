//! Error types for the panel controllers.

use crate::state::RequestToken;

/// Failures reported by host collaborators.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CollaboratorError {
    /// The text service refused because the user's daily quota is spent.
    #[error("Daily correction limit reached")]
    DailyLimitReached,
    /// Any other failure. The message may be empty.
    #[error("{0}")]
    Failed(String),
}

/// Requests a panel refuses outright.
///
/// These never carry collaborator failures: those are absorbed into the
/// panel's error state and reported as an `ActionOutcome`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PanelError {
    #[error("Panel busy: {0} already in flight")]
    Busy(String),
    #[error("Nothing to process: text is empty")]
    EmptyText,
    #[error("Limit reached: {0}")]
    LimitReached(String),
    #[error("Nothing to revert")]
    NothingToRevert,
    #[error("Invalid state transition: {0} -> {1}")]
    InvalidTransition(String, String),
    #[error("Stale request {0}")]
    StaleRequest(RequestToken),
}
