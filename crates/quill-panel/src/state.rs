//! Per-panel action state machine.
//!
//! Enforces the lifecycle around one external call at a time:
//! - Idle -> Pending(action) (request accepted)
//! - Idle -> Error (request rejected locally)
//! - Pending -> Idle (collaborator succeeded)
//! - Pending -> Error (collaborator failed)
//! - Error -> Idle (next edit)
//! - Error -> Pending(action) (retry by the user)
//!
//! Every accepted request gets a fresh [`RequestToken`]. Completions are
//! matched against the token of the request currently pending, so a result
//! that arrives after the panel moved on is dropped.

use std::fmt;

use crate::error::PanelError;

/// Visible state of a panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionState<A> {
    Idle,
    Pending(A),
    Error(String),
}

impl<A: Copy + fmt::Display> ActionState<A> {
    pub fn is_pending(&self) -> bool {
        matches!(self, ActionState::Pending(_))
    }

    pub fn pending_action(&self) -> Option<A> {
        match self {
            ActionState::Pending(action) => Some(*action),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ActionState::Error(message) => Some(message),
            _ => None,
        }
    }

    /// Returns whether a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: &ActionState<A>) -> bool {
        matches!(
            (self, target),
            (ActionState::Idle, ActionState::Pending(_))
                | (ActionState::Idle, ActionState::Error(_))
                | (ActionState::Pending(_), ActionState::Idle)
                | (ActionState::Pending(_), ActionState::Error(_))
                | (ActionState::Error(_), ActionState::Idle)
                | (ActionState::Error(_), ActionState::Pending(_))
                | (ActionState::Error(_), ActionState::Error(_))
        )
    }
}

impl<A: fmt::Display> fmt::Display for ActionState<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionState::Idle => write!(f, "idle"),
            ActionState::Pending(action) => write!(f, "pending({})", action),
            ActionState::Error(_) => write!(f, "error"),
        }
    }
}

/// Identity of one accepted request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestToken(u64);

impl RequestToken {
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What happened to a requested action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The collaborator succeeded and its result was applied.
    Completed,
    /// The gate refused the request; no collaborator was called.
    Rejected,
    /// The collaborator failed; the panel shows an error.
    Failed,
    /// The result arrived for a request the panel no longer tracks.
    Discarded,
}

/// State machine for a single panel instance.
///
/// Not shared between panels and not thread-safe by itself: the owning panel
/// holds it by value and mutates it through `&mut self`.
#[derive(Debug)]
pub struct ActionStateMachine<A> {
    state: ActionState<A>,
    pending_token: Option<RequestToken>,
    issued: u64,
}

impl<A: Copy + fmt::Display> Default for ActionStateMachine<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Copy + fmt::Display> ActionStateMachine<A> {
    pub fn new() -> Self {
        Self {
            state: ActionState::Idle,
            pending_token: None,
            issued: 0,
        }
    }

    pub fn current(&self) -> &ActionState<A> {
        &self.state
    }

    /// Whether `token` identifies the request currently pending.
    pub fn is_current(&self, token: RequestToken) -> bool {
        self.pending_token == Some(token)
    }

    fn transition(&mut self, target: ActionState<A>) -> Result<(), PanelError> {
        if !self.state.can_transition_to(&target) {
            return Err(PanelError::InvalidTransition(
                self.state.to_string(),
                target.to_string(),
            ));
        }
        tracing::debug!("Panel state: {} -> {}", self.state, target);
        self.state = target;
        Ok(())
    }

    fn ensure_not_pending(&self) -> Result<(), PanelError> {
        match self.state.pending_action() {
            Some(action) => Err(PanelError::Busy(action.to_string())),
            None => Ok(()),
        }
    }

    /// Accept a request and hand out its token.
    pub fn begin(&mut self, action: A) -> Result<RequestToken, PanelError> {
        self.ensure_not_pending()?;
        self.transition(ActionState::Pending(action))?;
        self.issued += 1;
        let token = RequestToken(self.issued);
        self.pending_token = Some(token);
        Ok(token)
    }

    /// Refuse a request locally and show `message`.
    pub fn reject(&mut self, message: String) -> Result<(), PanelError> {
        self.ensure_not_pending()?;
        self.transition(ActionState::Error(message))
    }

    fn settle(&mut self, token: RequestToken, target: ActionState<A>) -> Result<A, PanelError> {
        if !self.is_current(token) {
            return Err(PanelError::StaleRequest(token));
        }
        let action = self
            .state
            .pending_action()
            .ok_or(PanelError::StaleRequest(token))?;
        self.transition(target)?;
        self.pending_token = None;
        Ok(action)
    }

    /// Settle the pending request as a success.
    pub fn complete(&mut self, token: RequestToken) -> Result<A, PanelError> {
        self.settle(token, ActionState::Idle)
    }

    /// Settle the pending request as a failure showing `message`.
    pub fn fail(&mut self, token: RequestToken, message: String) -> Result<A, PanelError> {
        self.settle(token, ActionState::Error(message))
    }

    /// Drop a visible error. No-op when idle.
    pub fn clear_error(&mut self) -> Result<(), PanelError> {
        self.ensure_not_pending()?;
        if self.state.error().is_some() {
            self.transition(ActionState::Idle)?;
        }
        Ok(())
    }

    /// Stop waiting for the pending request without aborting it.
    ///
    /// The call keeps running; its result will come back stale.
    pub fn abandon(&mut self) -> Option<A> {
        let action = self.state.pending_action()?;
        tracing::debug!(action = %action, "Abandoning pending request");
        self.state = ActionState::Idle;
        self.pending_token = None;
        Some(action)
    }
}
