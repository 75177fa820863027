//! Per-review retry state machine
//!
//! ```text
//! Pending --success--> Succeeded
//! Pending --retryable--> Retrying(1) --retryable--> ... --> Exhausted
//! any non-terminal --fatal--> Exhausted
//! ```
//!
//! The policy is a pure transition function; the classifier owns the loop,
//! the sleeping and the logging.

use std::time::Duration;

/// Where a review is in its attempt sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryState {
    /// No attempt made yet
    Pending,
    /// `n` attempts have failed with a retryable error
    Retrying(u32),
    Succeeded,
    Exhausted,
}

impl RetryState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RetryState::Succeeded | RetryState::Exhausted)
    }
}

/// Classification of a single attempt's result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    Success,
    Retryable,
    Fatal,
}

/// What the driver does next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryAction {
    Accept,
    RetryAfter(Duration),
    GiveUp,
}

/// Fixed-backoff policy with a cap on total attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff: Duration,
}

impl RetryPolicy {
    /// `max_attempts` counts every attempt, the first one included; values
    /// below 1 are raised to 1
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Transition after an attempt. Terminal states are absorbing.
    pub fn next(&self, state: RetryState, outcome: AttemptOutcome) -> (RetryState, RetryAction) {
        let failed_so_far = match state {
            RetryState::Pending => 0,
            RetryState::Retrying(n) => n,
            RetryState::Succeeded => return (state, RetryAction::Accept),
            RetryState::Exhausted => return (state, RetryAction::GiveUp),
        };

        match outcome {
            AttemptOutcome::Success => (RetryState::Succeeded, RetryAction::Accept),
            AttemptOutcome::Fatal => (RetryState::Exhausted, RetryAction::GiveUp),
            AttemptOutcome::Retryable => {
                let failed = failed_so_far + 1;
                if failed >= self.max_attempts {
                    (RetryState::Exhausted, RetryAction::GiveUp)
                } else {
                    (RetryState::Retrying(failed), RetryAction::RetryAfter(self.backoff))
                }
            }
        }
    }
}
