//! Bounded polling of an upstream run.
//!
//! The loop is a small state machine. [`next_action`] is the whole policy
//! and does no I/O, so it can be driven by a real or a paused clock.

pub mod run;

use crate::apify::RunStatus;

/// Why polling stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The run left `RUNNING`.
    Settled,
    /// The poll cap was hit while the run was still `RUNNING`.
    Exhausted,
}

/// What to do after observing a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollAction {
    /// Sleep for the poll interval, then fetch the run again.
    Poll,
    Stop(Termination),
}

/// Where the poll loop is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    /// The submit call returned; nothing polled yet.
    Submitted,
    Polling { polls: u32 },
    Terminal { polls: u32, termination: Termination },
}

impl PollState {
    /// Status polls performed so far.
    pub fn polls(&self) -> u32 {
        match self {
            PollState::Submitted => 0,
            PollState::Polling { polls } | PollState::Terminal { polls, .. } => *polls,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PollState::Terminal { .. })
    }

    /// Feed the latest observed status and get the next state and action.
    /// A terminal state stays terminal.
    pub fn advance(self, status: Option<&RunStatus>, max_polls: u32) -> (PollState, PollAction) {
        if let PollState::Terminal { termination, .. } = self {
            return (self, PollAction::Stop(termination));
        }
        let polls = self.polls();
        match next_action(status, polls, max_polls) {
            PollAction::Poll => (PollState::Polling { polls: polls + 1 }, PollAction::Poll),
            PollAction::Stop(termination) => (
                PollState::Terminal { polls, termination },
                PollAction::Stop(termination),
            ),
        }
    }
}

/// Poll while the run is `RUNNING` and fewer than `max_polls` polls were made.
/// A run without a status is not running.
pub fn next_action(status: Option<&RunStatus>, polls: u32, max_polls: u32) -> PollAction {
    if status != Some(&RunStatus::Running) {
        PollAction::Stop(Termination::Settled)
    } else if polls >= max_polls {
        PollAction::Stop(Termination::Exhausted)
    } else {
        PollAction::Poll
    }
}
