use crate::{Error, Result};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayState {
    Streaming,
    FlushPending,
    Done,
    Error,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelaySignal {
    /// A line was consumed without reaching a flush point.
    LineConsumed,
    /// The last fragment closed a sentence or a line.
    FlushPointReached,
    /// The backend reported `done` or the body ended.
    StreamCompleted,
    /// The buffered text has been handed to the client.
    Flushed,
    ReadFailed,
    ClientGone,
}

pub struct RelayStateMachine {
    state: RelayState,
    // Set once the backend has nothing more to send; the next flush ends the relay.
    finishing: bool,
}

impl RelayStateMachine {
    pub fn new() -> Self {
        Self {
            state: RelayState::Streaming,
            finishing: false,
        }
    }

    pub fn current_state(&self) -> RelayState {
        self.state
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self.state,
            RelayState::Done | RelayState::Error | RelayState::Cancelled
        )
    }

    pub fn transition(&mut self, signal: RelaySignal) -> Result<RelayState> {
        let old_state = self.state;

        let new_state = match (old_state, signal) {
            (RelayState::Streaming, RelaySignal::LineConsumed) => RelayState::Streaming,
            (RelayState::Streaming, RelaySignal::FlushPointReached) => RelayState::FlushPending,
            (RelayState::Streaming, RelaySignal::StreamCompleted) => {
                self.finishing = true;
                RelayState::FlushPending
            }
            (RelayState::FlushPending, RelaySignal::Flushed) if self.finishing => RelayState::Done,
            (RelayState::FlushPending, RelaySignal::Flushed) => RelayState::Streaming,
            (RelayState::Streaming | RelayState::FlushPending, RelaySignal::ReadFailed) => {
                RelayState::Error
            }
            (RelayState::Streaming | RelayState::FlushPending, RelaySignal::ClientGone) => {
                RelayState::Cancelled
            }
            _ => {
                warn!(
                    "Invalid relay transition from {:?} with signal {:?}",
                    old_state, signal
                );
                return Err(Error::InvalidTransition {
                    current: format!("{old_state:?}"),
                    requested: format!("{signal:?}"),
                });
            }
        };

        if old_state != new_state {
            debug!(
                "Relay state transition: {:?} -> {:?} (signal: {:?})",
                old_state, new_state, signal
            );
        }

        self.state = new_state;
        Ok(new_state)
    }
}

impl Default for RelayStateMachine {
    fn default() -> Self {
        Self::new()
    }
}
