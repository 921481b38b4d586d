//! Level-triggered "a frame has arrived" signal
//!
//! The receive loop raises the signal for every decoded frame and callers
//! wait on it. A raised signal stays raised until the caller clears it, so
//! a waiter that arrives after the frame still wakes immediately.

use std::time::Duration;

use tokio::sync::watch;

use chatwire_utils::{ChatwireError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SignalState {
    Idle,
    Signaled,
    Closed,
}

/// How a wait finished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// At least one frame arrived since the last `clear()`
    Woken,
    /// Nothing arrived before the deadline
    TimedOut,
}

/// Single-slot response signal shared by the receive loop and callers
#[derive(Debug)]
pub struct ResponseSignal {
    state: watch::Sender<SignalState>,
}

impl ResponseSignal {
    pub fn new() -> Self {
        let (state, _) = watch::channel(SignalState::Idle);
        Self { state }
    }

    /// Raise the signal, waking every current waiter
    ///
    /// Has no effect once the signal is closed.
    pub fn signal(&self) {
        self.state.send_if_modified(|state| match state {
            SignalState::Idle => {
                *state = SignalState::Signaled;
                true
            }
            SignalState::Signaled | SignalState::Closed => false,
        });
    }

    /// Lower the signal before issuing the next request
    pub fn clear(&self) {
        self.state.send_if_modified(|state| match state {
            SignalState::Signaled => {
                *state = SignalState::Idle;
                true
            }
            SignalState::Idle | SignalState::Closed => false,
        });
    }

    /// Mark the connection as gone; current and future waiters fail
    pub fn close(&self) {
        self.state.send_replace(SignalState::Closed);
    }

    /// Return to idle for a fresh connection
    pub fn reset(&self) {
        self.state.send_replace(SignalState::Idle);
    }

    pub fn is_signaled(&self) -> bool {
        *self.state.borrow() == SignalState::Signaled
    }

    pub fn is_closed(&self) -> bool {
        *self.state.borrow() == SignalState::Closed
    }

    /// Wait until the signal is raised or `timeout` elapses
    ///
    /// Returns immediately if the signal is already raised. Fails with
    /// [`ChatwireError::ConnectionClosed`] if the connection ends first.
    pub async fn wait(&self, timeout: Duration) -> Result<WaitOutcome> {
        let mut rx = self.state.subscribe();
        let waited = tokio::time::timeout(
            timeout,
            rx.wait_for(|state| *state != SignalState::Idle),
        )
        .await;

        match waited {
            Err(_) => Ok(WaitOutcome::TimedOut),
            Ok(Err(_)) => Err(ChatwireError::ConnectionClosed),
            Ok(Ok(state)) => match *state {
                SignalState::Signaled => Ok(WaitOutcome::Woken),
                SignalState::Closed => Err(ChatwireError::ConnectionClosed),
                SignalState::Idle => Err(ChatwireError::internal("signal woke while idle")),
            },
        }
    }
}

impl Default for ResponseSignal {
    fn default() -> Self {
        Self::new()
    }
}
