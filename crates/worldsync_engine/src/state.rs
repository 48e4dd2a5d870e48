//! Connection state machine.

use crate::error::{SyncError, SyncResult};
use parking_lot::RwLock;
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};
use tracing::debug;

/// The current state of a connection.
///
/// Transitions: `Connecting -> Open -> {Closing -> Closed | Closed}`.
/// `Closed` is absorbing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Handshake in progress.
    Connecting,
    /// Frames may be sent and received.
    Open,
    /// A close has been initiated.
    Closing,
    /// The connection is gone. Every operation fails fast.
    Closed,
}

impl ConnectionState {
    /// Returns true if frames may be sent or received.
    pub fn is_open(&self) -> bool {
        matches!(self, ConnectionState::Open)
    }

    /// Returns true if the connection has reached its terminal state.
    pub fn is_closed(&self) -> bool {
        matches!(self, ConnectionState::Closed)
    }

    /// Returns true if the machine may move from `self` to `next`.
    pub fn can_transition_to(&self, next: ConnectionState) -> bool {
        use ConnectionState::*;
        matches!(
            (self, next),
            (Connecting, Open)
                | (Connecting, Closed)
                | (Open, Closing)
                | (Open, Closed)
                | (Closing, Closed)
        )
    }
}

/// Shared, thread-safe connection state.
///
/// Besides the state value this carries a cancellation token that fires
/// when the state reaches `Closed`, so suspended receives and sends can
/// observe a close without polling.
#[derive(Debug)]
pub struct ConnectionStatus {
    state: RwLock<ConnectionState>,
    closed: CancellationToken,
}

impl ConnectionStatus {
    /// Creates a status in the `Connecting` state.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(ConnectionState::Connecting),
            closed: CancellationToken::new(),
        }
    }

    /// Creates a status that is already `Open`.
    pub fn open() -> Self {
        let status = Self::new();
        *status.state.write() = ConnectionState::Open;
        status
    }

    /// Gets the current state.
    pub fn state(&self) -> ConnectionState {
        *self.state.read()
    }

    /// Returns true if the connection is open.
    pub fn is_open(&self) -> bool {
        self.state().is_open()
    }

    /// Returns true if the connection is closed.
    pub fn is_closed(&self) -> bool {
        self.state().is_closed()
    }

    /// Moves to `next`, rejecting transitions the machine does not allow.
    pub fn transition(&self, next: ConnectionState) -> SyncResult<()> {
        let mut state = self.state.write();
        if !state.can_transition_to(next) {
            return Err(SyncError::InvalidStateTransition {
                from: format!("{:?}", *state),
                to: format!("{:?}", next),
            });
        }
        debug!(from = ?*state, to = ?next, "connection state change");
        *state = next;
        drop(state);

        if next.is_closed() {
            self.closed.cancel();
        }
        Ok(())
    }

    /// Starts closing. Returns false if the connection was not open.
    pub fn begin_closing(&self) -> bool {
        self.transition(ConnectionState::Closing).is_ok()
    }

    /// Moves to `Closed`. Returns false if already closed.
    pub fn mark_closed(&self) -> bool {
        self.transition(ConnectionState::Closed).is_ok()
    }

    /// Resolves once the connection is closed.
    pub fn closed(&self) -> WaitForCancellationFuture<'_> {
        self.closed.cancelled()
    }
}

impl Default for ConnectionStatus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn connection_state_checks() {
        assert!(ConnectionState::Open.is_open());
        assert!(!ConnectionState::Closing.is_open());
        assert!(ConnectionState::Closed.is_closed());

        assert!(ConnectionState::Connecting.can_transition_to(ConnectionState::Open));
        assert!(ConnectionState::Open.can_transition_to(ConnectionState::Closing));
        assert!(ConnectionState::Open.can_transition_to(ConnectionState::Closed));
        assert!(ConnectionState::Closing.can_transition_to(ConnectionState::Closed));
        assert!(!ConnectionState::Closing.can_transition_to(ConnectionState::Open));
        assert!(!ConnectionState::Open.can_transition_to(ConnectionState::Connecting));
    }

    #[test]
    fn closed_is_absorbing() {
        for next in [
            ConnectionState::Connecting,
            ConnectionState::Open,
            ConnectionState::Closing,
            ConnectionState::Closed,
        ] {
            assert!(!ConnectionState::Closed.can_transition_to(next));
        }
    }

    #[test]
    fn status_lifecycle() {
        let status = ConnectionStatus::new();
        assert_eq!(status.state(), ConnectionState::Connecting);

        status.transition(ConnectionState::Open).unwrap();
        assert!(status.is_open());

        assert!(status.begin_closing());
        assert!(!status.begin_closing());
        assert_eq!(status.state(), ConnectionState::Closing);

        assert!(status.mark_closed());
        assert!(!status.mark_closed());
        assert!(status.is_closed());

        let err = status.transition(ConnectionState::Open).unwrap_err();
        assert!(matches!(err, SyncError::InvalidStateTransition { .. }));
    }

    #[tokio::test]
    async fn closed_future_resolves_on_close() {
        let status = ConnectionStatus::open();
        status.mark_closed();

        tokio::time::timeout(Duration::from_secs(1), status.closed())
            .await
            .expect("closed future should resolve");
    }
}
