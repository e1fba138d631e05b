//! The `connection` module defines the duplex connection abstraction the
//! broker depends on.
//!
//! The broker never touches a concrete transport: it sees an opened,
//! readable/writable handle through the [`Connection`] trait, queries its
//! liveness through [`ConnectionState`], and receives inbound traffic as
//! [`Frame`] values. The WebSocket implementation lives in the `transport`
//! module.

use async_trait::async_trait;

use crate::utils::error::BrokerError;

/// Liveness of a duplex connection as reported by the transport.
///
/// The broker does not assume any particular transport's native state
/// enumeration; it only distinguishes "open", "still connecting", and
/// "closed or otherwise unusable".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Open,
    Connecting,
    Closed,
}

impl ConnectionState {
    /// A connection is reclaimable when it is definitively past any
    /// open or pending state.
    pub fn is_dead(self) -> bool {
        !matches!(self, ConnectionState::Open | ConnectionState::Connecting)
    }
}

/// One inbound message frame read from a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// A UTF-8 text frame carrying an opaque payload.
    Text(String),
    /// Any non-text frame; the receive loop skips these.
    Binary,
}

/// An open duplex connection handle.
///
/// Handles are shared, not exclusively owned: the session's receive loop
/// reads from the handle while broadcasters concurrently write to it, so
/// implementations must synchronize internally.
#[async_trait]
pub trait Connection: Send + Sync {
    /// Current liveness as reported by the underlying transport.
    fn state(&self) -> ConnectionState;

    /// Waits for the next inbound frame.
    ///
    /// Returns `None` when no frame was produced for this iteration: the
    /// read failed, the stream ended, or a close frame arrived. In those
    /// cases the implementation transitions [`Connection::state`] to
    /// `Closed`; the caller re-checks the state rather than treating
    /// `None` as an error.
    async fn recv(&self) -> Option<Frame>;

    /// Sends a UTF-8 text frame to the peer.
    async fn send_text(&self, payload: &str) -> Result<(), BrokerError>;
}
