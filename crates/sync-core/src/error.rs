//! Error types for the relay core.
//!
//! Nothing here is fatal. The server logs these and keeps going; the
//! connection that caused one is left in whatever state it was in.

use thiserror::Error;

use crate::identity::ConnectionId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelayError {
    /// Event arrived for a connection the relay does not know about
    /// (never connected, or already disconnected).
    #[error("unknown connection {0}")]
    UnknownConnection(ConnectionId),

    /// `register_screen` with a missing or blank screen id.
    #[error("screen id missing or empty")]
    InvalidScreenId,

    /// Second registration on a connection that already has a role.
    #[error("connection {0} is already registered")]
    AlreadyRegistered(ConnectionId),
}
