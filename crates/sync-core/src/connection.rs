//! The relay's view of a live transport session.
//!
//! The core never touches sockets. It talks to connections through
//! [`Connection`], which the server implements over a channel into the
//! connection's writer task and tests implement with a recording double.

use std::fmt;

use crate::identity::{ConnectionId, ScreenId};
use crate::messages::OutboundEvent;

/// Handle to one live bidirectional session.
///
/// Both methods must be non-blocking enqueues: they are called from
/// inside the relay's single processing loop.
pub trait Connection: Clone {
    fn id(&self) -> ConnectionId;

    /// Queue an event for this connection.
    ///
    /// Returns `false` if the transport is already gone. That is not an
    /// error; the disconnect path will clean up the registry.
    fn deliver(&self, event: &OutboundEvent) -> bool;

    /// Force the transport closed.
    fn close(&self, reason: CloseReason);
}

/// Why the relay closed a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseReason {
    /// Pushed out by a newer instance of the same screen.
    Evicted { screen_id: ScreenId },

    /// Server is going away.
    Shutdown,
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CloseReason::Evicted { screen_id } => write!(f, "evicted: {}", screen_id),
            CloseReason::Shutdown => f.write_str("shutdown"),
        }
    }
}
