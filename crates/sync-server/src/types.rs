//! Shared types for the relay server.
//!
//! This module defines:
//! - `ClientHandle`: the server's `Connection` implementation
//! - `OutboundFrame`: what a connection's writer task consumes
//! - `RelayRequest`: messages flowing from connection tasks to the relay task
//! - channel aliases between the two

use serde::Serialize;
use tokio::sync::{mpsc, oneshot};

use sync_core::{CloseReason, Connection, ConnectionId, InboundEvent, OutboundEvent, ScreenCount};

/// Work item for a connection's writer task.
#[derive(Debug, Clone)]
pub enum OutboundFrame {
    Event(OutboundEvent),
    Close(CloseReason),
}

/// Outbound frames from the relay to a given connection.
pub type OutboundTx = mpsc::UnboundedSender<OutboundFrame>;
pub type OutboundRx = mpsc::UnboundedReceiver<OutboundFrame>;

/// Relay-side handle to one websocket.
///
/// Cloning is cheap; every clone feeds the same writer task.
#[derive(Debug, Clone)]
pub struct ClientHandle {
    id: ConnectionId,
    tx: OutboundTx,
}

impl ClientHandle {
    pub fn new(id: ConnectionId, tx: OutboundTx) -> Self {
        ClientHandle { id, tx }
    }
}

impl Connection for ClientHandle {
    fn id(&self) -> ConnectionId {
        self.id
    }

    fn deliver(&self, event: &OutboundEvent) -> bool {
        self.tx.send(OutboundFrame::Event(event.clone())).is_ok()
    }

    fn close(&self, reason: CloseReason) {
        let _ = self.tx.send(OutboundFrame::Close(reason));
    }
}

/// Relay state as seen by the health endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayStats {
    pub connected_screens: Vec<ScreenCount>,
    pub control_panels: usize,
    pub connections: usize,
}

/// Message flowing from connection tasks into the relay task.
#[derive(Debug)]
pub enum RelayRequest {
    /// New websocket accepted; starts Unregistered.
    Connect(ClientHandle),

    /// Decoded event from a connection.
    Inbound {
        conn_id: ConnectionId,
        event: InboundEvent,
    },

    /// Websocket gone (closed, errored, or evicted).
    Disconnect(ConnectionId),

    /// Snapshot request from the health endpoint.
    Health(oneshot::Sender<RelayStats>),

    /// Close every connection; the server is stopping.
    Shutdown,
}

/// Channel from connection tasks → relay task.
pub type RelayTx = mpsc::UnboundedSender<RelayRequest>;
pub type RelayRx = mpsc::UnboundedReceiver<RelayRequest>;
