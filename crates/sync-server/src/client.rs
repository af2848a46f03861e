// crates/sync-server/src/client.rs
// Per-connection websocket I/O.

use axum::extract::ws::{CloseFrame, Message, WebSocket};
use futures::stream::{SplitSink, StreamExt};
use futures::SinkExt;
use tracing::{debug, warn};

use sync_core::{CloseReason, ConnectionId};
use sync_protocol::{decode_inbound, encode_outbound};

use crate::types::{OutboundFrame, OutboundRx, RelayRequest, RelayTx};

/// Close code sent to an instance pushed out by a newer one.
pub const CLOSE_CODE_EVICTED: u16 = 4000;

/// Close code sent when the server is stopping ("going away").
pub const CLOSE_CODE_SHUTDOWN: u16 = 1001;

/// Run the I/O loops for a single connection.
///
/// The reader forwards decoded events to the relay; a spawned writer
/// drains `out_rx` onto the socket. Whichever side finishes first ends
/// the connection, and the relay is told exactly once.
pub async fn run_client(
    conn_id: ConnectionId,
    socket: WebSocket,
    relay_tx: RelayTx,
    out_rx: OutboundRx,
) {
    let (ws_sender, mut ws_receiver) = socket.split();

    let mut writer = tokio::spawn(write_loop(conn_id, ws_sender, out_rx));

    loop {
        tokio::select! {
            msg = ws_receiver.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        if !forward_frame(conn_id, text.as_str(), &relay_tx) {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        debug!(conn_id = %conn_id, "Client closed connection");
                        break;
                    }
                    Some(Ok(Message::Binary(_))) => {
                        debug!(conn_id = %conn_id, "Ignoring binary frame");
                    }
                    // Ping/pong are answered by axum.
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        warn!(conn_id = %conn_id, error = %e, "Websocket read error");
                        break;
                    }
                }
            }
            _ = &mut writer => {
                debug!(conn_id = %conn_id, "Writer finished");
                break;
            }
        }
    }

    let _ = relay_tx.send(RelayRequest::Disconnect(conn_id));
    writer.abort();
}

/// Decode one text frame and hand it to the relay.
///
/// Returns `false` only if the relay task is gone.
fn forward_frame(conn_id: ConnectionId, text: &str, relay_tx: &RelayTx) -> bool {
    match decode_inbound(text) {
        Ok(event) => {
            debug!(conn_id = %conn_id, event = event.name(), "Inbound event");
            if relay_tx.send(RelayRequest::Inbound { conn_id, event }).is_err() {
                warn!("Relay channel closed");
                return false;
            }
        }
        Err(e) => {
            warn!(conn_id = %conn_id, error = %e, "Dropping malformed frame");
        }
    }
    true
}

async fn write_loop(
    conn_id: ConnectionId,
    mut ws_sender: SplitSink<WebSocket, Message>,
    mut out_rx: OutboundRx,
) {
    while let Some(frame) = out_rx.recv().await {
        match frame {
            OutboundFrame::Event(event) => {
                let text = match encode_outbound(&event) {
                    Ok(text) => text,
                    Err(e) => {
                        warn!(conn_id = %conn_id, event = event.name(), error = %e, "Encode failed");
                        continue;
                    }
                };
                if let Err(e) = ws_sender.send(Message::Text(text.into())).await {
                    debug!(conn_id = %conn_id, error = %e, "Write failed");
                    break;
                }
            }
            OutboundFrame::Close(reason) => {
                debug!(conn_id = %conn_id, reason = %reason, "Closing connection");
                let frame = CloseFrame {
                    code: close_code(&reason),
                    reason: reason.to_string().into(),
                };
                let _ = ws_sender.send(Message::Close(Some(frame))).await;
                break;
            }
        }
    }
}

fn close_code(reason: &CloseReason) -> u16 {
    match reason {
        CloseReason::Evicted { .. } => CLOSE_CODE_EVICTED,
        CloseReason::Shutdown => CLOSE_CODE_SHUTDOWN,
    }
}
