//! Central relay loop.
//!
//! This task owns the `Relay` instance and processes every
//! `RelayRequest` coming from connection tasks, one at a time, in
//! arrival order. Nothing else ever touches the registry, so no locking
//! is needed.
//!
//! Delivery is a non-blocking enqueue onto each connection's own
//! outbound channel; the loop never waits on a socket.

use tracing::{debug, info, warn};

use sync_core::{ConnectionId, Handled, Relay, RelayConfig, RelayError};

use crate::types::{ClientHandle, RelayRequest, RelayRx, RelayStats};

/// Run the central relay processing loop until every sender is dropped.
pub async fn run_relay_loop(mut relay_rx: RelayRx, config: RelayConfig) {
    let mut relay: Relay<ClientHandle> = Relay::new(config);

    info!(
        max_instances_per_screen = relay.config().max_instances_per_screen,
        "Relay loop started"
    );

    while let Some(req) = relay_rx.recv().await {
        match req {
            RelayRequest::Connect(handle) => relay.connect(handle),
            RelayRequest::Inbound { conn_id, event } => {
                let name = event.name();
                match relay.handle(conn_id, event) {
                    Ok(handled) => log_handled(conn_id, name, &handled),
                    Err(err @ RelayError::UnknownConnection(_)) => {
                        debug!(conn_id = %conn_id, event = name, error = %err, "Event for closed session");
                    }
                    Err(err) => {
                        warn!(conn_id = %conn_id, event = name, error = %err, "Event rejected");
                    }
                }
            }
            RelayRequest::Disconnect(conn_id) => {
                relay.disconnect(conn_id);
            }
            RelayRequest::Health(reply) => {
                let _ = reply.send(RelayStats {
                    connected_screens: relay.snapshot(),
                    control_panels: relay.control_panel_count(),
                    connections: relay.session_count(),
                });
            }
            RelayRequest::Shutdown => {
                relay.shutdown();
            }
        }
    }

    info!("Relay loop shutting down (relay_rx closed)");
}

fn log_handled(conn_id: ConnectionId, event: &str, handled: &Handled) {
    match handled {
        Handled::Routed(report) => {
            for outcome in &report.outcomes {
                debug!(conn_id = %conn_id, event, screen_id = %outcome.screen_id, delivery = ?outcome.delivery, "Target outcome");
            }
        }
        Handled::StatusDropped => {
            debug!(conn_id = %conn_id, event, "Status dropped, no screen id");
        }
        _ => {}
    }
}
