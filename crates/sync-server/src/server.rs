//! HTTP/websocket listener and top-level server wiring.
//!
//! This module:
//! - Builds the axum router (`/health`, `/ws`) with CORS and tracing layers.
//! - Enforces the origin allow-list and connection limit on upgrade.
//! - Assigns each websocket a `ConnectionId`.
//! - Spawns:
//!   - a single central relay task that owns the registry,
//!   - per-connection I/O (see `client`).

use std::future::Future;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use axum::{
    extract::{ws::WebSocket, State, WebSocketUpgrade},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use sync_core::{ConnectionId, RelayConfig};

use crate::client;
use crate::config::Config;
use crate::health;
use crate::relay_task;
use crate::types::{ClientHandle, OutboundRx, OutboundTx, RelayRequest, RelayRx, RelayTx};

/// Counter for assigning unique `ConnectionId`s.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

fn next_connection_id() -> ConnectionId {
    ConnectionId(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed))
}

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub(crate) relay_tx: RelayTx,
    pub(crate) config: Arc<Config>,
    pub(crate) active_connections: Arc<AtomicUsize>,
    pub(crate) started_at: Instant,
}

impl AppState {
    pub fn new(config: Config, relay_tx: RelayTx) -> Self {
        AppState {
            relay_tx,
            config: Arc::new(config),
            active_connections: Arc::new(AtomicUsize::new(0)),
            started_at: Instant::now(),
        }
    }
}

/// Spawn the central relay task and return its request channel.
pub fn spawn_relay(config: RelayConfig) -> RelayTx {
    let (relay_tx, relay_rx): (RelayTx, RelayRx) = mpsc::unbounded_channel();
    tokio::spawn(relay_task::run_relay_loop(relay_rx, config));
    relay_tx
}

/// Build the HTTP router for the given state.
pub fn router(state: AppState) -> Router {
    let origins: Vec<HeaderValue> = state
        .config
        .allowed_origins
        .iter()
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(origin = %o, "Skipping unparseable origin");
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST]);

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/ws", get(ws_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Bind and run the server with the given configuration until Ctrl-C.
pub async fn run(config: Config) -> anyhow::Result<()> {
    let addr = config.socket_addr_string();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Listening on {}", addr);

    serve(listener, config, shutdown_signal()).await
}

/// Serve on an already-bound listener until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, config: Config, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let relay_tx = spawn_relay(config.relay_config());
    let state = AppState::new(config, relay_tx.clone());
    let app = router(state);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown.await;
            info!("Shutdown requested, closing connections");
            let _ = relay_tx.send(RelayRequest::Shutdown);
        })
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

async fn ws_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    ws: WebSocketUpgrade,
) -> Response {
    if let Some(origin) = headers.get(header::ORIGIN) {
        let allowed = origin
            .to_str()
            .map(|o| state.config.is_origin_allowed(o))
            .unwrap_or(false);
        if !allowed {
            warn!(origin = ?origin, "Rejecting websocket from disallowed origin");
            return StatusCode::FORBIDDEN.into_response();
        }
    }

    let Some(slot) = ConnectionSlot::reserve(&state.active_connections, state.config.max_connections)
    else {
        warn!(
            max_connections = state.config.max_connections,
            "Rejecting websocket: connection limit reached"
        );
        return StatusCode::SERVICE_UNAVAILABLE.into_response();
    };

    // A failed upgrade drops the callback, and the slot with it.
    ws.on_upgrade(move |socket| handle_socket(socket, state, slot))
}

/// One reserved unit of the connection limit, released on drop.
struct ConnectionSlot(Arc<AtomicUsize>);

impl ConnectionSlot {
    fn reserve(active: &Arc<AtomicUsize>, max: usize) -> Option<Self> {
        active
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| (n < max).then_some(n + 1))
            .ok()
            .map(|_| ConnectionSlot(Arc::clone(active)))
    }
}

impl Drop for ConnectionSlot {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

async fn handle_socket(socket: WebSocket, state: AppState, _slot: ConnectionSlot) {
    let conn_id = next_connection_id();
    let (out_tx, out_rx): (OutboundTx, OutboundRx) = mpsc::unbounded_channel();

    if state
        .relay_tx
        .send(RelayRequest::Connect(ClientHandle::new(conn_id, out_tx)))
        .is_err()
    {
        warn!(conn_id = %conn_id, "Relay channel closed, dropping connection");
    } else {
        info!(conn_id = %conn_id, "Connection opened");
        client::run_client(conn_id, socket, state.relay_tx.clone(), out_rx).await;
        info!(conn_id = %conn_id, "Connection closed");
    }
}
