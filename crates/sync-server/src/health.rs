//! Health endpoint: relay snapshot via the relay task.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tokio::sync::oneshot;

use sync_core::ScreenCount;

use crate::server::AppState;
use crate::types::RelayRequest;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub status: &'static str,
    pub connected_screens: Vec<ScreenCount>,
    pub control_panels: usize,
    pub connections: usize,
    pub uptime_secs: u64,
}

/// Health check endpoint - returns relay status and registry contents
pub async fn health_handler(State(state): State<AppState>) -> Response {
    let (reply_tx, reply_rx) = oneshot::channel();

    if state.relay_tx.send(RelayRequest::Health(reply_tx)).is_err() {
        return unavailable();
    }

    match reply_rx.await {
        Ok(stats) => Json(HealthStatus {
            status: "ok",
            connected_screens: stats.connected_screens,
            control_panels: stats.control_panels,
            connections: stats.connections,
            uptime_secs: state.started_at.elapsed().as_secs(),
        })
        .into_response(),
        Err(_) => unavailable(),
    }
}

fn unavailable() -> Response {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(serde_json::json!({ "status": "unavailable" })),
    )
        .into_response()
}
