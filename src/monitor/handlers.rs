use super::detector::FailureDetector;
use super::protocol::*;

use axum::{Extension, Json, Router, http::StatusCode, routing::get, routing::post};
use std::sync::Arc;

pub async fn handle_heartbeat(
    Extension(detector): Extension<Arc<FailureDetector>>,
    Json(req): Json<HeartbeatRequest>,
) -> (StatusCode, Json<HeartbeatResponse>) {
    detector.receive_heartbeat(req.node_id);

    (StatusCode::OK, Json(HeartbeatResponse { acknowledged: true }))
}

pub async fn handle_check_failures(
    Extension(detector): Extension<Arc<FailureDetector>>,
) -> Json<FailuresResponse> {
    let failed = detector.check_failures();
    if !failed.is_empty() {
        tracing::warn!("Nodes without recent heartbeat: {:?}", failed);
    }

    Json(FailuresResponse { failed })
}

pub async fn handle_monitor_status(
    Extension(detector): Extension<Arc<FailureDetector>>,
) -> Json<MonitorStatusResponse> {
    Json(MonitorStatusResponse {
        heartbeats: detector.status(),
    })
}

/// HTTP surface of the monitor process.
pub fn router(detector: Arc<FailureDetector>) -> Router {
    Router::new()
        .route(ENDPOINT_HEARTBEAT, post(handle_heartbeat))
        .route(ENDPOINT_FAILURES, get(handle_check_failures))
        .route(ENDPOINT_MONITOR_STATUS, get(handle_monitor_status))
        .layer(Extension(detector))
}
