use super::protocol::*;
use super::service::NodeService;
use super::types::NodeStatus;
use crate::error::NodeError;
use crate::snapshot::SnapshotView;

use axum::{Extension, Json, Router, http::StatusCode, routing::get, routing::post};
use std::sync::Arc;

// --- Lamport clock ---

pub async fn handle_local_event(
    Extension(node): Extension<Arc<NodeService>>,
    Json(req): Json<LocalEventRequest>,
) -> Result<Json<ClockResponse>, NodeError> {
    let clock = node.local_event(&req.description).await?;
    Ok(Json(ClockResponse { clock }))
}

pub async fn handle_send_message(
    Extension(node): Extension<Arc<NodeService>>,
    Json(req): Json<SendMessageRequest>,
) -> Result<Json<SendMessageResponse>, NodeError> {
    let report = node.send_message(req.target, &req.message).await?;

    Ok(Json(SendMessageResponse {
        clock: report.local,
        delivered: report.delivered(),
        error: report.error,
    }))
}

pub async fn handle_receive_message(
    Extension(node): Extension<Arc<NodeService>>,
    Json(req): Json<ReceiveMessageRequest>,
) -> Result<Json<ClockResponse>, NodeError> {
    let clock = node
        .receive_message(req.timestamp, &req.message, req.sender)
        .await?;
    Ok(Json(ClockResponse { clock }))
}

// --- Snapshot ---

pub async fn handle_initiate_snapshot(
    Extension(node): Extension<Arc<NodeService>>,
) -> Json<InitiateSnapshotResponse> {
    let (status, markers) = node.initiate_snapshot().await;

    Json(InitiateSnapshotResponse {
        status: status.to_string(),
        markers,
    })
}

pub async fn handle_marker(
    Extension(node): Extension<Arc<NodeService>>,
    Json(req): Json<MarkerRequest>,
) -> Result<Json<MarkerResponse>, NodeError> {
    let recorded_state = node.receive_marker(req.sender).await?;
    Ok(Json(MarkerResponse { recorded_state }))
}

pub async fn handle_get_snapshot(Extension(node): Extension<Arc<NodeService>>) -> Json<SnapshotView> {
    Json(node.get_snapshot().await)
}

pub async fn handle_send_app(
    Extension(node): Extension<Arc<NodeService>>,
    Json(req): Json<SendAppRequest>,
) -> Result<Json<SendAppResponse>, NodeError> {
    let report = node.send_app_message(req.target, req.delta).await?;

    Ok(Json(SendAppResponse {
        value: report.local,
        delivered: report.delivered(),
        error: report.error,
    }))
}

pub async fn handle_receive_app(
    Extension(node): Extension<Arc<NodeService>>,
    Json(req): Json<ReceiveAppRequest>,
) -> Json<ValueResponse> {
    let value = node.receive_app_message(req.delta, req.sender).await;
    Json(ValueResponse { value })
}

// --- Election ---

pub async fn handle_start_election(
    Extension(node): Extension<Arc<NodeService>>,
) -> Json<ElectionResultResponse> {
    let outcome = node.start_election().await;

    Json(ElectionResultResponse {
        result: outcome.to_string(),
        coordinator: outcome.coordinator(),
    })
}

pub async fn handle_election_request(
    Extension(node): Extension<Arc<NodeService>>,
    Json(req): Json<ElectionRequest>,
) -> Json<ElectionReply> {
    let reply = node.receive_election(req.sender).await;
    Json(ElectionReply {
        reply: reply.to_string(),
    })
}

pub async fn handle_coordinator(
    Extension(node): Extension<Arc<NodeService>>,
    Json(req): Json<CoordinatorAnnouncement>,
) -> (StatusCode, Json<AcknowledgeResponse>) {
    node.announce_coordinator(req.coordinator);
    (StatusCode::OK, Json(AcknowledgeResponse { acknowledged: true }))
}

// --- Diagnostics ---

pub async fn handle_node_status(Extension(node): Extension<Arc<NodeService>>) -> Json<NodeStatus> {
    Json(node.status().await)
}

/// HTTP surface of a node.
pub fn router(node: Arc<NodeService>) -> Router {
    Router::new()
        .route(ENDPOINT_LOCAL_EVENT, post(handle_local_event))
        .route(ENDPOINT_SEND_MESSAGE, post(handle_send_message))
        .route(ENDPOINT_RECEIVE_MESSAGE, post(handle_receive_message))
        .route(ENDPOINT_INITIATE_SNAPSHOT, post(handle_initiate_snapshot))
        .route(ENDPOINT_MARKER, post(handle_marker))
        .route(ENDPOINT_GET_SNAPSHOT, get(handle_get_snapshot))
        .route(ENDPOINT_SEND_APP, post(handle_send_app))
        .route(ENDPOINT_RECEIVE_APP, post(handle_receive_app))
        .route(ENDPOINT_START_ELECTION, post(handle_start_election))
        .route(ENDPOINT_ELECTION_REQUEST, post(handle_election_request))
        .route(ENDPOINT_COORDINATOR, post(handle_coordinator))
        .route(ENDPOINT_NODE_STATUS, get(handle_node_status))
        .layer(Extension(node))
}
