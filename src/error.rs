//! Errors surfaced to callers of node operations.
//!
//! Peer transport failures are deliberately absent: they are logged at the
//! call site and reported inside normal results, never raised. What remains
//! are precondition violations of the directly invoked operation.

use crate::clock::ClockError;
use crate::membership::NodeId;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NodeError {
    /// The target id has no entry in the peer table.
    #[error("node {0} is not a known peer")]
    UnknownPeer(NodeId),

    /// A timestamp that would push the logical clock past its maximum.
    #[error(transparent)]
    ClockOverflow(#[from] ClockError),
}

impl NodeError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            NodeError::UnknownPeer(_) => StatusCode::NOT_FOUND,
            NodeError::ClockOverflow(_) => StatusCode::BAD_REQUEST,
        }
    }
}

/// JSON body returned alongside an error status.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for NodeError {
    fn into_response(self) -> Response {
        (
            self.status_code(),
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}
