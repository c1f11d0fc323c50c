//! Monitor Module Tests
//!
//! ## Test Scopes
//! - **Detector**: Timeout semantics using paused tokio time.
//! - **HTTP**: Router round trips through `tower::ServiceExt::oneshot`.

#[cfg(test)]
mod tests {
    use crate::membership::NodeId;
    use crate::monitor::protocol::{FailuresResponse, MonitorStatusResponse};
    use crate::monitor::{FailureDetector, router};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;

    // ============================================================
    // DETECTOR
    // ============================================================

    #[tokio::test(start_paused = true)]
    async fn test_fresh_heartbeat_is_not_failed() {
        let detector = FailureDetector::default();
        detector.receive_heartbeat(NodeId(1));

        assert!(detector.check_failures().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_heartbeat_is_failed() {
        let detector = FailureDetector::new(Duration::from_secs(5));
        detector.receive_heartbeat(NodeId(1));
        detector.receive_heartbeat(NodeId(2));

        tokio::time::advance(Duration::from_secs(4)).await;
        detector.receive_heartbeat(NodeId(2));
        tokio::time::advance(Duration::from_secs(2)).await;

        assert_eq!(detector.check_failures(), vec![NodeId(1)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_heartbeat_clears_failure() {
        let detector = FailureDetector::new(Duration::from_secs(5));
        detector.receive_heartbeat(NodeId(3));

        tokio::time::advance(Duration::from_secs(6)).await;
        assert_eq!(detector.check_failures(), vec![NodeId(3)]);

        detector.receive_heartbeat(NodeId(3));
        assert!(detector.check_failures().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_check_failures_has_no_side_effect() {
        let detector = FailureDetector::new(Duration::from_secs(5));
        detector.receive_heartbeat(NodeId(1));
        tokio::time::advance(Duration::from_secs(10)).await;

        assert_eq!(detector.check_failures(), vec![NodeId(1)]);
        assert_eq!(detector.check_failures(), vec![NodeId(1)]);
        assert_eq!(detector.status().len(), 1);
    }

    #[test]
    fn test_status_reports_every_node_seen() {
        let detector = FailureDetector::default();
        detector.receive_heartbeat(NodeId(2));
        detector.receive_heartbeat(NodeId(1));
        detector.receive_heartbeat(NodeId(2));

        let status = detector.status();
        assert_eq!(status.keys().copied().collect::<Vec<_>>(), vec![NodeId(1), NodeId(2)]);
        assert!(status.values().all(|ms| *ms > 0));
    }

    // ============================================================
    // HTTP
    // ============================================================

    async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_heartbeat_endpoint_updates_status() {
        let detector = Arc::new(FailureDetector::default());
        let app = router(detector.clone());

        let response = app
            .clone()
            .oneshot(
                Request::post("/heartbeat")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"node_id":7}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(Request::get("/status").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status: MonitorStatusResponse = body_json(response).await;
        assert!(status.heartbeats.contains_key(&NodeId(7)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failures_endpoint() {
        let detector = Arc::new(FailureDetector::new(Duration::from_secs(5)));
        detector.receive_heartbeat(NodeId(1));
        tokio::time::advance(Duration::from_secs(6)).await;
        detector.receive_heartbeat(NodeId(2));

        let response = router(detector)
            .oneshot(Request::get("/failures").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let failures: FailuresResponse = body_json(response).await;

        assert_eq!(failures.failed, vec![NodeId(1)]);
    }
}
