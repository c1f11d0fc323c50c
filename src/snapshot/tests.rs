//! Snapshot Module Tests
//!
//! Exercises the snapshot state machine without any networking.
//!
//! ## Test Scopes
//! - **Initiation**: One capture per lifetime.
//! - **Markers**: First-marker capture, channel closing, completion.
//! - **Channel Recording**: Messages before and after a channel's marker.

#[cfg(test)]
mod tests {
    use crate::membership::NodeId;
    use crate::snapshot::{SnapshotPhase, SnapshotRecord, SnapshotStatus};

    fn record_with_peers(peers: &[u64]) -> SnapshotRecord {
        SnapshotRecord::new(peers.iter().copied().map(NodeId))
    }

    // ============================================================
    // INITIATION
    // ============================================================

    #[test]
    fn test_new_record_is_empty() {
        let record = record_with_peers(&[2, 3]);
        let view = record.view();

        assert_eq!(record.phase(), SnapshotPhase::NotStarted);
        assert_eq!(view.recorded_state, None);
        assert_eq!(view.channel_state.len(), 2);
        assert!(view.channel_state.values().all(|msgs| msgs.is_empty()));
        assert!(!view.complete);
    }

    #[test]
    fn test_begin_captures_once() {
        let mut record = record_with_peers(&[2, 3]);

        assert!(record.begin(10));
        assert!(!record.begin(99));

        assert_eq!(record.phase(), SnapshotPhase::Recording);
        assert_eq!(record.view().recorded_state, Some(10));
    }

    #[test]
    fn test_status_strings() {
        assert_eq!(SnapshotStatus::Started.to_string(), "snapshot started");
        assert_eq!(
            SnapshotStatus::AlreadyStarted.to_string(),
            "snapshot already started"
        );
    }

    // ============================================================
    // MARKERS
    // ============================================================

    #[test]
    fn test_first_marker_captures_state() {
        let mut record = record_with_peers(&[1, 3]);

        let outcome = record.on_marker(NodeId(1), 5).unwrap();
        assert!(outcome.first);
        assert_eq!(outcome.recorded_state, 5);
        assert!(!outcome.complete);

        // Second marker does not re-capture.
        let outcome = record.on_marker(NodeId(3), 42).unwrap();
        assert!(!outcome.first);
        assert_eq!(outcome.recorded_state, 5);
        assert!(outcome.complete);
    }

    #[test]
    fn test_marker_from_unknown_peer_is_rejected() {
        let mut record = record_with_peers(&[2]);

        assert!(record.on_marker(NodeId(9), 1).is_none());
        assert_eq!(record.phase(), SnapshotPhase::NotStarted);
    }

    #[test]
    fn test_initiator_completes_after_all_markers() {
        let mut record = record_with_peers(&[2, 3]);
        record.begin(0);

        assert!(!record.is_complete());
        record.on_marker(NodeId(2), 0);
        assert!(!record.is_complete());
        record.on_marker(NodeId(3), 0);
        assert!(record.is_complete());
    }

    #[test]
    fn test_record_without_peers_completes_on_capture() {
        let mut record = record_with_peers(&[]);
        assert!(!record.is_complete());

        record.begin(3);
        assert!(record.is_complete());
    }

    // ============================================================
    // CHANNEL RECORDING
    // ============================================================

    #[test]
    fn test_messages_before_capture_are_not_recorded() {
        let mut record = record_with_peers(&[2]);

        assert!(!record.record_message(NodeId(2), 7));
        assert!(record.view().channel_state[&NodeId(2)].is_empty());
    }

    #[test]
    fn test_message_before_marker_is_recorded_after_marker_is_not() {
        let mut record = record_with_peers(&[1, 2]);
        record.begin(0);

        // In flight on channel 2 when the cut was taken.
        assert!(record.record_message(NodeId(2), 10));

        record.on_marker(NodeId(2), 0);
        assert!(!record.record_message(NodeId(2), 20));

        // Channel 1 is still open.
        assert!(record.record_message(NodeId(1), -3));

        let view = record.view();
        assert_eq!(view.channel_state[&NodeId(2)], vec![10]);
        assert_eq!(view.channel_state[&NodeId(1)], vec![-3]);
    }

    #[test]
    fn test_channel_state_preserves_arrival_order() {
        let mut record = record_with_peers(&[2]);
        record.begin(0);

        for payload in [3, -1, 4] {
            record.record_message(NodeId(2), payload);
        }

        assert_eq!(record.view().channel_state[&NodeId(2)], vec![3, -1, 4]);
    }

    #[test]
    fn test_unknown_sender_is_never_recorded() {
        let mut record = record_with_peers(&[2]);
        record.begin(0);

        assert!(!record.record_message(NodeId(8), 1));
        assert!(!record.view().channel_state.contains_key(&NodeId(8)));
    }

    #[test]
    fn test_view_serializes_with_string_keys() {
        let mut record = record_with_peers(&[2]);
        record.begin(4);
        record.record_message(NodeId(2), 6);

        let json = serde_json::to_value(record.view()).unwrap();
        assert_eq!(json["recorded_state"], 4);
        assert_eq!(json["channel_state"]["2"][0], 6);
        assert_eq!(json["complete"], false);
    }
}
