//! Membership Module Tests
//!
//! Validates node identity ordering and the peer table invariants.

#[cfg(test)]
mod tests {
    use crate::membership::types::{NodeId, PeerTable};
    use std::collections::HashSet;

    fn three_node_table(local: u64) -> PeerTable {
        PeerTable::new(
            NodeId(local),
            vec![
                (NodeId(1), "127.0.0.1:8001".to_string()),
                (NodeId(2), "127.0.0.1:8002".to_string()),
                (NodeId(3), "127.0.0.1:8003".to_string()),
            ],
        )
    }

    // ============================================================
    // NODE ID TESTS
    // ============================================================

    #[test]
    fn test_node_id_ordering_is_priority() {
        assert!(NodeId(3) > NodeId(2));
        assert!(NodeId(1) < NodeId(2));
        assert_eq!(NodeId(7), NodeId::from(7));
    }

    #[test]
    fn test_node_id_hash() {
        let mut set = HashSet::new();
        set.insert(NodeId(1));
        set.insert(NodeId(1)); // duplicate
        set.insert(NodeId(2));

        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_node_id_serializes_as_plain_integer() {
        let json = serde_json::to_string(&NodeId(42)).unwrap();
        assert_eq!(json, "42");

        let restored: NodeId = serde_json::from_str("42").unwrap();
        assert_eq!(restored, NodeId(42));
    }

    // ============================================================
    // PEER TABLE TESTS
    // ============================================================

    #[test]
    fn test_peer_table_excludes_self() {
        let table = three_node_table(2);

        assert_eq!(table.len(), 2);
        assert!(!table.contains(NodeId(2)));
        assert!(table.contains(NodeId(1)));
        assert!(table.contains(NodeId(3)));
    }

    #[test]
    fn test_peer_table_address_lookup() {
        let table = three_node_table(1);

        assert_eq!(table.address(NodeId(3)), Some("127.0.0.1:8003"));
        assert_eq!(table.address(NodeId(4)), None);
    }

    #[test]
    fn test_peer_table_higher_than() {
        let table = three_node_table(1);
        let higher: Vec<NodeId> = table.higher_than(NodeId(1)).map(|(id, _)| id).collect();
        assert_eq!(higher, vec![NodeId(2), NodeId(3)]);

        let table = three_node_table(3);
        assert_eq!(table.higher_than(NodeId(3)).count(), 0);
    }

    #[test]
    fn test_peer_table_from_yaml_map() {
        let yaml = "2: \"127.0.0.1:8002\"\n3: \"127.0.0.1:8003\"\n";
        let table: PeerTable = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(table.ids().collect::<Vec<_>>(), vec![NodeId(2), NodeId(3)]);
    }
}
