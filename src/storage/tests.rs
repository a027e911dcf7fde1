#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::storage::{InmemTuples, Tuple, TupleStorage};

    fn test_tuples() -> Vec<Tuple> {
        vec![
            Tuple::new(b"foo".to_vec(), "127.0.0.1:8902"),
            Tuple::new(b"parent/child/grandchild".to_vec(), "127.0.0.1:65432"),
            Tuple::new(b"database/table/key".to_vec(), "127.0.0.1:12345"),
            Tuple::new(b"cluster/group/node".to_vec(), "127.0.0.1:23456"),
            Tuple::new(b"key-subkey".to_vec(), "127.0.0.1:3741"),
            Tuple::new(b"value-sub/value".to_vec(), "127.0.0.1:8673"),
            Tuple::new(b"sub/value-".to_vec(), "127.0.0.1:3741"),
            Tuple::new(b"abcdefghijklmnopqrstuvwxyz".to_vec(), "127.0.0.1:3741"),
        ]
    }

    #[test]
    fn insert_and_lookup() {
        let store = InmemTuples::new();
        assert_eq!(store.insert(test_tuples()), 8);

        for tuple in test_tuples() {
            let found = store.lookup(&tuple.key).expect("tuple should exist");
            assert_eq!(found.host, tuple.host);
            assert_eq!(found.heartbeats, 0);
        }
    }

    #[test]
    fn insert_is_first_insert_wins() {
        let store = InmemTuples::new();
        assert_eq!(store.insert(vec![Tuple::new(b"foo".to_vec(), "127.0.0.1:9000")]), 1);

        // Same key, different host: skipped, host untouched, count 0.
        assert_eq!(store.insert(vec![Tuple::new(b"foo".to_vec(), "127.0.0.1:9999")]), 0);
        let found = store.lookup(b"foo").unwrap();
        assert_eq!(found.host, "127.0.0.1:9000");
        assert_eq!(found.heartbeats, 0);
    }

    #[test]
    fn ping_increments_heartbeats() {
        let store = InmemTuples::new();
        store.insert(test_tuples());

        let keys: Vec<Vec<u8>> = test_tuples().into_iter().map(|t| t.key).collect();
        assert_eq!(store.ping(&keys), 8);
        assert_eq!(store.ping(&[b"missing".to_vec()]), 0);

        for key in &keys {
            assert_eq!(store.lookup(key).unwrap().heartbeats, 1);
        }
    }

    #[test]
    fn delete_removes_matching_keys() {
        let store = InmemTuples::new();
        store.insert(test_tuples());

        assert_eq!(store.delete(&[b"foo".to_vec(), b"missing".to_vec()]), 1);
        assert!(store.lookup(b"foo").is_none());
        assert_eq!(store.list().len(), 7);
    }

    #[test]
    fn expire_host_purges_all_tuples_of_a_host() {
        let store = InmemTuples::new();
        store.insert(test_tuples());

        assert_eq!(store.expire_host("127.0.0.1:3741"), 3);
        assert_eq!(store.list().len(), 5);
        for tuple in store.list() {
            assert_ne!(tuple.host, "127.0.0.1:3741");
        }
    }

    #[test]
    fn expire_removes_only_stale_tuples() {
        let store = InmemTuples::new();
        store.insert(vec![Tuple::new(b"fresh".to_vec(), "127.0.0.1:9000")]);

        // Nothing is older than an hour.
        assert_eq!(store.expire(Duration::from_secs(3600)), 0);
        assert!(store.lookup(b"fresh").is_some());

        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(store.expire(Duration::from_millis(1)), 1);
        assert!(store.lookup(b"fresh").is_none());
        assert!(store.list().is_empty());
    }

    #[test]
    fn lookup_returns_a_deep_copy() {
        let store = InmemTuples::new();
        store.insert(vec![Tuple::new(b"foo".to_vec(), "127.0.0.1:9000")]);

        let mut copy = store.lookup(b"foo").unwrap();
        copy.key[0] = b'X';
        copy.host.push_str(":mutated");

        let original = store.lookup(b"foo").unwrap();
        assert_eq!(original.key, b"foo");
        assert_eq!(original.host, "127.0.0.1:9000");
    }

    #[test]
    fn ping_refreshes_the_expiry_clock() {
        let store = InmemTuples::new();
        store.insert(vec![Tuple::new(b"foo".to_vec(), "127.0.0.1:9000")]);

        std::thread::sleep(Duration::from_millis(30));
        store.ping(&[b"foo".to_vec()]);

        // The tuple was just pinged, so a 25ms TTL keeps it.
        assert_eq!(store.expire(Duration::from_millis(25)), 0);
        assert!(store.lookup(b"foo").is_some());
    }
}
