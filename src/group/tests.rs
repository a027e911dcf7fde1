#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::net::TcpListener;

    use crate::contacts::{ContactStorage, InmemContacts, Peer};
    use crate::error::KelipsError;
    use crate::group::{AffinityGroup, GroupContact, HomeGroup, LookupRequest, RemoteGroup};
    use crate::storage::{InmemTuples, Tuple, TupleStorage};
    use crate::transport::Transport;

    const LOCAL: &str = "127.0.0.1:9000";
    const PEER: &str = "127.0.0.1:9001";

    /// Records forwarded requests and answers with a canned host.
    struct CapturingTransport {
        answer: String,
        inserts: Mutex<Vec<(GroupContact, Vec<u8>)>>,
        lookups: Mutex<Vec<(GroupContact, LookupRequest)>>,
    }

    impl CapturingTransport {
        fn new(answer: &str) -> Arc<Self> {
            Arc::new(Self {
                answer: answer.to_string(),
                inserts: Mutex::new(vec![]),
                lookups: Mutex::new(vec![]),
            })
        }
    }

    #[async_trait]
    impl Transport for CapturingTransport {
        async fn insert(
            &self,
            target: &GroupContact,
            key: &[u8],
        ) -> Result<String, KelipsError> {
            self.inserts
                .lock()
                .unwrap()
                .push((target.clone(), key.to_vec()));
            Ok(self.answer.clone())
        }

        async fn lookup(
            &self,
            target: &GroupContact,
            req: &LookupRequest,
        ) -> Result<String, KelipsError> {
            self.lookups
                .lock()
                .unwrap()
                .push((target.clone(), req.clone()));
            Ok(self.answer.clone())
        }

        async fn add_peer(
            &self,
            _target: &GroupContact,
            _peer: &Peer,
        ) -> Result<(), KelipsError> {
            Ok(())
        }

        fn register(&self, _contact: GroupContact, _group: Arc<dyn AffinityGroup>) {}

        async fn start(&self, _listener: TcpListener) -> Result<(), KelipsError> {
            Ok(())
        }

        async fn shutdown(&self, _deadline: Duration) -> Result<(), KelipsError> {
            Ok(())
        }
    }

    fn home_group(
        trans: Arc<CapturingTransport>,
        tuples: Arc<dyn TupleStorage>,
        peers: &[&str],
    ) -> Arc<HomeGroup> {
        let contacts = Arc::new(InmemContacts::new(1, LOCAL));
        for peer in peers {
            contacts.add(Peer::new(*peer)).unwrap();
        }
        HomeGroup::new(
            GroupContact::new(1, LOCAL),
            contacts,
            tuples,
            Duration::from_secs(45),
            Duration::from_secs(20),
            Duration::from_secs(30),
            trans,
        )
    }

    fn remote_group(trans: Arc<CapturingTransport>, peers: &[&str]) -> Arc<RemoteGroup> {
        let contacts = Arc::new(InmemContacts::new(2, LOCAL));
        for peer in peers {
            contacts.add(Peer::new(*peer)).unwrap();
        }
        RemoteGroup::new(GroupContact::new(2, LOCAL), contacts, trans)
    }

    #[tokio::test]
    async fn home_insert_without_contacts_fails() {
        let trans = CapturingTransport::new("");
        let group = home_group(trans, Arc::new(InmemTuples::new()), &[]);

        assert!(matches!(
            group.insert(b"foo").await,
            Err(KelipsError::NoContacts)
        ));
    }

    #[tokio::test]
    async fn home_insert_records_tuple_and_returns_host() {
        let trans = CapturingTransport::new("");
        let tuples: Arc<dyn TupleStorage> = Arc::new(InmemTuples::new());
        let group = home_group(trans, tuples.clone(), &[LOCAL]);

        let host = group.insert(b"foo").await.unwrap();
        assert_eq!(host, LOCAL);
        assert_eq!(tuples.lookup(b"foo").unwrap().host, LOCAL);
    }

    #[tokio::test]
    async fn home_lookup_answers_from_local_state_without_forwarding() {
        let trans = CapturingTransport::new("");
        let tuples: Arc<dyn TupleStorage> = Arc::new(InmemTuples::new());
        tuples.insert(vec![Tuple::new(b"foo".to_vec(), PEER)]);
        let group = home_group(trans.clone(), tuples, &[LOCAL, PEER]);

        let host = group.lookup(&LookupRequest::new(&b"foo"[..], 0)).await.unwrap();
        assert_eq!(host, PEER);
        assert!(trans.lookups.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn home_lookup_miss_with_zero_ttl_is_exhausted() {
        let trans = CapturingTransport::new("");
        let group = home_group(trans, Arc::new(InmemTuples::new()), &[LOCAL, PEER]);

        assert!(matches!(
            group.lookup(&LookupRequest::new(&b"foo"[..], 0)).await,
            Err(KelipsError::TtlExhausted)
        ));
    }

    #[tokio::test]
    async fn home_lookup_miss_without_peers_has_no_contacts() {
        let trans = CapturingTransport::new("");
        let group = home_group(trans, Arc::new(InmemTuples::new()), &[LOCAL]);

        assert!(matches!(
            group.lookup(&LookupRequest::new(&b"foo"[..], 1)).await,
            Err(KelipsError::NoContacts)
        ));
    }

    #[tokio::test]
    async fn home_forward_decrements_ttl_and_rewrites_originator() {
        let trans = CapturingTransport::new("127.0.0.1:9005");
        let group = home_group(trans.clone(), Arc::new(InmemTuples::new()), &[LOCAL, PEER]);

        let host = group.lookup(&LookupRequest::new(&b"foo"[..], 2)).await.unwrap();
        assert_eq!(host, "127.0.0.1:9005");

        let lookups = trans.lookups.lock().unwrap();
        let (target, forwarded) = &lookups[0];
        assert_eq!(target, &GroupContact::new(1, PEER));
        assert_eq!(forwarded.key, b"foo");
        assert_eq!(forwarded.ttl, 1);
        assert_eq!(forwarded.originator, GroupContact::new(1, LOCAL));
    }

    #[tokio::test]
    async fn remote_lookup_keeps_the_caller_ttl() {
        let trans = CapturingTransport::new("127.0.0.1:9005");
        let group = remote_group(trans.clone(), &[PEER]);

        group.lookup(&LookupRequest::new(&b"foo"[..], 2)).await.unwrap();

        let lookups = trans.lookups.lock().unwrap();
        let (target, forwarded) = &lookups[0];
        assert_eq!(target, &GroupContact::new(2, PEER));
        // The cross-group hop is free: the receiving home node spends
        // budget only if it has to forward again.
        assert_eq!(forwarded.ttl, 2);
        assert_eq!(forwarded.originator, GroupContact::new(2, LOCAL));
        assert_eq!(group.heartbeats(), 1);
    }

    #[tokio::test]
    async fn remote_insert_forwards_and_beats() {
        let trans = CapturingTransport::new("127.0.0.1:9005");
        let group = remote_group(trans.clone(), &[PEER]);

        let host = group.insert(b"foo").await.unwrap();
        assert_eq!(host, "127.0.0.1:9005");
        assert_eq!(group.heartbeats(), 1);

        let inserts = trans.inserts.lock().unwrap();
        assert_eq!(inserts[0], (GroupContact::new(2, PEER), b"foo".to_vec()));
    }

    #[tokio::test]
    async fn remote_without_contacts_fails() {
        let trans = CapturingTransport::new("");
        let group = remote_group(trans, &[]);

        assert!(matches!(
            group.insert(b"foo").await,
            Err(KelipsError::NoContacts)
        ));
        assert!(matches!(
            group.lookup(&LookupRequest::new(&b"foo"[..], 1)).await,
            Err(KelipsError::NoContacts)
        ));
        assert_eq!(group.heartbeats(), 0);
    }

    #[tokio::test]
    async fn home_expiry_task_sweeps_stale_tuples() {
        let trans = CapturingTransport::new("");
        let tuples: Arc<dyn TupleStorage> = Arc::new(InmemTuples::new());
        let contacts = Arc::new(InmemContacts::new(1, LOCAL));
        contacts.add(Peer::new(LOCAL)).unwrap();

        let group = HomeGroup::new(
            GroupContact::new(1, LOCAL),
            contacts,
            tuples.clone(),
            Duration::from_millis(100),
            Duration::from_millis(50),
            Duration::from_millis(120),
            trans,
        );

        group.insert(b"foo").await.unwrap();
        group.insert(b"bar").await.unwrap();
        group.start();

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(tuples.list().is_empty());
    }
}
