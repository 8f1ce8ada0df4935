//! Unit tests for the session store

mod session_tests {
    use cropcircle::{EventId, SessionStore};
    use tempfile::TempDir;

    #[test]
    fn identifiers_survive_a_store_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.db");
        let path = path.to_str().unwrap();
        let id = EventId::from_topic(&[0x3c; 32]);

        {
            let store = SessionStore::open(path).unwrap();
            store.record_confirmed(&id).unwrap();
        }

        // Persists across restarts by design; there is no teardown.
        let store = SessionStore::open(path).unwrap();
        assert_eq!(store.current(), Some(id.clone()));
        assert_eq!(store.last_attempted(), Some(id));
    }

    #[test]
    fn marker_survives_a_reopen_but_stays_invisible() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.db");
        let path = path.to_str().unwrap();

        {
            let store = SessionStore::open(path).unwrap();
            store.record_attempt_marker().unwrap();
        }

        let store = SessionStore::open(path).unwrap();
        assert!(store.raw_last_attempted().unwrap().starts_with("attempting-"));
        assert!(store.last_attempted().is_none());
    }

    #[test]
    fn externally_tracked_identifier_becomes_current_only() {
        let store = SessionStore::temporary().unwrap();
        let id = EventId::from_topic(&[0x9d; 32]);
        store.set_current(&id).unwrap();
        assert_eq!(store.current(), Some(id));
        assert!(store.last_attempted().is_none());
    }
}
