//! End-to-end tests for the create pipeline over the mock ledger

mod create_pipeline_tests {
    use cropcircle::config::Config;
    use cropcircle::decoder::EVENT_CREATED_TOPIC;
    use cropcircle::errors::EngineError;
    use cropcircle::ledger::mock::{MockLedger, WriteOutcome};
    use cropcircle::ledger::ReceiptPoll;
    use cropcircle::types::{ActionRegistry, LogEntry, Receipt, TxStatus};
    use cropcircle::{CreateEventPipeline, EventId, IdSource, SessionStore};
    use std::sync::Arc;

    const REGISTRY: &str = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";

    fn config() -> Config {
        let mut config = Config::default();
        config.contracts.registry_address = REGISTRY.to_string();
        config.session.origin = "https://shill.example".to_string();
        config
    }

    fn setup(ledger: &Arc<MockLedger>) -> (Arc<SessionStore>, CreateEventPipeline) {
        let session = Arc::new(SessionStore::temporary().unwrap());
        let pipeline = CreateEventPipeline::new(
            ledger.clone(),
            ledger.clone(),
            session.clone(),
            Arc::new(ActionRegistry::new()),
            &config(),
        );
        (session, pipeline)
    }

    fn creation_log(id: [u8; 32]) -> LogEntry {
        LogEntry {
            address: REGISTRY.to_string(),
            topics: vec![*EVENT_CREATED_TOPIC, id],
            data: vec![0u8; 96],
        }
    }

    #[tokio::test(start_paused = true)]
    async fn create_resolves_persists_and_links_the_identifier() {
        let ledger = Arc::new(MockLedger::new());
        let (session, pipeline) = setup(&ledger);

        let id_topic = [0x42u8; 32];
        let handle = ledger.peek_next_handle();
        // Two pending polls before the confirmation lands.
        ledger.schedule_receipt(
            &handle,
            vec![
                ReceiptPoll::Pending,
                ReceiptPoll::Pending,
                ReceiptPoll::Ready(Receipt {
                    handle: handle.clone(),
                    status: TxStatus::Confirmed,
                    logs: vec![creation_log(id_topic)],
                }),
            ],
        );

        let created = pipeline.run(86_400).await.unwrap();

        let expected = EventId::from_topic(&id_topic);
        assert_eq!(created.id, expected);
        assert_eq!(created.source, IdSource::CanonicalDecode);
        assert_eq!(
            created.share_url,
            format!("https://shill.example/event?id={expected}")
        );
        assert_eq!(ledger.submitted_functions(), vec!["createEvent"]);
        // Both session keys now carry the confirmed identifier.
        assert_eq!(session.current(), Some(expected.clone()));
        assert_eq!(session.last_attempted(), Some(expected));
    }

    #[tokio::test(start_paused = true)]
    async fn attempt_marker_lands_before_the_submission_is_dispatched() {
        let ledger = Arc::new(MockLedger::new());
        let (session, pipeline) = setup(&ledger);
        ledger.script_write("createEvent", WriteOutcome::Reject("user said no".into()));

        let err = pipeline.run(3_600).await.unwrap_err();
        assert!(matches!(err, EngineError::SubmissionRejected(_)));

        // The rejected attempt still left its marker, and the marker is
        // invisible to validated reads.
        let raw = session.raw_last_attempted().unwrap();
        assert!(raw.starts_with("attempting-"));
        assert!(session.last_attempted().is_none());
        assert!(session.current().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn undecodable_receipt_fails_without_persisting_an_identifier() {
        let ledger = Arc::new(MockLedger::new());
        let (session, pipeline) = setup(&ledger);

        let handle = ledger.peek_next_handle();
        ledger.confirm_with_logs(&handle, Vec::new());

        let err = pipeline.run(3_600).await.unwrap_err();
        assert!(matches!(err, EngineError::DecodeNotFound));
        assert!(session.current().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn reverted_creation_surfaces_a_receipt_error() {
        let ledger = Arc::new(MockLedger::new());
        let (_, pipeline) = setup(&ledger);

        let handle = ledger.peek_next_handle();
        ledger.revert(&handle);

        let err = pipeline.run(3_600).await.unwrap_err();
        assert!(matches!(err, EngineError::ReceiptError(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_create_is_refused_while_one_is_in_flight() {
        let ledger = Arc::new(MockLedger::new());
        let (_, pipeline) = setup(&ledger);
        let pipeline = Arc::new(pipeline);

        // First run never sees a finalized receipt within the test body.
        let handle = ledger.peek_next_handle();
        ledger.schedule_receipt(&handle, vec![ReceiptPoll::Pending]);

        let first = {
            let pipeline = pipeline.clone();
            tokio::spawn(async move { pipeline.run(3_600).await })
        };
        // Let the first run reach its watcher loop.
        tokio::task::yield_now().await;

        let second = pipeline.run(3_600).await.unwrap_err();
        assert!(matches!(second, EngineError::AlreadyInFlight(_)));

        first.abort();
    }
}
