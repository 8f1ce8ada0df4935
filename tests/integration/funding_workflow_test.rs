//! End-to-end tests for the two-phase funding workflow

mod funding_workflow_tests {
    use cropcircle::balance::parse_units;
    use cropcircle::errors::{simplify_funding_error, EngineError, FundingStep};
    use cropcircle::ledger::mock::{MockLedger, WriteOutcome};
    use cropcircle::ledger::{CallArg, ReceiptPoll};
    use cropcircle::submitter::Submitter;
    use cropcircle::types::{ActionRegistry, TOKEN_DECIMALS};
    use cropcircle::watcher::ReceiptWatcher;
    use cropcircle::{FundingRequest, FundingState, FundingWorkflow};
    use std::sync::Arc;
    use std::time::Duration;

    const REGISTRY: &str = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
    const GRANTER: &str = "0x1111111111111111111111111111111111111111";

    fn workflow(ledger: &Arc<MockLedger>) -> FundingWorkflow {
        let watcher = ReceiptWatcher::new(
            ledger.clone(),
            Duration::from_millis(500),
            Duration::from_secs(60),
        );
        FundingWorkflow::new(
            Submitter::new(ledger.clone()),
            Submitter::new(ledger.clone()),
            watcher,
            Arc::new(ActionRegistry::new()),
        )
    }

    fn request(amount_human: &str) -> FundingRequest {
        FundingRequest {
            granter: GRANTER.to_string(),
            spender: REGISTRY.to_string(),
            amount: parse_units(amount_human, TOKEN_DECIMALS).unwrap(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn allowance_call_carries_spender_and_base_unit_amount() {
        let ledger = Arc::new(MockLedger::new());
        let mut flow = workflow(&ledger);

        flow.run(&request("500")).await.unwrap();

        let calls = ledger.submissions();
        assert_eq!(calls[0].function, "approve");
        assert_eq!(
            calls[0].args,
            vec![
                CallArg::Address(REGISTRY.to_string()),
                CallArg::Uint(500 * 10u128.pow(18)),
            ]
        );
        assert_eq!(calls[1].function, "refillTokens");
        assert_eq!(calls[1].args, vec![CallArg::Uint(500 * 10u128.pow(18))]);
        assert_eq!(*flow.state(), FundingState::DepositConfirmed);
    }

    #[tokio::test(start_paused = true)]
    async fn deposit_waits_for_the_allowance_receipt() {
        let ledger = Arc::new(MockLedger::new());
        let mut flow = workflow(&ledger);

        // Allowance confirmation arrives only after three polls; the
        // deposit must still come second.
        let allowance_handle = ledger.peek_next_handle();
        ledger.schedule_receipt(
            &allowance_handle,
            vec![
                ReceiptPoll::Pending,
                ReceiptPoll::Pending,
                ReceiptPoll::Ready(cropcircle::Receipt {
                    handle: allowance_handle.clone(),
                    status: cropcircle::TxStatus::Confirmed,
                    logs: Vec::new(),
                }),
            ],
        );

        let outcome = flow.run(&request("42")).await.unwrap();
        assert_eq!(outcome.allowance, allowance_handle);
        assert_eq!(ledger.submitted_functions(), vec!["approve", "refillTokens"]);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_allowance_leaves_no_deposit_submission() {
        let ledger = Arc::new(MockLedger::new());
        ledger.script_write("approve", WriteOutcome::Reject("User rejected the request".into()));
        let mut flow = workflow(&ledger);

        let err = flow.run(&request("500")).await.unwrap_err();
        assert_eq!(err.failed_step(), Some(FundingStep::Allowance));
        assert_eq!(*flow.state(), FundingState::Failed(FundingStep::Allowance));
        assert_eq!(ledger.submitted_functions(), vec!["approve"]);
    }

    #[tokio::test(start_paused = true)]
    async fn deposit_failure_names_the_deposit_step() {
        let ledger = Arc::new(MockLedger::new());
        let mut flow = workflow(&ledger);

        // Allowance confirms, then the deposit reverts on chain.
        let deposit_handle = {
            // Handles are assigned in order: 0 = approve, 1 = refill.
            let first = ledger.peek_next_handle();
            ledger.confirm_with_logs(&first, Vec::new());
            cropcircle::TxHandle::new("0xmock00000001")
        };
        ledger.revert(&deposit_handle);

        let err = flow.run(&request("500")).await.unwrap_err();
        assert_eq!(err.failed_step(), Some(FundingStep::Deposit));
        assert_eq!(*flow.state(), FundingState::Failed(FundingStep::Deposit));
        assert_eq!(ledger.submitted_functions(), vec!["approve", "refillTokens"]);
    }

    #[tokio::test(start_paused = true)]
    async fn funding_errors_simplify_for_operators() {
        let ledger = Arc::new(MockLedger::new());
        ledger.script_write("approve", WriteOutcome::Reject("User rejected the request".into()));
        let mut flow = workflow(&ledger);

        let err = flow.run(&request("500")).await.unwrap_err();
        if let EngineError::AllowanceFailed { source } = &err {
            let message = simplify_funding_error(&source.to_string());
            assert!(message.contains("approve both transactions"));
        } else {
            panic!("expected AllowanceFailed, got {err:?}");
        }
    }
}
