//! Create and claim pipelines
//!
//! Orchestration of the leaf components: Submitter feeds the Watcher,
//! a confirmed receipt feeds the Retry Coordinator's decode loop, and
//! the resolved identifier lands in the session store and the share
//! link. The claim workflow adds its advisory pre-checks on top of the
//! same submit-and-watch core.

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::balance::{BalanceCheck, BalanceValidator};
use crate::config::Config;
use crate::decoder::{EventLogDecoder, IdSource};
use crate::errors::{simplify_claim_error, EngineError};
use crate::ledger::{CallArg, LedgerReader, LedgerWriter, ReceiptSource};
use crate::registry::{RegistryReader, FALLBACK_CLAIM_AMOUNT};
use crate::retry::RetryCoordinator;
use crate::session::SessionStore;
use crate::submitter::Submitter;
use crate::types::{share_url, ActionRegistry, EventId, TxHandle};
use crate::watcher::ReceiptWatcher;

/// A successfully created event.
#[derive(Debug, Clone, Serialize)]
pub struct CreatedEvent {
    pub id: EventId,
    /// Which decode strategy produced the identifier.
    pub source: IdSource,
    pub share_url: String,
    pub handle: TxHandle,
}

/// Submits the creation call, waits for confirmation, then runs the
/// bounded decode loop and persists the recovered identifier.
pub struct CreateEventPipeline {
    registry_writer: Submitter,
    watcher: ReceiptWatcher,
    session: Arc<SessionStore>,
    actions: Arc<ActionRegistry>,
    registry_address: String,
    origin: String,
    retry_delay: Duration,
}

impl CreateEventPipeline {
    pub fn new(
        writer: Arc<dyn LedgerWriter>,
        receipts: Arc<dyn ReceiptSource>,
        session: Arc<SessionStore>,
        actions: Arc<ActionRegistry>,
        config: &Config,
    ) -> Self {
        Self {
            registry_writer: Submitter::new(writer),
            watcher: ReceiptWatcher::from_config(receipts, &config.chain),
            session,
            actions,
            registry_address: config.contracts.registry_address.clone(),
            origin: config.session.origin.clone(),
            retry_delay: Duration::from_millis(config.chain.decode_retry_delay_ms),
        }
    }

    /// Create an event lasting `duration_secs` and recover its
    /// identifier from the confirmation logs.
    pub async fn run(&self, duration_secs: u64) -> Result<CreatedEvent, EngineError> {
        let _guard = self.actions.begin("create_event")?;
        let correlation = Uuid::new_v4();

        // Persisted before dispatch: an abandoned workflow still leaves
        // a trace, and the marker can never be mistaken for an id.
        self.session
            .record_attempt_marker()
            .map_err(|e| EngineError::Session(e.to_string()))?;

        info!(%correlation, duration_secs, "submitting event creation");
        let handle = self
            .registry_writer
            .submit("createEvent", &[CallArg::Uint(duration_secs as u128)])
            .await?;

        let receipt = self.watcher.wait_for_confirmation(&handle).await?;

        let mut coordinator = RetryCoordinator::new(EventLogDecoder::new(), self.retry_delay);
        let extracted = coordinator
            .resolve(&receipt, &self.registry_address, Some(self.session.as_ref()))
            .await?;

        self.session
            .record_confirmed(&extracted.id)
            .map_err(|e| EngineError::Session(e.to_string()))?;

        let url = share_url(&self.origin, &extracted.id);
        info!(%correlation, id = %extracted.id, source = ?extracted.source, %url, "event created");

        Ok(CreatedEvent {
            id: extracted.id,
            source: extracted.source,
            share_url: url,
            handle,
        })
    }
}

/// Advisory findings gathered before a claim submission. None of them
/// block the claim; the registry contract enforces for real.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ClaimAdvisories {
    pub already_claimed: bool,
    pub balance: Option<BalanceCheck>,
}

/// A dispatched and confirmed claim.
#[derive(Debug, Clone, Serialize)]
pub struct ClaimOutcome {
    pub handle: TxHandle,
    pub advisories: ClaimAdvisories,
}

pub struct ClaimWorkflow {
    registry_writer: Submitter,
    registry: RegistryReader,
    watcher: ReceiptWatcher,
    validator: BalanceValidator,
    actions: Arc<ActionRegistry>,
}

impl ClaimWorkflow {
    pub fn new(
        writer: Arc<dyn LedgerWriter>,
        reader: Arc<dyn LedgerReader>,
        receipts: Arc<dyn ReceiptSource>,
        actions: Arc<ActionRegistry>,
        config: &Config,
    ) -> Self {
        Self {
            registry_writer: Submitter::new(writer),
            registry: RegistryReader::new(reader),
            watcher: ReceiptWatcher::from_config(receipts, &config.chain),
            validator: BalanceValidator::new(),
            actions,
        }
    }

    /// Claim the initial token grant for `event_id`.
    ///
    /// The event record must exist; everything else gathered up front is
    /// advisory and the submission proceeds regardless.
    pub async fn run(
        &self,
        event_id: &EventId,
        claimant: &str,
    ) -> Result<ClaimOutcome, EngineError> {
        let _guard = self.actions.begin(&format!("claim:{event_id}"))?;
        let correlation = Uuid::new_v4();

        let record = self.registry.event_record(event_id).await?;
        if record.is_none() {
            return Err(EngineError::EventNotFound(event_id.to_string()));
        }

        let advisories = self.gather_advisories(event_id, claimant).await;

        info!(%correlation, %event_id, claimant, "submitting token claim");
        let handle = self
            .registry_writer
            .submit(
                "provideInitialTokens",
                &[CallArg::Bytes32(event_id.to_topic())],
            )
            .await?;
        self.watcher.wait_for_confirmation(&handle).await?;
        info!(%correlation, %handle, "claim confirmed");

        Ok(ClaimOutcome { handle, advisories })
    }

    /// Map a claim failure to the plain-language message shown to users.
    pub fn user_message(err: &EngineError) -> String {
        match err {
            EngineError::SubmissionRejected(_) => {
                "You rejected the transaction in your wallet.".to_string()
            }
            EngineError::SubmissionError(raw) | EngineError::ReceiptError(raw) => {
                simplify_claim_error(raw)
            }
            EngineError::EventNotFound(_) => {
                "Unable to fetch event details. Please try again later.".to_string()
            }
            EngineError::ReceiptUnavailable { .. } => {
                "Claim confirmation timed out. Please check your wallet for more details."
                    .to_string()
            }
            _ => "Unable to claim tokens at this time. Please try again later.".to_string(),
        }
    }

    /// Best-effort pre-checks; read failures are logged and skipped
    /// rather than propagated.
    async fn gather_advisories(&self, event_id: &EventId, claimant: &str) -> ClaimAdvisories {
        let mut advisories = ClaimAdvisories::default();

        match self.registry.has_claimed(event_id, claimant).await {
            Ok(true) => {
                warn!(%event_id, claimant, "records show tokens already claimed, proceeding anyway");
                advisories.already_claimed = true;
            }
            Ok(false) => {}
            Err(e) => debug!(error = %e, "claimed-state read unavailable"),
        }

        match self.registry.pooled_balance().await {
            Ok(pool) => {
                let required = match self.registry.required_claim_amount().await {
                    Ok(required) => required,
                    Err(e) => {
                        debug!(error = %e, "claim amount unreadable, using fallback");
                        FALLBACK_CLAIM_AMOUNT
                    }
                };
                let check = self.validator.check(pool, required);
                if !check.sufficient {
                    warn!(
                        pool = %check.pool_display,
                        required = %check.required_display,
                        "pooled balance below required amount, contract will decide"
                    );
                }
                advisories.balance = Some(check);
            }
            Err(e) => debug!(error = %e, "pooled balance unavailable, skipping advisory check"),
        }

        advisories
    }
}
