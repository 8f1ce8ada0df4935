//! Read-only registry projections
//!
//! Typed wrappers over the untyped ledger read seam: the event record
//! tuple, the claimed flag, ownership, and the two balance figures the
//! validator compares. Read failures propagate; callers above the core
//! decide whether "not yet available" is acceptable.

use std::sync::Arc;

use crate::errors::EngineError;
use crate::ledger::{CallArg, LedgerReader, Value};
use crate::types::{EventId, EventRecord, RawAmount};

/// Claim amount assumed when `INITIAL_TOKEN_AMOUNT` is unreadable.
/// Matches the deployed contract value of 100 tokens.
pub const FALLBACK_CLAIM_AMOUNT: RawAmount = 100 * 1_000_000_000_000_000_000;

/// Operator-facing classification of an event record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventStatus {
    NotFound,
    Inactive,
    NotStarted,
    Ended,
    Active,
}

impl std::fmt::Display for EventStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            EventStatus::NotFound => "Unknown Event",
            EventStatus::Inactive => "Event Inactive",
            EventStatus::NotStarted => "Not Started",
            EventStatus::Ended => "Event Ended",
            EventStatus::Active => "Event Active",
        };
        write!(f, "{text}")
    }
}

/// Classify a record (or its absence) against a unix timestamp.
pub fn event_status(record: Option<&EventRecord>, now: u64) -> EventStatus {
    match record {
        None => EventStatus::NotFound,
        Some(r) if !r.active => EventStatus::Inactive,
        Some(r) if r.start_time > now => EventStatus::NotStarted,
        Some(r) if r.end_time < now => EventStatus::Ended,
        Some(_) => EventStatus::Active,
    }
}

#[derive(Clone)]
pub struct RegistryReader {
    reader: Arc<dyn LedgerReader>,
}

impl RegistryReader {
    pub fn new(reader: Arc<dyn LedgerReader>) -> Self {
        Self { reader }
    }

    /// Fetch and project the event record for `id`.
    ///
    /// A zeroed start time means the registry has no such event; that is
    /// `None`, not a legitimate zero-time record.
    pub async fn event_record(&self, id: &EventId) -> Result<Option<EventRecord>, EngineError> {
        let value = self
            .read("getEventDetails", &[CallArg::Bytes32(id.to_topic())])
            .await?;
        let record = parse_event_record(&value)
            .ok_or_else(|| EngineError::Read("malformed event record tuple".into()))?;
        Ok((record.start_time != 0).then_some(record))
    }

    /// Whether `claimant` already claimed tokens for `id`.
    pub async fn has_claimed(&self, id: &EventId, claimant: &str) -> Result<bool, EngineError> {
        let value = self
            .read(
                "hasUserClaimedTokens",
                &[
                    CallArg::Bytes32(id.to_topic()),
                    CallArg::Address(claimant.to_string()),
                ],
            )
            .await?;
        value
            .as_bool()
            .ok_or_else(|| EngineError::Read("claimed flag is not a bool".into()))
    }

    /// Registry owner address.
    pub async fn owner(&self) -> Result<String, EngineError> {
        let value = self.read("owner", &[]).await?;
        value
            .as_address()
            .map(str::to_string)
            .ok_or_else(|| EngineError::Read("owner is not an address".into()))
    }

    /// Case-insensitive ownership check.
    pub async fn is_owner(&self, address: &str) -> Result<bool, EngineError> {
        Ok(self.owner().await?.eq_ignore_ascii_case(address))
    }

    /// Tokens currently pooled in the registry, base units.
    pub async fn pooled_balance(&self) -> Result<RawAmount, EngineError> {
        let value = self.read("getContractTokenBalance", &[]).await?;
        value
            .as_uint()
            .ok_or_else(|| EngineError::Read("pooled balance is not a uint".into()))
    }

    /// Amount handed out per claim, base units.
    pub async fn required_claim_amount(&self) -> Result<RawAmount, EngineError> {
        let value = self.read("INITIAL_TOKEN_AMOUNT", &[]).await?;
        value
            .as_uint()
            .ok_or_else(|| EngineError::Read("claim amount is not a uint".into()))
    }

    async fn read(&self, function: &str, args: &[CallArg]) -> Result<Value, EngineError> {
        self.reader
            .read(function, args)
            .await
            .map_err(|e| EngineError::Read(e.to_string()))
    }
}

/// Project the 8-field registry tuple into an [`EventRecord`].
fn parse_event_record(value: &Value) -> Option<EventRecord> {
    let fields = value.as_tuple()?;
    if fields.len() < 8 {
        return None;
    }
    Some(EventRecord {
        start_time: fields[0].as_uint()? as u64,
        end_time: fields[1].as_uint()? as u64,
        content_hash: *fields[2].as_bytes32()?,
        active: fields[3].as_bool()?,
        entry_count: fields[4].as_uint()? as u64,
        winner_token: fields[5].as_address()?.to_string(),
        winner_entry_id: fields[6].as_uint()? as u64,
        finalized: fields[7].as_bool()?,
    })
}
