//! Core data model shared across the engine
//!
//! Plain data types for transaction handles and receipts, the canonical
//! event identifier, registry record projections, and the in-flight
//! action guard.

use dashmap::DashMap;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use crate::errors::EngineError;

/// Number of decimals in the token's base-unit representation.
pub const TOKEN_DECIMALS: u32 = 18;

/// An amount in base (smallest) units.
///
/// Comparisons and arithmetic stay in this representation; human-scaled
/// values exist only as display strings produced by
/// [`crate::balance::format_units`].
pub type RawAmount = u128;

/// A 32-byte indexed log field.
pub type Topic = [u8; 32];

/// Opaque reference to a submitted transaction.
///
/// Created by the submitter, resolvable to a [`Receipt`] once finalized.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TxHandle(String);

impl TxHandle {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TxHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle status of a submitted transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TxStatus {
    /// Accepted by the signing agent, not yet finalized.
    Submitted,
    /// Finalized successfully.
    Confirmed,
    /// Finalized with a chain-level failure.
    Reverted,
    /// Terminal state the receipt source could not classify.
    Unknown,
}

/// A structured event record emitted by contract code during execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// Address of the emitting contract.
    pub address: String,
    /// Ordered 32-byte indexed fields; the first is conventionally the
    /// event signature hash.
    pub topics: Vec<Topic>,
    /// Opaque non-indexed payload.
    pub data: Vec<u8>,
}

/// Finalized outcome of a transaction, including emitted log entries.
#[derive(Debug, Clone)]
pub struct Receipt {
    pub handle: TxHandle,
    pub status: TxStatus,
    pub logs: Vec<LogEntry>,
}

impl Receipt {
    pub fn is_confirmed(&self) -> bool {
        self.status == TxStatus::Confirmed
    }
}

/// Raised when a string fails the event identifier format predicate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("not a canonical event identifier: {0:?}")]
pub struct InvalidEventId(pub String);

/// Canonical 32-byte event identifier in hex form.
///
/// Invariant: `0x` prefix, exactly 66 characters, 64 hex digits.
/// Construction validates, so a malformed identifier can never reach a
/// contract call or persisted session state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct EventId(String);

impl EventId {
    /// Parse and validate, trimming surrounding whitespace.
    pub fn parse(raw: &str) -> Result<Self, InvalidEventId> {
        let trimmed = raw.trim();
        if Self::is_valid_format(trimmed) {
            Ok(Self(trimmed.to_string()))
        } else {
            Err(InvalidEventId(raw.to_string()))
        }
    }

    /// The format predicate on its own, for callers that only need a check.
    pub fn is_valid_format(raw: &str) -> bool {
        raw.len() == 66
            && raw.starts_with("0x")
            && raw[2..].bytes().all(|b| b.is_ascii_hexdigit())
    }

    /// Canonical lowercase form of a raw 32-byte topic.
    pub fn from_topic(topic: &Topic) -> Self {
        Self(format!("0x{}", hex::encode(topic)))
    }

    /// The identifier as a 32-byte topic, for use as a call argument.
    pub fn to_topic(&self) -> Topic {
        let mut out = [0u8; 32];
        // Infallible: the constructor guaranteed 64 hex digits.
        hex::decode_to_slice(&self.0[2..], &mut out).expect("validated hex");
        out
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Read-only projection of an on-chain event record.
///
/// A record whose `start_time` is zero does not exist; the registry
/// reader maps that case to `None` before it reaches any workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventRecord {
    pub start_time: u64,
    pub end_time: u64,
    pub content_hash: Topic,
    pub active: bool,
    pub entry_count: u64,
    pub winner_token: String,
    pub winner_entry_id: u64,
    pub finalized: bool,
}

/// Shareable URI for a resolved event identifier.
pub fn share_url(origin: &str, id: &EventId) -> String {
    format!("{}/event?id={}", origin.trim_end_matches('/'), id)
}

/// Guards against concurrent re-submission of the same logical action.
///
/// One registry is shared by every workflow of a session; an action key
/// stays occupied until its [`ActionGuard`] drops, including on error
/// and on abandonment of the workflow future.
#[derive(Debug, Clone, Default)]
pub struct ActionRegistry {
    in_flight: Arc<DashMap<String, ()>>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim an action key, failing if an identical action is in flight.
    pub fn begin(&self, action: &str) -> Result<ActionGuard, EngineError> {
        use dashmap::mapref::entry::Entry;

        match self.in_flight.entry(action.to_string()) {
            Entry::Occupied(_) => Err(EngineError::AlreadyInFlight(action.to_string())),
            Entry::Vacant(slot) => {
                slot.insert(());
                Ok(ActionGuard {
                    in_flight: Arc::clone(&self.in_flight),
                    action: action.to_string(),
                })
            }
        }
    }

    pub fn is_in_flight(&self, action: &str) -> bool {
        self.in_flight.contains_key(action)
    }
}

/// RAII release for a claimed action key.
pub struct ActionGuard {
    in_flight: Arc<DashMap<String, ()>>,
    action: String,
}

impl Drop for ActionGuard {
    fn drop(&mut self) {
        self.in_flight.remove(&self.action);
    }
}
