//! Event Log Decoder
//!
//! Extracts the 32-byte event identifier from a confirmed receipt by
//! applying fallback strategies in strict order. The decoder is a pure
//! function over the receipt (plus the session context for the recovery
//! strategy); it performs no contract calls.

use once_cell::sync::Lazy;
use serde::Serialize;
use sha3::{Digest, Keccak256};
use tracing::{debug, warn};

use crate::errors::EngineError;
use crate::session::SessionStore;
use crate::types::{EventId, LogEntry, Receipt, Topic};

/// Canonical signature of the creation event.
pub const EVENT_CREATED_SIGNATURE: &str = "EventCreated(bytes32,uint256,uint256,bytes32)";

/// Keccak-256 of [`EVENT_CREATED_SIGNATURE`]; the first topic of every
/// well-formed creation log.
pub static EVENT_CREATED_TOPIC: Lazy<Topic> =
    Lazy::new(|| keccak256(EVENT_CREATED_SIGNATURE.as_bytes()));

/// Number of 32-byte words in the non-indexed payload of a well-formed
/// creation log (start time, end time, content hash).
const EVENT_DATA_WORDS: usize = 3;

pub fn keccak256(bytes: &[u8]) -> Topic {
    let mut out = [0u8; 32];
    out.copy_from_slice(&Keccak256::digest(bytes));
    out
}

/// Which strategy produced the identifier. Declaration order is
/// confidence order; anything past `SignatureTopic` is a fallback worth
/// flagging to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum IdSource {
    CanonicalDecode,
    SignatureTopic,
    SessionRecovery,
    TopicScan,
}

impl IdSource {
    /// True when the identifier was read out of the receipt's own logs.
    pub fn is_log_derived(&self) -> bool {
        matches!(self, IdSource::CanonicalDecode | IdSource::SignatureTopic | IdSource::TopicScan)
    }
}

/// A decoded identifier together with its provenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedId {
    pub id: EventId,
    pub source: IdSource,
}

#[derive(Clone)]
pub struct EventLogDecoder {
    signature_topic: Topic,
}

impl Default for EventLogDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl EventLogDecoder {
    pub fn new() -> Self {
        Self {
            signature_topic: *EVENT_CREATED_TOPIC,
        }
    }

    /// Run the strategies in strict order, returning the first success.
    ///
    /// `expected_address` is the contract of interest; the canonical
    /// strategy keys off the first log's address under the assumption
    /// that every entry in the receipt belongs to one contract, and a
    /// mismatch with the expectation is logged rather than fatal.
    pub fn extract(
        &self,
        receipt: &Receipt,
        expected_address: &str,
        session: Option<&SessionStore>,
    ) -> Result<ExtractedId, EngineError> {
        let logs = &receipt.logs;

        if let Some(first) = logs.first() {
            if !first.address.eq_ignore_ascii_case(expected_address) {
                debug!(
                    first = %first.address,
                    expected = %expected_address,
                    "first log not from the expected contract"
                );
            }
        }

        if let Some(id) = self.canonical_decode(logs) {
            return Ok(ExtractedId {
                id,
                source: IdSource::CanonicalDecode,
            });
        }

        if let Some(id) = self.signature_topic_match(logs) {
            return Ok(ExtractedId {
                id,
                source: IdSource::SignatureTopic,
            });
        }

        if let Some(id) = session.and_then(SessionStore::last_attempted) {
            warn!(%id, "no identifier in logs, recovering last attempted from session");
            return Ok(ExtractedId {
                id,
                source: IdSource::SessionRecovery,
            });
        }

        if let Some(id) = self.topic_scan(logs) {
            warn!(%id, "falling back to unconstrained topic scan, result is less reliable");
            return Ok(ExtractedId {
                id,
                source: IdSource::TopicScan,
            });
        }

        Err(EngineError::DecodeNotFound)
    }

    /// Strategy 1: decode entries from the receipt's own contract
    /// against the known creation event schema.
    fn canonical_decode(&self, logs: &[LogEntry]) -> Option<EventId> {
        let reference = &logs.first()?.address;
        logs.iter()
            .filter(|log| &log.address == reference)
            .find_map(|log| self.decode_creation_log(log))
    }

    /// Full schema check: signature topic, one indexed identifier, and
    /// the three non-indexed payload words.
    fn decode_creation_log(&self, log: &LogEntry) -> Option<EventId> {
        if log.topics.first()? != &self.signature_topic {
            return None;
        }
        if log.topics.len() != 2 || log.data.len() < EVENT_DATA_WORDS * 32 {
            return None;
        }
        Some(EventId::from_topic(&log.topics[1]))
    }

    /// Strategy 2: any entry whose first topic is the signature hash and
    /// which carries at least two topics; the second topic is returned
    /// verbatim.
    fn signature_topic_match(&self, logs: &[LogEntry]) -> Option<EventId> {
        logs.iter().find_map(|log| {
            (log.topics.first() == Some(&self.signature_topic) && log.topics.len() >= 2)
                .then(|| EventId::from_topic(&log.topics[1]))
        })
    }

    /// Strategy 4: first topic anywhere that is not the signature hash.
    fn topic_scan(&self, logs: &[LogEntry]) -> Option<EventId> {
        logs.iter()
            .flat_map(|log| log.topics.iter())
            .find(|topic| **topic != self.signature_topic)
            .map(EventId::from_topic)
    }
}
