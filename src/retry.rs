//! Retry Coordinator
//!
//! Bounds repeated decode attempts against an already-fetched receipt.
//! Decoding is deterministic over unchanged input, so a retry cannot
//! learn anything new on its own; the behavior is kept because the
//! surrounding system treats the third miss as the signal to hand the
//! operator off to external verification. Each retry is logged so the
//! repetition is visible in traces.

use std::time::Duration;
use tracing::{info, warn};

use crate::decoder::{EventLogDecoder, ExtractedId};
use crate::errors::EngineError;
use crate::session::SessionStore;
use crate::types::Receipt;

/// Hard bound on decode attempts for a single workflow instance.
pub const MAX_DECODE_ATTEMPTS: u32 = 3;

/// Observable phase of one create/claim decode cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodePhase {
    Submitted,
    Confirmed,
    Decoding { attempt: u32 },
    Retrying { attempt: u32 },
    Succeeded(ExtractedId),
    Failed,
}

pub struct RetryCoordinator {
    decoder: EventLogDecoder,
    retry_delay: Duration,
    max_attempts: u32,
    phase: DecodePhase,
    attempts_made: u32,
}

impl RetryCoordinator {
    pub fn new(decoder: EventLogDecoder, retry_delay: Duration) -> Self {
        Self {
            decoder,
            retry_delay,
            max_attempts: MAX_DECODE_ATTEMPTS,
            phase: DecodePhase::Submitted,
            attempts_made: 0,
        }
    }

    pub fn phase(&self) -> &DecodePhase {
        &self.phase
    }

    /// Decode attempts performed so far.
    pub fn attempts_made(&self) -> u32 {
        self.attempts_made
    }

    /// Resolve an identifier from a confirmed receipt.
    ///
    /// Runs the decoder up to [`MAX_DECODE_ATTEMPTS`] times against the
    /// same receipt, sleeping the fixed delay between attempts. No
    /// resubmission and no receipt re-fetch happen here; `Succeeded`
    /// and `Failed` are terminal.
    pub async fn resolve(
        &mut self,
        receipt: &Receipt,
        expected_address: &str,
        session: Option<&SessionStore>,
    ) -> Result<ExtractedId, EngineError> {
        debug_assert!(receipt.is_confirmed(), "decode requires a confirmed receipt");
        self.phase = DecodePhase::Confirmed;

        let mut attempt = 1u32;
        loop {
            self.phase = DecodePhase::Decoding { attempt };
            self.attempts_made = attempt;

            match self.decoder.extract(receipt, expected_address, session) {
                Ok(found) => {
                    info!(id = %found.id, source = ?found.source, attempt, "identifier resolved");
                    self.phase = DecodePhase::Succeeded(found.clone());
                    return Ok(found);
                }
                Err(EngineError::DecodeNotFound) if attempt < self.max_attempts => {
                    warn!(
                        attempt,
                        max = self.max_attempts,
                        "no identifier found, retrying decode against the same receipt"
                    );
                    self.phase = DecodePhase::Retrying { attempt };
                    tokio::time::sleep(self.retry_delay).await;
                    attempt += 1;
                }
                Err(err) => {
                    warn!(attempt, error = %err, "identifier extraction failed");
                    self.phase = DecodePhase::Failed;
                    return Err(err);
                }
            }
        }
    }
}
