//! Error taxonomy and user-facing message mapping
//!
//! Submission and chain-level errors are terminal for their attempt;
//! decode failures are retried by the coordinator before surfacing;
//! balance shortfalls are advisory. Remote rejection reasons arrive as
//! free text, so the simplifiers below pattern-match known substrings;
//! callers log the raw text before simplification.

use thiserror::Error;

use crate::types::TxHandle;

/// The funding step that failed, so the operator knows whether a fresh
/// allowance grant is required.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FundingStep {
    Allowance,
    Deposit,
}

/// Engine-level failures across submission, confirmation, decoding,
/// validation, and the funding workflow.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The user declined signing. Terminal; never retried.
    #[error("signing rejected: {0}")]
    SubmissionRejected(String),

    /// Any other dispatch failure (network, encoding). The user may
    /// retry manually; the engine does not.
    #[error("submission failed: {0}")]
    SubmissionError(String),

    /// Chain-level failure while confirming (revert or fetch error).
    #[error("confirmation failed: {0}")]
    ReceiptError(String),

    /// The wait bound elapsed without a finalized receipt.
    #[error("no receipt for {handle} within {waited_secs}s")]
    ReceiptUnavailable { handle: TxHandle, waited_secs: u64 },

    /// Every decode strategy came up empty.
    #[error("no event identifier found in receipt logs")]
    DecodeNotFound,

    /// Advisory: the pooled balance cannot cover the required amount.
    /// The remote ledger is the real gate; this never blocks submission.
    #[error("pooled balance {pool_display} below required {required_display}")]
    InsufficientPoolBalance {
        pool_display: String,
        required_display: String,
    },

    /// Funding step 1 failed; no deposit was attempted.
    #[error("allowance step failed: {source}")]
    AllowanceFailed { source: Box<EngineError> },

    /// Funding step 2 failed after a confirmed allowance.
    #[error("deposit step failed after confirmed allowance: {source}")]
    DepositFailed { source: Box<EngineError> },

    /// The referenced event record does not exist (zero start time).
    #[error("event {0} not found in registry")]
    EventNotFound(String),

    /// A ledger read failed; callers above the core treat this as
    /// "not yet available".
    #[error("ledger read failed: {0}")]
    Read(String),

    /// Session store failure.
    #[error("session store failure: {0}")]
    Session(String),

    /// The same logical action is already in flight.
    #[error("action already in flight: {0}")]
    AlreadyInFlight(String),
}

impl EngineError {
    /// Which funding step failed, if this is a funding error.
    pub fn failed_step(&self) -> Option<FundingStep> {
        match self {
            EngineError::AllowanceFailed { .. } => Some(FundingStep::Allowance),
            EngineError::DepositFailed { .. } => Some(FundingStep::Deposit),
            _ => None,
        }
    }

    /// Plain-language message for event creation failures.
    pub fn user_message(&self) -> String {
        match self {
            EngineError::SubmissionRejected(_) => {
                "Transaction rejected in your wallet.".to_string()
            }
            EngineError::DecodeNotFound => "Could not extract event ID from transaction. \
                 Please check if the event was created and try again if needed."
                .to_string(),
            EngineError::ReceiptUnavailable { .. } => {
                "Transaction confirmation timed out. Please check your wallet for more details."
                    .to_string()
            }
            EngineError::ReceiptError(_) => "There was an issue confirming your transaction. \
                 Please check your wallet for more details or try again."
                .to_string(),
            other => format!("Error creating event: {other}"),
        }
    }
}

/// Simplify a remote rejection during a claim into user-facing text.
///
/// Substring order follows the observed contract revert strings; the
/// generic fallback hides technical detail from users.
pub fn simplify_claim_error(raw: &str) -> String {
    let text = raw.to_lowercase();
    if text.contains("already claimed") {
        "You have already claimed tokens for this event.".to_string()
    } else if text.contains("insufficient") || text.contains("balance") {
        "Unable to claim tokens at this time. Please try again later or contact the event \
         organizer."
            .to_string()
    } else if text.contains("not active") {
        "The event is not active.".to_string()
    } else if text.contains("not started") {
        "The event has not started yet.".to_string()
    } else if text.contains("ended") {
        "The event has already ended.".to_string()
    } else if text.contains("rejected") || text.contains("denied") {
        "You rejected the transaction in your wallet.".to_string()
    } else {
        "Unable to claim tokens at this time. Please try again later.".to_string()
    }
}

/// Simplify a remote rejection during the funding workflow.
pub fn simplify_funding_error(raw: &str) -> String {
    let text = raw.to_lowercase();
    if text.contains("user rejected") || text.contains("rejected") || text.contains("denied") {
        "Transaction rejected in wallet. To refill tokens, you need to approve both \
         transactions."
            .to_string()
    } else if text.contains("insufficient") {
        "You don't have enough tokens in your wallet for this amount.".to_string()
    } else if text.contains("allowance") {
        "The approval transaction failed. Please try again and approve the contract to spend \
         your tokens first."
            .to_string()
    } else {
        format!("Failed to refill tokens. {raw}")
    }
}
