//! Transaction Submitter
//!
//! One call, one outcome. Nothing is observable until a handle exists,
//! and no retries happen at this layer: a declined signature is
//! terminal, and any other dispatch failure is left to the user to
//! retry manually.

use std::sync::Arc;
use tracing::{debug, info};

use crate::errors::EngineError;
use crate::ledger::{CallArg, LedgerWriter, WriteError};
use crate::types::TxHandle;

/// Thin submission wrapper over a ledger write seam.
#[derive(Clone)]
pub struct Submitter {
    writer: Arc<dyn LedgerWriter>,
}

impl Submitter {
    pub fn new(writer: Arc<dyn LedgerWriter>) -> Self {
        Self { writer }
    }

    /// Dispatch a state-changing call and return its handle.
    pub async fn submit(&self, function: &str, args: &[CallArg]) -> Result<TxHandle, EngineError> {
        debug!(function, "dispatching contract call");
        match self.writer.submit(function, args).await {
            Ok(handle) => {
                info!(function, %handle, "call accepted by signer");
                Ok(handle)
            }
            Err(WriteError::Rejected(reason)) => Err(EngineError::SubmissionRejected(reason)),
            Err(WriteError::Dispatch(reason)) => Err(EngineError::SubmissionError(reason)),
        }
    }
}
