//! Receipt Watcher
//!
//! Suspends the calling workflow until a submitted transaction is
//! finalized, polling the receipt source on a fixed interval. The wait
//! is bounded: exceeding the configured deadline yields
//! `ReceiptUnavailable` instead of suspending indefinitely.

use std::sync::Arc;
use std::time::Duration;
use tracing::{info, trace};

use crate::config::ChainConfig;
use crate::errors::EngineError;
use crate::ledger::{ReceiptPoll, ReceiptSource};
use crate::types::{Receipt, TxHandle, TxStatus};

#[derive(Clone)]
pub struct ReceiptWatcher {
    source: Arc<dyn ReceiptSource>,
    poll_interval: Duration,
    timeout: Duration,
}

impl ReceiptWatcher {
    pub fn new(source: Arc<dyn ReceiptSource>, poll_interval: Duration, timeout: Duration) -> Self {
        Self {
            source,
            poll_interval,
            timeout,
        }
    }

    pub fn from_config(source: Arc<dyn ReceiptSource>, chain: &ChainConfig) -> Self {
        Self::new(
            source,
            Duration::from_millis(chain.receipt_poll_ms),
            Duration::from_secs(chain.receipt_timeout_secs),
        )
    }

    /// Wait until `handle` finalizes.
    ///
    /// Returns the receipt only when confirmed; a revert, an
    /// unclassifiable terminal state, or a fetch error is `ReceiptError`,
    /// and an elapsed deadline is `ReceiptUnavailable`.
    pub async fn wait_for_confirmation(&self, handle: &TxHandle) -> Result<Receipt, EngineError> {
        let poll = async {
            loop {
                match self.source.fetch_receipt(handle).await {
                    Ok(ReceiptPoll::Pending) => {
                        trace!(%handle, "receipt still pending");
                    }
                    Ok(ReceiptPoll::Ready(receipt)) => match receipt.status {
                        TxStatus::Confirmed => {
                            info!(%handle, logs = receipt.logs.len(), "transaction confirmed");
                            return Ok(receipt);
                        }
                        TxStatus::Reverted => {
                            return Err(EngineError::ReceiptError(format!(
                                "transaction {handle} reverted on chain"
                            )));
                        }
                        other => {
                            return Err(EngineError::ReceiptError(format!(
                                "transaction {handle} finalized with status {other:?}"
                            )));
                        }
                    },
                    Err(e) => return Err(EngineError::ReceiptError(e.to_string())),
                }
                tokio::time::sleep(self.poll_interval).await;
            }
        };

        match tokio::time::timeout(self.timeout, poll).await {
            Ok(result) => result,
            Err(_) => Err(EngineError::ReceiptUnavailable {
                handle: handle.clone(),
                waited_secs: self.timeout.as_secs(),
            }),
        }
    }
}
