//! Scriptable in-memory ledger
//!
//! Backs simulation mode and the test suites. Writes, reads, and
//! receipt schedules are scripted per function name or handle; every
//! submission is recorded in order so tests can assert sequencing
//! (e.g. that no deposit is dispatched before an allowance confirms).

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use super::{
    CallArg, LedgerReader, LedgerWriter, ReadError, ReceiptFetchError, ReceiptPoll, ReceiptSource,
    Value, WriteError,
};
use crate::types::{LogEntry, Receipt, TxHandle, TxStatus};

/// Scripted outcome for one `submit` of a given function.
#[derive(Debug, Clone)]
pub enum WriteOutcome {
    Accept,
    Reject(String),
    Fail(String),
}

/// One recorded submission.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub function: String,
    pub args: Vec<CallArg>,
    pub handle: Option<TxHandle>,
}

#[derive(Default)]
struct Inner {
    next_handle: u64,
    calls: Vec<RecordedCall>,
    scripted_writes: HashMap<String, VecDeque<WriteOutcome>>,
    receipts: HashMap<TxHandle, VecDeque<ReceiptPoll>>,
    reads: HashMap<String, Value>,
}

/// In-memory implementation of all three ledger seams.
///
/// Unscripted behavior is permissive: submissions are accepted and
/// unscheduled receipts resolve as confirmed with no logs, so a test
/// only scripts what it wants to constrain.
#[derive(Default)]
pub struct MockLedger {
    inner: Mutex<Inner>,
}

impl MockLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the outcome for the next `submit` of `function`.
    pub fn script_write(&self, function: &str, outcome: WriteOutcome) {
        let mut inner = self.inner.lock().unwrap();
        inner
            .scripted_writes
            .entry(function.to_string())
            .or_default()
            .push_back(outcome);
    }

    /// Schedule the poll sequence for a handle. The final entry repeats
    /// once the queue drains.
    pub fn schedule_receipt(&self, handle: &TxHandle, polls: Vec<ReceiptPoll>) {
        let mut inner = self.inner.lock().unwrap();
        inner.receipts.insert(handle.clone(), polls.into());
    }

    /// Shorthand: resolve `handle` as confirmed with the given logs.
    pub fn confirm_with_logs(&self, handle: &TxHandle, logs: Vec<LogEntry>) {
        self.schedule_receipt(
            handle,
            vec![ReceiptPoll::Ready(Receipt {
                handle: handle.clone(),
                status: TxStatus::Confirmed,
                logs,
            })],
        );
    }

    /// Shorthand: resolve `handle` as reverted.
    pub fn revert(&self, handle: &TxHandle) {
        self.schedule_receipt(
            handle,
            vec![ReceiptPoll::Ready(Receipt {
                handle: handle.clone(),
                status: TxStatus::Reverted,
                logs: Vec::new(),
            })],
        );
    }

    /// Fix the value returned for reads of `function`.
    pub fn set_read(&self, function: &str, value: Value) {
        let mut inner = self.inner.lock().unwrap();
        inner.reads.insert(function.to_string(), value);
    }

    /// The handle the next accepted submission will receive.
    pub fn peek_next_handle(&self) -> TxHandle {
        let inner = self.inner.lock().unwrap();
        Self::handle_for(inner.next_handle)
    }

    /// Function names of every submission, in dispatch order.
    pub fn submitted_functions(&self) -> Vec<String> {
        let inner = self.inner.lock().unwrap();
        inner.calls.iter().map(|c| c.function.clone()).collect()
    }

    /// Full submission records, in dispatch order.
    pub fn submissions(&self) -> Vec<RecordedCall> {
        self.inner.lock().unwrap().calls.clone()
    }

    fn handle_for(seq: u64) -> TxHandle {
        TxHandle::new(format!("0xmock{seq:08x}"))
    }
}

#[async_trait]
impl LedgerWriter for MockLedger {
    async fn submit(&self, function: &str, args: &[CallArg]) -> Result<TxHandle, WriteError> {
        let mut inner = self.inner.lock().unwrap();
        let outcome = inner
            .scripted_writes
            .get_mut(function)
            .and_then(|queue| queue.pop_front())
            .unwrap_or(WriteOutcome::Accept);

        match outcome {
            WriteOutcome::Accept => {
                let handle = Self::handle_for(inner.next_handle);
                inner.next_handle += 1;
                inner.calls.push(RecordedCall {
                    function: function.to_string(),
                    args: args.to_vec(),
                    handle: Some(handle.clone()),
                });
                Ok(handle)
            }
            WriteOutcome::Reject(msg) => {
                inner.calls.push(RecordedCall {
                    function: function.to_string(),
                    args: args.to_vec(),
                    handle: None,
                });
                Err(WriteError::Rejected(msg))
            }
            WriteOutcome::Fail(msg) => {
                inner.calls.push(RecordedCall {
                    function: function.to_string(),
                    args: args.to_vec(),
                    handle: None,
                });
                Err(WriteError::Dispatch(msg))
            }
        }
    }
}

#[async_trait]
impl LedgerReader for MockLedger {
    async fn read(&self, function: &str, _args: &[CallArg]) -> Result<Value, ReadError> {
        let inner = self.inner.lock().unwrap();
        inner
            .reads
            .get(function)
            .cloned()
            .ok_or_else(|| ReadError(format!("no fixture for read of {function}")))
    }
}

#[async_trait]
impl ReceiptSource for MockLedger {
    async fn fetch_receipt(&self, handle: &TxHandle) -> Result<ReceiptPoll, ReceiptFetchError> {
        let mut inner = self.inner.lock().unwrap();
        match inner.receipts.get_mut(handle) {
            Some(queue) => {
                let poll = if queue.len() > 1 {
                    queue.pop_front().unwrap()
                } else {
                    queue.front().cloned().unwrap_or(ReceiptPoll::Pending)
                };
                Ok(poll)
            }
            // Unscheduled handles confirm immediately with no logs.
            None => Ok(ReceiptPoll::Ready(Receipt {
                handle: handle.clone(),
                status: TxStatus::Confirmed,
                logs: Vec::new(),
            })),
        }
    }
}
