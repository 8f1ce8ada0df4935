//! External ledger seams
//!
//! The engine never talks to a chain directly: every write, read, and
//! receipt fetch goes through these traits. A production embedding
//! provides wallet-backed implementations; the [`mock`] module provides
//! the scriptable in-memory ledger used by simulation mode and tests.

use async_trait::async_trait;
use thiserror::Error;

use crate::types::{RawAmount, Receipt, Topic, TxHandle};

#[cfg(any(test, feature = "mock-ledger"))]
pub mod mock;

/// Write-path failure, split so the engine can tell a declined signature
/// from everything else.
#[derive(Debug, Clone, Error)]
pub enum WriteError {
    /// The signing agent declined the call.
    #[error("signer rejected the call: {0}")]
    Rejected(String),
    /// Network, encoding, or any other dispatch failure.
    #[error("dispatch failed: {0}")]
    Dispatch(String),
}

#[derive(Debug, Clone, Error)]
#[error("read failed: {0}")]
pub struct ReadError(pub String);

#[derive(Debug, Clone, Error)]
#[error("receipt fetch failed: {0}")]
pub struct ReceiptFetchError(pub String);

/// Argument to a contract call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallArg {
    Uint(RawAmount),
    Bytes32(Topic),
    Address(String),
    Bool(bool),
}

/// Value returned from a contract read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Uint(RawAmount),
    Bytes32(Topic),
    Address(String),
    Bool(bool),
    Tuple(Vec<Value>),
}

impl Value {
    pub fn as_uint(&self) -> Option<RawAmount> {
        match self {
            Value::Uint(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bytes32(&self) -> Option<&Topic> {
        match self {
            Value::Bytes32(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_address(&self) -> Option<&str> {
        match self {
            Value::Address(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_tuple(&self) -> Option<&[Value]> {
        match self {
            Value::Tuple(v) => Some(v),
            _ => None,
        }
    }
}

/// State-changing contract calls. One `submit` is one signed dispatch;
/// implementations must not retry on the engine's behalf.
#[async_trait]
pub trait LedgerWriter: Send + Sync {
    async fn submit(&self, function: &str, args: &[CallArg]) -> Result<TxHandle, WriteError>;
}

/// Read-only contract calls.
#[async_trait]
pub trait LedgerReader: Send + Sync {
    async fn read(&self, function: &str, args: &[CallArg]) -> Result<Value, ReadError>;
}

/// One poll of a submitted transaction.
#[derive(Debug, Clone)]
pub enum ReceiptPoll {
    /// Not yet finalized.
    Pending,
    /// Finalized; the receipt carries confirmed or reverted status.
    Ready(Receipt),
}

/// Source of finalized receipts for submitted handles.
#[async_trait]
pub trait ReceiptSource: Send + Sync {
    async fn fetch_receipt(&self, handle: &TxHandle) -> Result<ReceiptPoll, ReceiptFetchError>;
}
