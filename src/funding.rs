//! Two-Phase Funding Workflow
//!
//! Moves tokens into the registry's pooled balance as two dependent
//! transactions: an allowance grant on the token ledger, then the
//! deposit call on the registry. The deposit is never submitted before
//! the allowance receipt confirms, and a failure carries which step
//! died so the operator knows whether re-approval is required. Neither
//! step is retried automatically.

use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::{EngineError, FundingStep};
use crate::ledger::CallArg;
use crate::submitter::Submitter;
use crate::types::{ActionRegistry, RawAmount, TxHandle};
use crate::watcher::ReceiptWatcher;

/// A request to fund the pooled balance.
///
/// Decomposed into two independent transactions; never submitted as a
/// single atomic operation.
#[derive(Debug, Clone)]
pub struct FundingRequest {
    /// Owner of the tokens being moved (the signing identity).
    pub granter: String,
    /// Contract authorized to move them; the registry address.
    pub spender: String,
    /// Amount in base units.
    pub amount: RawAmount,
}

/// Workflow states, in order of progression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FundingState {
    Idle,
    AwaitingAllowance,
    AllowanceConfirmed,
    AwaitingDeposit,
    DepositConfirmed,
    Failed(FundingStep),
}

/// Handles of both confirmed transactions.
#[derive(Debug, Clone)]
pub struct FundingOutcome {
    pub allowance: TxHandle,
    pub deposit: TxHandle,
}

pub struct FundingWorkflow {
    token: Submitter,
    registry: Submitter,
    watcher: ReceiptWatcher,
    actions: Arc<ActionRegistry>,
    state: FundingState,
}

impl FundingWorkflow {
    /// `token` submits to the token ledger (the allowance grant),
    /// `registry` to the event registry (the deposit).
    pub fn new(
        token: Submitter,
        registry: Submitter,
        watcher: ReceiptWatcher,
        actions: Arc<ActionRegistry>,
    ) -> Self {
        Self {
            token,
            registry,
            watcher,
            actions,
            state: FundingState::Idle,
        }
    }

    pub fn state(&self) -> &FundingState {
        &self.state
    }

    /// Run both steps to completion.
    pub async fn run(&mut self, request: &FundingRequest) -> Result<FundingOutcome, EngineError> {
        let _guard = self.actions.begin("funding")?;
        let correlation = Uuid::new_v4();

        info!(
            %correlation,
            granter = %request.granter,
            spender = %request.spender,
            amount = request.amount,
            "funding: requesting allowance grant"
        );
        self.state = FundingState::AwaitingAllowance;

        let allowance = match self.grant_allowance(request).await {
            Ok(handle) => handle,
            Err(source) => {
                warn!(%correlation, error = %source, "funding: allowance step failed");
                self.state = FundingState::Failed(FundingStep::Allowance);
                return Err(EngineError::AllowanceFailed {
                    source: Box::new(source),
                });
            }
        };
        self.state = FundingState::AllowanceConfirmed;
        info!(%correlation, handle = %allowance, "funding: allowance confirmed, submitting deposit");

        self.state = FundingState::AwaitingDeposit;
        let deposit = match self.deposit(request).await {
            Ok(handle) => handle,
            Err(source) => {
                warn!(%correlation, error = %source, "funding: deposit step failed");
                self.state = FundingState::Failed(FundingStep::Deposit);
                return Err(EngineError::DepositFailed {
                    source: Box::new(source),
                });
            }
        };
        self.state = FundingState::DepositConfirmed;
        info!(%correlation, handle = %deposit, "funding: deposit confirmed");

        Ok(FundingOutcome { allowance, deposit })
    }

    async fn grant_allowance(&self, request: &FundingRequest) -> Result<TxHandle, EngineError> {
        let handle = self
            .token
            .submit(
                "approve",
                &[
                    CallArg::Address(request.spender.clone()),
                    CallArg::Uint(request.amount),
                ],
            )
            .await?;
        self.watcher.wait_for_confirmation(&handle).await?;
        Ok(handle)
    }

    async fn deposit(&self, request: &FundingRequest) -> Result<TxHandle, EngineError> {
        let handle = self
            .registry
            .submit("refillTokens", &[CallArg::Uint(request.amount)])
            .await?;
        self.watcher.wait_for_confirmation(&handle).await?;
        Ok(handle)
    }
}
