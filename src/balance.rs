//! Balance Validator and base-unit arithmetic
//!
//! Every comparison runs on base-unit integers. Human-scaled values
//! enter only as decimal strings (`parse_units`) and leave only as
//! display strings (`format_units`); no float ever touches an amount.
//! The validator is advisory: the remote ledger enforces sufficiency at
//! submission time, so a negative check warns without blocking.

use serde::Serialize;
use thiserror::Error;

use crate::errors::EngineError;
use crate::types::{RawAmount, TOKEN_DECIMALS};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountParseError {
    #[error("empty amount")]
    Empty,
    #[error("invalid digit in amount")]
    InvalidDigit,
    #[error("too many decimal places (max {0})")]
    TooManyDecimals(u32),
    #[error("amount overflows the base-unit range")]
    Overflow,
}

/// Convert a human-unit decimal string into base units.
///
/// `parse_units("500", 18)` is 500 * 10^18; `parse_units("0.5", 18)` is
/// 5 * 10^17. Fractions beyond `decimals` places are rejected rather
/// than silently truncated.
pub fn parse_units(human: &str, decimals: u32) -> Result<RawAmount, AmountParseError> {
    let trimmed = human.trim();
    if trimmed.is_empty() {
        return Err(AmountParseError::Empty);
    }

    let (whole, frac) = match trimmed.split_once('.') {
        Some((w, f)) => (w, f),
        None => (trimmed, ""),
    };
    if whole.is_empty() && frac.is_empty() {
        return Err(AmountParseError::Empty);
    }
    if frac.len() as u32 > decimals {
        return Err(AmountParseError::TooManyDecimals(decimals));
    }

    let mut raw: RawAmount = 0;
    for digit in whole.bytes().chain(frac.bytes()) {
        if !digit.is_ascii_digit() {
            return Err(AmountParseError::InvalidDigit);
        }
        raw = raw
            .checked_mul(10)
            .and_then(|v| v.checked_add((digit - b'0') as RawAmount))
            .ok_or(AmountParseError::Overflow)?;
    }

    // Pad out the fraction to the full decimal width.
    let padding = decimals - frac.len() as u32;
    raw.checked_mul(10u128.pow(padding))
        .ok_or(AmountParseError::Overflow)
}

/// Render a base-unit amount as a human-readable string with two
/// decimal places (truncating, not rounding). Display only.
pub fn format_units(raw: RawAmount, decimals: u32) -> String {
    let scale = 10u128.pow(decimals);
    let whole = raw / scale;
    let cents = (raw % scale) / 10u128.pow(decimals.saturating_sub(2));
    format!("{whole}.{cents:02}")
}

/// Outcome of a pre-flight sufficiency check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BalanceCheck {
    pub pool: RawAmount,
    pub required: RawAmount,
    /// The authoritative integer comparison.
    pub sufficient: bool,
    pub shortfall: RawAmount,
    /// Human-readable renderings, for messaging only.
    pub pool_display: String,
    pub required_display: String,
}

#[derive(Debug, Clone)]
pub struct BalanceValidator {
    decimals: u32,
}

impl Default for BalanceValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl BalanceValidator {
    pub fn new() -> Self {
        Self {
            decimals: TOKEN_DECIMALS,
        }
    }

    /// Compare a pooled balance against a required threshold, both in
    /// base units.
    pub fn check(&self, pool: RawAmount, required: RawAmount) -> BalanceCheck {
        BalanceCheck {
            pool,
            required,
            sufficient: pool >= required,
            shortfall: required.saturating_sub(pool),
            pool_display: format_units(pool, self.decimals),
            required_display: format_units(required, self.decimals),
        }
    }

    /// Advisory error payload for an insufficient check, for callers
    /// that surface a warning. Never used to block a submission.
    pub fn advisory_error(check: &BalanceCheck) -> Option<EngineError> {
        (!check.sufficient).then(|| EngineError::InsufficientPoolBalance {
            pool_display: check.pool_display.clone(),
            required_display: check.required_display.clone(),
        })
    }
}
