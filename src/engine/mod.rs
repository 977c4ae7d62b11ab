//! Pure computation engine for FIFO cost matching and tax splitting.

use crate::domain::Decimal;
use crate::ledger::LedgerError;
use thiserror::Error;

pub mod fifo;
pub mod split;

pub use fifo::{consume, match_lots, FifoMatch, LotConsumption};
pub use split::{fallback_cost, split, FifoResult, SplitMode};

/// Errors from a single cost calculation.
#[derive(Debug, Error)]
pub enum CalcError {
    /// Negative or non-finite input; the calculation was not attempted.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// Lot history could not be read. Callers may fall back to an estimate.
    #[error("Lot data unavailable: {0}")]
    DataUnavailable(#[from] LedgerError),
}

pub(crate) fn ensure_non_negative(name: &str, value: Decimal) -> Result<(), CalcError> {
    if value.is_negative() {
        return Err(CalcError::InvalidInput(format!(
            "{} must not be negative, got {}",
            name, value
        )));
    }
    Ok(())
}

pub(crate) fn overflow(what: &str) -> CalcError {
    CalcError::InvalidInput(format!("{} overflows the supported decimal range", what))
}

/// Convert a float input, rejecting non-finite and negative values.
pub fn decimal_input(name: &str, value: f64) -> Result<Decimal, CalcError> {
    let d = Decimal::from_f64_checked(value)
        .ok_or_else(|| CalcError::InvalidInput(format!("{} must be finite and in range, got {}", name, value)))?;
    ensure_non_negative(name, d)?;
    Ok(d)
}
