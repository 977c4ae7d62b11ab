//! Lot ledger abstraction: the read port the cost calculator depends on.

use crate::domain::{AcquisitionLot, Asset};
use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

pub mod import;
pub mod mock;

pub use import::{parse_purchase_orders_csv, ImportError};
pub use mock::MockLotLedger;

/// Read access to completed acquisition lots.
#[async_trait]
pub trait LotLedger: Send + Sync + fmt::Debug {
    /// Fetch every completed acquisition of `asset`.
    ///
    /// # Returns
    /// Lots ordered ascending by acquisition time; ties keep insertion order.
    async fn completed_lots(&self, asset: &Asset) -> Result<Vec<AcquisitionLot>, LedgerError>;
}

/// Error type for ledger reads.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LedgerError {
    /// Store unreachable or query failed.
    #[error("ledger store unavailable: {0}")]
    Unavailable(String),
    /// The read did not finish within the configured budget.
    #[error("ledger read timed out after {0}ms")]
    Timeout(u64),
    /// A stored record could not be decoded.
    #[error("malformed ledger record: {0}")]
    Malformed(String),
}

impl From<sqlx::Error> for LedgerError {
    fn from(err: sqlx::Error) -> Self {
        LedgerError::Unavailable(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ledger_error_display() {
        let err = LedgerError::Unavailable("connection refused".to_string());
        assert_eq!(err.to_string(), "ledger store unavailable: connection refused");

        let err = LedgerError::Timeout(250);
        assert_eq!(err.to_string(), "ledger read timed out after 250ms");

        let err = LedgerError::Malformed("quantity: abc".to_string());
        assert_eq!(err.to_string(), "malformed ledger record: quantity: abc");
    }

    #[test]
    fn test_sqlx_error_maps_to_unavailable() {
        let err: LedgerError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(err, LedgerError::Unavailable(_)));
    }
}
