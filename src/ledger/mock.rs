//! In-memory lot ledger for testing without a database.

use super::{LedgerError, LotLedger};
use crate::domain::{sort_fifo, AcquisitionLot, Asset, Decimal, TimeMs};
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;

/// Mock ledger that returns predefined lots, or a predefined failure.
#[derive(Debug, Clone, Default)]
pub struct MockLotLedger {
    lots: HashMap<Asset, Vec<AcquisitionLot>>,
    failure: Option<LedgerError>,
    delay: Option<Duration>,
}

impl MockLotLedger {
    /// Create a new mock ledger with no lots.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a completed lot for an asset.
    pub fn with_lot(mut self, asset: &str, quantity: Decimal, unit_cost: Decimal, at_ms: i64) -> Self {
        self.lots
            .entry(Asset::new(asset))
            .or_default()
            .push(AcquisitionLot::new(quantity, unit_cost, TimeMs::new(at_ms)));
        self
    }

    /// Make every read fail with `err`.
    pub fn failing(mut self, err: LedgerError) -> Self {
        self.failure = Some(err);
        self
    }

    /// Delay every read, for exercising timeouts.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl LotLedger for MockLotLedger {
    async fn completed_lots(&self, asset: &Asset) -> Result<Vec<AcquisitionLot>, LedgerError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }

        let mut lots = self.lots.get(asset).cloned().unwrap_or_default();
        sort_fifo(&mut lots);
        Ok(lots)
    }
}
