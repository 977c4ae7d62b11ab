//! Acquisition lots and disposal requests.

use crate::domain::{Decimal, TimeMs};
use serde::{Deserialize, Serialize};

/// A completed acquisition of a fungible asset, available as FIFO supply.
///
/// Lots are read-only snapshots; a cost calculation never writes them back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcquisitionLot {
    pub quantity: Decimal,
    pub unit_cost: Decimal,
    pub acquired_at: TimeMs,
}

impl AcquisitionLot {
    pub fn new(quantity: Decimal, unit_cost: Decimal, acquired_at: TimeMs) -> Self {
        Self {
            quantity,
            unit_cost,
            acquired_at,
        }
    }
}

/// The sell side being costed: how much was disposed of and for what.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisposalRequest {
    pub quantity: Decimal,
    pub proceeds: Decimal,
}

impl DisposalRequest {
    pub fn new(quantity: Decimal, proceeds: Decimal) -> Self {
        Self { quantity, proceeds }
    }
}

/// Sort lots ascending by acquisition time. Stable, so same-time lots keep
/// their insertion order.
pub fn sort_fifo(lots: &mut [AcquisitionLot]) {
    lots.sort_by_key(|l| l.acquired_at);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn lot(qty: &str, cost: &str, at: i64) -> AcquisitionLot {
        AcquisitionLot::new(
            Decimal::from_str(qty).unwrap(),
            Decimal::from_str(cost).unwrap(),
            TimeMs::new(at),
        )
    }

    #[test]
    fn sort_fifo_orders_by_time_and_keeps_ties_stable() {
        let mut lots = vec![lot("1", "90", 2000), lot("2", "80", 1000), lot("3", "85", 1000)];
        sort_fifo(&mut lots);
        assert_eq!(lots[0].quantity, Decimal::from_str("2").unwrap());
        assert_eq!(lots[1].quantity, Decimal::from_str("3").unwrap());
        assert_eq!(lots[2].acquired_at, TimeMs::new(2000));
    }

    #[test]
    fn lot_serializes_camel_case() {
        let json = serde_json::to_value(lot("10", "80", 1)).unwrap();
        assert_eq!(json["unitCost"], serde_json::json!(80.0));
        assert_eq!(json["acquiredAt"], serde_json::json!(1));
    }
}
