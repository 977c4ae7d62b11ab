//! Purchase order record, the persisted source of acquisition lots.

use crate::domain::{AcquisitionLot, Asset, Decimal, OrderStatus, TimeMs};
use serde::{Deserialize, Serialize};

/// A purchase of an asset from a P2P counterparty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOrder {
    /// Stable unique identifier for this order.
    ///
    /// Priority: `order_number` (if present) > hash of deterministic fields.
    pub order_key: String,
    /// Exchange order number when available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_number: Option<String>,
    pub asset: Asset,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub order_date: TimeMs,
    pub status: OrderStatus,
}

impl PurchaseOrder {
    /// Create a new PurchaseOrder and compute its `order_key`.
    pub fn new(
        order_number: Option<String>,
        asset: Asset,
        quantity: Decimal,
        unit_price: Decimal,
        order_date: TimeMs,
        status: OrderStatus,
    ) -> Self {
        let order_number = order_number
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        let order_key = Self::compute_order_key(
            order_number.as_deref(),
            &asset,
            order_date,
            &quantity,
            &unit_price,
        );
        Self {
            order_key,
            order_number,
            asset,
            quantity,
            unit_price,
            order_date,
            status,
        }
    }

    /// Compute a stable unique key for this order.
    ///
    /// When no exchange order number exists, the key is a SHA-256 over the
    /// canonical fields truncated to 128 bits, so re-importing the same
    /// export is idempotent.
    pub fn compute_order_key(
        order_number: Option<&str>,
        asset: &Asset,
        order_date: TimeMs,
        quantity: &Decimal,
        unit_price: &Decimal,
    ) -> String {
        if let Some(n) = order_number.filter(|s| !s.trim().is_empty()) {
            return format!("order:{}", n.trim());
        }

        use sha2::{Digest, Sha256};

        fn hash_var(hasher: &mut Sha256, data: &str) {
            hasher.update((data.len() as u32).to_le_bytes());
            hasher.update(data.as_bytes());
        }

        let mut hasher = Sha256::new();
        hash_var(&mut hasher, asset.as_str());
        hasher.update(order_date.as_ms().to_le_bytes());
        hash_var(&mut hasher, &quantity.to_canonical_string());
        hash_var(&mut hasher, &unit_price.to_canonical_string());

        let hash = hasher.finalize();
        format!("hash:{}", hex::encode(&hash[..16]))
    }

    /// The FIFO lot this order contributes, if it has completed.
    pub fn as_lot(&self) -> Option<AcquisitionLot> {
        (self.status == OrderStatus::Completed)
            .then(|| AcquisitionLot::new(self.quantity, self.unit_price, self.order_date))
    }
}
