//! CSV import of purchase orders exported from the trading desk.

use crate::domain::{Asset, Decimal, OrderStatus, PurchaseOrder, TimeMs};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("csv error at record {line}: {message}")]
    Csv { line: usize, message: String },
}

/// Parse purchase orders from CSV with header
/// `order_number,asset,quantity,unit_price,order_date_ms,status`.
///
/// `order_number` may be empty. Rows with non-positive quantity or negative
/// price are rejected, failing the whole import.
pub fn parse_purchase_orders_csv(csv_bytes: &[u8]) -> Result<Vec<PurchaseOrder>, ImportError> {
    #[derive(Debug, serde::Deserialize)]
    struct Row {
        order_number: Option<String>,
        asset: String,
        quantity: String,
        unit_price: String,
        order_date_ms: i64,
        status: String,
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(csv_bytes);

    let mut orders = Vec::new();
    for (idx, record) in reader.deserialize::<Row>().enumerate() {
        let line = idx + 1;
        let err = |message: String| ImportError::Csv { line, message };

        let row = record.map_err(|e| err(e.to_string()))?;
        let quantity = Decimal::from_str_canonical(&row.quantity)
            .map_err(|e| err(format!("invalid quantity: {}", e)))?;
        let unit_price = Decimal::from_str_canonical(&row.unit_price)
            .map_err(|e| err(format!("invalid unit_price: {}", e)))?;
        let status = row
            .status
            .parse::<OrderStatus>()
            .map_err(|e| err(e.to_string()))?;

        if !quantity.is_positive() {
            return Err(err(format!("quantity must be positive, got {}", quantity)));
        }
        if unit_price.is_negative() {
            return Err(err(format!("unit_price must not be negative, got {}", unit_price)));
        }
        if row.asset.trim().is_empty() {
            return Err(err("asset is empty".to_string()));
        }

        orders.push(PurchaseOrder::new(
            row.order_number,
            Asset::new(&row.asset),
            quantity,
            unit_price,
            TimeMs::new(row.order_date_ms),
            status,
        ));
    }

    Ok(orders)
}
