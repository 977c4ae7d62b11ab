//! Repository layer for database operations.

use crate::domain::{AcquisitionLot, Asset, Decimal, OrderStatus, PurchaseOrder, TimeMs};
use crate::ledger::{LedgerError, LotLedger};
use async_trait::async_trait;
use sqlx::sqlite::{Sqlite, SqlitePool, SqliteRow};
use sqlx::{Executor, Row};
use tracing::debug;

/// Repository for database operations.
pub struct Repository {
    pool: SqlitePool,
}

impl std::fmt::Debug for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository").finish_non_exhaustive()
    }
}

impl Repository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Repository { pool }
    }

    // =========================================================================
    // Purchase order operations
    // =========================================================================

    /// Insert a purchase order idempotently.
    ///
    /// # Returns
    /// `true` if a new row was written, `false` if `order_key` already existed.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub async fn insert_purchase_order(&self, order: &PurchaseOrder) -> Result<bool, sqlx::Error> {
        let now = chrono::Utc::now().timestamp_millis();
        insert_order(&self.pool, order, now).await
    }

    /// Insert many purchase orders in one transaction.
    ///
    /// # Returns
    /// Number of newly written rows.
    ///
    /// # Errors
    /// Returns an error if any insert fails; nothing is written in that case.
    pub async fn insert_purchase_orders_batch(
        &self,
        orders: &[PurchaseOrder],
    ) -> Result<usize, sqlx::Error> {
        let now = chrono::Utc::now().timestamp_millis();
        let mut tx = self.pool.begin().await?;
        let mut inserted = 0;

        for order in orders {
            if insert_order(&mut *tx, order, now).await? {
                inserted += 1;
            }
        }

        tx.commit().await?;
        debug!("Inserted {} of {} purchase orders", inserted, orders.len());
        Ok(inserted)
    }

    /// Update the status of a purchase order.
    ///
    /// # Returns
    /// `false` if no order has this key.
    ///
    /// # Errors
    /// Returns an error if the update fails.
    pub async fn set_purchase_status(
        &self,
        order_key: &str,
        status: OrderStatus,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE purchase_orders SET status = ?, updated_at = ? WHERE order_key = ?",
        )
        .bind(status.as_str())
        .bind(chrono::Utc::now().timestamp_millis())
        .bind(order_key)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Get a purchase order by its key.
    ///
    /// # Errors
    /// Returns an error if the query fails or the stored row cannot be decoded.
    pub async fn get_purchase_order(
        &self,
        order_key: &str,
    ) -> Result<Option<PurchaseOrder>, LedgerError> {
        let row = sqlx::query(
            r#"
            SELECT order_key, order_number, asset, quantity, unit_price, order_date, status
            FROM purchase_orders
            WHERE order_key = ?
            "#,
        )
        .bind(order_key)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(decode_purchase_order).transpose()
    }

    /// Count purchase orders for an asset, across all statuses.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn count_purchase_orders(&self, asset: &Asset) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM purchase_orders WHERE asset = ?")
                .bind(asset.as_str())
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    // =========================================================================
    // Lot reads
    // =========================================================================

    /// Completed acquisitions of `asset`, oldest first.
    ///
    /// # Errors
    /// Returns an error if the query fails or a stored amount cannot be decoded.
    pub async fn query_completed_lots(
        &self,
        asset: &Asset,
    ) -> Result<Vec<AcquisitionLot>, LedgerError> {
        let rows = sqlx::query(
            r#"
            SELECT order_key, order_number, asset, quantity, unit_price, order_date, status
            FROM purchase_orders
            WHERE asset = ? AND status = 'completed'
            ORDER BY order_date ASC, id ASC
            "#,
        )
        .bind(asset.as_str())
        .fetch_all(&self.pool)
        .await?;

        let mut lots = Vec::with_capacity(rows.len());
        for row in &rows {
            if let Some(lot) = decode_purchase_order(row)?.as_lot() {
                lots.push(lot);
            }
        }
        Ok(lots)
    }

    /// Round-trip a trivial query to confirm the database answers.
    ///
    /// # Errors
    /// Returns an error if the pool is closed or the query fails.
    pub async fn ping(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl LotLedger for Repository {
    async fn completed_lots(&self, asset: &Asset) -> Result<Vec<AcquisitionLot>, LedgerError> {
        self.query_completed_lots(asset).await
    }
}

async fn insert_order<'e, E>(executor: E, order: &PurchaseOrder, now: i64) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        r#"
        INSERT INTO purchase_orders (
            order_key, order_number, asset, quantity, unit_price,
            order_date, status, created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(order_key) DO NOTHING
        "#,
    )
    .bind(order.order_key.as_str())
    .bind(order.order_number.as_deref())
    .bind(order.asset.as_str())
    .bind(order.quantity.to_canonical_string())
    .bind(order.unit_price.to_canonical_string())
    .bind(order.order_date.as_ms())
    .bind(order.status.as_str())
    .bind(now)
    .bind(now)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}

fn decode_decimal(row: &SqliteRow, column: &str) -> Result<Decimal, LedgerError> {
    let raw: String = row.get(column);
    Decimal::from_str_canonical(&raw)
        .map_err(|e| LedgerError::Malformed(format!("{} {:?}: {}", column, raw, e)))
}

fn decode_purchase_order(row: &SqliteRow) -> Result<PurchaseOrder, LedgerError> {
    let status_str: String = row.get("status");
    let status = status_str
        .parse::<OrderStatus>()
        .map_err(|e| LedgerError::Malformed(e.to_string()))?;
    let asset: String = row.get("asset");

    Ok(PurchaseOrder {
        order_key: row.get("order_key"),
        order_number: row.get("order_number"),
        asset: Asset::new(asset),
        quantity: decode_decimal(row, "quantity")?,
        unit_price: decode_decimal(row, "unit_price")?,
        order_date: TimeMs::new(row.get("order_date")),
        status,
    })
}
