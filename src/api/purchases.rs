use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::AppState;
use crate::domain::{Asset, Decimal, OrderStatus, PurchaseOrder, TimeMs};
use crate::error::AppError;
use crate::ledger::parse_purchase_orders_csv;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePurchaseOrderRequest {
    pub order_number: Option<String>,
    pub asset: String,
    pub quantity: String,
    pub unit_price: String,
    pub order_date_ms: Option<i64>,
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePurchaseOrderResponse {
    pub order_key: String,
    pub inserted: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResponse {
    pub parsed: usize,
    pub inserted: usize,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

fn parse_amount(name: &str, raw: &str) -> Result<Decimal, AppError> {
    Decimal::from_str_canonical(raw)
        .map_err(|_| AppError::BadRequest(format!("Invalid {}", name)))
}

fn parse_status(raw: &str) -> Result<OrderStatus, AppError> {
    raw.parse::<OrderStatus>()
        .map_err(|e| AppError::BadRequest(e.to_string()))
}

pub async fn create_purchase_order(
    State(state): State<AppState>,
    Json(body): Json<CreatePurchaseOrderRequest>,
) -> Result<Json<CreatePurchaseOrderResponse>, AppError> {
    if body.asset.trim().is_empty() {
        return Err(AppError::BadRequest("asset is required".to_string()));
    }
    let quantity = parse_amount("quantity", &body.quantity)?;
    if !quantity.is_positive() {
        return Err(AppError::BadRequest("quantity must be positive".to_string()));
    }
    let unit_price = parse_amount("unitPrice", &body.unit_price)?;
    if unit_price.is_negative() {
        return Err(AppError::BadRequest(
            "unitPrice must not be negative".to_string(),
        ));
    }
    let status = body
        .status
        .as_deref()
        .map(parse_status)
        .transpose()?
        .unwrap_or(OrderStatus::Pending);

    let order = PurchaseOrder::new(
        body.order_number,
        Asset::new(&body.asset),
        quantity,
        unit_price,
        body.order_date_ms.map(TimeMs::new).unwrap_or_else(TimeMs::now),
        status,
    );

    let inserted = state.repo.insert_purchase_order(&order).await?;
    tracing::info!(
        "Purchase order {} for {} {} recorded (new: {})",
        order.order_key,
        order.quantity,
        order.asset,
        inserted
    );

    Ok(Json(CreatePurchaseOrderResponse {
        order_key: order.order_key,
        inserted,
    }))
}

pub async fn import_purchase_orders(
    State(state): State<AppState>,
    body: String,
) -> Result<Json<ImportResponse>, AppError> {
    let orders = parse_purchase_orders_csv(body.as_bytes())?;
    let inserted = state.repo.insert_purchase_orders_batch(&orders).await?;
    tracing::info!("Imported {} purchase orders ({} new)", orders.len(), inserted);

    Ok(Json(ImportResponse {
        parsed: orders.len(),
        inserted,
    }))
}

pub async fn update_purchase_status(
    State(state): State<AppState>,
    Path(order_key): Path<String>,
    Json(body): Json<UpdateStatusRequest>,
) -> Result<Json<PurchaseOrder>, AppError> {
    let status = parse_status(&body.status)?;
    if !state.repo.set_purchase_status(&order_key, status).await? {
        return Err(AppError::NotFound(format!("purchase order {}", order_key)));
    }

    let order = state
        .repo
        .get_purchase_order(&order_key)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("purchase order {}", order_key)))?;
    Ok(Json(order))
}
