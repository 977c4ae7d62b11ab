use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::AppState;
use crate::domain::{AcquisitionLot, Asset, Decimal};
use crate::engine::CalcError;
use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct LotsQuery {
    pub asset: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LotsResponse {
    pub asset: String,
    pub total_quantity: String,
    pub lots: Vec<AcquisitionLot>,
}

/// Completed lots for an asset in FIFO order.
pub async fn get_lots(
    Query(params): Query<LotsQuery>,
    State(state): State<AppState>,
) -> Result<Json<LotsResponse>, AppError> {
    let asset = params.asset.trim();
    if asset.is_empty() {
        return Err(AppError::BadRequest("asset is required".to_string()));
    }
    let asset = Asset::new(asset);

    let lots = state.calculator.read_lots(&asset).await?;
    let total_quantity = lots
        .iter()
        .try_fold(Decimal::zero(), |acc, l| acc.checked_add(l.quantity))
        .ok_or_else(|| {
            CalcError::InvalidInput("total lot quantity overflows the supported decimal range".to_string())
        })?;

    Ok(Json(LotsResponse {
        asset: asset.to_string(),
        total_quantity: total_quantity.to_canonical_string(),
        lots,
    }))
}
