use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::AppState;
use crate::domain::{Asset, DisposalRequest};
use crate::engine::{decimal_input, CalcError, SplitMode};
use crate::error::AppError;
use crate::invoicing::BatchItem;
use crate::render::InvoiceDocument;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceRequest {
    pub asset: String,
    pub quantity: f64,
    pub proceeds: f64,
    pub mode: Option<SplitMode>,
}

#[derive(Debug, Deserialize)]
pub struct BatchInvoiceRequest {
    pub items: Vec<InvoiceRequest>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchInvoiceEntry {
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice: Option<InvoiceDocument>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchInvoiceResponse {
    pub entries: Vec<BatchInvoiceEntry>,
    pub estimated_count: usize,
    pub failed_count: usize,
}

fn to_batch_item(req: &InvoiceRequest) -> Result<BatchItem, CalcError> {
    if req.asset.trim().is_empty() {
        return Err(CalcError::InvalidInput("asset is required".to_string()));
    }
    Ok(BatchItem {
        asset: Asset::new(&req.asset),
        request: DisposalRequest::new(
            decimal_input("quantity", req.quantity)?,
            decimal_input("proceeds", req.proceeds)?,
        ),
        mode: req.mode,
    })
}

pub async fn create_invoice(
    State(state): State<AppState>,
    Json(body): Json<InvoiceRequest>,
) -> Result<Json<InvoiceDocument>, AppError> {
    let item = to_batch_item(&body)?;
    let mode = item.mode.unwrap_or(state.calculator.settings().split_mode);

    let invoice = state
        .calculator
        .cost_invoice_with_mode(&item.asset, &item.request, mode)
        .await?;

    Ok(Json(InvoiceDocument::render(&invoice, state.config.currency)))
}

pub async fn create_invoice_batch(
    State(state): State<AppState>,
    Json(body): Json<BatchInvoiceRequest>,
) -> Result<Json<BatchInvoiceResponse>, AppError> {
    let mut entries: Vec<Option<BatchInvoiceEntry>> = Vec::with_capacity(body.items.len());
    let mut valid = Vec::new();
    let mut valid_index = Vec::new();

    for (index, req) in body.items.iter().enumerate() {
        match to_batch_item(req) {
            Ok(item) => {
                valid_index.push(index);
                valid.push(item);
                entries.push(None);
            }
            Err(err) => entries.push(Some(BatchInvoiceEntry {
                index,
                invoice: None,
                error: Some(err.to_string()),
            })),
        }
    }

    for entry in state.calculator.cost_batch(valid).await {
        let index = valid_index[entry.index];
        entries[index] = Some(match entry.outcome {
            Ok(invoice) => BatchInvoiceEntry {
                index,
                invoice: Some(InvoiceDocument::render(&invoice, state.config.currency)),
                error: None,
            },
            Err(err) => BatchInvoiceEntry {
                index,
                invoice: None,
                error: Some(err.to_string()),
            },
        });
    }

    let entries: Vec<BatchInvoiceEntry> = entries.into_iter().flatten().collect();
    let estimated_count = entries
        .iter()
        .filter(|e| e.invoice.as_ref().is_some_and(|i| i.basis.is_estimated()))
        .count();
    let failed_count = entries.iter().filter(|e| e.error.is_some()).count();

    Ok(Json(BatchInvoiceResponse {
        entries,
        estimated_count,
        failed_count,
    }))
}
