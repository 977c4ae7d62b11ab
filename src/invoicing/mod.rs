//! Invoice costing: reads lot history, runs FIFO and splits the margin.
//!
//! This is the caller of the pure engine and the single place that decides
//! when a missing ledger degrades to the default-margin estimate.

use crate::config::PricingSettings;
use crate::domain::{AcquisitionLot, Asset, Decimal, DisposalRequest};
use crate::engine::{self, CalcError, FifoMatch, FifoResult, SplitMode};
use crate::ledger::{LedgerError, LotLedger};
use futures::future::join_all;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

/// Why an invoice's cost is an estimate rather than FIFO-matched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EstimateReason {
    LedgerUnavailable,
    NoLots,
}

/// Whether the cost figure came from lot history or from the fallback margin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CostBasis {
    Actual,
    Estimated { reason: EstimateReason },
}

impl CostBasis {
    pub fn is_estimated(&self) -> bool {
        matches!(self, CostBasis::Estimated { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            CostBasis::Actual => "actual",
            CostBasis::Estimated { .. } => "estimated",
        }
    }
}

/// A fully costed sale invoice, ready for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CostedInvoice {
    pub asset: Asset,
    pub request: DisposalRequest,
    pub mode: SplitMode,
    pub result: FifoResult,
    pub basis: CostBasis,
    /// Quantity the lot history could not cover, costed at zero.
    pub unmatched_quantity: Decimal,
}

/// One invoice of a batch.
#[derive(Debug, Clone)]
pub struct BatchItem {
    pub asset: Asset,
    pub request: DisposalRequest,
    pub mode: Option<SplitMode>,
}

/// Outcome for one batch item; failures are flagged, not fatal to the batch.
#[derive(Debug)]
pub struct BatchEntry {
    pub index: usize,
    pub outcome: Result<CostedInvoice, CalcError>,
}

#[derive(Debug, Clone)]
pub struct InvoiceCalculator {
    ledger: Arc<dyn LotLedger>,
    settings: PricingSettings,
}

impl InvoiceCalculator {
    pub fn new(ledger: Arc<dyn LotLedger>, settings: PricingSettings) -> Self {
        Self { ledger, settings }
    }

    pub fn settings(&self) -> &PricingSettings {
        &self.settings
    }

    /// Read completed lots for `asset` within the configured timeout.
    pub async fn read_lots(&self, asset: &Asset) -> Result<Vec<AcquisitionLot>, CalcError> {
        let timeout = self.settings.ledger_timeout;
        match tokio::time::timeout(timeout, self.ledger.completed_lots(asset)).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(LedgerError::Timeout(timeout.as_millis() as u64).into()),
        }
    }

    /// FIFO-match the disposal against lot history. Never estimates: a
    /// failed read is returned as `DataUnavailable`.
    pub async fn cost_actual(
        &self,
        asset: &Asset,
        request: &DisposalRequest,
    ) -> Result<FifoMatch, CalcError> {
        validate_request(request)?;
        let lots = self.read_lots(asset).await?;
        engine::match_lots(&lots, request.quantity)
    }

    /// Cost an invoice using the configured split mode.
    pub async fn cost_invoice(
        &self,
        asset: &Asset,
        request: &DisposalRequest,
    ) -> Result<CostedInvoice, CalcError> {
        self.cost_invoice_with_mode(asset, request, self.settings.split_mode)
            .await
    }

    /// Cost an invoice, degrading to the default-margin estimate when lot
    /// history is unavailable or empty.
    pub async fn cost_invoice_with_mode(
        &self,
        asset: &Asset,
        request: &DisposalRequest,
        mode: SplitMode,
    ) -> Result<CostedInvoice, CalcError> {
        validate_request(request)?;

        let (cost, basis, unmatched_quantity) = match self.read_lots(asset).await {
            Ok(lots) if lots.is_empty() => {
                warn!(
                    "No completed lots for {}; estimating cost at default margin {}",
                    asset, self.settings.default_margin_rate
                );
                (
                    self.fallback_cost(request)?,
                    CostBasis::Estimated {
                        reason: EstimateReason::NoLots,
                    },
                    Decimal::zero(),
                )
            }
            Ok(lots) => {
                let matched = engine::match_lots(&lots, request.quantity)?;
                (matched.total_cost, CostBasis::Actual, matched.unmatched_quantity)
            }
            Err(CalcError::DataUnavailable(err)) => {
                warn!(
                    "Lot ledger unavailable for {} ({}); invoice marked estimated",
                    asset, err
                );
                (
                    self.fallback_cost(request)?,
                    CostBasis::Estimated {
                        reason: EstimateReason::LedgerUnavailable,
                    },
                    Decimal::zero(),
                )
            }
            Err(err) => return Err(err),
        };

        let result = engine::split(request.proceeds, cost, self.settings.tax_rate, mode)?;

        info!(
            "Costed {} qty={} proceeds={} cost={} basis={} mode={}",
            asset,
            request.quantity,
            request.proceeds,
            result.total_cost,
            basis.label(),
            mode
        );

        Ok(CostedInvoice {
            asset: asset.clone(),
            request: *request,
            mode,
            result,
            basis,
            unmatched_quantity,
        })
    }

    /// Cost many invoices concurrently. Each item reads its own ledger
    /// snapshot; an invalid item is reported in its entry and the rest proceed.
    pub async fn cost_batch(&self, items: Vec<BatchItem>) -> Vec<BatchEntry> {
        let futures = items.iter().enumerate().map(|(index, item)| async move {
            let mode = item.mode.unwrap_or(self.settings.split_mode);
            let outcome = self
                .cost_invoice_with_mode(&item.asset, &item.request, mode)
                .await;
            if let Err(err) = &outcome {
                warn!("Batch item {} skipped: {}", index, err);
            }
            BatchEntry { index, outcome }
        });

        join_all(futures).await
    }

    fn fallback_cost(&self, request: &DisposalRequest) -> Result<Decimal, CalcError> {
        engine::fallback_cost(request.proceeds, self.settings.default_margin_rate)
    }
}

fn validate_request(request: &DisposalRequest) -> Result<(), CalcError> {
    if request.quantity.is_negative() {
        return Err(CalcError::InvalidInput(format!(
            "quantity must not be negative, got {}",
            request.quantity
        )));
    }
    if request.proceeds.is_negative() {
        return Err(CalcError::InvalidInput(format!(
            "proceeds must not be negative, got {}",
            request.proceeds
        )));
    }
    Ok(())
}
