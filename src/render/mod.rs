//! Invoice rendering: the formatting boundary for costed invoices.
//!
//! All rounding happens here. Monetary fields are fixed to two places;
//! quantities keep their full canonical precision.

pub mod words;

use crate::config::Currency;
use crate::invoicing::{CostBasis, CostedInvoice};
use serde::Serialize;

pub use words::{amount_in_words, integer_in_words};

/// Display-ready invoice figures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceDocument {
    pub asset: String,
    pub quantity: String,
    pub currency: String,
    pub proceeds: String,
    pub total_cost: String,
    pub service_charges: String,
    pub taxable_value: String,
    pub tax_amount: String,
    pub total_amount: String,
    pub amount_in_words: String,
    pub split_mode: String,
    pub basis: CostBasis,
    /// Quantity not covered by lot history; omitted when fully matched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unmatched_quantity: Option<String>,
}

impl InvoiceDocument {
    pub fn render(invoice: &CostedInvoice, currency: Currency) -> Self {
        let r = &invoice.result;
        InvoiceDocument {
            asset: invoice.asset.to_string(),
            quantity: invoice.request.quantity.to_canonical_string(),
            currency: currency.code().to_string(),
            proceeds: invoice.request.proceeds.to_fixed(2),
            total_cost: r.total_cost.to_fixed(2),
            service_charges: r.service_charges.to_fixed(2),
            taxable_value: r.taxable_value.to_fixed(2),
            tax_amount: r.tax_amount.to_fixed(2),
            total_amount: r.total_amount.to_fixed(2),
            amount_in_words: amount_in_words(r.total_amount, currency),
            split_mode: invoice.mode.to_string(),
            basis: invoice.basis.clone(),
            unmatched_quantity: (!invoice.unmatched_quantity.is_zero())
                .then(|| invoice.unmatched_quantity.to_canonical_string()),
        }
    }
}
