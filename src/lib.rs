pub mod api;
pub mod config;
pub mod db;
pub mod domain;
pub mod engine;
pub mod error;
pub mod invoicing;
pub mod ledger;
pub mod render;

pub use config::{Config, PricingSettings};
pub use db::{init_db, Repository};
pub use domain::{AcquisitionLot, Asset, Decimal, DisposalRequest, OrderStatus, PurchaseOrder, TimeMs};
pub use engine::{consume, fallback_cost, match_lots, split, CalcError, FifoMatch, FifoResult, SplitMode};
pub use error::AppError;
pub use invoicing::{CostBasis, CostedInvoice, EstimateReason, InvoiceCalculator};
pub use ledger::{LedgerError, LotLedger, MockLotLedger};
pub use render::InvoiceDocument;
