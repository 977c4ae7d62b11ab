pub mod health;
pub mod invoices;
pub mod lots;
pub mod purchases;

use crate::config::Config;
use crate::db::Repository;
use crate::invoicing::InvoiceCalculator;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub config: Config,
    pub calculator: Arc<InvoiceCalculator>,
}

impl AppState {
    /// Build state whose calculator reads lots from `repo`.
    pub fn new(repo: Arc<Repository>, config: Config) -> Self {
        let calculator = Arc::new(InvoiceCalculator::new(
            repo.clone(),
            config.pricing.clone(),
        ));
        Self {
            repo,
            config,
            calculator,
        }
    }

    /// Build state with an explicit calculator, e.g. over a different ledger.
    pub fn with_calculator(
        repo: Arc<Repository>,
        config: Config,
        calculator: Arc<InvoiceCalculator>,
    ) -> Self {
        Self {
            repo,
            config,
            calculator,
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route("/v1/purchase-orders", post(purchases::create_purchase_order))
        .route(
            "/v1/purchase-orders/import",
            post(purchases::import_purchase_orders),
        )
        .route(
            "/v1/purchase-orders/:order_key/status",
            post(purchases::update_purchase_status),
        )
        .route("/v1/lots", get(lots::get_lots))
        .route("/v1/invoices", post(invoices::create_invoice))
        .route("/v1/invoices/batch", post(invoices::create_invoice_batch))
        .layer(cors)
        .with_state(state)
}
