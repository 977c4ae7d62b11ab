//! Domain types for FIFO cost-basis invoicing.
//!
//! This module provides:
//! - Lossless numeric handling via Decimal wrapper
//! - Domain primitives: TimeMs, Asset, OrderStatus
//! - Acquisition lots, disposal requests and purchase orders

pub mod decimal;
pub mod lot;
pub mod primitives;
pub mod purchase;

pub use decimal::Decimal;
pub use lot::{sort_fifo, AcquisitionLot, DisposalRequest};
pub use primitives::{Asset, OrderStatus, OrderStatusParseError, TimeMs};
pub use purchase::PurchaseOrder;
