//! Services for bank-service.

pub mod database;
pub mod metrics;
pub mod queries;
pub mod transfer;

pub use database::Database;
pub use metrics::{get_metrics, init_metrics};
pub use transfer::TransferEngine;
