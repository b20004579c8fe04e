//! service-core: Shared infrastructure for the bank and hotel services.
pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod grpc;
pub mod middleware;
pub mod observability;
pub mod shutdown;
pub mod utils;

pub use axum;
pub use serde;
pub use serde_json;
pub use sqlx;
pub use tokio;
pub use tonic;
pub use tracing;
pub use validator;
