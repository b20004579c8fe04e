//! Panic recovery for HTTP handlers.
//!
//! Used with `tower_http::catch_panic::CatchPanicLayer::custom(panic_response)`
//! so a panicking handler still answers with the `AppError` JSON body.

use std::any::Any;

use axum::response::{IntoResponse, Response};

use crate::error::AppError;

/// Log the panic payload and render it as a 500 `{"error": ...}` response.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else {
        "non-string panic payload".to_string()
    };

    tracing::error!(panic = %detail, "Request handler panicked");
    AppError::InternalError(anyhow::anyhow!("handler panicked: {}", detail)).into_response()
}
