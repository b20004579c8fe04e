use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use service_core::error::AppError;
use service_core::extract::{JsonBody, PathParam};

use crate::dtos::{CreateTransferRequest, TransferDetailsResponse};
use crate::models::TransferResult;
use crate::startup::AppState;

pub async fn create_transfer(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<CreateTransferRequest>,
) -> Result<(StatusCode, Json<TransferResult>), AppError> {
    tracing::info!(
        from_account_id = payload.from_account_id,
        to_account_id = payload.to_account_id,
        amount = payload.amount,
        "Creating transfer"
    );

    let result = state.transfers.transfer(payload.into()).await?;

    Ok((StatusCode::CREATED, Json(result)))
}

pub async fn get_transfer(
    State(state): State<AppState>,
    PathParam(id): PathParam<i64>,
) -> Result<Json<TransferDetailsResponse>, AppError> {
    let transfer = state
        .db
        .get_transfer(id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("transfer {} not found", id)))?;
    let entries = state.db.transfer_entries(id).await?;

    Ok(Json(TransferDetailsResponse { transfer, entries }))
}
