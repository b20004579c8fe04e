use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use service_core::error::AppError;
use service_core::extract::{JsonBody, PathParam, QueryParams};
use service_core::utils::PageParams;
use validator::Validate;

use crate::dtos::{CreateAccountRequest, ListResponse};
use crate::models::{Account, CreateAccount, Entry};
use crate::startup::AppState;

pub async fn create_account(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<CreateAccountRequest>,
) -> Result<(StatusCode, Json<Account>), AppError> {
    payload.validate()?;
    let input = CreateAccount::parse(&payload.owner, &payload.currency)?;

    tracing::info!(owner = %input.owner, currency = %input.currency, "Creating account");

    let account = state.db.create_account(&input).await?;

    Ok((StatusCode::CREATED, Json(account)))
}

pub async fn get_account(
    State(state): State<AppState>,
    PathParam(id): PathParam<i64>,
) -> Result<Json<Account>, AppError> {
    let account = state
        .db
        .get_account(id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("account {} not found", id)))?;

    Ok(Json(account))
}

pub async fn list_accounts(
    State(state): State<AppState>,
    QueryParams(params): QueryParams<PageParams>,
) -> Result<Json<ListResponse<Account>>, AppError> {
    let page = params.resolve();
    let accounts = state.db.list_accounts(page).await?;

    Ok(Json(ListResponse::new(accounts, page)))
}

pub async fn list_entries(
    State(state): State<AppState>,
    PathParam(id): PathParam<i64>,
    QueryParams(params): QueryParams<PageParams>,
) -> Result<Json<ListResponse<Entry>>, AppError> {
    if state.db.get_account(id).await?.is_none() {
        return Err(AppError::NotFound(anyhow::anyhow!("account {} not found", id)));
    }

    let page = params.resolve();
    let entries = state.db.list_entries(id, page).await?;

    Ok(Json(ListResponse::new(entries, page)))
}
