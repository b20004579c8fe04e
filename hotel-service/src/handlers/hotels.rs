use axum::{extract::State, http::StatusCode, Json};
use service_core::error::AppError;
use service_core::extract::{JsonBody, PathParam, QueryParams};
use service_core::utils::PageParams;
use uuid::Uuid;
use validator::Validate;

use crate::dtos::{HotelRequest, ListResponse, MessageResponse};
use crate::models::Hotel;
use crate::startup::AppState;

pub async fn create_hotel(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<HotelRequest>,
) -> Result<(StatusCode, Json<Hotel>), AppError> {
    payload.validate()?;
    let hotel = state.hotels.create_hotel(payload.into()).await?;

    Ok((StatusCode::CREATED, Json(hotel)))
}

pub async fn get_hotel(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
) -> Result<Json<Hotel>, AppError> {
    Ok(Json(state.hotels.get_hotel(id).await?))
}

pub async fn list_hotels(
    State(state): State<AppState>,
    QueryParams(params): QueryParams<PageParams>,
) -> Result<Json<ListResponse<Hotel>>, AppError> {
    let page = params.resolve();
    let hotels = state.hotels.list_hotels(page).await?;

    Ok(Json(ListResponse::new(hotels, page)))
}

pub async fn update_hotel(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
    JsonBody(payload): JsonBody<HotelRequest>,
) -> Result<Json<Hotel>, AppError> {
    payload.validate()?;
    let hotel = state.hotels.update_hotel(id, payload.into()).await?;

    Ok(Json(hotel))
}

pub async fn delete_hotel(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    state.hotels.delete_hotel(id).await?;

    Ok(Json(MessageResponse {
        message: "hotel deleted successfully",
    }))
}
