use axum::{extract::State, http::StatusCode, Json};
use service_core::error::AppError;
use service_core::extract::{JsonBody, PathParam, QueryParams};
use service_core::utils::PageParams;
use uuid::Uuid;
use validator::Validate;

use crate::dtos::{
    CreateReservationRequest, RoomReservationsResponse, UpdateReservationRequest,
    UpdateStatusRequest, UserReservationsResponse,
};
use crate::models::{Reservation, StatusChange};
use crate::startup::AppState;

pub async fn create_reservation(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<CreateReservationRequest>,
) -> Result<(StatusCode, Json<Reservation>), AppError> {
    payload.validate()?;
    let reservation = state.bookings.create_reservation(payload.into()).await?;

    Ok((StatusCode::CREATED, Json(reservation)))
}

pub async fn get_reservation(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
) -> Result<Json<Reservation>, AppError> {
    Ok(Json(state.bookings.get_reservation(id).await?))
}

pub async fn list_by_user(
    State(state): State<AppState>,
    PathParam(user_id): PathParam<String>,
    QueryParams(params): QueryParams<PageParams>,
) -> Result<Json<UserReservationsResponse>, AppError> {
    let page = params.resolve();
    let reservations = state.bookings.list_by_user(&user_id, page).await?;

    Ok(Json(UserReservationsResponse {
        data: reservations,
        user_id,
        page: page.page,
        page_size: page.page_size,
    }))
}

pub async fn list_by_room(
    State(state): State<AppState>,
    PathParam(room_id): PathParam<Uuid>,
    QueryParams(params): QueryParams<PageParams>,
) -> Result<Json<RoomReservationsResponse>, AppError> {
    let page = params.resolve();
    let reservations = state.bookings.list_by_room(room_id, page).await?;

    Ok(Json(RoomReservationsResponse {
        data: reservations,
        room_id,
        page: page.page,
        page_size: page.page_size,
    }))
}

pub async fn update_reservation(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
    JsonBody(payload): JsonBody<UpdateReservationRequest>,
) -> Result<Json<Reservation>, AppError> {
    let reservation = state
        .bookings
        .update_reservation(id, payload.into())
        .await?;

    Ok(Json(reservation))
}

pub async fn update_status(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
    JsonBody(payload): JsonBody<UpdateStatusRequest>,
) -> Result<Json<Reservation>, AppError> {
    let change = StatusChange::from_target(&payload.status)?;
    let reservation = state
        .bookings
        .change_status(id, change, payload.updated_by)
        .await?;

    Ok(Json(reservation))
}

/// Soft delete: the reservation is cancelled, never removed.
pub async fn cancel_reservation(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
) -> Result<Json<Reservation>, AppError> {
    Ok(Json(state.bookings.cancel(id, None).await?))
}
