use axum::{extract::State, http::StatusCode, Json};
use service_core::error::AppError;
use service_core::extract::{JsonBody, PathParam, QueryParams};
use service_core::utils::PageParams;
use uuid::Uuid;
use validator::Validate;

use crate::dtos::{
    AvailabilityQuery, AvailabilityResponse, HotelRoomsResponse, MessageResponse, RoomRequest,
};
use crate::models::Room;
use crate::startup::AppState;

pub async fn create_room(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<RoomRequest>,
) -> Result<(StatusCode, Json<Room>), AppError> {
    payload.validate()?;
    let room = state
        .rooms
        .create_room(payload.input(), payload.created_by)
        .await?;

    Ok((StatusCode::CREATED, Json(room)))
}

pub async fn get_room(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
) -> Result<Json<Room>, AppError> {
    Ok(Json(state.rooms.get_room(id).await?))
}

pub async fn list_rooms_by_hotel(
    State(state): State<AppState>,
    PathParam(hotel_id): PathParam<Uuid>,
    QueryParams(params): QueryParams<PageParams>,
) -> Result<Json<HotelRoomsResponse>, AppError> {
    let page = params.resolve();
    let rooms = state.rooms.list_rooms_by_hotel(hotel_id, page).await?;

    Ok(Json(HotelRoomsResponse {
        data: rooms,
        hotel_id,
        page: page.page,
        page_size: page.page_size,
    }))
}

pub async fn available_rooms(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<AvailabilityQuery>,
) -> Result<Json<AvailabilityResponse>, AppError> {
    let (check_in, check_out) = query.dates()?;
    let rooms = state
        .bookings
        .available_rooms(query.hotel_id, check_in, check_out)
        .await?;

    Ok(Json(AvailabilityResponse {
        data: rooms,
        hotel_id: query.hotel_id,
        check_in,
        check_out,
    }))
}

pub async fn update_room(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
    JsonBody(payload): JsonBody<RoomRequest>,
) -> Result<Json<Room>, AppError> {
    payload.validate()?;
    let room = state
        .rooms
        .update_room(id, payload.input(), payload.updated_by)
        .await?;

    Ok(Json(room))
}

pub async fn delete_room(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    state.rooms.delete_room(id).await?;

    Ok(Json(MessageResponse {
        message: "room deleted successfully",
    }))
}
