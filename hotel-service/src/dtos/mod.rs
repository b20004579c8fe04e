//! HTTP request and response bodies.

use crate::models::{HotelInput, Reservation, Room, RoomInput};
use crate::services::{BookingRequest, RescheduleRequest};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use service_core::utils::Page;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct HotelRequest {
    pub destination_id: Option<Uuid>,
    #[validate(length(max = 50, message = "type_id must be at most 50 characters"))]
    pub type_id: Option<String>,
    pub total_room: Option<i32>,
    pub rating: Option<f64>,
}

impl From<HotelRequest> for HotelInput {
    fn from(req: HotelRequest) -> Self {
        Self {
            destination_id: req.destination_id,
            type_id: req.type_id,
            total_room: req.total_room,
            rating: req.rating,
        }
    }
}

/// Body of `POST /rooms` and `PUT /rooms/:id`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RoomRequest {
    pub hotel_id: Uuid,
    #[validate(length(max = 255, message = "room_name must be at most 255 characters"))]
    pub room_name: Option<String>,
    pub floor: Option<i32>,
    #[validate(length(max = 50, message = "type_id must be at most 50 characters"))]
    pub type_id: Option<String>,
    pub max_capacity: Option<i32>,
    pub rate: Option<f64>,
    pub description: Option<String>,
    pub price: Option<i32>,
    pub created_by: Option<Uuid>,
    pub updated_by: Option<Uuid>,
}

impl RoomRequest {
    pub fn input(&self) -> RoomInput {
        RoomInput {
            hotel_id: self.hotel_id,
            room_name: self.room_name.clone(),
            floor: self.floor,
            type_id: self.type_id.clone(),
            max_capacity: self.max_capacity,
            rate: self.rate,
            description: self.description.clone(),
            price: self.price,
        }
    }
}

/// Query of `GET /rooms/available`. Dates stay strings so a bad format gets
/// its own message.
#[derive(Debug, Clone, Deserialize)]
pub struct AvailabilityQuery {
    pub hotel_id: Uuid,
    pub check_in: String,
    pub check_out: String,
}

impl AvailabilityQuery {
    pub fn dates(&self) -> Result<(NaiveDate, NaiveDate), AppError> {
        Ok((
            parse_date("check_in", &self.check_in)?,
            parse_date("check_out", &self.check_out)?,
        ))
    }
}

/// Parse a `YYYY-MM-DD` calendar date.
pub fn parse_date(field: &str, value: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        AppError::BadRequest(anyhow::anyhow!(
            "invalid {} date format, use YYYY-MM-DD",
            field
        ))
    })
}

#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    pub data: Vec<Room>,
    pub hotel_id: Uuid,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateReservationRequest {
    pub room_id: Uuid,
    #[validate(length(min = 1, max = 255, message = "user_id must be between 1 and 255 characters"))]
    pub user_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub created_by: Option<Uuid>,
}

impl From<CreateReservationRequest> for BookingRequest {
    fn from(req: CreateReservationRequest) -> Self {
        Self {
            room_id: req.room_id,
            user_id: req.user_id,
            start_date: req.start_date,
            end_date: req.end_date,
            created_by: req.created_by,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct UpdateReservationRequest {
    pub room_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub updated_by: Option<Uuid>,
}

impl From<UpdateReservationRequest> for RescheduleRequest {
    fn from(req: UpdateReservationRequest) -> Self {
        Self {
            room_id: req.room_id,
            start_date: req.start_date,
            end_date: req.end_date,
            updated_by: req.updated_by,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
    pub updated_by: Option<Uuid>,
}

/// One page of a list endpoint.
#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    pub data: Vec<T>,
    pub page: i64,
    pub page_size: i64,
}

impl<T> ListResponse<T> {
    pub fn new(data: Vec<T>, page: Page) -> Self {
        Self {
            data,
            page: page.page,
            page_size: page.page_size,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HotelRoomsResponse {
    pub data: Vec<Room>,
    pub hotel_id: Uuid,
    pub page: i64,
    pub page_size: i64,
}

#[derive(Debug, Serialize)]
pub struct UserReservationsResponse {
    pub data: Vec<Reservation>,
    pub user_id: String,
    pub page: i64,
    pub page_size: i64,
}

#[derive(Debug, Serialize)]
pub struct RoomReservationsResponse {
    pub data: Vec<Reservation>,
    pub room_id: Uuid,
    pub page: i64,
    pub page_size: i64,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}
