//! Hotel model.

use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Hotel {
    pub hotel_id: Uuid,
    pub destination_id: Option<Uuid>,
    pub type_id: Option<String>,
    pub total_room: Option<i32>,
    pub rating: Option<f64>,
}

/// Writable hotel fields, shared by create and update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HotelInput {
    pub destination_id: Option<Uuid>,
    pub type_id: Option<String>,
    pub total_room: Option<i32>,
    pub rating: Option<f64>,
}

impl HotelInput {
    pub fn validate(&self) -> Result<(), AppError> {
        if matches!(self.total_room, Some(n) if n < 0) {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "total room cannot be negative"
            )));
        }
        if matches!(self.rating, Some(r) if !(0.0..=5.0).contains(&r)) {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "rating must be between 0 and 5"
            )));
        }
        Ok(())
    }

    pub fn into_hotel(self, hotel_id: Uuid) -> Hotel {
        Hotel {
            hotel_id,
            destination_id: self.destination_id,
            type_id: self.type_id,
            total_room: self.total_room,
            rating: self.rating,
        }
    }
}
