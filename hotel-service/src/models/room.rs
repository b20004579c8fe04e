//! Room model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Room {
    pub room_id: Uuid,
    pub room_name: Option<String>,
    pub hotel_id: Uuid,
    pub floor: Option<i32>,
    pub type_id: Option<String>,
    pub max_capacity: Option<i32>,
    pub rate: Option<f64>,
    pub description: Option<String>,
    pub price: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub updated_at: Option<DateTime<Utc>>,
    pub updated_by: Option<Uuid>,
}

/// Writable room fields, shared by create and update.
#[derive(Debug, Clone, PartialEq)]
pub struct RoomInput {
    pub hotel_id: Uuid,
    pub room_name: Option<String>,
    pub floor: Option<i32>,
    pub type_id: Option<String>,
    pub max_capacity: Option<i32>,
    pub rate: Option<f64>,
    pub description: Option<String>,
    pub price: Option<i32>,
}

impl RoomInput {
    pub fn validate(&self) -> Result<(), AppError> {
        if matches!(self.max_capacity, Some(n) if n <= 0) {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "max capacity must be greater than 0"
            )));
        }
        if matches!(self.price, Some(p) if p < 0) {
            return Err(AppError::BadRequest(anyhow::anyhow!("price cannot be negative")));
        }
        if matches!(self.rate, Some(r) if !(0.0..=5.0).contains(&r)) {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "rate must be between 0 and 5"
            )));
        }
        Ok(())
    }
}
