//! Hotel and room management.

use crate::models::{Hotel, HotelInput, Room, RoomInput};
use crate::services::store::{HotelStore, RoomStore};
use service_core::error::AppError;
use service_core::utils::Page;
use std::sync::Arc;
use uuid::Uuid;

pub(crate) fn hotel_not_found() -> AppError {
    AppError::NotFound(anyhow::anyhow!("hotel not found"))
}

pub(crate) fn room_not_found() -> AppError {
    AppError::NotFound(anyhow::anyhow!("room not found"))
}

#[derive(Clone)]
pub struct HotelService {
    hotels: Arc<dyn HotelStore>,
}

impl HotelService {
    pub fn new(hotels: Arc<dyn HotelStore>) -> Self {
        Self { hotels }
    }

    pub async fn create_hotel(&self, input: HotelInput) -> Result<Hotel, AppError> {
        input.validate()?;
        self.hotels.create_hotel(Uuid::new_v4(), &input).await
    }

    pub async fn get_hotel(&self, hotel_id: Uuid) -> Result<Hotel, AppError> {
        self.hotels
            .get_hotel(hotel_id)
            .await?
            .ok_or_else(hotel_not_found)
    }

    pub async fn list_hotels(&self, page: Page) -> Result<Vec<Hotel>, AppError> {
        self.hotels.list_hotels(page).await
    }

    pub async fn update_hotel(&self, hotel_id: Uuid, input: HotelInput) -> Result<Hotel, AppError> {
        input.validate()?;
        self.hotels
            .update_hotel(hotel_id, &input)
            .await?
            .ok_or_else(hotel_not_found)
    }

    /// Fails with a conflict while the hotel still has rooms.
    pub async fn delete_hotel(&self, hotel_id: Uuid) -> Result<(), AppError> {
        if self.hotels.delete_hotel(hotel_id).await? {
            tracing::info!(hotel_id = %hotel_id, "Hotel deleted");
            Ok(())
        } else {
            Err(hotel_not_found())
        }
    }
}

#[derive(Clone)]
pub struct RoomService {
    rooms: Arc<dyn RoomStore>,
    hotels: Arc<dyn HotelStore>,
}

impl RoomService {
    pub fn new(rooms: Arc<dyn RoomStore>, hotels: Arc<dyn HotelStore>) -> Self {
        Self { rooms, hotels }
    }

    async fn require_hotel(&self, hotel_id: Uuid) -> Result<(), AppError> {
        match self.hotels.get_hotel(hotel_id).await? {
            Some(_) => Ok(()),
            None => Err(hotel_not_found()),
        }
    }

    pub async fn create_room(
        &self,
        input: RoomInput,
        created_by: Option<Uuid>,
    ) -> Result<Room, AppError> {
        self.require_hotel(input.hotel_id).await?;
        input.validate()?;
        self.rooms
            .create_room(Uuid::new_v4(), &input, created_by)
            .await
    }

    pub async fn get_room(&self, room_id: Uuid) -> Result<Room, AppError> {
        self.rooms.get_room(room_id).await?.ok_or_else(room_not_found)
    }

    pub async fn list_rooms_by_hotel(
        &self,
        hotel_id: Uuid,
        page: Page,
    ) -> Result<Vec<Room>, AppError> {
        self.require_hotel(hotel_id).await?;
        self.rooms.list_rooms_by_hotel(hotel_id, page).await
    }

    pub async fn update_room(
        &self,
        room_id: Uuid,
        input: RoomInput,
        updated_by: Option<Uuid>,
    ) -> Result<Room, AppError> {
        if self.rooms.get_room(room_id).await?.is_none() {
            return Err(room_not_found());
        }
        input.validate()?;
        self.require_hotel(input.hotel_id).await?;

        self.rooms
            .update_room(room_id, &input, updated_by)
            .await?
            .ok_or_else(room_not_found)
    }

    /// Fails with a conflict while reservations still reference the room.
    pub async fn delete_room(&self, room_id: Uuid) -> Result<(), AppError> {
        if self.rooms.delete_room(room_id).await? {
            tracing::info!(room_id = %room_id, "Room deleted");
            Ok(())
        } else {
            Err(room_not_found())
        }
    }
}
