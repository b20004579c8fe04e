//! Capability traits over the backing store.
//!
//! [`Database`](super::Database) implements all of them against PostgreSQL;
//! tests swap in an in-memory implementation.

use crate::models::{
    DateRange, Hotel, HotelInput, NewReservation, Reschedule, Reservation, ReservationStatus,
    Room, RoomInput,
};
use async_trait::async_trait;
use service_core::error::AppError;
use service_core::utils::Page;
use uuid::Uuid;

/// Outcome of an availability-guarded write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Booked {
    Reserved(Reservation),
    /// An active reservation already holds the room for part of the range.
    Unavailable,
}

#[async_trait]
pub trait HealthCheck: Send + Sync {
    async fn health_check(&self) -> Result<(), AppError>;
}

#[async_trait]
pub trait HotelStore: Send + Sync {
    async fn create_hotel(&self, hotel_id: Uuid, input: &HotelInput) -> Result<Hotel, AppError>;

    async fn get_hotel(&self, hotel_id: Uuid) -> Result<Option<Hotel>, AppError>;

    /// Hotels ordered by id.
    async fn list_hotels(&self, page: Page) -> Result<Vec<Hotel>, AppError>;

    async fn update_hotel(
        &self,
        hotel_id: Uuid,
        input: &HotelInput,
    ) -> Result<Option<Hotel>, AppError>;

    /// `false` when there was no such hotel.
    async fn delete_hotel(&self, hotel_id: Uuid) -> Result<bool, AppError>;
}

#[async_trait]
pub trait RoomStore: Send + Sync {
    async fn create_room(
        &self,
        room_id: Uuid,
        input: &RoomInput,
        created_by: Option<Uuid>,
    ) -> Result<Room, AppError>;

    async fn get_room(&self, room_id: Uuid) -> Result<Option<Room>, AppError>;

    /// Rooms of one hotel ordered by id.
    async fn list_rooms_by_hotel(&self, hotel_id: Uuid, page: Page) -> Result<Vec<Room>, AppError>;

    async fn update_room(
        &self,
        room_id: Uuid,
        input: &RoomInput,
        updated_by: Option<Uuid>,
    ) -> Result<Option<Room>, AppError>;

    async fn delete_room(&self, room_id: Uuid) -> Result<bool, AppError>;

    /// Rooms of `hotel_id` with no active reservation overlapping `range`,
    /// ordered by id.
    async fn available_rooms(&self, hotel_id: Uuid, range: DateRange)
        -> Result<Vec<Room>, AppError>;
}

#[async_trait]
pub trait ReservationStore: Send + Sync {
    async fn get_reservation(&self, reservation_id: Uuid) -> Result<Option<Reservation>, AppError>;

    /// Newest stay first.
    async fn list_reservations_by_user(
        &self,
        user_id: &str,
        page: Page,
    ) -> Result<Vec<Reservation>, AppError>;

    /// Newest stay first.
    async fn list_reservations_by_room(
        &self,
        room_id: Uuid,
        page: Page,
    ) -> Result<Vec<Reservation>, AppError>;

    /// Unconditional insert of a `PENDING` reservation.
    async fn insert_reservation(&self, new: &NewReservation) -> Result<Reservation, AppError>;

    /// Availability check over `hotel_id` and insert as one atomic unit.
    async fn reserve_if_available(
        &self,
        hotel_id: Uuid,
        new: &NewReservation,
    ) -> Result<Booked, AppError>;

    /// Move a reservation to a new room/range if no other active reservation
    /// overlaps it, as one atomic unit. `None` when the reservation is missing
    /// or cancelled.
    async fn reschedule_if_available(
        &self,
        reservation_id: Uuid,
        change: &Reschedule,
    ) -> Result<Option<Booked>, AppError>;

    /// Compare-and-set on status. `None` when the reservation is missing or
    /// its status is no longer `expected`.
    async fn update_status(
        &self,
        reservation_id: Uuid,
        expected: ReservationStatus,
        next: ReservationStatus,
        updated_by: Option<Uuid>,
    ) -> Result<Option<Reservation>, AppError>;
}
