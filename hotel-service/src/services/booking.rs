//! Booking Engine: room availability, reservation writes and status changes.

use crate::config::ReservationGuard;
use crate::models::{
    DateRange, NewReservation, Reschedule, Reservation, ReservationStatus, Room, StatusChange,
};
use crate::services::catalog::{hotel_not_found, room_not_found};
use crate::services::metrics::{RESERVATIONS_TOTAL, STATUS_TRANSITIONS_TOTAL};
use crate::services::store::{Booked, HotelStore, ReservationStore, RoomStore};
use chrono::{NaiveDate, Utc};
use service_core::error::AppError;
use service_core::utils::Page;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// A request to hold a room for a stay.
#[derive(Debug, Clone)]
pub struct BookingRequest {
    pub room_id: Uuid,
    pub user_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub created_by: Option<Uuid>,
}

/// A request to move an existing reservation.
#[derive(Debug, Clone, Copy)]
pub struct RescheduleRequest {
    pub room_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub updated_by: Option<Uuid>,
}

fn utc_today() -> NaiveDate {
    Utc::now().date_naive()
}

fn room_unavailable() -> AppError {
    AppError::Conflict(anyhow::anyhow!("room is not available for the selected dates"))
}

fn cancelled_reservation() -> AppError {
    AppError::Conflict(anyhow::anyhow!("cannot update cancelled reservation"))
}

fn reservation_not_found() -> AppError {
    AppError::NotFound(anyhow::anyhow!("reservation not found"))
}

fn outcome_label(err: &AppError) -> &'static str {
    match err.root() {
        AppError::BadRequest(_) | AppError::ValidationError(_) => "rejected",
        AppError::NotFound(_) => "not_found",
        AppError::Conflict(_) => "conflict",
        _ => "error",
    }
}

#[derive(Clone)]
pub struct BookingEngine {
    hotels: Arc<dyn HotelStore>,
    rooms: Arc<dyn RoomStore>,
    reservations: Arc<dyn ReservationStore>,
    guard: ReservationGuard,
    today: fn() -> NaiveDate,
}

impl BookingEngine {
    pub fn new(
        hotels: Arc<dyn HotelStore>,
        rooms: Arc<dyn RoomStore>,
        reservations: Arc<dyn ReservationStore>,
        guard: ReservationGuard,
    ) -> Self {
        Self {
            hotels,
            rooms,
            reservations,
            guard,
            today: utc_today,
        }
    }

    /// Replace the source of "today" used for past-date checks.
    pub fn with_clock(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// A stay that starts today or later and ends after it starts.
    fn stay(&self, check_in: NaiveDate, check_out: NaiveDate) -> Result<DateRange, AppError> {
        let range = DateRange::new(check_in, check_out).ok_or_else(|| {
            AppError::BadRequest(anyhow::anyhow!(
                "invalid date range: check-in must be before check-out"
            ))
        })?;
        if range.start < (self.today)() {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "check-in date cannot be in the past"
            )));
        }
        Ok(range)
    }

    /// Rooms of a hotel free for every night of `[check_in, check_out)`, by id.
    #[instrument(skip(self))]
    pub async fn available_rooms(
        &self,
        hotel_id: Uuid,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> Result<Vec<Room>, AppError> {
        let range = self.stay(check_in, check_out)?;
        if self.hotels.get_hotel(hotel_id).await?.is_none() {
            return Err(hotel_not_found());
        }
        self.rooms.available_rooms(hotel_id, range).await
    }

    /// Create a `PENDING` reservation if the room is free for the whole stay.
    #[instrument(skip(self, request), fields(room_id = %request.room_id, guard = %self.guard))]
    pub async fn create_reservation(&self, request: BookingRequest) -> Result<Reservation, AppError> {
        let result = self.try_create(request).await;

        match &result {
            Ok(reservation) => {
                RESERVATIONS_TOTAL
                    .with_label_values(&[self.guard.as_str(), "created"])
                    .inc();
                info!(reservation_id = %reservation.reservation_id, "Reservation created");
            }
            Err(e) => {
                RESERVATIONS_TOTAL
                    .with_label_values(&[self.guard.as_str(), outcome_label(e)])
                    .inc();
                warn!(error = %e, "Reservation rejected");
            }
        }

        result
    }

    async fn try_create(&self, request: BookingRequest) -> Result<Reservation, AppError> {
        let range = self.stay(request.start_date, request.end_date)?;
        if request.user_id.trim().is_empty() {
            return Err(AppError::BadRequest(anyhow::anyhow!("user_id is required")));
        }

        let room = self
            .rooms
            .get_room(request.room_id)
            .await?
            .ok_or_else(room_not_found)?;

        let new = NewReservation {
            reservation_id: Uuid::new_v4(),
            room_id: room.room_id,
            user_id: request.user_id,
            range,
            created_by: request.created_by,
        };

        let booked = match self.guard {
            ReservationGuard::CheckThenInsert => {
                let available = self.rooms.available_rooms(room.hotel_id, range).await?;
                if available.iter().any(|r| r.room_id == room.room_id) {
                    Booked::Reserved(self.reservations.insert_reservation(&new).await?)
                } else {
                    Booked::Unavailable
                }
            }
            ReservationGuard::Serializable => {
                self.reservations
                    .reserve_if_available(room.hotel_id, &new)
                    .await?
            }
        };

        match booked {
            Booked::Reserved(reservation) => Ok(reservation),
            Booked::Unavailable => Err(room_unavailable()),
        }
    }

    pub async fn get_reservation(&self, reservation_id: Uuid) -> Result<Reservation, AppError> {
        self.reservations
            .get_reservation(reservation_id)
            .await?
            .ok_or_else(reservation_not_found)
    }

    pub async fn list_by_user(&self, user_id: &str, page: Page) -> Result<Vec<Reservation>, AppError> {
        self.reservations.list_reservations_by_user(user_id, page).await
    }

    pub async fn list_by_room(&self, room_id: Uuid, page: Page) -> Result<Vec<Reservation>, AppError> {
        if self.rooms.get_room(room_id).await?.is_none() {
            return Err(room_not_found());
        }
        self.reservations.list_reservations_by_room(room_id, page).await
    }

    /// Move a reservation to new dates and/or room. Status is left unchanged.
    #[instrument(skip(self, request))]
    pub async fn update_reservation(
        &self,
        reservation_id: Uuid,
        request: RescheduleRequest,
    ) -> Result<Reservation, AppError> {
        let existing = self.get_reservation(reservation_id).await?;
        if existing.parsed_status()? == ReservationStatus::Cancelled {
            return Err(cancelled_reservation());
        }

        let range = DateRange::new(request.start_date, request.end_date).ok_or_else(|| {
            AppError::BadRequest(anyhow::anyhow!(
                "invalid date range: start date must be before end date"
            ))
        })?;
        if range.start < (self.today)() {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "start date cannot be in the past"
            )));
        }
        if self.rooms.get_room(request.room_id).await?.is_none() {
            return Err(room_not_found());
        }

        let change = Reschedule {
            room_id: request.room_id,
            range,
            updated_by: request.updated_by,
        };
        match self
            .reservations
            .reschedule_if_available(reservation_id, &change)
            .await?
        {
            Some(Booked::Reserved(reservation)) => {
                info!(reservation_id = %reservation_id, "Reservation updated");
                Ok(reservation)
            }
            Some(Booked::Unavailable) => Err(room_unavailable()),
            // Cancelled between the read above and the write.
            None => Err(cancelled_reservation()),
        }
    }

    /// Apply a status change guarded by the reservation state machine.
    #[instrument(skip(self))]
    pub async fn change_status(
        &self,
        reservation_id: Uuid,
        change: StatusChange,
        updated_by: Option<Uuid>,
    ) -> Result<Reservation, AppError> {
        let current = self.get_reservation(reservation_id).await?;
        let from = current.parsed_status()?;
        let next = change.apply(from)?;

        let updated = self
            .reservations
            .update_status(reservation_id, from, next, updated_by)
            .await?
            .ok_or_else(|| {
                AppError::Conflict(anyhow::anyhow!(
                    "reservation status changed concurrently, retry the request"
                ))
            })?;

        STATUS_TRANSITIONS_TOTAL
            .with_label_values(&[from.as_str(), next.as_str()])
            .inc();
        info!(
            reservation_id = %reservation_id,
            change = change.as_str(),
            from = %from,
            to = %next,
            "Reservation status changed"
        );

        Ok(updated)
    }

    pub async fn confirm(
        &self,
        reservation_id: Uuid,
        updated_by: Option<Uuid>,
    ) -> Result<Reservation, AppError> {
        self.change_status(reservation_id, StatusChange::Confirm, updated_by)
            .await
    }

    pub async fn cancel(
        &self,
        reservation_id: Uuid,
        updated_by: Option<Uuid>,
    ) -> Result<Reservation, AppError> {
        self.change_status(reservation_id, StatusChange::Cancel, updated_by)
            .await
    }
}
