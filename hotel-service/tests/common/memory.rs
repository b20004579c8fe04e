//! In-memory implementation of the hotel stores.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use hotel_service::models::{
    DateRange, Hotel, HotelInput, NewReservation, Reschedule, Reservation, ReservationStatus,
    Room, RoomInput,
};
use hotel_service::services::{Booked, HealthCheck, HotelStore, ReservationStore, RoomStore};
use service_core::error::AppError;
use service_core::utils::Page;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::Barrier;
use uuid::Uuid;

#[derive(Default)]
struct Tables {
    hotels: BTreeMap<Uuid, Hotel>,
    rooms: BTreeMap<Uuid, Room>,
    reservations: Vec<Reservation>,
}

impl Tables {
    fn room_is_free(&self, room_id: Uuid, range: DateRange, excluding: Option<Uuid>) -> bool {
        !self.reservations.iter().any(|r| {
            r.room_id == room_id
                && Some(r.reservation_id) != excluding
                && r.status != ReservationStatus::Cancelled.as_str()
                && r.range().overlaps(&range)
        })
    }

    fn available_rooms(&self, hotel_id: Uuid, range: DateRange) -> Vec<Room> {
        self.rooms
            .values()
            .filter(|room| room.hotel_id == hotel_id)
            .filter(|room| self.room_is_free(room.room_id, range, None))
            .cloned()
            .collect()
    }

    fn insert(&mut self, new: &NewReservation) -> Reservation {
        let reservation = row(new, ReservationStatus::Pending);
        self.reservations.push(reservation.clone());
        reservation
    }
}

fn row(new: &NewReservation, status: ReservationStatus) -> Reservation {
    Reservation {
        reservation_id: new.reservation_id,
        room_id: new.room_id,
        user_id: new.user_id.clone(),
        start_date: new.range.start,
        end_date: new.range.end,
        status: status.as_str().to_string(),
        created_at: Utc::now(),
        created_by: new.created_by,
        updated_at: None,
        updated_by: None,
    }
}

fn page_of<T>(items: impl Iterator<Item = T>, page: Page) -> Vec<T> {
    items
        .skip(page.offset() as usize)
        .take(page.limit() as usize)
        .collect()
}

fn newest_stay_first(mut reservations: Vec<Reservation>) -> Vec<Reservation> {
    reservations.sort_by(|a, b| {
        b.start_date
            .cmp(&a.start_date)
            .then(a.reservation_id.cmp(&b.reservation_id))
    });
    reservations
}

pub struct MemoryStore {
    tables: Mutex<Tables>,
    healthy: AtomicBool,
    /// Makes `list_hotels` panic, to exercise panic recovery.
    panic_on_list: AtomicBool,
    /// Held between reading availability and returning it, so concurrent
    /// check-then-insert bookings all observe the same free room.
    availability_gate: Option<Arc<Barrier>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self {
            tables: Mutex::new(Tables::default()),
            healthy: AtomicBool::new(true),
            panic_on_list: AtomicBool::new(false),
            availability_gate: None,
        }
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `available_rooms` call waits until `callers` of them have read.
    pub fn with_availability_gate(callers: usize) -> Self {
        Self {
            availability_gate: Some(Arc::new(Barrier::new(callers))),
            ..Self::default()
        }
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().expect("memory store poisoned")
    }

    pub fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::SeqCst);
    }

    pub fn panic_on_hotel_list(&self) {
        self.panic_on_list.store(true, Ordering::SeqCst);
    }

    pub fn seed_hotel(&self) -> Uuid {
        let hotel_id = Uuid::new_v4();
        let hotel = HotelInput::default().into_hotel(hotel_id);
        self.tables().hotels.insert(hotel_id, hotel);
        hotel_id
    }

    pub fn seed_room(&self, hotel_id: Uuid) -> Uuid {
        let room_id = Uuid::new_v4();
        let room = Room {
            room_id,
            room_name: Some(format!("room-{}", &room_id.to_string()[..8])),
            hotel_id,
            floor: Some(1),
            type_id: None,
            max_capacity: Some(2),
            rate: Some(4.0),
            description: None,
            price: Some(100),
            created_at: Utc::now(),
            created_by: None,
            updated_at: None,
            updated_by: None,
        };
        self.tables().rooms.insert(room_id, room);
        room_id
    }

    pub fn seed_reservation(
        &self,
        room_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
        status: ReservationStatus,
    ) -> Uuid {
        let reservation_id = Uuid::new_v4();
        let new = NewReservation {
            reservation_id,
            room_id,
            user_id: "seed-user".to_string(),
            range: DateRange { start, end },
            created_by: None,
        };
        self.tables().reservations.push(row(&new, status));
        reservation_id
    }

    /// Active reservations of a room.
    pub fn active_on(&self, room_id: Uuid) -> Vec<Reservation> {
        self.tables()
            .reservations
            .iter()
            .filter(|r| r.room_id == room_id && r.status != "CANCELLED")
            .cloned()
            .collect()
    }
}

#[async_trait]
impl HealthCheck for MemoryStore {
    async fn health_check(&self) -> Result<(), AppError> {
        if self.healthy.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(AppError::DatabaseError(anyhow::anyhow!("store unavailable")))
        }
    }
}

#[async_trait]
impl HotelStore for MemoryStore {
    async fn create_hotel(&self, hotel_id: Uuid, input: &HotelInput) -> Result<Hotel, AppError> {
        let hotel = input.clone().into_hotel(hotel_id);
        self.tables().hotels.insert(hotel_id, hotel.clone());
        Ok(hotel)
    }

    async fn get_hotel(&self, hotel_id: Uuid) -> Result<Option<Hotel>, AppError> {
        Ok(self.tables().hotels.get(&hotel_id).cloned())
    }

    async fn list_hotels(&self, page: Page) -> Result<Vec<Hotel>, AppError> {
        if self.panic_on_list.load(Ordering::SeqCst) {
            panic!("hotel table corrupted");
        }
        Ok(page_of(self.tables().hotels.values().cloned(), page))
    }

    async fn update_hotel(
        &self,
        hotel_id: Uuid,
        input: &HotelInput,
    ) -> Result<Option<Hotel>, AppError> {
        let mut tables = self.tables();
        Ok(tables.hotels.get_mut(&hotel_id).map(|hotel| {
            *hotel = input.clone().into_hotel(hotel_id);
            hotel.clone()
        }))
    }

    async fn delete_hotel(&self, hotel_id: Uuid) -> Result<bool, AppError> {
        let mut tables = self.tables();
        if tables.rooms.values().any(|room| room.hotel_id == hotel_id) {
            return Err(AppError::Conflict(anyhow::anyhow!(
                "delete hotel: referenced record is missing or still in use"
            )));
        }
        Ok(tables.hotels.remove(&hotel_id).is_some())
    }
}

#[async_trait]
impl RoomStore for MemoryStore {
    async fn create_room(
        &self,
        room_id: Uuid,
        input: &RoomInput,
        created_by: Option<Uuid>,
    ) -> Result<Room, AppError> {
        let room = Room {
            room_id,
            room_name: input.room_name.clone(),
            hotel_id: input.hotel_id,
            floor: input.floor,
            type_id: input.type_id.clone(),
            max_capacity: input.max_capacity,
            rate: input.rate,
            description: input.description.clone(),
            price: input.price,
            created_at: Utc::now(),
            created_by,
            updated_at: None,
            updated_by: None,
        };
        self.tables().rooms.insert(room_id, room.clone());
        Ok(room)
    }

    async fn get_room(&self, room_id: Uuid) -> Result<Option<Room>, AppError> {
        Ok(self.tables().rooms.get(&room_id).cloned())
    }

    async fn list_rooms_by_hotel(&self, hotel_id: Uuid, page: Page) -> Result<Vec<Room>, AppError> {
        let tables = self.tables();
        Ok(page_of(
            tables
                .rooms
                .values()
                .filter(|room| room.hotel_id == hotel_id)
                .cloned(),
            page,
        ))
    }

    async fn update_room(
        &self,
        room_id: Uuid,
        input: &RoomInput,
        updated_by: Option<Uuid>,
    ) -> Result<Option<Room>, AppError> {
        let mut tables = self.tables();
        Ok(tables.rooms.get_mut(&room_id).map(|room| {
            room.room_name = input.room_name.clone();
            room.hotel_id = input.hotel_id;
            room.floor = input.floor;
            room.type_id = input.type_id.clone();
            room.max_capacity = input.max_capacity;
            room.rate = input.rate;
            room.description = input.description.clone();
            room.price = input.price;
            room.updated_at = Some(Utc::now());
            room.updated_by = updated_by;
            room.clone()
        }))
    }

    async fn delete_room(&self, room_id: Uuid) -> Result<bool, AppError> {
        let mut tables = self.tables();
        if tables.reservations.iter().any(|r| r.room_id == room_id) {
            return Err(AppError::Conflict(anyhow::anyhow!(
                "delete room: referenced record is missing or still in use"
            )));
        }
        Ok(tables.rooms.remove(&room_id).is_some())
    }

    async fn available_rooms(
        &self,
        hotel_id: Uuid,
        range: DateRange,
    ) -> Result<Vec<Room>, AppError> {
        let rooms = self.tables().available_rooms(hotel_id, range);
        if let Some(gate) = &self.availability_gate {
            gate.wait().await;
        }
        Ok(rooms)
    }
}

#[async_trait]
impl ReservationStore for MemoryStore {
    async fn get_reservation(&self, reservation_id: Uuid) -> Result<Option<Reservation>, AppError> {
        Ok(self
            .tables()
            .reservations
            .iter()
            .find(|r| r.reservation_id == reservation_id)
            .cloned())
    }

    async fn list_reservations_by_user(
        &self,
        user_id: &str,
        page: Page,
    ) -> Result<Vec<Reservation>, AppError> {
        let matching = self
            .tables()
            .reservations
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        Ok(page_of(newest_stay_first(matching).into_iter(), page))
    }

    async fn list_reservations_by_room(
        &self,
        room_id: Uuid,
        page: Page,
    ) -> Result<Vec<Reservation>, AppError> {
        let matching = self
            .tables()
            .reservations
            .iter()
            .filter(|r| r.room_id == room_id)
            .cloned()
            .collect();
        Ok(page_of(newest_stay_first(matching).into_iter(), page))
    }

    async fn insert_reservation(&self, new: &NewReservation) -> Result<Reservation, AppError> {
        Ok(self.tables().insert(new))
    }

    async fn reserve_if_available(
        &self,
        hotel_id: Uuid,
        new: &NewReservation,
    ) -> Result<Booked, AppError> {
        let mut tables = self.tables();
        let available = tables.available_rooms(hotel_id, new.range);
        if !available.iter().any(|room| room.room_id == new.room_id) {
            return Ok(Booked::Unavailable);
        }
        Ok(Booked::Reserved(tables.insert(new)))
    }

    async fn reschedule_if_available(
        &self,
        reservation_id: Uuid,
        change: &Reschedule,
    ) -> Result<Option<Booked>, AppError> {
        let mut tables = self.tables();
        if !tables.room_is_free(change.room_id, change.range, Some(reservation_id)) {
            return Ok(Some(Booked::Unavailable));
        }

        let updated = tables
            .reservations
            .iter_mut()
            .find(|r| r.reservation_id == reservation_id && r.status != "CANCELLED")
            .map(|r| {
                r.room_id = change.room_id;
                r.start_date = change.range.start;
                r.end_date = change.range.end;
                r.updated_at = Some(Utc::now());
                r.updated_by = change.updated_by;
                r.clone()
            });
        Ok(updated.map(Booked::Reserved))
    }

    async fn update_status(
        &self,
        reservation_id: Uuid,
        expected: ReservationStatus,
        next: ReservationStatus,
        updated_by: Option<Uuid>,
    ) -> Result<Option<Reservation>, AppError> {
        let mut tables = self.tables();
        Ok(tables
            .reservations
            .iter_mut()
            .find(|r| r.reservation_id == reservation_id && r.status == expected.as_str())
            .map(|r| {
                r.status = next.as_str().to_string();
                r.updated_at = Some(Utc::now());
                r.updated_by = updated_by;
                r.clone()
            }))
    }
}
