//! PostgreSQL implementation of the hotel stores.

use crate::config::DatabaseConfig;
use crate::models::{
    DateRange, Hotel, HotelInput, NewReservation, Reschedule, Reservation, ReservationStatus,
    Room, RoomInput,
};
use crate::services::metrics::DB_QUERY_DURATION;
use crate::services::queries;
use crate::services::store::{Booked, HealthCheck, HotelStore, ReservationStore, RoomStore};
use async_trait::async_trait;
use service_core::db::{exec_tx, map_db_error, IsolationLevel};
use service_core::error::AppError;
use service_core::utils::Page;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::PgConnection;
use std::time::Duration;
use tracing::{info, instrument};
use uuid::Uuid;

/// Database connection pool wrapper.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database connection pool.
    #[instrument(skip(config), fields(service = "hotel-service"))]
    pub async fn new(config: &DatabaseConfig) -> Result<Self, AppError> {
        info!(
            max_connections = config.max_connections,
            min_connections = config.min_connections,
            "Connecting to PostgreSQL"
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .idle_timeout(Duration::from_secs(600))
            .connect(&config.url)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to connect: {}", e)))?;

        info!("PostgreSQL connection pool established");

        Ok(Self { pool })
    }

    /// Run database migrations.
    #[instrument(skip(self))]
    pub async fn run_migrations(&self) -> Result<(), AppError> {
        info!("Running database migrations");
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Migration failed: {}", e)))?;
        info!("Database migrations completed");
        Ok(())
    }

    async fn acquire(&self) -> Result<sqlx::pool::PoolConnection<sqlx::Postgres>, AppError> {
        self.pool
            .acquire()
            .await
            .map_err(|e| map_db_error("acquire connection", e))
    }
}

#[async_trait]
impl HealthCheck for Database {
    #[instrument(skip(self))]
    async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Health check failed: {}", e)))?;
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// Hotels
// -----------------------------------------------------------------------------

#[async_trait]
impl HotelStore for Database {
    #[instrument(skip(self, input))]
    async fn create_hotel(&self, hotel_id: Uuid, input: &HotelInput) -> Result<Hotel, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_hotel"])
            .start_timer();

        let hotel = sqlx::query_as::<_, Hotel>(
            r#"
            INSERT INTO hotel (hotel_id, destination_id, type_id, total_room, rating)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING hotel_id, destination_id, type_id, total_room, rating
            "#,
        )
        .bind(hotel_id)
        .bind(input.destination_id)
        .bind(&input.type_id)
        .bind(input.total_room)
        .bind(input.rating)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error("create hotel", e))?;

        timer.observe_duration();
        info!(hotel_id = %hotel.hotel_id, "Hotel created");

        Ok(hotel)
    }

    #[instrument(skip(self))]
    async fn get_hotel(&self, hotel_id: Uuid) -> Result<Option<Hotel>, AppError> {
        sqlx::query_as::<_, Hotel>(
            r#"
            SELECT hotel_id, destination_id, type_id, total_room, rating
            FROM hotel
            WHERE hotel_id = $1
            "#,
        )
        .bind(hotel_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_db_error("get hotel", e))
    }

    #[instrument(skip(self))]
    async fn list_hotels(&self, page: Page) -> Result<Vec<Hotel>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_hotels"])
            .start_timer();

        let hotels = sqlx::query_as::<_, Hotel>(
            r#"
            SELECT hotel_id, destination_id, type_id, total_room, rating
            FROM hotel
            ORDER BY hotel_id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_error("list hotels", e))?;

        timer.observe_duration();

        Ok(hotels)
    }

    #[instrument(skip(self, input))]
    async fn update_hotel(
        &self,
        hotel_id: Uuid,
        input: &HotelInput,
    ) -> Result<Option<Hotel>, AppError> {
        sqlx::query_as::<_, Hotel>(
            r#"
            UPDATE hotel
            SET destination_id = $2, type_id = $3, total_room = $4, rating = $5
            WHERE hotel_id = $1
            RETURNING hotel_id, destination_id, type_id, total_room, rating
            "#,
        )
        .bind(hotel_id)
        .bind(input.destination_id)
        .bind(&input.type_id)
        .bind(input.total_room)
        .bind(input.rating)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_db_error("update hotel", e))
    }

    #[instrument(skip(self))]
    async fn delete_hotel(&self, hotel_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM hotel WHERE hotel_id = $1")
            .bind(hotel_id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_db_error("delete hotel", e))?;

        Ok(result.rows_affected() > 0)
    }
}

// -----------------------------------------------------------------------------
// Rooms
// -----------------------------------------------------------------------------

#[async_trait]
impl RoomStore for Database {
    #[instrument(skip(self, input), fields(hotel_id = %input.hotel_id))]
    async fn create_room(
        &self,
        room_id: Uuid,
        input: &RoomInput,
        created_by: Option<Uuid>,
    ) -> Result<Room, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_room"])
            .start_timer();

        let room = sqlx::query_as::<_, Room>(
            r#"
            INSERT INTO room (room_id, room_name, hotel_id, floor, type_id, max_capacity,
                              rate, description, price, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING room_id, room_name, hotel_id, floor, type_id, max_capacity, rate,
                      description, price, created_at, created_by, updated_at, updated_by
            "#,
        )
        .bind(room_id)
        .bind(&input.room_name)
        .bind(input.hotel_id)
        .bind(input.floor)
        .bind(&input.type_id)
        .bind(input.max_capacity)
        .bind(input.rate)
        .bind(&input.description)
        .bind(input.price)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error("create room", e))?;

        timer.observe_duration();
        info!(room_id = %room.room_id, "Room created");

        Ok(room)
    }

    #[instrument(skip(self))]
    async fn get_room(&self, room_id: Uuid) -> Result<Option<Room>, AppError> {
        sqlx::query_as::<_, Room>(
            r#"
            SELECT room_id, room_name, hotel_id, floor, type_id, max_capacity, rate,
                   description, price, created_at, created_by, updated_at, updated_by
            FROM room
            WHERE room_id = $1
            "#,
        )
        .bind(room_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_db_error("get room", e))
    }

    #[instrument(skip(self))]
    async fn list_rooms_by_hotel(&self, hotel_id: Uuid, page: Page) -> Result<Vec<Room>, AppError> {
        sqlx::query_as::<_, Room>(
            r#"
            SELECT room_id, room_name, hotel_id, floor, type_id, max_capacity, rate,
                   description, price, created_at, created_by, updated_at, updated_by
            FROM room
            WHERE hotel_id = $1
            ORDER BY room_id
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(hotel_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_error("list rooms", e))
    }

    #[instrument(skip(self, input))]
    async fn update_room(
        &self,
        room_id: Uuid,
        input: &RoomInput,
        updated_by: Option<Uuid>,
    ) -> Result<Option<Room>, AppError> {
        sqlx::query_as::<_, Room>(
            r#"
            UPDATE room
            SET room_name = $2, hotel_id = $3, floor = $4, type_id = $5, max_capacity = $6,
                rate = $7, description = $8, price = $9, updated_at = now(), updated_by = $10
            WHERE room_id = $1
            RETURNING room_id, room_name, hotel_id, floor, type_id, max_capacity, rate,
                      description, price, created_at, created_by, updated_at, updated_by
            "#,
        )
        .bind(room_id)
        .bind(&input.room_name)
        .bind(input.hotel_id)
        .bind(input.floor)
        .bind(&input.type_id)
        .bind(input.max_capacity)
        .bind(input.rate)
        .bind(&input.description)
        .bind(input.price)
        .bind(updated_by)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_db_error("update room", e))
    }

    #[instrument(skip(self))]
    async fn delete_room(&self, room_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM room WHERE room_id = $1")
            .bind(room_id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_db_error("delete room", e))?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn available_rooms(
        &self,
        hotel_id: Uuid,
        range: DateRange,
    ) -> Result<Vec<Room>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["available_rooms"])
            .start_timer();

        let mut conn = self.acquire().await?;
        let rooms = queries::available_rooms(&mut conn, hotel_id, range).await?;

        timer.observe_duration();

        Ok(rooms)
    }
}

// -----------------------------------------------------------------------------
// Reservations
// -----------------------------------------------------------------------------

async fn reserve_in_tx(
    conn: &mut PgConnection,
    hotel_id: Uuid,
    new: NewReservation,
) -> Result<Booked, AppError> {
    let available = queries::available_rooms(conn, hotel_id, new.range).await?;
    if !available.iter().any(|room| room.room_id == new.room_id) {
        return Ok(Booked::Unavailable);
    }

    let reservation = queries::insert_reservation(conn, &new).await?;
    Ok(Booked::Reserved(reservation))
}

async fn reschedule_in_tx(
    conn: &mut PgConnection,
    reservation_id: Uuid,
    change: Reschedule,
) -> Result<Option<Booked>, AppError> {
    if queries::room_has_overlap(conn, change.room_id, change.range, reservation_id).await? {
        return Ok(Some(Booked::Unavailable));
    }

    let updated = queries::reschedule_reservation(conn, reservation_id, &change).await?;
    Ok(updated.map(Booked::Reserved))
}

#[async_trait]
impl ReservationStore for Database {
    #[instrument(skip(self))]
    async fn get_reservation(&self, reservation_id: Uuid) -> Result<Option<Reservation>, AppError> {
        sqlx::query_as::<_, Reservation>(
            r#"
            SELECT reservation_id, room_id, user_id, start_date, end_date, status,
                   created_at, created_by, updated_at, updated_by
            FROM reservation
            WHERE reservation_id = $1
            "#,
        )
        .bind(reservation_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_db_error("get reservation", e))
    }

    #[instrument(skip(self))]
    async fn list_reservations_by_user(
        &self,
        user_id: &str,
        page: Page,
    ) -> Result<Vec<Reservation>, AppError> {
        sqlx::query_as::<_, Reservation>(
            r#"
            SELECT reservation_id, room_id, user_id, start_date, end_date, status,
                   created_at, created_by, updated_at, updated_by
            FROM reservation
            WHERE user_id = $1
            ORDER BY start_date DESC, reservation_id
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_error("list reservations by user", e))
    }

    #[instrument(skip(self))]
    async fn list_reservations_by_room(
        &self,
        room_id: Uuid,
        page: Page,
    ) -> Result<Vec<Reservation>, AppError> {
        sqlx::query_as::<_, Reservation>(
            r#"
            SELECT reservation_id, room_id, user_id, start_date, end_date, status,
                   created_at, created_by, updated_at, updated_by
            FROM reservation
            WHERE room_id = $1
            ORDER BY start_date DESC, reservation_id
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(room_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_error("list reservations by room", e))
    }

    async fn insert_reservation(&self, new: &NewReservation) -> Result<Reservation, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["insert_reservation"])
            .start_timer();

        let mut conn = self.acquire().await?;
        let reservation = queries::insert_reservation(&mut conn, new).await?;

        timer.observe_duration();

        Ok(reservation)
    }

    #[instrument(skip(self, new), fields(reservation_id = %new.reservation_id, room_id = %new.room_id))]
    async fn reserve_if_available(
        &self,
        hotel_id: Uuid,
        new: &NewReservation,
    ) -> Result<Booked, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["reserve_if_available"])
            .start_timer();

        let new = new.clone();
        let booked = exec_tx(&self.pool, IsolationLevel::Serializable, move |conn| {
            Box::pin(reserve_in_tx(conn, hotel_id, new))
        })
        .await?;

        timer.observe_duration();

        Ok(booked)
    }

    #[instrument(skip(self, change), fields(room_id = %change.room_id))]
    async fn reschedule_if_available(
        &self,
        reservation_id: Uuid,
        change: &Reschedule,
    ) -> Result<Option<Booked>, AppError> {
        let change = *change;
        exec_tx(&self.pool, IsolationLevel::Serializable, move |conn| {
            Box::pin(reschedule_in_tx(conn, reservation_id, change))
        })
        .await
    }

    #[instrument(skip(self))]
    async fn update_status(
        &self,
        reservation_id: Uuid,
        expected: ReservationStatus,
        next: ReservationStatus,
        updated_by: Option<Uuid>,
    ) -> Result<Option<Reservation>, AppError> {
        sqlx::query_as::<_, Reservation>(
            r#"
            UPDATE reservation
            SET status = $3, updated_at = now(), updated_by = $4
            WHERE reservation_id = $1 AND status = $2
            RETURNING reservation_id, room_id, user_id, start_date, end_date, status,
                      created_at, created_by, updated_at, updated_by
            "#,
        )
        .bind(reservation_id)
        .bind(expected.as_str())
        .bind(next.as_str())
        .bind(updated_by)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_db_error("update reservation status", e))
    }
}
