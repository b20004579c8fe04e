//! Reservation statements that must be able to share one transaction.

use crate::models::{DateRange, NewReservation, Reschedule, Reservation, Room};
use service_core::db::map_db_error;
use service_core::error::AppError;
use sqlx::PgConnection;
use tracing::instrument;
use uuid::Uuid;

/// Rooms of a hotel that no active reservation holds for any night of `range`.
#[instrument(skip(conn))]
pub async fn available_rooms(
    conn: &mut PgConnection,
    hotel_id: Uuid,
    range: DateRange,
) -> Result<Vec<Room>, AppError> {
    sqlx::query_as::<_, Room>(
        r#"
        SELECT r.room_id, r.room_name, r.hotel_id, r.floor, r.type_id, r.max_capacity,
               r.rate, r.description, r.price, r.created_at, r.created_by,
               r.updated_at, r.updated_by
        FROM room r
        WHERE r.hotel_id = $1
          AND NOT EXISTS (
              SELECT 1
              FROM reservation res
              WHERE res.room_id = r.room_id
                AND res.status <> 'CANCELLED'
                AND res.start_date < $3
                AND $2 < res.end_date
          )
        ORDER BY r.room_id
        "#,
    )
    .bind(hotel_id)
    .bind(range.start)
    .bind(range.end)
    .fetch_all(&mut *conn)
    .await
    .map_err(|e| map_db_error("get available rooms", e))
}

/// Whether another active reservation holds `room_id` for part of `range`.
#[instrument(skip(conn))]
pub async fn room_has_overlap(
    conn: &mut PgConnection,
    room_id: Uuid,
    range: DateRange,
    excluding: Uuid,
) -> Result<bool, AppError> {
    sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS (
            SELECT 1
            FROM reservation
            WHERE room_id = $1
              AND reservation_id <> $4
              AND status <> 'CANCELLED'
              AND start_date < $3
              AND $2 < end_date
        )
        "#,
    )
    .bind(room_id)
    .bind(range.start)
    .bind(range.end)
    .bind(excluding)
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| map_db_error("check room overlap", e))
}

#[instrument(skip(conn, new), fields(reservation_id = %new.reservation_id, room_id = %new.room_id))]
pub async fn insert_reservation(
    conn: &mut PgConnection,
    new: &NewReservation,
) -> Result<Reservation, AppError> {
    sqlx::query_as::<_, Reservation>(
        r#"
        INSERT INTO reservation (reservation_id, room_id, user_id, start_date, end_date, status, created_by)
        VALUES ($1, $2, $3, $4, $5, 'PENDING', $6)
        RETURNING reservation_id, room_id, user_id, start_date, end_date, status,
                  created_at, created_by, updated_at, updated_by
        "#,
    )
    .bind(new.reservation_id)
    .bind(new.room_id)
    .bind(&new.user_id)
    .bind(new.range.start)
    .bind(new.range.end)
    .bind(new.created_by)
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| map_db_error("create reservation", e))
}

/// Rewrite room and dates unless the reservation has been cancelled.
#[instrument(skip(conn, change))]
pub async fn reschedule_reservation(
    conn: &mut PgConnection,
    reservation_id: Uuid,
    change: &Reschedule,
) -> Result<Option<Reservation>, AppError> {
    sqlx::query_as::<_, Reservation>(
        r#"
        UPDATE reservation
        SET room_id = $2, start_date = $3, end_date = $4, updated_at = now(), updated_by = $5
        WHERE reservation_id = $1 AND status <> 'CANCELLED'
        RETURNING reservation_id, room_id, user_id, start_date, end_date, status,
                  created_at, created_by, updated_at, updated_by
        "#,
    )
    .bind(reservation_id)
    .bind(change.room_id)
    .bind(change.range.start)
    .bind(change.range.end)
    .bind(change.updated_by)
    .fetch_optional(&mut *conn)
    .await
    .map_err(|e| map_db_error("update reservation", e))
}
