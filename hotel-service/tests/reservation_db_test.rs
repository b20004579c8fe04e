//! Reservation tests against PostgreSQL.
//!
//! Run with `TEST_DATABASE_URL` pointing at a disposable database:
//! `cargo test -p hotel-service --test reservation_db_test -- --ignored`

mod common;

use common::{in_days, TestApp};
use hotel_service::config::ReservationGuard;
use hotel_service::models::{DateRange, NewReservation};
use hotel_service::services::queries;
use reqwest::StatusCode;
use serde_json::{json, Value};
use serial_test::serial;
use std::sync::Arc;
use uuid::Uuid;

async fn race_bookings(app: &Arc<TestApp>, room: Uuid, callers: usize) -> usize {
    let mut handles = Vec::with_capacity(callers);
    for i in 0..callers {
        let app = app.clone();
        handles.push(tokio::spawn(async move {
            app.book(room, &format!("guest-{}", i), in_days(30), in_days(33))
                .await
                .status()
        }));
    }

    let mut created = 0;
    for handle in handles {
        let status = handle.await.unwrap();
        if status == StatusCode::CREATED {
            created += 1;
        } else {
            assert_eq!(status, StatusCode::CONFLICT);
        }
    }
    created
}

#[tokio::test]
#[ignore]
#[serial]
async fn serializable_guard_never_double_books() {
    let app = Arc::new(TestApp::spawn(ReservationGuard::Serializable).await);
    let hotel = app.create_hotel().await;
    let room = app.create_room(hotel).await;

    let created = race_bookings(&app, room, 8).await;

    assert_eq!(created, 1);
    assert_eq!(app.overlapping_pairs().await, 0);
    app.cleanup().await;
}

/// Check-then-insert has no atomicity: every booking past the first that
/// slips through is a double booking.
#[tokio::test]
#[ignore]
#[serial]
async fn check_then_insert_double_bookings_are_visible() {
    let app = Arc::new(TestApp::spawn(ReservationGuard::CheckThenInsert).await);
    let hotel = app.create_hotel().await;
    let room = app.create_room(hotel).await;

    let created = race_bookings(&app, room, 8).await as i64;

    assert!(created >= 1);
    assert_eq!(app.overlapping_pairs().await, created * (created - 1) / 2);
    app.cleanup().await;
}

#[tokio::test]
#[ignore]
async fn availability_follows_half_open_stays() {
    let app = TestApp::spawn(ReservationGuard::Serializable).await;
    let hotel = app.create_hotel().await;
    let room = app.create_room(hotel).await;

    let response = app.book(room, "guest-1", in_days(10), in_days(14)).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let available = |check_in: i64, check_out: i64| {
        format!(
            "/rooms/available?hotel_id={}&check_in={}&check_out={}",
            hotel,
            in_days(check_in),
            in_days(check_out)
        )
    };

    let body: Value = app.get(&available(12, 16)).await.json().await.unwrap();
    assert!(body["data"].as_array().unwrap().is_empty());

    let body: Value = app.get(&available(14, 19)).await.json().await.unwrap();
    assert_eq!(body["data"][0]["room_id"], room.to_string());

    let response = app.book(room, "guest-2", in_days(14), in_days(19)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    app.cleanup().await;
}

#[tokio::test]
#[ignore]
async fn status_transitions_persist() {
    let app = TestApp::spawn(ReservationGuard::Serializable).await;
    let hotel = app.create_hotel().await;
    let room = app.create_room(hotel).await;

    let created: Value = app
        .book(room, "guest-1", in_days(3), in_days(5))
        .await
        .json()
        .await
        .unwrap();
    let id = created["reservation_id"].as_str().unwrap();

    let response = app
        .put_json(
            &format!("/reservations/{}/status", id),
            json!({ "status": "CONFIRMED" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .put_json(
            &format!("/reservations/{}/status", id),
            json!({ "status": "CONFIRMED" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app
        .client
        .delete(app.url(&format!("/reservations/{}", id)))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let status: String =
        sqlx::query_scalar("SELECT status FROM reservation WHERE reservation_id = $1")
            .bind(id.parse::<Uuid>().unwrap())
            .fetch_one(&app.pool)
            .await
            .unwrap();
    assert_eq!(status, "CANCELLED");

    // The cancelled stay no longer blocks the room.
    let response = app.book(room, "guest-2", in_days(3), in_days(5)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    app.cleanup().await;
}

#[tokio::test]
#[ignore]
async fn reschedule_skips_its_own_stay() {
    let app = TestApp::spawn(ReservationGuard::Serializable).await;
    let hotel = app.create_hotel().await;
    let room = app.create_room(hotel).await;

    let mine: Value = app
        .book(room, "guest-1", in_days(5), in_days(8))
        .await
        .json()
        .await
        .unwrap();
    app.book(room, "guest-2", in_days(10), in_days(12)).await;

    let path = format!("/reservations/{}", mine["reservation_id"].as_str().unwrap());
    let response = app
        .put_json(
            &path,
            json!({ "room_id": room, "start_date": in_days(6), "end_date": in_days(10) }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .put_json(
            &path,
            json!({ "room_id": room, "start_date": in_days(9), "end_date": in_days(11) }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(app.overlapping_pairs().await, 0);
    app.cleanup().await;
}

#[tokio::test]
#[ignore]
async fn schema_rejects_inverted_stays() {
    let app = TestApp::spawn(ReservationGuard::Serializable).await;
    let hotel = app.create_hotel().await;
    let room = app.create_room(hotel).await;

    let mut conn = app.pool.acquire().await.unwrap();
    let new = NewReservation {
        reservation_id: Uuid::new_v4(),
        room_id: room,
        user_id: "guest".to_string(),
        range: DateRange {
            start: in_days(4),
            end: in_days(2),
        },
        created_by: None,
    };
    let result = queries::insert_reservation(&mut conn, &new).await;
    tokio_test::assert_err!(result);

    let valid = DateRange::new(in_days(2), in_days(4)).unwrap();
    assert_eq!(
        queries::available_rooms(&mut conn, hotel, valid)
            .await
            .unwrap()
            .len(),
        1
    );
    drop(conn);
    app.cleanup().await;
}

#[tokio::test]
#[ignore]
async fn hotel_with_rooms_cannot_be_deleted() {
    let app = TestApp::spawn(ReservationGuard::Serializable).await;
    let hotel = app.create_hotel().await;
    app.create_room(hotel).await;

    let response = app
        .client
        .delete(app.url(&format!("/hotels/{}", hotel)))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    app.cleanup().await;
}
