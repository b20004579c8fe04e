//! Services for hotel-service.

pub mod booking;
pub mod catalog;
pub mod database;
pub mod metrics;
pub mod queries;
pub mod store;

pub use booking::{BookingEngine, BookingRequest, RescheduleRequest};
pub use catalog::{HotelService, RoomService};
pub use database::Database;
pub use metrics::{get_metrics, init_metrics};
pub use store::{Booked, HealthCheck, HotelStore, ReservationStore, RoomStore};
