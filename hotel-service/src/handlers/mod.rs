//! HTTP handlers for hotel-service.

pub mod hotels;
pub mod reservations;
pub mod rooms;
