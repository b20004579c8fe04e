//! Hotel Service: hotels, rooms and reservations over HTTP.

pub mod config;
pub mod dtos;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;
