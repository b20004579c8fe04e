//! Domain models for hotel-service.

mod hotel;
mod reservation;
mod room;

pub use hotel::{Hotel, HotelInput};
pub use reservation::{
    DateRange, NewReservation, Reschedule, Reservation, ReservationStatus, StatusChange,
};
pub use room::{Room, RoomInput};
