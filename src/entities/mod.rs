//! Typed records for the backend resources the core reads
//!
//! Field names and enum encodings match the backend exactly; records are
//! decoded from and encoded to JSON through the [`Entity`](crate::core::Entity)
//! trait.

pub mod appointment;
pub mod catalog;
pub mod customer;
pub mod datetime;
pub mod hotel;
pub mod id;
pub mod macros;

pub use appointment::{Appointment, AppointmentStatus, ServiceAppointment};
pub use catalog::{Service, Shop};
pub use customer::Customer;
pub use hotel::{BookingStatus, Hotel, Room, RoomBooking, RoomType};
