//! Booking flow of a minivan ride service: the customer wizard
//! (route, vehicle, payment), the driver dashboard and driver ratings.

pub mod config;
pub mod definitions;
pub mod providers;
