//! Domain types for the reservation engine.
//!
//! This module contains the core domain model. All identifier types
//! enforce their invariants at construction time, so code that receives
//! these types can trust their validity.

mod booking;
mod class;
mod locator;
mod occupancy;
mod seat;
mod segment;
mod station;
mod vehicle;

pub use booking::Booking;
pub use class::{InvalidTravelClass, TravelClass};
pub use locator::{InvalidLocator, Locator};
pub use occupancy::{Occupancy, OccupancyId, OccupancyStatus, Passenger};
pub use seat::{CoachCode, InvalidCoachCode, InvalidSeatNumber, SeatId};
pub use segment::{EmptySegment, Segment};
pub use station::{InvalidStationCode, StationCode};
pub use vehicle::VehicleId;
