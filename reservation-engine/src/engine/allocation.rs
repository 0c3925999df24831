//! Booking-time allocation: pairing passengers with available seats.

use crate::domain::{OccupancyStatus, Passenger, SeatId};
use crate::ledger::OccupancyDraft;

/// Assign seats positionally: passenger `i` takes seat `i` while seats
/// last, and the remainder join the waitlist. Both inputs keep their
/// given order (request order and catalog order) — that pairing is the
/// entire tie-break policy, so a request never partially fails: with
/// zero seats free every passenger is waitlisted.
pub(crate) fn allocate(passengers: Vec<Passenger>, seats: &[SeatId]) -> Vec<OccupancyDraft> {
    passengers
        .into_iter()
        .enumerate()
        .map(|(i, passenger)| match seats.get(i) {
            Some(seat) => OccupancyDraft {
                passenger,
                seat: Some(seat.clone()),
                status: OccupancyStatus::Confirmed,
            },
            None => OccupancyDraft {
                passenger,
                seat: None,
                status: OccupancyStatus::Waiting,
            },
        })
        .collect()
}
