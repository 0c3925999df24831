//! Occupancies: one passenger's claim on a segment for a travel date.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Locator, SeatId, Segment, TravelClass, VehicleId};

/// Identifier of an occupancy, assigned by the ledger.
///
/// The ledger assigns these monotonically, so id order is creation
/// order. The waitlist for a `(vehicle, class, date)` scope is exactly
/// the Waiting occupancies in id order.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OccupancyId(pub u64);

impl fmt::Debug for OccupancyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OccupancyId({})", self.0)
    }
}

impl fmt::Display for OccupancyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle status of an occupancy.
///
/// `Waiting → Confirmed` (allocation or promotion),
/// `Waiting → Cancelled`, `Confirmed → Cancelled`.
/// Nothing ever leaves `Cancelled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OccupancyStatus {
    /// On the waitlist, no seat bound.
    Waiting,
    /// Holds a seat for its segment.
    Confirmed,
    /// Cancelled; any previously bound seat is retained for audit only.
    Cancelled,
}

impl OccupancyStatus {
    /// Whether the state machine permits moving to `next`.
    pub fn can_transition_to(self, next: OccupancyStatus) -> bool {
        use OccupancyStatus::*;
        matches!(
            (self, next),
            (Waiting, Confirmed) | (Waiting, Cancelled) | (Confirmed, Cancelled)
        )
    }
}

impl fmt::Display for OccupancyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OccupancyStatus::Waiting => "waiting",
            OccupancyStatus::Confirmed => "confirmed",
            OccupancyStatus::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// A passenger named on a booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passenger {
    /// Passenger name as given in the booking request.
    pub name: String,
}

impl Passenger {
    /// Create a passenger record.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// One passenger's claim on a segment of a vehicle's route for a date.
///
/// The central mutable entity of the engine. Mutated only by the
/// allocation engine (at creation), the promotion engine
/// (`Waiting → Confirmed`) and cancellation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occupancy {
    /// Ledger-assigned identifier.
    pub id: OccupancyId,
    /// Locator of the booking this occupancy belongs to (non-owning
    /// back-reference; the booking lists its occupancy ids).
    pub booking: Locator,
    /// Vehicle travelled on.
    pub vehicle: VehicleId,
    /// Date of travel.
    pub travel_date: NaiveDate,
    /// Accommodation class.
    pub class: TravelClass,
    /// Requested segment of the route.
    pub segment: Segment,
    /// The passenger holding this claim.
    pub passenger: Passenger,
    /// Bound seat. `None` while waiting; retained after cancellation
    /// for audit, but a cancelled occupancy no longer occupies it.
    pub seat: Option<SeatId>,
    /// Lifecycle status.
    pub status: OccupancyStatus,
}

impl Occupancy {
    /// Whether this occupancy is on the waitlist.
    pub fn is_waiting(&self) -> bool {
        self.status == OccupancyStatus::Waiting
    }

    /// Whether this occupancy holds a confirmed seat.
    pub fn is_confirmed(&self) -> bool {
        self.status == OccupancyStatus::Confirmed
    }

    /// Whether this occupancy currently occupies `seat` on `date`.
    ///
    /// Only Confirmed occupancies count as occupying; a cancelled
    /// occupancy's retained seat binding does not.
    pub fn occupies(&self, seat: &SeatId, date: NaiveDate) -> bool {
        self.status == OccupancyStatus::Confirmed
            && self.travel_date == date
            && self.seat.as_ref() == Some(seat)
    }
}
