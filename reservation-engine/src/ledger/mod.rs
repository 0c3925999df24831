//! Reservation ledger: durable record of bookings and occupancies.
//!
//! The ledger is the engine's persistence collaborator. Each write
//! method is one durable transaction: a booking is created atomically
//! with all its occupancies, and a batch of status transitions either
//! applies completely or not at all. Reads return committed state only.

mod memory;
mod snapshot;

pub use memory::InMemoryLedger;
pub use snapshot::LedgerSnapshot;

use chrono::NaiveDate;

use crate::domain::{
    Booking, Locator, Occupancy, OccupancyId, OccupancyStatus, Passenger, SeatId, Segment,
    TravelClass, VehicleId,
};

/// Errors from the ledger.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    /// No booking exists with the locator
    #[error("booking {0} not found")]
    BookingNotFound(Locator),

    /// No occupancy exists with the id
    #[error("occupancy {0} not found")]
    OccupancyNotFound(OccupancyId),

    /// A write would violate a ledger constraint.
    ///
    /// Under the engine's locking discipline this should not occur; it
    /// is the defensive fallback for seat-exclusivity and state-machine
    /// violations.
    #[error("ledger conflict: {0}")]
    Conflict(String),

    /// Underlying storage failed
    #[error("storage error: {0}")]
    Storage(String),
}

/// One occupancy to create as part of a booking.
///
/// Produced by the allocation engine: a Confirmed draft carries its
/// assigned seat, a Waiting draft carries none.
#[derive(Debug, Clone)]
pub struct OccupancyDraft {
    /// The passenger this occupancy is for.
    pub passenger: Passenger,
    /// Assigned seat, if any.
    pub seat: Option<SeatId>,
    /// Initial status.
    pub status: OccupancyStatus,
}

/// A booking to persist, with its occupancies, in one transaction.
#[derive(Debug, Clone)]
pub struct BookingDraft {
    /// Vehicle travelled on.
    pub vehicle: VehicleId,
    /// Date of travel.
    pub travel_date: NaiveDate,
    /// Accommodation class booked.
    pub class: TravelClass,
    /// Requested segment.
    pub segment: Segment,
    /// Contact that made the booking.
    pub contact: String,
    /// Total price in minor currency units.
    pub total_price: u32,
    /// Occupancies to create, in passenger request order.
    pub passengers: Vec<OccupancyDraft>,
}

/// One status transition to apply to an occupancy.
#[derive(Debug, Clone)]
pub struct OccupancyTransition {
    /// The occupancy to transition.
    pub occupancy: OccupancyId,
    /// Target status.
    pub to: OccupancyStatus,
    /// New seat binding. `Some` on promotion; `None` leaves the
    /// existing binding untouched (cancellation retains the seat for
    /// audit).
    pub seat: Option<SeatId>,
}

impl OccupancyTransition {
    /// Transition to Cancelled, retaining any seat binding for audit.
    pub fn cancel(occupancy: OccupancyId) -> Self {
        Self {
            occupancy,
            to: OccupancyStatus::Cancelled,
            seat: None,
        }
    }

    /// Promotion: transition to Confirmed, bound to `seat`.
    pub fn promote(occupancy: OccupancyId, seat: SeatId) -> Self {
        Self {
            occupancy,
            to: OccupancyStatus::Confirmed,
            seat: Some(seat),
        }
    }
}

/// The reservation ledger (external collaborator).
///
/// Implementations must apply each write method atomically and provide
/// at least read-committed isolation, so that an availability snapshot
/// taken under the engine's lock reflects true committed state.
pub trait Ledger {
    /// Fetch a booking by locator.
    fn booking(&self, locator: Locator)
    -> impl Future<Output = Result<Booking, LedgerError>> + Send;

    /// Fetch the occupancies of a booking, in creation order.
    fn occupancies_for(
        &self,
        locator: Locator,
    ) -> impl Future<Output = Result<Vec<Occupancy>, LedgerError>> + Send;

    /// Confirmed occupancies on a seat for a travel date.
    fn confirmed_on_seat(
        &self,
        vehicle: VehicleId,
        seat: SeatId,
        date: NaiveDate,
    ) -> impl Future<Output = Result<Vec<Occupancy>, LedgerError>> + Send;

    /// Waiting occupancies for a vehicle, class and date, in queue
    /// order (creation order).
    fn waiting_entries(
        &self,
        vehicle: VehicleId,
        class: TravelClass,
        date: NaiveDate,
    ) -> impl Future<Output = Result<Vec<Occupancy>, LedgerError>> + Send;

    /// Persist a booking and its occupancies in one transaction.
    ///
    /// Assigns the locator and occupancy ids; occupancy ids are
    /// monotonic in draft order, so waitlist order follows request
    /// order.
    fn save_booking(
        &self,
        draft: BookingDraft,
    ) -> impl Future<Output = Result<(Booking, Vec<Occupancy>), LedgerError>> + Send;

    /// Apply a batch of status transitions in one transaction.
    ///
    /// The whole batch is validated against the state machine and the
    /// seat-exclusivity constraint before anything is committed.
    /// Returns the updated occupancies in batch order.
    fn apply_transitions(
        &self,
        transitions: &[OccupancyTransition],
    ) -> impl Future<Output = Result<Vec<Occupancy>, LedgerError>> + Send;
}
