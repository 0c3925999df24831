//! Seat availability calculator.

use chrono::NaiveDate;

use crate::domain::{Occupancy, SeatId, Segment, VehicleId};
use crate::ledger::{Ledger, LedgerError};

/// Whether a seat with the given Confirmed occupancies can take
/// `segment` without violating seat exclusivity.
fn seat_is_free(confirmed: &[Occupancy], segment: Segment) -> bool {
    confirmed.iter().all(|o| !o.segment.overlaps(&segment))
}

/// Filter `seats` down to those available for `segment` on `date`.
///
/// A seat qualifies iff none of its Confirmed occupancies for the date
/// overlaps the requested segment. Catalog order is preserved; the
/// allocation engine relies on it as the assignment tie-break.
///
/// This is a pure read. Callers that go on to allocate must hold the
/// vehicle lock across the read-then-write sequence, or a concurrent
/// booking may invalidate the answer.
pub(crate) async fn available_seats<L: Ledger>(
    ledger: &L,
    vehicle: VehicleId,
    date: NaiveDate,
    segment: Segment,
    seats: &[SeatId],
) -> Result<Vec<SeatId>, LedgerError> {
    let mut free = Vec::new();
    for seat in seats {
        let confirmed = ledger.confirmed_on_seat(vehicle, seat.clone(), date).await?;
        if seat_is_free(&confirmed, segment) {
            free.push(seat.clone());
        }
    }
    Ok(free)
}
