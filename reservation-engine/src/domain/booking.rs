//! Bookings: a group of occupancies created in one request.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Locator, OccupancyId, Segment, TravelClass, VehicleId};

/// A booking groups the occupancies created by a single request.
///
/// The booking owns its occupancies by id only; each occupancy carries
/// the locator as a non-owning back-reference. Created atomically with
/// its occupancies by the ledger. Cancellation operates per-occupancy,
/// not per-booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    /// Locator code identifying this booking.
    pub locator: Locator,
    /// Vehicle travelled on.
    pub vehicle: VehicleId,
    /// Date of travel.
    pub travel_date: NaiveDate,
    /// Accommodation class booked.
    pub class: TravelClass,
    /// Requested segment, shared by all occupancies of the booking.
    pub segment: Segment,
    /// Contact that made the booking; cancellation requires a match.
    pub contact: String,
    /// Total price in minor currency units.
    pub total_price: u32,
    /// Ids of the occupancies created with this booking, in passenger
    /// request order.
    pub occupancies: Vec<OccupancyId>,
}

impl Booking {
    /// The equal per-passenger share of the booking total.
    ///
    /// Used as the refund figure per cancelled occupancy. Fare rules
    /// live outside the engine; this is bookkeeping only.
    pub fn per_passenger_share(&self) -> u32 {
        match self.occupancies.len() as u32 {
            0 => 0,
            n => self.total_price / n,
        }
    }

    /// Refund owed for cancelling `cancelled_count` occupancies.
    pub fn refund_for(&self, cancelled_count: usize) -> u32 {
        self.per_passenger_share() * cancelled_count as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn booking(total: u32, passengers: usize) -> Booking {
        Booking {
            locator: Locator::from_index(7),
            vehicle: VehicleId(12301),
            travel_date: NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
            class: TravelClass::parse("3A").unwrap(),
            segment: Segment::between(0, 60).unwrap(),
            contact: "traveller@example.com".to_string(),
            total_price: total,
            occupancies: (0..passengers as u64).map(OccupancyId).collect(),
        }
    }

    #[test]
    fn refund_is_equal_share() {
        let b = booking(3000, 3);
        assert_eq!(b.per_passenger_share(), 1000);
        assert_eq!(b.refund_for(1), 1000);
        assert_eq!(b.refund_for(3), 3000);
    }

    #[test]
    fn refund_rounds_down() {
        let b = booking(1000, 3);
        assert_eq!(b.per_passenger_share(), 333);
        assert_eq!(b.refund_for(2), 666);
    }
}
