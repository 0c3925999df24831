//! The reservation engine: the booking and cancellation request paths.
//!
//! [`ReservationEngine`] ties the collaborators together. Booking runs
//! under a per-vehicle lock so availability reads and the persisting
//! write form one atomic decision per vehicle; cancellation (with its
//! promotion pass) runs under a single global lock, serialized against
//! other cancellations but not against bookings — the ledger's
//! defensive exclusivity check backstops that window.

mod allocation;
mod availability;
mod locks;
mod promotion;

#[cfg(test)]
mod booking_tests;

use chrono::NaiveDate;
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, info, warn};

use crate::catalog::{CatalogError, SeatCatalog};
use crate::domain::{
    Booking, Locator, Occupancy, OccupancyId, OccupancyStatus, Passenger, SeatId, StationCode,
    TravelClass, VehicleId,
};
use crate::ledger::{BookingDraft, Ledger, LedgerError, OccupancyTransition};
use crate::notify::NotificationSink;
use crate::route::{RouteError, RouteIndex, RouteProvider};

use locks::VehicleLocks;

/// Errors surfaced by the engine's request paths.
#[derive(Debug, thiserror::Error)]
pub enum ReservationError {
    /// A booking request named no passengers.
    #[error("booking request names no passengers")]
    NoPassengers,

    /// The requester's contact does not match the booking's contact.
    #[error("contact does not match the contact on booking {0}")]
    Unauthorized(Locator),

    /// A cancellation named an occupancy outside the booking.
    #[error("occupancy {occupancy} does not belong to booking {booking}")]
    ForeignOccupancy {
        booking: Locator,
        occupancy: OccupancyId,
    },

    #[error(transparent)]
    Route(#[from] RouteError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// A request to book one segment for a party of passengers.
#[derive(Debug, Clone)]
pub struct BookingRequest {
    pub vehicle: VehicleId,
    pub travel_date: NaiveDate,
    pub class: TravelClass,
    /// Boarding stop. Board and alight may be given in either order.
    pub board: StationCode,
    /// Alighting stop.
    pub alight: StationCode,
    /// Party, in request order; allocation preserves this order.
    pub passengers: Vec<Passenger>,
    /// Contact that owns the booking; cancellation requires it to match.
    pub contact: String,
    /// Fare per passenger in minor units. Fare rules live with the
    /// caller; the engine only totals and apportions.
    pub fare_per_passenger: u32,
}

/// Outcome of a booking request.
#[derive(Debug, Clone)]
pub struct BookingOutcome {
    pub booking: Booking,
    /// Occupancies in passenger request order.
    pub occupancies: Vec<Occupancy>,
}

impl BookingOutcome {
    /// Number of passengers holding a confirmed seat.
    pub fn confirmed_count(&self) -> usize {
        self.occupancies.iter().filter(|o| o.is_confirmed()).count()
    }

    /// Number of passengers on the waitlist.
    pub fn waiting_count(&self) -> usize {
        self.occupancies.iter().filter(|o| o.is_waiting()).count()
    }
}

/// A request to cancel occupancies of a booking.
#[derive(Debug, Clone)]
pub struct CancellationRequest {
    pub locator: Locator,
    /// Must match the contact the booking was made with.
    pub contact: String,
    /// Occupancies to cancel. Empty means every occupancy of the
    /// booking not already cancelled. Duplicates are collapsed.
    pub occupancies: Vec<OccupancyId>,
}

/// Outcome of a cancellation request.
#[derive(Debug, Clone)]
pub struct CancellationOutcome {
    pub booking: Booking,
    /// The occupancies cancelled by this request.
    pub cancelled: Vec<Occupancy>,
    /// Waitlisted occupancies promoted onto freed seats.
    pub promoted: Vec<Occupancy>,
    /// Refund owed, in minor units.
    pub refund: u32,
}

/// The reservation engine.
///
/// Generic over its collaborators: a route provider for segment
/// resolution, a seat catalog, the ledger, and a notification sink.
pub struct ReservationEngine<R, C, L, N> {
    routes: RouteIndex<R>,
    catalog: C,
    ledger: L,
    notifier: N,
    vehicle_locks: VehicleLocks,
    cancel_lock: AsyncMutex<()>,
}

impl<R, C, L, N> ReservationEngine<R, C, L, N>
where
    R: RouteProvider,
    C: SeatCatalog,
    L: Ledger,
    N: NotificationSink,
{
    pub fn new(routes: R, catalog: C, ledger: L, notifier: N) -> Self {
        Self {
            routes: RouteIndex::new(routes),
            catalog,
            ledger,
            notifier,
            vehicle_locks: VehicleLocks::new(),
            cancel_lock: AsyncMutex::new(()),
        }
    }

    /// The underlying ledger.
    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// The notification sink.
    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Seats available for the given journey, in catalog order.
    ///
    /// A pure read; the answer can be stale by the time a booking is
    /// attempted, which is why [`Self::book`] recomputes it under the
    /// vehicle lock.
    pub async fn available_seats(
        &self,
        vehicle: VehicleId,
        class: TravelClass,
        travel_date: NaiveDate,
        board: StationCode,
        alight: StationCode,
    ) -> Result<Vec<SeatId>, ReservationError> {
        let segment = self.routes.resolve_segment(vehicle, board, alight).await?;
        let seats = self.catalog.seats(vehicle, class).await?;
        let free =
            availability::available_seats(&self.ledger, vehicle, travel_date, segment, &seats)
                .await?;
        Ok(free)
    }

    /// Book a segment for a party of passengers.
    ///
    /// Never partially fails on capacity: passengers beyond the
    /// available seats are waitlisted in request order, and a booking
    /// with zero free seats succeeds with everyone waiting. The
    /// availability read and the persisting write happen under the
    /// vehicle's lock. Notification delivery is best-effort.
    pub async fn book(&self, request: BookingRequest) -> Result<BookingOutcome, ReservationError> {
        if request.passengers.is_empty() {
            return Err(ReservationError::NoPassengers);
        }

        let segment = self
            .routes
            .resolve_segment(request.vehicle, request.board, request.alight)
            .await?;

        let lock = self.vehicle_locks.for_vehicle(request.vehicle);
        let guard = lock.lock().await;
        debug!(vehicle = %request.vehicle, "vehicle lock acquired");

        let seats = self.catalog.seats(request.vehicle, request.class).await?;
        let free = availability::available_seats(
            &self.ledger,
            request.vehicle,
            request.travel_date,
            segment,
            &seats,
        )
        .await?;

        let total_price = request
            .fare_per_passenger
            .saturating_mul(request.passengers.len() as u32);
        let drafts = allocation::allocate(request.passengers, &free);

        let (booking, occupancies) = self
            .ledger
            .save_booking(BookingDraft {
                vehicle: request.vehicle,
                travel_date: request.travel_date,
                class: request.class,
                segment,
                contact: request.contact,
                total_price,
                passengers: drafts,
            })
            .await?;
        drop(guard);

        let outcome = BookingOutcome {
            booking,
            occupancies,
        };
        info!(
            locator = %outcome.booking.locator,
            vehicle = %outcome.booking.vehicle,
            confirmed = outcome.confirmed_count(),
            waiting = outcome.waiting_count(),
            "booking persisted"
        );

        if let Err(err) = self
            .notifier
            .booking_completed(&outcome.booking, &outcome.occupancies)
            .await
        {
            warn!(%err, locator = %outcome.booking.locator, "booking notification failed");
        }

        Ok(outcome)
    }

    /// Cancel occupancies of a booking and promote from the waitlist.
    ///
    /// Requires the requesting contact to match the booking's. An empty
    /// occupancy list cancels the whole booking. Cancelling an
    /// occupancy that is already cancelled is a ledger conflict. The
    /// refund is the booking's per-passenger share times the number
    /// cancelled. Runs under the global cancellation lock; promotion
    /// happens in the same critical section so a freed seat cannot be
    /// double-promoted by a racing cancellation.
    pub async fn cancel(
        &self,
        request: CancellationRequest,
    ) -> Result<CancellationOutcome, ReservationError> {
        let guard = self.cancel_lock.lock().await;
        debug!(locator = %request.locator, "cancellation lock acquired");

        let booking = self.ledger.booking(request.locator).await?;
        if booking.contact != request.contact {
            return Err(ReservationError::Unauthorized(request.locator));
        }

        let targets: Vec<OccupancyId> = if request.occupancies.is_empty() {
            self.ledger
                .occupancies_for(request.locator)
                .await?
                .iter()
                .filter(|o| o.status != OccupancyStatus::Cancelled)
                .map(|o| o.id)
                .collect()
        } else {
            let mut targets = Vec::new();
            for id in &request.occupancies {
                if !booking.occupancies.contains(id) {
                    return Err(ReservationError::ForeignOccupancy {
                        booking: request.locator,
                        occupancy: *id,
                    });
                }
                if !targets.contains(id) {
                    targets.push(*id);
                }
            }
            targets
        };

        if targets.is_empty() {
            return Ok(CancellationOutcome {
                booking,
                cancelled: Vec::new(),
                promoted: Vec::new(),
                refund: 0,
            });
        }

        let transitions: Vec<OccupancyTransition> = targets
            .iter()
            .map(|id| OccupancyTransition::cancel(*id))
            .collect();
        let cancelled = self.ledger.apply_transitions(&transitions).await?;
        let refund = booking.refund_for(cancelled.len());

        let plan = promotion::plan_promotions(&self.ledger, &cancelled).await?;
        let promoted = if plan.is_empty() {
            Vec::new()
        } else {
            self.ledger.apply_transitions(&plan).await?
        };
        drop(guard);

        info!(
            locator = %booking.locator,
            cancelled = cancelled.len(),
            promoted = promoted.len(),
            refund,
            "cancellation completed"
        );

        if let Err(err) = self.notifier.cancelled(&booking, &cancelled, refund).await {
            warn!(%err, locator = %booking.locator, "cancellation notification failed");
        }
        for occupancy in &promoted {
            if let Err(err) = self.notifier.promoted(occupancy).await {
                warn!(%err, occupancy = %occupancy.id, "promotion notification failed");
            }
        }

        Ok(CancellationOutcome {
            booking,
            cancelled,
            promoted,
            refund,
        })
    }
}
