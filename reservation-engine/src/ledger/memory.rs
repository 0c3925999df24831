//! In-memory ledger.
//!
//! Keeps all bookings and occupancies under one `std::sync::Mutex`.
//! Each trait method takes the lock once, so every write batch is
//! atomic and reads see committed state only. Batch application is
//! synchronous under the lock: once a write has begun it cannot be torn
//! by task cancellation.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::NaiveDate;

use crate::domain::{
    Booking, Locator, Occupancy, OccupancyId, OccupancyStatus, SeatId, TravelClass, VehicleId,
};

use super::{BookingDraft, Ledger, LedgerError, OccupancyTransition};

#[derive(Debug, Default)]
pub(crate) struct LedgerState {
    pub(crate) bookings: HashMap<Locator, Booking>,
    // BTreeMap so that iteration order is id order, i.e. creation order.
    pub(crate) occupancies: BTreeMap<OccupancyId, Occupancy>,
    pub(crate) next_booking: u64,
    pub(crate) next_occupancy: u64,
}

/// Ledger backed by process memory.
///
/// Cheap to clone; clones share the same state. Use
/// [`LedgerSnapshot`](super::LedgerSnapshot) to persist across runs.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLedger {
    inner: Arc<Mutex<LedgerState>>,
}

impl InMemoryLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, LedgerState> {
        // A poisoned lock means a panic mid-read; state writes are
        // all-or-nothing, so the data is still coherent.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn with_state<T>(&self, f: impl FnOnce(&mut LedgerState) -> T) -> T {
        f(&mut self.state())
    }

    /// All occupancies in creation order. Intended for diagnostics and
    /// invariant checks in tests.
    pub fn all_occupancies(&self) -> Vec<Occupancy> {
        self.state().occupancies.values().cloned().collect()
    }

    /// Number of bookings recorded.
    pub fn booking_count(&self) -> usize {
        self.state().bookings.len()
    }

    /// Check whether `occupancy` (being moved to Confirmed on `seat`)
    /// would overlap any other Confirmed occupancy of the same vehicle,
    /// seat and date, considering the overlay of pending updates.
    fn exclusivity_violation(
        state: &LedgerState,
        updates: &HashMap<OccupancyId, Occupancy>,
        candidate: &Occupancy,
        seat: &SeatId,
    ) -> Option<OccupancyId> {
        state
            .occupancies
            .values()
            .map(|o| updates.get(&o.id).unwrap_or(o))
            .find(|o| {
                o.id != candidate.id
                    && o.vehicle == candidate.vehicle
                    && o.occupies(seat, candidate.travel_date)
                    && o.segment.overlaps(&candidate.segment)
            })
            .map(|o| o.id)
    }
}

impl Ledger for InMemoryLedger {
    async fn booking(&self, locator: Locator) -> Result<Booking, LedgerError> {
        self.state()
            .bookings
            .get(&locator)
            .cloned()
            .ok_or(LedgerError::BookingNotFound(locator))
    }

    async fn occupancies_for(&self, locator: Locator) -> Result<Vec<Occupancy>, LedgerError> {
        let state = self.state();
        let booking = state
            .bookings
            .get(&locator)
            .ok_or(LedgerError::BookingNotFound(locator))?;

        booking
            .occupancies
            .iter()
            .map(|id| {
                state
                    .occupancies
                    .get(id)
                    .cloned()
                    .ok_or(LedgerError::OccupancyNotFound(*id))
            })
            .collect()
    }

    async fn confirmed_on_seat(
        &self,
        vehicle: VehicleId,
        seat: SeatId,
        date: NaiveDate,
    ) -> Result<Vec<Occupancy>, LedgerError> {
        Ok(self
            .state()
            .occupancies
            .values()
            .filter(|o| o.vehicle == vehicle && o.occupies(&seat, date))
            .cloned()
            .collect())
    }

    async fn waiting_entries(
        &self,
        vehicle: VehicleId,
        class: TravelClass,
        date: NaiveDate,
    ) -> Result<Vec<Occupancy>, LedgerError> {
        Ok(self
            .state()
            .occupancies
            .values()
            .filter(|o| {
                o.is_waiting()
                    && o.vehicle == vehicle
                    && o.class == class
                    && o.travel_date == date
            })
            .cloned()
            .collect())
    }

    async fn save_booking(
        &self,
        draft: BookingDraft,
    ) -> Result<(Booking, Vec<Occupancy>), LedgerError> {
        if draft.passengers.is_empty() {
            return Err(LedgerError::Conflict(
                "booking must create at least one occupancy".to_string(),
            ));
        }
        for p in &draft.passengers {
            match p.status {
                OccupancyStatus::Confirmed if p.seat.is_none() => {
                    return Err(LedgerError::Conflict(
                        "confirmed occupancy without a seat".to_string(),
                    ));
                }
                OccupancyStatus::Waiting if p.seat.is_some() => {
                    return Err(LedgerError::Conflict(
                        "waiting occupancy with a seat".to_string(),
                    ));
                }
                OccupancyStatus::Cancelled => {
                    return Err(LedgerError::Conflict(
                        "cannot create a cancelled occupancy".to_string(),
                    ));
                }
                _ => {}
            }
        }

        let mut state = self.state();

        // Defensive exclusivity check, within the batch and against
        // committed state. The engine's vehicle lock should make this
        // unreachable.
        for (i, p) in draft.passengers.iter().enumerate() {
            let Some(seat) = &p.seat else { continue };

            let against_batch = draft.passengers[..i]
                .iter()
                .any(|q| q.seat.as_ref() == Some(seat));
            let against_state = state.occupancies.values().any(|o| {
                o.vehicle == draft.vehicle
                    && o.occupies(seat, draft.travel_date)
                    && o.segment.overlaps(&draft.segment)
            });
            if against_batch || against_state {
                return Err(LedgerError::Conflict(format!(
                    "seat {seat} already confirmed for an overlapping segment"
                )));
            }
        }

        let locator = Locator::from_index(state.next_booking);
        if state.bookings.contains_key(&locator) {
            // Locators wrap after 36^6 bookings.
            return Err(LedgerError::Conflict(format!(
                "locator {locator} already in use"
            )));
        }
        state.next_booking += 1;

        let mut occupancies = Vec::with_capacity(draft.passengers.len());
        for p in draft.passengers {
            let id = OccupancyId(state.next_occupancy);
            state.next_occupancy += 1;
            occupancies.push(Occupancy {
                id,
                booking: locator,
                vehicle: draft.vehicle,
                travel_date: draft.travel_date,
                class: draft.class,
                segment: draft.segment,
                passenger: p.passenger,
                seat: p.seat,
                status: p.status,
            });
        }

        let booking = Booking {
            locator,
            vehicle: draft.vehicle,
            travel_date: draft.travel_date,
            class: draft.class,
            segment: draft.segment,
            contact: draft.contact,
            total_price: draft.total_price,
            occupancies: occupancies.iter().map(|o| o.id).collect(),
        };

        state.bookings.insert(locator, booking.clone());
        for o in &occupancies {
            state.occupancies.insert(o.id, o.clone());
        }

        Ok((booking, occupancies))
    }

    async fn apply_transitions(
        &self,
        transitions: &[OccupancyTransition],
    ) -> Result<Vec<Occupancy>, LedgerError> {
        let mut state = self.state();

        // Validate the whole batch against an overlay of pending
        // updates; commit only if every transition is legal.
        let mut updates: HashMap<OccupancyId, Occupancy> = HashMap::new();

        for t in transitions {
            let current = updates
                .get(&t.occupancy)
                .or_else(|| state.occupancies.get(&t.occupancy))
                .cloned()
                .ok_or(LedgerError::OccupancyNotFound(t.occupancy))?;

            if !current.status.can_transition_to(t.to) {
                return Err(LedgerError::Conflict(format!(
                    "occupancy {} cannot move from {} to {}",
                    current.id, current.status, t.to
                )));
            }

            let mut next = current;
            next.status = t.to;

            if t.to == OccupancyStatus::Confirmed {
                let seat = t.seat.clone().ok_or_else(|| {
                    LedgerError::Conflict(format!(
                        "promotion of occupancy {} names no seat",
                        next.id
                    ))
                })?;
                if let Some(holder) =
                    Self::exclusivity_violation(&state, &updates, &next, &seat)
                {
                    return Err(LedgerError::Conflict(format!(
                        "seat {seat} overlaps occupancy {holder}"
                    )));
                }
                next.seat = Some(seat);
            } else if let Some(seat) = &t.seat {
                next.seat = Some(seat.clone());
            }

            updates.insert(next.id, next);
        }

        for occupancy in updates.values() {
            state.occupancies.insert(occupancy.id, occupancy.clone());
        }

        Ok(transitions
            .iter()
            .map(|t| state.occupancies[&t.occupancy].clone())
            .collect())
    }
}
