//! End-to-end tests of the booking and cancellation paths, wired with
//! the in-memory collaborators.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use futures::future::join_all;

use crate::catalog::{CatalogError, StaticCatalog};
use crate::domain::{
    CoachCode, Occupancy, OccupancyStatus, Passenger, SeatId, StationCode, TravelClass, VehicleId,
};
use crate::ledger::{InMemoryLedger, LedgerError};
use crate::notify::{Notification, NullSink, RecordingSink};
use crate::route::{RouteError, RouteStop, StaticRoutes};

use super::{BookingRequest, CancellationRequest, ReservationEngine, ReservationError};

const VEHICLE: VehicleId = VehicleId(12301);

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 9, 1).unwrap()
}

fn station(s: &str) -> StationCode {
    StationCode::parse(s).unwrap()
}

fn class(s: &str) -> TravelClass {
    TravelClass::parse(s).unwrap()
}

fn seat(n: u16) -> SeatId {
    SeatId::new(CoachCode::parse("S1").unwrap(), n).unwrap()
}

type TestEngine = ReservationEngine<StaticRoutes, StaticCatalog, InMemoryLedger, RecordingSink>;

/// One vehicle on NDLS (0) → CNB (30) → ALD (60), one SL coach.
fn engine_with(seat_count: u16) -> TestEngine {
    let mut routes = StaticRoutes::new();
    routes
        .add_route(
            VEHICLE,
            vec![
                RouteStop::new(station("NDLS"), 0),
                RouteStop::new(station("CNB"), 30),
                RouteStop::new(station("ALD"), 60),
            ],
        )
        .unwrap();

    let mut catalog = StaticCatalog::new();
    catalog.add_coach(VEHICLE, class("SL"), CoachCode::parse("S1").unwrap(), seat_count);

    ReservationEngine::new(routes, catalog, InMemoryLedger::new(), RecordingSink::new())
}

fn request(passengers: &[&str], contact: &str, board: &str, alight: &str) -> BookingRequest {
    BookingRequest {
        vehicle: VEHICLE,
        travel_date: date(),
        class: class("SL"),
        board: station(board),
        alight: station(alight),
        passengers: passengers.iter().map(|n| Passenger::new(*n)).collect(),
        contact: contact.to_string(),
        fare_per_passenger: 1000,
    }
}

fn cancel_all(outcome: &super::BookingOutcome, contact: &str) -> CancellationRequest {
    CancellationRequest {
        locator: outcome.booking.locator,
        contact: contact.to_string(),
        occupancies: Vec::new(),
    }
}

/// No two Confirmed occupancies of the same (vehicle, seat, date) may
/// overlap.
fn assert_seat_exclusivity(occupancies: &[Occupancy]) {
    let mut by_seat: HashMap<_, Vec<&Occupancy>> = HashMap::new();
    for o in occupancies.iter().filter(|o| o.is_confirmed()) {
        if let Some(seat) = &o.seat {
            by_seat
                .entry((o.vehicle, seat.clone(), o.travel_date))
                .or_default()
                .push(o);
        }
    }
    for ((_, seat, _), holders) in &by_seat {
        for (i, a) in holders.iter().enumerate() {
            for b in &holders[i + 1..] {
                assert!(
                    !a.segment.overlaps(&b.segment),
                    "seat {seat} double-booked: {} and {}",
                    a.id,
                    b.id
                );
            }
        }
    }
}

#[tokio::test]
async fn overlapping_request_on_full_seat_is_waitlisted() {
    let engine = engine_with(1);

    let first = engine.book(request(&["A"], "a@x.com", "NDLS", "ALD")).await.unwrap();
    assert_eq!(first.confirmed_count(), 1);
    assert_eq!(first.occupancies[0].seat, Some(seat(1)));

    let second = engine.book(request(&["B"], "b@x.com", "CNB", "ALD")).await.unwrap();
    assert_eq!(second.confirmed_count(), 0);
    assert_eq!(second.waiting_count(), 1);
    assert_eq!(second.occupancies[0].seat, None);

    assert_seat_exclusivity(&engine.ledger().all_occupancies());
}

#[tokio::test]
async fn disjoint_segments_share_one_seat() {
    let engine = engine_with(1);

    let first = engine.book(request(&["A"], "a@x.com", "NDLS", "CNB")).await.unwrap();
    let second = engine.book(request(&["B"], "b@x.com", "CNB", "ALD")).await.unwrap();

    assert_eq!(first.confirmed_count(), 1);
    assert_eq!(second.confirmed_count(), 1);
    assert_eq!(first.occupancies[0].seat, second.occupancies[0].seat);
    assert_seat_exclusivity(&engine.ledger().all_occupancies());
}

#[tokio::test]
async fn cancellation_promotes_waiting_passenger() {
    let engine = engine_with(1);

    let first = engine.book(request(&["A"], "a@x.com", "NDLS", "ALD")).await.unwrap();
    let second = engine.book(request(&["B"], "b@x.com", "CNB", "ALD")).await.unwrap();
    assert_eq!(second.waiting_count(), 1);

    let outcome = engine.cancel(cancel_all(&first, "a@x.com")).await.unwrap();
    assert_eq!(outcome.cancelled.len(), 1);
    assert_eq!(outcome.promoted.len(), 1);

    let promoted = &outcome.promoted[0];
    assert_eq!(promoted.id, second.occupancies[0].id);
    assert!(promoted.is_confirmed());
    assert_eq!(promoted.seat, Some(seat(1)));

    let events = engine.notifier().events();
    assert!(events.contains(&Notification::Promoted {
        occupancy: promoted.id,
        seat: Some(seat(1)),
    }));
    assert_seat_exclusivity(&engine.ledger().all_occupancies());
}

#[tokio::test]
async fn promotion_blocked_by_surviving_leg() {
    let engine = engine_with(1);

    // Seat 1 carries two touching legs; a full-route party waits.
    let first_leg = engine.book(request(&["A"], "a@x.com", "NDLS", "CNB")).await.unwrap();
    let _second_leg = engine.book(request(&["B"], "b@x.com", "CNB", "ALD")).await.unwrap();
    let full = engine.book(request(&["C"], "c@x.com", "NDLS", "ALD")).await.unwrap();
    assert_eq!(full.waiting_count(), 1);

    // Freeing [0, 30) is not enough: the survivor on [30, 60) still
    // conflicts with the full-route waiter.
    let outcome = engine.cancel(cancel_all(&first_leg, "a@x.com")).await.unwrap();
    assert_eq!(outcome.cancelled.len(), 1);
    assert!(outcome.promoted.is_empty());

    let occupancies = engine.ledger().all_occupancies();
    let still_waiting = occupancies
        .iter()
        .find(|o| o.id == full.occupancies[0].id)
        .unwrap();
    assert!(still_waiting.is_waiting());
}

#[tokio::test]
async fn party_larger_than_capacity_splits_in_request_order() {
    let engine = engine_with(1);

    let outcome = engine
        .book(request(&["A", "B", "C"], "a@x.com", "NDLS", "ALD"))
        .await
        .unwrap();

    assert_eq!(outcome.confirmed_count(), 1);
    assert_eq!(outcome.waiting_count(), 2);
    assert!(outcome.occupancies[0].is_confirmed());
    assert_eq!(outcome.occupancies[0].passenger.name, "A");
    assert!(outcome.occupancies[1].is_waiting());
    assert!(outcome.occupancies[2].is_waiting());
    assert_eq!(outcome.booking.total_price, 3000);
}

#[tokio::test]
async fn confirmed_count_is_min_of_party_and_seats() {
    let engine = engine_with(3);

    let outcome = engine
        .book(request(&["A", "B", "C", "D", "E"], "a@x.com", "NDLS", "ALD"))
        .await
        .unwrap();

    assert_eq!(outcome.confirmed_count(), 3);
    assert_eq!(outcome.waiting_count(), 2);
    assert_eq!(outcome.occupancies.len(), 5);
}

#[tokio::test]
async fn full_vehicle_booking_succeeds_with_everyone_waiting() {
    let engine = engine_with(1);
    engine.book(request(&["A"], "a@x.com", "NDLS", "ALD")).await.unwrap();

    let outcome = engine
        .book(request(&["B", "C"], "b@x.com", "NDLS", "ALD"))
        .await
        .unwrap();
    assert_eq!(outcome.confirmed_count(), 0);
    assert_eq!(outcome.waiting_count(), 2);

    let events = engine.notifier().events();
    assert!(events.contains(&Notification::BookingCompleted {
        locator: outcome.booking.locator,
        confirmed: 0,
        waiting: 2,
    }));
}

#[tokio::test]
async fn availability_query_matches_booking_outcome() {
    let engine = engine_with(2);
    engine.book(request(&["A"], "a@x.com", "NDLS", "ALD")).await.unwrap();

    let free = engine
        .available_seats(VEHICLE, class("SL"), date(), station("CNB"), station("ALD"))
        .await
        .unwrap();
    assert_eq!(free, vec![seat(2)]);

    // The query is a pure read.
    let again = engine
        .available_seats(VEHICLE, class("SL"), date(), station("CNB"), station("ALD"))
        .await
        .unwrap();
    assert_eq!(free, again);

    let outcome = engine.book(request(&["B"], "b@x.com", "CNB", "ALD")).await.unwrap();
    assert_eq!(outcome.occupancies[0].seat, Some(seat(2)));
}

#[tokio::test]
async fn waitlist_promotes_in_queue_order() {
    let engine = engine_with(1);

    let first = engine.book(request(&["A"], "a@x.com", "NDLS", "ALD")).await.unwrap();
    let w1 = engine.book(request(&["B"], "b@x.com", "NDLS", "ALD")).await.unwrap();
    let _w2 = engine.book(request(&["C"], "c@x.com", "NDLS", "ALD")).await.unwrap();

    let outcome = engine.cancel(cancel_all(&first, "a@x.com")).await.unwrap();
    assert_eq!(outcome.promoted.len(), 1);
    assert_eq!(outcome.promoted[0].id, w1.occupancies[0].id);
}

#[tokio::test]
async fn whole_booking_cancellation_refunds_total() {
    let engine = engine_with(2);
    let outcome = engine
        .book(request(&["A", "B"], "a@x.com", "NDLS", "ALD"))
        .await
        .unwrap();
    assert_eq!(outcome.booking.total_price, 2000);

    let cancelled = engine.cancel(cancel_all(&outcome, "a@x.com")).await.unwrap();
    assert_eq!(cancelled.cancelled.len(), 2);
    assert_eq!(cancelled.refund, 2000);

    let events = engine.notifier().events();
    assert!(events.contains(&Notification::Cancelled {
        locator: outcome.booking.locator,
        cancelled: 2,
        refund: 2000,
    }));
}

#[tokio::test]
async fn partial_cancellation_refunds_per_passenger_share() {
    let engine = engine_with(2);
    let outcome = engine
        .book(request(&["A", "B"], "a@x.com", "NDLS", "ALD"))
        .await
        .unwrap();

    let cancelled = engine
        .cancel(CancellationRequest {
            locator: outcome.booking.locator,
            contact: "a@x.com".to_string(),
            occupancies: vec![outcome.occupancies[1].id],
        })
        .await
        .unwrap();
    assert_eq!(cancelled.cancelled.len(), 1);
    assert_eq!(cancelled.refund, 1000);

    // The other occupancy is untouched.
    let remaining = engine.ledger().all_occupancies();
    let kept = remaining
        .iter()
        .find(|o| o.id == outcome.occupancies[0].id)
        .unwrap();
    assert!(kept.is_confirmed());
}

#[tokio::test]
async fn duplicate_cancellation_targets_collapse() {
    let engine = engine_with(1);
    let outcome = engine.book(request(&["A"], "a@x.com", "NDLS", "ALD")).await.unwrap();
    let id = outcome.occupancies[0].id;

    let cancelled = engine
        .cancel(CancellationRequest {
            locator: outcome.booking.locator,
            contact: "a@x.com".to_string(),
            occupancies: vec![id, id, id],
        })
        .await
        .unwrap();
    assert_eq!(cancelled.cancelled.len(), 1);
    assert_eq!(cancelled.refund, 1000);
}

#[tokio::test]
async fn repeated_whole_booking_cancellation_is_a_no_op() {
    let engine = engine_with(1);
    let outcome = engine.book(request(&["A"], "a@x.com", "NDLS", "ALD")).await.unwrap();

    engine.cancel(cancel_all(&outcome, "a@x.com")).await.unwrap();
    let second = engine.cancel(cancel_all(&outcome, "a@x.com")).await.unwrap();
    assert!(second.cancelled.is_empty());
    assert_eq!(second.refund, 0);
}

#[tokio::test]
async fn cancelling_a_cancelled_occupancy_conflicts() {
    let engine = engine_with(1);
    let outcome = engine.book(request(&["A"], "a@x.com", "NDLS", "ALD")).await.unwrap();
    let id = outcome.occupancies[0].id;

    let explicit = CancellationRequest {
        locator: outcome.booking.locator,
        contact: "a@x.com".to_string(),
        occupancies: vec![id],
    };
    engine.cancel(explicit.clone()).await.unwrap();

    let err = engine.cancel(explicit).await.unwrap_err();
    assert!(matches!(
        err,
        ReservationError::Ledger(LedgerError::Conflict(_))
    ));
}

#[tokio::test]
async fn booking_request_errors() {
    let engine = engine_with(1);

    let err = engine.book(request(&[], "a@x.com", "NDLS", "ALD")).await.unwrap_err();
    assert!(matches!(err, ReservationError::NoPassengers));

    let mut bad_vehicle = request(&["A"], "a@x.com", "NDLS", "ALD");
    bad_vehicle.vehicle = VehicleId(99999);
    let err = engine.book(bad_vehicle).await.unwrap_err();
    assert!(matches!(
        err,
        ReservationError::Route(RouteError::VehicleNotFound(VehicleId(99999)))
    ));

    let err = engine.book(request(&["A"], "a@x.com", "CNB", "CNB")).await.unwrap_err();
    assert!(matches!(
        err,
        ReservationError::Route(RouteError::EmptySegment { .. })
    ));

    let err = engine.book(request(&["A"], "a@x.com", "NDLS", "BCT")).await.unwrap_err();
    assert!(matches!(
        err,
        ReservationError::Route(RouteError::StopNotFound { .. })
    ));

    let mut bad_class = request(&["A"], "a@x.com", "NDLS", "ALD");
    bad_class.class = class("1A");
    let err = engine.book(bad_class).await.unwrap_err();
    assert!(matches!(
        err,
        ReservationError::Catalog(CatalogError::ClassNotOffered { .. })
    ));
}

#[tokio::test]
async fn cancellation_request_errors() {
    let engine = engine_with(1);
    let outcome = engine.book(request(&["A"], "a@x.com", "NDLS", "ALD")).await.unwrap();
    let other = engine.book(request(&["B"], "b@x.com", "CNB", "ALD")).await.unwrap();

    let err = engine
        .cancel(CancellationRequest {
            locator: crate::domain::Locator::from_index(999),
            contact: "a@x.com".to_string(),
            occupancies: Vec::new(),
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ReservationError::Ledger(LedgerError::BookingNotFound(_))
    ));

    let err = engine.cancel(cancel_all(&outcome, "mallory@x.com")).await.unwrap_err();
    assert!(matches!(err, ReservationError::Unauthorized(_)));

    let err = engine
        .cancel(CancellationRequest {
            locator: outcome.booking.locator,
            contact: "a@x.com".to_string(),
            occupancies: vec![other.occupancies[0].id],
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ReservationError::ForeignOccupancy { .. }));

    // Neither failed request changed any state.
    let occupancies = engine.ledger().all_occupancies();
    assert!(occupancies.iter().all(|o| !matches!(o.status, OccupancyStatus::Cancelled)));
}

#[tokio::test]
async fn failing_notifier_does_not_fail_requests() {
    let mut routes = StaticRoutes::new();
    routes
        .add_route(
            VEHICLE,
            vec![
                RouteStop::new(station("NDLS"), 0),
                RouteStop::new(station("CNB"), 30),
                RouteStop::new(station("ALD"), 60),
            ],
        )
        .unwrap();
    let mut catalog = StaticCatalog::new();
    catalog.add_coach(VEHICLE, class("SL"), CoachCode::parse("S1").unwrap(), 1);

    let engine =
        ReservationEngine::new(routes, catalog, InMemoryLedger::new(), RecordingSink::failing());

    let outcome = engine.book(request(&["A"], "a@x.com", "NDLS", "ALD")).await.unwrap();
    let cancelled = engine.cancel(cancel_all(&outcome, "a@x.com")).await.unwrap();
    assert_eq!(cancelled.cancelled.len(), 1);

    // Deliveries were attempted despite failing.
    assert_eq!(engine.notifier().events().len(), 2);
}

#[tokio::test]
async fn seat_is_rebookable_after_full_cancellation() {
    let engine = engine_with(1);

    let first = engine.book(request(&["A"], "a@x.com", "NDLS", "ALD")).await.unwrap();
    engine.cancel(cancel_all(&first, "a@x.com")).await.unwrap();

    let second = engine.book(request(&["B"], "b@x.com", "NDLS", "ALD")).await.unwrap();
    assert_eq!(second.confirmed_count(), 1);
    assert_eq!(second.occupancies[0].seat, Some(seat(1)));
    assert_seat_exclusivity(&engine.ledger().all_occupancies());
}

#[tokio::test]
async fn promotion_chain_across_successive_cancellations() {
    let engine = engine_with(1);

    let a = engine.book(request(&["A"], "a@x.com", "NDLS", "ALD")).await.unwrap();
    let b = engine.book(request(&["B"], "b@x.com", "NDLS", "ALD")).await.unwrap();
    let c = engine.book(request(&["C"], "c@x.com", "NDLS", "ALD")).await.unwrap();

    let first = engine.cancel(cancel_all(&a, "a@x.com")).await.unwrap();
    assert_eq!(first.promoted[0].id, b.occupancies[0].id);

    let second = engine.cancel(cancel_all(&b, "b@x.com")).await.unwrap();
    assert_eq!(second.promoted[0].id, c.occupancies[0].id);

    assert_seat_exclusivity(&engine.ledger().all_occupancies());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_bookings_never_double_book() {
    let mut routes = StaticRoutes::new();
    routes
        .add_route(
            VEHICLE,
            vec![
                RouteStop::new(station("NDLS"), 0),
                RouteStop::new(station("CNB"), 30),
                RouteStop::new(station("ALD"), 60),
            ],
        )
        .unwrap();
    let mut catalog = StaticCatalog::new();
    catalog.add_coach(VEHICLE, class("SL"), CoachCode::parse("S1").unwrap(), 3);

    let engine = Arc::new(ReservationEngine::new(
        routes,
        catalog,
        InMemoryLedger::new(),
        NullSink,
    ));

    let tasks: Vec<_> = (0..8)
        .map(|i| {
            let engine = engine.clone();
            tokio::spawn(async move {
                engine
                    .book(request(&[&format!("P{i}")], "p@x.com", "NDLS", "ALD"))
                    .await
                    .unwrap()
            })
        })
        .collect();

    let outcomes: Vec<_> = join_all(tasks)
        .await
        .into_iter()
        .map(|r| r.unwrap())
        .collect();

    let confirmed: usize = outcomes.iter().map(|o| o.confirmed_count()).sum();
    let waiting: usize = outcomes.iter().map(|o| o.waiting_count()).sum();
    assert_eq!(confirmed, 3);
    assert_eq!(waiting, 5);
    assert_seat_exclusivity(&engine.ledger().all_occupancies());
}
