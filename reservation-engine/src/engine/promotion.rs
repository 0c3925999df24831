//! Waitlist promotion after cancellation.

use crate::domain::{Occupancy, SeatId, Segment};
use crate::ledger::{Ledger, LedgerError, OccupancyTransition};

/// First waiting entry whose segment overlaps no survivor segment.
fn first_promotable<'a>(waiting: &'a [Occupancy], survivors: &[Segment]) -> Option<&'a Occupancy> {
    waiting
        .iter()
        .find(|w| survivors.iter().all(|s| !s.overlaps(&w.segment)))
}

/// Plan promotions for the seats freed by `cancelled`.
///
/// For each cancelled occupancy that held a seat, the seat's surviving
/// Confirmed occupancies are re-fetched and the waitlist for the same
/// vehicle, class and date is scanned in queue order for the first
/// entry whose segment fits. One freed seat promotes at most one
/// passenger per pass. Promotions planned earlier in the same pass
/// count as survivors of their seat and are no longer waitlist
/// candidates, so a multi-cancellation pass can never plan two
/// conflicting promotions.
///
/// Entries formerly Waiting carry no seat and free nothing; the let-else
/// skips them.
pub(crate) async fn plan_promotions<L: Ledger>(
    ledger: &L,
    cancelled: &[Occupancy],
) -> Result<Vec<OccupancyTransition>, LedgerError> {
    let mut planned: Vec<(Occupancy, SeatId)> = Vec::new();

    for freed in cancelled {
        let Some(seat) = &freed.seat else { continue };

        let mut survivors: Vec<Segment> = ledger
            .confirmed_on_seat(freed.vehicle, seat.clone(), freed.travel_date)
            .await?
            .iter()
            .map(|o| o.segment)
            .collect();
        survivors.extend(
            planned
                .iter()
                .filter(|(p, s)| {
                    s == seat && p.vehicle == freed.vehicle && p.travel_date == freed.travel_date
                })
                .map(|(p, _)| p.segment),
        );

        let waiting: Vec<Occupancy> = ledger
            .waiting_entries(freed.vehicle, freed.class, freed.travel_date)
            .await?
            .into_iter()
            .filter(|w| !planned.iter().any(|(p, _)| p.id == w.id))
            .collect();

        if let Some(candidate) = first_promotable(&waiting, &survivors) {
            tracing::debug!(
                occupancy = %candidate.id,
                seat = %seat,
                "waitlist promotion planned"
            );
            planned.push((candidate.clone(), seat.clone()));
        }
    }

    Ok(planned
        .into_iter()
        .map(|(p, seat)| OccupancyTransition::promote(p.id, seat))
        .collect())
}
