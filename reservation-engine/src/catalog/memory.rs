//! In-memory seat catalog.

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::{CoachCode, SeatId, TravelClass, VehicleId};

use super::{CatalogError, SeatCatalog};

/// Seat catalog backed by an in-memory map.
///
/// Insertion order of classes and seats is preserved, so lookups return
/// a stable catalog order.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    vehicles: HashMap<VehicleId, Vec<(TravelClass, Arc<Vec<SeatId>>)>>,
}

impl StaticCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Define the seats of one class on a vehicle, in catalog order.
    ///
    /// Replaces any previous seat list for that class.
    pub fn add_class(&mut self, vehicle: VehicleId, class: TravelClass, seats: Vec<SeatId>) {
        let classes = self.vehicles.entry(vehicle).or_default();
        match classes.iter_mut().find(|(c, _)| *c == class) {
            Some((_, existing)) => *existing = Arc::new(seats),
            None => classes.push((class, Arc::new(seats))),
        }
    }

    /// Define a whole coach: seats `1..=count` of `class` in `coach`.
    pub fn add_coach(
        &mut self,
        vehicle: VehicleId,
        class: TravelClass,
        coach: CoachCode,
        count: u16,
    ) {
        let seats: Vec<SeatId> = (1..=count)
            .map(|n| SeatId::new(coach, n).expect("seat numbers start at 1"))
            .collect();

        let classes = self.vehicles.entry(vehicle).or_default();
        match classes.iter_mut().find(|(c, _)| *c == class) {
            Some((_, existing)) => {
                let mut merged = existing.as_ref().clone();
                merged.extend(seats);
                *existing = Arc::new(merged);
            }
            None => classes.push((class, Arc::new(seats))),
        }
    }
}

impl SeatCatalog for StaticCatalog {
    async fn seats(
        &self,
        vehicle: VehicleId,
        class: TravelClass,
    ) -> Result<Arc<Vec<SeatId>>, CatalogError> {
        let classes = self
            .vehicles
            .get(&vehicle)
            .ok_or(CatalogError::VehicleNotFound(vehicle))?;

        classes
            .iter()
            .find(|(c, _)| *c == class)
            .map(|(_, seats)| seats.clone())
            .ok_or(CatalogError::ClassNotOffered { vehicle, class })
    }
}
