//! Seat and coach catalog lookup.
//!
//! The catalog is an external collaborator that knows which seats each
//! vehicle offers, grouped by accommodation class. Seat lists come back
//! in catalog order, which the allocation engine uses as its assignment
//! tie-break, so implementations must return a stable order.

mod memory;

use std::sync::Arc;

pub use memory::StaticCatalog;

use crate::domain::{SeatId, TravelClass, VehicleId};

/// Errors from seat catalog lookup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    /// The vehicle has no seat configuration
    #[error("vehicle {0} has no seat configuration")]
    VehicleNotFound(VehicleId),

    /// The vehicle does not offer the requested class
    #[error("class {class} is not offered on vehicle {vehicle}")]
    ClassNotOffered {
        vehicle: VehicleId,
        class: TravelClass,
    },
}

/// Catalog of seats per vehicle and class (external collaborator).
pub trait SeatCatalog {
    /// Get the seats of `class` on `vehicle`, in catalog order.
    fn seats(
        &self,
        vehicle: VehicleId,
        class: TravelClass,
    ) -> impl Future<Output = Result<Arc<Vec<SeatId>>, CatalogError>> + Send;
}
