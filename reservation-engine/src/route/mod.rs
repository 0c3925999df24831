//! Route and schedule lookup.
//!
//! A vehicle's route is an ordered list of stops at strictly increasing
//! distances from the origin. Routes are defined at fleet-configuration
//! time and are immutable afterwards, which is what makes the cached
//! provider in [`cache`] safe.

mod cache;
mod error;
mod index;
mod memory;

use std::sync::Arc;

pub use cache::{CachedRouteProvider, RouteCacheConfig};
pub use error::RouteError;
pub use index::RouteIndex;
pub use memory::{InvalidRoute, StaticRoutes};

use crate::domain::{StationCode, VehicleId};

/// A stop on a vehicle's route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteStop {
    /// Station at this stop.
    pub station: StationCode,
    /// Distance from the route's origin.
    pub distance: u32,
}

impl RouteStop {
    /// Create a route stop.
    pub fn new(station: StationCode, distance: u32) -> Self {
        Self { station, distance }
    }
}

/// Provider of route data for vehicles (external collaborator).
///
/// Returns the ordered stops of a vehicle's route. Implementations may
/// suspend on I/O; the returned list is shared behind an `Arc` so that
/// caching layers can hand out the same data repeatedly.
pub trait RouteProvider {
    /// Get the ordered stops for a vehicle's route.
    fn stops(
        &self,
        vehicle: VehicleId,
    ) -> impl Future<Output = Result<Arc<Vec<RouteStop>>, RouteError>> + Send;
}
