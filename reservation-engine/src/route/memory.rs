//! In-memory route provider.
//!
//! Serves routes from a map, for tests and for deployments where the
//! schedule is loaded up front. Route definitions are validated on
//! insertion; lookups never re-check.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::domain::{StationCode, VehicleId};

use super::{RouteError, RouteProvider, RouteStop};

/// Error returned for a malformed route definition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidRoute {
    /// A route needs at least a boarding and an alighting stop
    #[error("route must have at least two stops")]
    TooFewStops,

    /// The first stop must be the origin
    #[error("route distances must start at 0")]
    MustStartAtOrigin,

    /// Distances must strictly increase along the route
    #[error("route distances must be strictly increasing")]
    NotIncreasing,

    /// The same station appears twice
    #[error("station {0} appears twice on the route")]
    DuplicateStop(StationCode),
}

/// Route provider backed by an in-memory map.
#[derive(Debug, Clone, Default)]
pub struct StaticRoutes {
    routes: HashMap<VehicleId, Arc<Vec<RouteStop>>>,
}

impl StaticRoutes {
    /// Create an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a vehicle's route.
    ///
    /// The stops must begin at distance 0, strictly increase, and not
    /// repeat a station. Replaces any previous route for the vehicle.
    pub fn add_route(
        &mut self,
        vehicle: VehicleId,
        stops: Vec<RouteStop>,
    ) -> Result<(), InvalidRoute> {
        if stops.len() < 2 {
            return Err(InvalidRoute::TooFewStops);
        }
        if stops[0].distance != 0 {
            return Err(InvalidRoute::MustStartAtOrigin);
        }
        for pair in stops.windows(2) {
            if pair[1].distance <= pair[0].distance {
                return Err(InvalidRoute::NotIncreasing);
            }
        }
        let mut seen = HashSet::new();
        for stop in &stops {
            if !seen.insert(stop.station) {
                return Err(InvalidRoute::DuplicateStop(stop.station));
            }
        }

        self.routes.insert(vehicle, Arc::new(stops));
        Ok(())
    }

    /// Number of routes defined.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Whether no routes are defined.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl RouteProvider for StaticRoutes {
    async fn stops(&self, vehicle: VehicleId) -> Result<Arc<Vec<RouteStop>>, RouteError> {
        self.routes
            .get(&vehicle)
            .cloned()
            .ok_or(RouteError::VehicleNotFound(vehicle))
    }
}
