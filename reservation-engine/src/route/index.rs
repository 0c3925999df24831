//! Route distance index: stop distances and segment resolution.

use crate::domain::{Segment, StationCode, VehicleId};

use super::{RouteError, RouteProvider};

/// Pure lookup over a route provider: distances from origin and segment
/// resolution for two stops. Holds no state of its own.
pub struct RouteIndex<P> {
    provider: P,
}

impl<P: RouteProvider> RouteIndex<P> {
    /// Create an index over the given provider.
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Distance from the route origin to `station` on `vehicle`'s route.
    pub async fn distance(
        &self,
        vehicle: VehicleId,
        station: StationCode,
    ) -> Result<u32, RouteError> {
        let stops = self.provider.stops(vehicle).await?;
        stops
            .iter()
            .find(|stop| stop.station == station)
            .map(|stop| stop.distance)
            .ok_or(RouteError::StopNotFound { vehicle, station })
    }

    /// Resolve two stops into the half-open segment between them.
    ///
    /// The stops may be given in either order; a zero-length journey is
    /// rejected. One provider fetch serves both lookups.
    pub async fn resolve_segment(
        &self,
        vehicle: VehicleId,
        board: StationCode,
        alight: StationCode,
    ) -> Result<Segment, RouteError> {
        let stops = self.provider.stops(vehicle).await?;

        let find = |station: StationCode| {
            stops
                .iter()
                .find(|stop| stop.station == station)
                .map(|stop| stop.distance)
                .ok_or(RouteError::StopNotFound { vehicle, station })
        };

        let from = find(board)?;
        let to = find(alight)?;

        Segment::between(from, to).map_err(|_| RouteError::EmptySegment {
            vehicle,
            board,
            alight,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::{RouteStop, StaticRoutes};

    fn station(s: &str) -> StationCode {
        StationCode::parse(s).unwrap()
    }

    fn routes() -> StaticRoutes {
        let mut routes = StaticRoutes::new();
        routes
            .add_route(
                VehicleId(12301),
                vec![
                    RouteStop::new(station("NDLS"), 0),
                    RouteStop::new(station("CNB"), 30),
                    RouteStop::new(station("ALD"), 60),
                ],
            )
            .unwrap();
        routes
    }

    #[tokio::test]
    async fn distance_lookup() {
        let index = RouteIndex::new(routes());
        assert_eq!(
            index.distance(VehicleId(12301), station("NDLS")).await,
            Ok(0)
        );
        assert_eq!(
            index.distance(VehicleId(12301), station("ALD")).await,
            Ok(60)
        );
    }

    #[tokio::test]
    async fn distance_unknown_stop() {
        let index = RouteIndex::new(routes());
        let err = index
            .distance(VehicleId(12301), station("BCT"))
            .await
            .unwrap_err();
        assert!(matches!(err, RouteError::StopNotFound { .. }));
    }

    #[tokio::test]
    async fn distance_unknown_vehicle() {
        let index = RouteIndex::new(routes());
        let err = index
            .distance(VehicleId(99999), station("NDLS"))
            .await
            .unwrap_err();
        assert_eq!(err, RouteError::VehicleNotFound(VehicleId(99999)));
    }

    #[tokio::test]
    async fn resolve_segment_orders_stops() {
        let index = RouteIndex::new(routes());
        let forward = index
            .resolve_segment(VehicleId(12301), station("NDLS"), station("ALD"))
            .await
            .unwrap();
        let backward = index
            .resolve_segment(VehicleId(12301), station("ALD"), station("NDLS"))
            .await
            .unwrap();
        assert_eq!(forward, backward);
        assert_eq!(forward.start(), 0);
        assert_eq!(forward.end(), 60);
    }

    #[tokio::test]
    async fn resolve_segment_rejects_same_stop() {
        let index = RouteIndex::new(routes());
        let err = index
            .resolve_segment(VehicleId(12301), station("CNB"), station("CNB"))
            .await
            .unwrap_err();
        assert!(matches!(err, RouteError::EmptySegment { .. }));
    }

    #[tokio::test]
    async fn resolve_segment_unknown_stop() {
        let index = RouteIndex::new(routes());
        let err = index
            .resolve_segment(VehicleId(12301), station("NDLS"), station("BCT"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RouteError::StopNotFound { station, .. } if station == StationCode::parse("BCT").unwrap()
        ));
    }
}
