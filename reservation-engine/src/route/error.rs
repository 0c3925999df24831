//! Route lookup error types.

use crate::domain::{StationCode, VehicleId};

/// Errors from route resolution.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    /// No route is defined for the vehicle
    #[error("vehicle {0} has no route defined")]
    VehicleNotFound(VehicleId),

    /// The stop is not on the vehicle's route
    #[error("stop {station} is not on the route of vehicle {vehicle}")]
    StopNotFound {
        vehicle: VehicleId,
        station: StationCode,
    },

    /// Boarding and alighting stops describe a zero-length journey
    #[error("stops {board} and {alight} describe a zero-length journey on vehicle {vehicle}")]
    EmptySegment {
        vehicle: VehicleId,
        board: StationCode,
        alight: StationCode,
    },
}
