//! Concurrency guard: the per-vehicle booking lock registry.
//!
//! Booking holds one async mutex per vehicle across its whole
//! compute-availability → allocate → persist sequence, so two requests
//! for the same vehicle can never both observe the same seat as free.
//! Requests for different vehicles proceed fully in parallel. Locks are
//! created on first use and retained for the engine's lifetime; the
//! registry map itself is guarded by a std mutex held only for the
//! clone-or-insert.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::Mutex as AsyncMutex;

use crate::domain::VehicleId;

/// Registry of per-vehicle booking locks.
#[derive(Debug, Default)]
pub(crate) struct VehicleLocks {
    inner: Mutex<HashMap<VehicleId, Arc<AsyncMutex<()>>>>,
}

impl VehicleLocks {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Lock handle for a vehicle, creating it on first use.
    pub(crate) fn for_vehicle(&self, vehicle: VehicleId) -> Arc<AsyncMutex<()>> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(vehicle)
            .or_default()
            .clone()
    }

    /// Number of vehicles with a registered lock.
    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
