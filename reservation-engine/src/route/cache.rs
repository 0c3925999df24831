//! Caching layer for route lookups.
//!
//! Routes are immutable once defined, so cached stop lists can never go
//! stale; the TTL only bounds memory for vehicles that stop being
//! queried. Booking traffic hits the same few routes repeatedly, which
//! is exactly the shape a per-vehicle cache serves well.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache as MokaCache;

use crate::domain::VehicleId;

use super::{RouteError, RouteProvider, RouteStop};

/// Configuration for the route cache.
#[derive(Debug, Clone)]
pub struct RouteCacheConfig {
    /// TTL for cached routes.
    pub ttl: Duration,

    /// Maximum number of cached routes.
    pub max_capacity: u64,
}

impl Default for RouteCacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(60 * 60),
            max_capacity: 4096,
        }
    }
}

/// Route provider with per-vehicle caching.
///
/// Wraps another provider and serves repeated stop-list lookups from a
/// moka cache. Lookup failures are not cached, so a vehicle that gains
/// a route later is picked up on the next call.
pub struct CachedRouteProvider<P> {
    inner: P,
    cache: MokaCache<VehicleId, Arc<Vec<RouteStop>>>,
}

impl<P: RouteProvider> CachedRouteProvider<P> {
    /// Create a caching wrapper around `inner`.
    pub fn new(inner: P, config: &RouteCacheConfig) -> Self {
        let cache = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self { inner, cache }
    }

    /// Number of cached routes (for monitoring).
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    /// Drop all cached routes.
    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }

    /// Access the wrapped provider.
    pub fn inner(&self) -> &P {
        &self.inner
    }
}

impl<P: RouteProvider + Sync> RouteProvider for CachedRouteProvider<P> {
    async fn stops(&self, vehicle: VehicleId) -> Result<Arc<Vec<RouteStop>>, RouteError> {
        if let Some(cached) = self.cache.get(&vehicle).await {
            return Ok(cached);
        }

        let stops = self.inner.stops(vehicle).await?;
        self.cache.insert(vehicle, stops.clone()).await;
        Ok(stops)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::StationCode;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Provider that counts how often it is asked.
    struct CountingProvider {
        stops: Arc<Vec<RouteStop>>,
        calls: AtomicUsize,
    }

    impl CountingProvider {
        fn new() -> Self {
            let stops = vec![
                RouteStop::new(StationCode::parse("NDLS").unwrap(), 0),
                RouteStop::new(StationCode::parse("CNB").unwrap(), 30),
            ];
            Self {
                stops: Arc::new(stops),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl RouteProvider for &CountingProvider {
        async fn stops(&self, vehicle: VehicleId) -> Result<Arc<Vec<RouteStop>>, RouteError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if vehicle == VehicleId(1) {
                Ok(self.stops.clone())
            } else {
                Err(RouteError::VehicleNotFound(vehicle))
            }
        }
    }

    #[tokio::test]
    async fn second_lookup_is_served_from_cache() {
        let provider = CountingProvider::new();
        let cached = CachedRouteProvider::new(&provider, &RouteCacheConfig::default());

        let first = cached.stops(VehicleId(1)).await.unwrap();
        let second = cached.stops(VehicleId(1)).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let provider = CountingProvider::new();
        let cached = CachedRouteProvider::new(&provider, &RouteCacheConfig::default());

        assert!(cached.stops(VehicleId(9)).await.is_err());
        assert!(cached.stops(VehicleId(9)).await.is_err());

        // Both misses went through to the provider.
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn invalidation_forces_refetch() {
        let provider = CountingProvider::new();
        let cached = CachedRouteProvider::new(&provider, &RouteCacheConfig::default());

        cached.stops(VehicleId(1)).await.unwrap();
        cached.invalidate_all();
        cached.stops(VehicleId(1)).await.unwrap();

        assert_eq!(provider.calls(), 2);
    }

    #[test]
    fn default_config() {
        let config = RouteCacheConfig::default();
        assert_eq!(config.ttl, Duration::from_secs(3600));
        assert_eq!(config.max_capacity, 4096);
    }
}
