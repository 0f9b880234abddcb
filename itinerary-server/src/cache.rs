//! Caching layer for routing oracle answers.
//!
//! A planning run asks for the same (origin, destination, departure) more
//! than once: overlapping candidate windows, repairs that land on an already
//! probed instant, and repeated plans for the same day. Answers are cached
//! for a few minutes, which keeps traffic predictions reasonably fresh.

use std::time::Duration;

use chrono::NaiveDateTime;
use moka::future::Cache as MokaCache;

use crate::domain::{Location, TravelEstimate};
use crate::planner::{OracleError, RoutingOracle};

/// Cache key for estimates: (origin, destination, departure).
type EstimateKey = (Location, Location, NaiveDateTime);

/// Configuration for the cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of cached entries.
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(5 * 60),
            max_capacity: 10_000,
        }
    }
}

/// Routing oracle with caching.
///
/// Wraps any `RoutingOracle` and caches successful estimates. Failures are
/// never cached, so a rate-limited query is retried next time it is asked.
pub struct CachedOracle<O> {
    inner: O,
    estimates: MokaCache<EstimateKey, TravelEstimate>,
}

impl<O: RoutingOracle> CachedOracle<O> {
    /// Create a new cached oracle.
    pub fn new(inner: O, config: &CacheConfig) -> Self {
        let estimates = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self { inner, estimates }
    }
}

impl<O: RoutingOracle> RoutingOracle for CachedOracle<O> {
    async fn estimate_travel(
        &self,
        origin: &Location,
        destination: &Location,
        departure: NaiveDateTime,
    ) -> Result<TravelEstimate, OracleError> {
        let key = (origin.clone(), destination.clone(), departure);

        if let Some(cached) = self.estimates.get(&key).await {
            return Ok(cached);
        }

        let estimate = self
            .inner
            .estimate_travel(origin, destination, departure)
            .await?;

        self.estimates.insert(key, estimate.clone()).await;

        Ok(estimate)
    }
}
