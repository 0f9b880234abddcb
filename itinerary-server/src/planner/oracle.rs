//! The routing oracle seam.
//!
//! The planner never talks to a routing API directly; it asks a
//! `RoutingOracle`. This abstraction allows the planner to be tested with
//! scripted responses.

use std::future::Future;
use std::sync::Arc;

use chrono::NaiveDateTime;
use tokio::time::Instant;

use crate::domain::{Location, TravelEstimate};

/// Why a single oracle query produced no estimate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OracleError {
    /// No route between the two locations
    #[error("no route found")]
    NotFound,

    /// The provider refused the query for quota reasons
    #[error("rate limited by routing provider")]
    RateLimited,

    /// The provider could not answer
    #[error("routing provider unavailable: {0}")]
    Unavailable(String),

    /// No answer within the query's time limit
    #[error("routing query timed out")]
    Timeout,
}

/// Trait for predicting travel durations.
pub trait RoutingOracle: Send + Sync {
    /// Estimate the travel time from `origin` to `destination` when leaving
    /// at `departure` on the travel date.
    fn estimate_travel(
        &self,
        origin: &Location,
        destination: &Location,
        departure: NaiveDateTime,
    ) -> impl Future<Output = Result<TravelEstimate, OracleError>> + Send;
}

impl<O: RoutingOracle> RoutingOracle for Arc<O> {
    fn estimate_travel(
        &self,
        origin: &Location,
        destination: &Location,
        departure: NaiveDateTime,
    ) -> impl Future<Output = Result<TravelEstimate, OracleError>> + Send {
        (**self).estimate_travel(origin, destination, departure)
    }
}

/// Query the oracle, giving up at `limit`.
///
/// A query still pending at `limit` is reported as `OracleError::Timeout`.
pub(crate) async fn query_until<O: RoutingOracle>(
    oracle: &O,
    origin: &Location,
    destination: &Location,
    departure: NaiveDateTime,
    limit: Instant,
) -> Result<TravelEstimate, OracleError> {
    match tokio::time::timeout_at(limit, oracle.estimate_travel(origin, destination, departure))
        .await
    {
        Ok(result) => result,
        Err(_) => Err(OracleError::Timeout),
    }
}
