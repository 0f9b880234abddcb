//! Journey requests as submitted by the caller.

use chrono::{Duration, NaiveTime};
use serde::{Deserialize, Serialize};

use super::{DomainError, Location};

/// Longest dwell a single journey may ask for.
pub const MAX_DWELL: Duration = Duration::hours(24);

/// Which side of the trip the preferred time constrains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimePolicy {
    /// Leave no earlier than the preferred time.
    #[serde(rename = "start")]
    StartPreferred,
    /// Arrive no later than the preferred time.
    #[serde(rename = "arrival")]
    ArrivalPreferred,
}

/// Which duration figure of an estimate the planner optimizes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulingObjective {
    /// Use the traffic-conditioned duration when the oracle has one.
    #[default]
    ShortestTime,
    /// Use the traffic-free baseline duration.
    MinimalTraffic,
}

/// A single point-to-point trip to be planned.
///
/// Immutable once constructed. Nothing checks that `start_point` differs
/// from `end_point`; the routing oracle is the judge of that.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JourneyRequest {
    start_point: Location,
    end_point: Location,
    time_policy: TimePolicy,
    preferred_time: NaiveTime,
    dwell: Duration,
}

impl JourneyRequest {
    /// Create a request.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NegativeDwell` if `dwell` is negative, and
    /// `DomainError::DwellTooLong` if it exceeds [`MAX_DWELL`].
    pub fn new(
        start_point: Location,
        end_point: Location,
        time_policy: TimePolicy,
        preferred_time: NaiveTime,
        dwell: Duration,
    ) -> Result<Self, DomainError> {
        if dwell < Duration::zero() {
            return Err(DomainError::NegativeDwell);
        }
        if dwell > MAX_DWELL {
            return Err(DomainError::DwellTooLong);
        }

        Ok(Self {
            start_point,
            end_point,
            time_policy,
            preferred_time,
            dwell,
        })
    }

    pub fn start_point(&self) -> &Location {
        &self.start_point
    }

    pub fn end_point(&self) -> &Location {
        &self.end_point
    }

    pub fn time_policy(&self) -> TimePolicy {
        self.time_policy
    }

    pub fn preferred_time(&self) -> NaiveTime {
        self.preferred_time
    }

    /// Time spent at the destination before the journey counts as finished.
    pub fn dwell(&self) -> Duration {
        self.dwell
    }
}
