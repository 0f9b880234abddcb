//! Travel estimates returned by the routing oracle.

use chrono::Duration;

use super::SchedulingObjective;

/// One oracle answer for a departure instant.
///
/// Durations are built from unsigned second counts, so they are never
/// negative. The route payload is whatever the oracle returned for
/// rendering; the planner never looks inside it.
#[derive(Debug, Clone, PartialEq)]
pub struct TravelEstimate {
    baseline: Duration,
    in_traffic: Option<Duration>,
    summary: Option<String>,
    route: serde_json::Value,
}

impl TravelEstimate {
    /// Create an estimate from a traffic-free duration in seconds.
    pub fn from_secs(baseline_secs: u32) -> Self {
        Self {
            baseline: Duration::seconds(i64::from(baseline_secs)),
            in_traffic: None,
            summary: None,
            route: serde_json::Value::Null,
        }
    }

    /// Create an estimate from a traffic-free duration in whole minutes.
    pub fn from_mins(baseline_mins: u32) -> Self {
        Self::from_secs(baseline_mins.saturating_mul(60))
    }

    /// Attach a traffic-conditioned duration in seconds.
    pub fn with_traffic_secs(mut self, secs: u32) -> Self {
        self.in_traffic = Some(Duration::seconds(i64::from(secs)));
        self
    }

    /// Attach the oracle's display text for the duration (e.g. "25 mins").
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Attach the opaque route payload.
    pub fn with_route(mut self, route: serde_json::Value) -> Self {
        self.route = route;
        self
    }

    /// The traffic-free duration.
    pub fn baseline(&self) -> Duration {
        self.baseline
    }

    /// The traffic-conditioned duration, if the oracle supplied one.
    pub fn in_traffic(&self) -> Option<Duration> {
        self.in_traffic
    }

    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    pub fn route(&self) -> &serde_json::Value {
        &self.route
    }

    /// The duration the planner treats as authoritative under `objective`.
    pub fn duration(&self, objective: SchedulingObjective) -> Duration {
        match objective {
            SchedulingObjective::ShortestTime => self.in_traffic.unwrap_or(self.baseline),
            SchedulingObjective::MinimalTraffic => self.baseline,
        }
    }
}
