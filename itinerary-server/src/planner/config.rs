//! Configuration for departure search and itinerary planning.

use chrono::Duration;

/// Configuration parameters for planning.
#[derive(Debug, Clone)]
pub struct PlannerConfig {
    /// Length of the candidate departure window (minutes).
    pub window_mins: i64,

    /// Spacing between candidate departures (minutes).
    pub step_mins: i64,

    /// Longest travel time a candidate may have and still qualify (minutes).
    /// The bound is inclusive.
    pub max_acceptable_mins: i64,

    /// Time limit for a single oracle query (seconds).
    pub query_timeout_secs: u64,

    /// Wall-clock budget for probing across a whole planning run (seconds).
    /// Probes still outstanding when it runs out count as timed out.
    pub run_budget_secs: u64,

    /// Maximum number of candidate probes in flight for one journey.
    pub probe_batch_size: usize,
}

impl PlannerConfig {
    /// Create a new configuration with the given parameters.
    pub fn new(
        window_mins: i64,
        step_mins: i64,
        max_acceptable_mins: i64,
        query_timeout_secs: u64,
        run_budget_secs: u64,
        probe_batch_size: usize,
    ) -> Self {
        Self {
            window_mins,
            step_mins,
            max_acceptable_mins,
            query_timeout_secs,
            run_budget_secs,
            probe_batch_size,
        }
    }

    /// Returns the candidate window as a Duration (never negative).
    pub fn window(&self) -> Duration {
        Duration::minutes(self.window_mins.max(0))
    }

    /// Returns the candidate step as a Duration (at least one minute).
    pub fn step(&self) -> Duration {
        Duration::minutes(self.step_mins.max(1))
    }

    /// Returns the acceptable travel time cap as a Duration.
    pub fn max_acceptable(&self) -> Duration {
        Duration::minutes(self.max_acceptable_mins)
    }

    /// Returns the per-query timeout.
    pub fn query_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.query_timeout_secs)
    }

    /// Returns the planning run budget.
    pub fn run_budget(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.run_budget_secs)
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            window_mins: 30,
            step_mins: 5,
            max_acceptable_mins: 30,
            query_timeout_secs: 10,
            run_budget_secs: 60,
            probe_batch_size: 8,
        }
    }
}
