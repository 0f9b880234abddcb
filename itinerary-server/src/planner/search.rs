//! Optimal departure search for a single journey.
//!
//! Probes the routing oracle at evenly spaced candidate departures around
//! the preferred time, keeps the candidates that satisfy the journey's time
//! policy, and picks the fastest one. When nothing qualifies the search
//! falls back to a fixed departure at the window edge.

use std::sync::Arc;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use futures::future::join_all;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::domain::{
    DomainError, Journey, JourneyRequest, SchedulingObjective, TimePolicy, TravelEstimate,
};

use super::config::PlannerConfig;
use super::oracle::{OracleError, RoutingOracle, query_until};

/// Why the fallback departure could not be used.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    /// The fallback query got no estimate
    #[error(transparent)]
    Oracle(#[from] OracleError),

    /// The journey's instants cannot be represented
    #[error(transparent)]
    OutOfRange(#[from] DomainError),
}

/// A journey that could not be given a departure at all.
///
/// Every candidate failed to qualify and the fallback could not be used
/// either. The journey is left out of the itinerary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "journey {original_index}: no candidate departure qualified \
     ({failed_probes} of {probes} probes failed) and the fallback at {fallback_departure} failed: {error}"
)]
pub struct SearchFailure {
    /// Position of the request in the caller's input.
    pub original_index: usize,

    /// Instant the fallback was planned for.
    pub fallback_departure: NaiveDateTime,

    /// Why the fallback failed.
    pub error: SearchError,

    /// Number of candidate departures probed.
    pub probes: usize,

    /// Number of candidate probes that got no estimate.
    pub failed_probes: usize,
}

/// The outcome of probing one candidate departure.
#[derive(Debug, Clone, PartialEq)]
pub struct Probe {
    pub departure: NaiveDateTime,
    pub outcome: Result<TravelEstimate, OracleError>,
}

impl Probe {
    pub fn new(departure: NaiveDateTime, outcome: Result<TravelEstimate, OracleError>) -> Self {
        Self { departure, outcome }
    }
}

/// Candidate departures for a journey whose preferred instant is `preferred`.
///
/// Start-preferred journeys probe `[preferred, preferred + window]`,
/// arrival-preferred ones `[preferred - window, preferred]`, both at
/// `step` intervals starting from the window's lower edge.
///
/// Instants chrono cannot represent are never produced: the list stops at
/// the end of the calendar, and is empty if the lower edge is before its
/// start.
pub fn candidate_departures(
    policy: TimePolicy,
    preferred: NaiveDateTime,
    config: &PlannerConfig,
) -> Vec<NaiveDateTime> {
    let window = config.window();
    let step = config.step();
    let Some(start) = fallback_departure(policy, preferred, config) else {
        return Vec::new();
    };
    let end = start.checked_add_signed(window).unwrap_or(NaiveDateTime::MAX);

    let mut candidates = Vec::new();
    let mut next = Some(start);
    while let Some(departure) = next.filter(|d| *d <= end) {
        candidates.push(departure);
        next = departure.checked_add_signed(step);
    }
    candidates
}

/// Departure used when no candidate qualifies: the lower window edge.
///
/// `None` if that edge is not representable.
pub fn fallback_departure(
    policy: TimePolicy,
    preferred: NaiveDateTime,
    config: &PlannerConfig,
) -> Option<NaiveDateTime> {
    match policy {
        TimePolicy::StartPreferred => Some(preferred),
        TimePolicy::ArrivalPreferred => preferred.checked_sub_signed(config.window()),
    }
}

/// Whether leaving at `departure` and travelling for `travel` satisfies the
/// policy. The `max_acceptable` bound is inclusive.
pub fn qualifies(
    policy: TimePolicy,
    preferred: NaiveDateTime,
    max_acceptable: Duration,
    departure: NaiveDateTime,
    travel: Duration,
) -> bool {
    if travel > max_acceptable {
        return false;
    }
    match policy {
        TimePolicy::StartPreferred => departure >= preferred,
        TimePolicy::ArrivalPreferred => departure
            .checked_add_signed(travel)
            .is_some_and(|arrival| arrival <= preferred),
    }
}

/// Pick the best qualifying probe: shortest travel, then earliest departure.
///
/// Depends only on the set of probes, not their order.
pub fn select_departure<'p>(
    policy: TimePolicy,
    preferred: NaiveDateTime,
    config: &PlannerConfig,
    objective: SchedulingObjective,
    probes: &'p [Probe],
) -> Option<(NaiveDateTime, &'p TravelEstimate)> {
    let max_acceptable = config.max_acceptable();

    probes
        .iter()
        .filter_map(|probe| {
            let estimate = probe.outcome.as_ref().ok()?;
            let travel = estimate.duration(objective);
            qualifies(policy, preferred, max_acceptable, probe.departure, travel)
                .then_some((travel, probe.departure, estimate))
        })
        .min_by_key(|(travel, departure, _)| (*travel, *departure))
        .map(|(_, departure, estimate)| (departure, estimate))
}

/// Departure search against a routing oracle.
pub struct DepartureSearch<'a, O: RoutingOracle> {
    oracle: &'a O,
    config: &'a PlannerConfig,
    objective: SchedulingObjective,
    deadline: Option<Instant>,
}

impl<'a, O: RoutingOracle> DepartureSearch<'a, O> {
    /// Create a new search with no overall deadline.
    pub fn new(oracle: &'a O, config: &'a PlannerConfig, objective: SchedulingObjective) -> Self {
        Self {
            oracle,
            config,
            objective,
            deadline: None,
        }
    }

    /// Stop probing candidates at `deadline`.
    ///
    /// Candidates not answered by then count as timed out. The fallback
    /// query is still made, bounded only by the per-query timeout.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Find the departure for `request` on `travel_date`.
    pub async fn search(
        &self,
        travel_date: NaiveDate,
        original_index: usize,
        request: Arc<JourneyRequest>,
    ) -> Result<Journey, SearchFailure> {
        let policy = request.time_policy();
        let preferred = travel_date.and_time(request.preferred_time());

        let candidates = candidate_departures(policy, preferred, self.config);
        let probes = self.probe_all(&request, &candidates).await;

        let failed_probes = probes.iter().filter(|p| p.outcome.is_err()).count();
        for probe in &probes {
            if let Err(e) = &probe.outcome {
                debug!(
                    original_index,
                    departure = %probe.departure,
                    error = %e,
                    "Candidate probe failed"
                );
            }
        }

        if let Some((departure, estimate)) =
            select_departure(policy, preferred, self.config, self.objective, &probes)
        {
            match Journey::build(
                Arc::clone(&request),
                original_index,
                departure,
                estimate.clone(),
                self.objective,
            ) {
                Ok(journey) => {
                    debug!(
                        original_index,
                        departure = %departure,
                        travel_mins = estimate.duration(self.objective).num_minutes(),
                        "Selected candidate departure"
                    );
                    return Ok(journey);
                }
                Err(e) => debug!(
                    original_index,
                    departure = %departure,
                    error = %e,
                    "Selected candidate cannot be built"
                ),
            }
        }

        let failure = |departure: NaiveDateTime, error: SearchError| SearchFailure {
            original_index,
            fallback_departure: departure,
            error,
            probes: probes.len(),
            failed_probes,
        };

        let Some(fallback) = fallback_departure(policy, preferred, self.config) else {
            return Err(failure(preferred, DomainError::OutOfRange.into()));
        };
        info!(
            original_index,
            fallback = %fallback,
            probes = probes.len(),
            failed_probes,
            "No candidate qualified, using fallback departure"
        );

        let limit = Instant::now() + self.config.query_timeout();
        match query_until(
            self.oracle,
            request.start_point(),
            request.end_point(),
            fallback,
            limit,
        )
        .await
        {
            Ok(estimate) => {
                Journey::build(request, original_index, fallback, estimate, self.objective)
                    .map_err(|e| failure(fallback, e.into()))
            }
            Err(error) => Err(failure(fallback, error.into())),
        }
    }

    /// Probe every candidate, `probe_batch_size` at a time.
    ///
    /// Results come back in candidate order whatever order the oracle
    /// answered in.
    async fn probe_all(
        &self,
        request: &JourneyRequest,
        candidates: &[NaiveDateTime],
    ) -> Vec<Probe> {
        let mut probes = Vec::with_capacity(candidates.len());

        for batch in candidates.chunks(self.config.probe_batch_size.max(1)) {
            if self.deadline.is_some_and(|d| Instant::now() >= d) {
                // Out of budget: the rest are never sent.
                probes.extend(
                    batch
                        .iter()
                        .map(|&departure| Probe::new(departure, Err(OracleError::Timeout))),
                );
                continue;
            }

            let futures: Vec<_> = batch
                .iter()
                .map(|&departure| async move {
                    let outcome = query_until(
                        self.oracle,
                        request.start_point(),
                        request.end_point(),
                        departure,
                        self.probe_limit(),
                    )
                    .await;
                    Probe::new(departure, outcome)
                })
                .collect();

            probes.extend(join_all(futures).await);
        }

        probes
    }

    /// The per-query timeout, cut short by the run deadline.
    fn probe_limit(&self) -> Instant {
        let limit = Instant::now() + self.config.query_timeout();
        match self.deadline {
            Some(deadline) => limit.min(deadline),
            None => limit,
        }
    }
}

#[cfg(test)]
#[path = "search_tests.rs"]
mod tests;
