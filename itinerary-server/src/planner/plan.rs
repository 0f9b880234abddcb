//! End-to-end itinerary planning.
//!
//! Runs a departure search for every journey concurrently, drops the ones
//! that could not be given a departure, and sequences the rest.

use std::sync::Arc;

use chrono::NaiveDate;
use futures::future::join_all;
use tokio::time::Instant;
use tracing::{info, warn};

use crate::domain::{Journey, JourneyRequest, SchedulingObjective};

use super::config::PlannerConfig;
use super::oracle::RoutingOracle;
use super::schedule::{ItineraryScheduler, RepairDegraded, RepairFailure};
use super::search::{DepartureSearch, SearchFailure};

/// A planning request: journeys for one day, all ranked by one objective.
#[derive(Debug, Clone)]
pub struct PlanRequest {
    pub travel_date: NaiveDate,
    pub objective: SchedulingObjective,
    pub journeys: Vec<JourneyRequest>,
}

impl PlanRequest {
    /// Create a new plan request.
    pub fn new(
        travel_date: NaiveDate,
        objective: SchedulingObjective,
        journeys: Vec<JourneyRequest>,
    ) -> Self {
        Self {
            travel_date,
            objective,
            journeys,
        }
    }
}

/// The planned itinerary plus everything that went wrong along the way.
#[derive(Debug, Clone)]
pub struct PlanOutcome {
    pub travel_date: NaiveDate,
    pub objective: SchedulingObjective,

    /// Scheduled journeys in itinerary order.
    pub itinerary: Vec<Journey>,

    /// Journeys left out, sorted by original index.
    pub dropped: Vec<SearchFailure>,

    /// Repairs that kept a stale travel time.
    pub degraded: Vec<RepairDegraded>,

    /// Journeys the scheduler could not move out of an overlap.
    pub unplaced: Vec<RepairFailure>,
}

/// Itinerary planner.
pub struct ItineraryPlanner<'a, O: RoutingOracle> {
    oracle: &'a O,
    config: &'a PlannerConfig,
}

impl<'a, O: RoutingOracle> ItineraryPlanner<'a, O> {
    /// Create a new planner.
    pub fn new(oracle: &'a O, config: &'a PlannerConfig) -> Self {
        Self { oracle, config }
    }

    /// Plan an itinerary.
    ///
    /// A journey whose search fails is reported in `dropped` and does not
    /// affect the others.
    pub async fn plan(&self, request: PlanRequest) -> PlanOutcome {
        let PlanRequest {
            travel_date,
            objective,
            journeys,
        } = request;
        let requested = journeys.len();

        let started = Instant::now();
        let deadline = started + self.config.run_budget();
        let search =
            DepartureSearch::new(self.oracle, self.config, objective).with_deadline(deadline);

        let searches = journeys
            .into_iter()
            .enumerate()
            .map(|(index, journey)| search.search(travel_date, index, Arc::new(journey)));

        let mut built = Vec::with_capacity(requested);
        let mut dropped = Vec::new();
        for result in join_all(searches).await {
            match result {
                Ok(journey) => built.push(journey),
                Err(failure) => {
                    warn!(original_index = failure.original_index, error = %failure, "Dropping journey");
                    dropped.push(failure);
                }
            }
        }
        dropped.sort_by_key(|f| f.original_index);

        let scheduled = ItineraryScheduler::new(self.oracle, self.config, objective)
            .schedule(built)
            .await;

        info!(
            %travel_date,
            ?objective,
            requested,
            scheduled = scheduled.journeys.len(),
            dropped = dropped.len(),
            degraded = scheduled.degraded.len(),
            unplaced = scheduled.unplaced.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Planned itinerary"
        );

        PlanOutcome {
            travel_date,
            objective,
            itinerary: scheduled.journeys,
            dropped,
            degraded: scheduled.degraded,
            unplaced: scheduled.unplaced,
        }
    }
}
