//! Itinerary sequencing.
//!
//! Journeys arrive here independently optimized, so their time slots may
//! collide. The scheduler places them greedily in departure order, and when
//! every remaining journey would start before the previous one ends it
//! pushes the earliest of them back to that end time, asking the oracle for
//! a fresh estimate at the new departure.

use chrono::NaiveDateTime;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::domain::{DomainError, Journey, SchedulingObjective};

use super::config::PlannerConfig;
use super::oracle::{OracleError, RoutingOracle, query_until};

/// A repaired journey whose travel time could not be refreshed.
///
/// The journey keeps its previous travel duration at the new departure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("journey {original_index} moved to {departure} with a stale travel time: {error}")]
pub struct RepairDegraded {
    /// Position of the request in the caller's input.
    pub original_index: usize,

    /// The departure the journey was moved to.
    pub departure: NaiveDateTime,

    /// Why the refresh query failed.
    pub error: OracleError,
}

/// A journey that could not be moved to the end of the one before it.
///
/// Its new arrival or end would not be a representable instant, so it is
/// left out of the itinerary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("journey {original_index} cannot be moved to {departure}: {error}")]
pub struct RepairFailure {
    pub original_index: usize,
    pub departure: NaiveDateTime,
    pub error: DomainError,
}

/// Result of scheduling.
#[derive(Debug, Clone)]
pub struct ScheduleResult {
    /// Journeys in schedule order.
    pub journeys: Vec<Journey>,

    /// Repairs that fell back to a stale estimate.
    pub degraded: Vec<RepairDegraded>,

    /// Journeys dropped because their repair could not be applied.
    pub unplaced: Vec<RepairFailure>,
}

/// What to do with the next journey.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Append `remaining[index]` unchanged.
    AsPlanned { index: usize },
    /// Move `remaining[index]` to depart at `departure`, then append it.
    Repair { index: usize, departure: NaiveDateTime },
}

/// Choose the next placement, or `None` when nothing remains.
///
/// Prefers the earliest-departing journey that starts at or after
/// `last_end`. If there is none, the earliest-departing journey overall is
/// repaired to start at `last_end`. Ties go to the lower original index.
pub fn next_placement(remaining: &[Journey], last_end: Option<NaiveDateTime>) -> Option<Placement> {
    let Some(last_end) = last_end else {
        return earliest(remaining.iter().enumerate()).map(|index| Placement::AsPlanned { index });
    };

    let on_time = remaining
        .iter()
        .enumerate()
        .filter(|(_, j)| j.departure_time() >= last_end);
    if let Some(index) = earliest(on_time) {
        return Some(Placement::AsPlanned { index });
    }

    earliest(remaining.iter().enumerate()).map(|index| Placement::Repair {
        index,
        departure: last_end,
    })
}

/// Index of the earliest-departing journey, ties to the lower original index.
fn earliest<'j>(candidates: impl Iterator<Item = (usize, &'j Journey)>) -> Option<usize> {
    candidates
        .min_by_key(|(_, j)| (j.departure_time(), j.original_index()))
        .map(|(index, _)| index)
}

/// Greedy itinerary scheduler.
pub struct ItineraryScheduler<'a, O: RoutingOracle> {
    oracle: &'a O,
    config: &'a PlannerConfig,
    objective: SchedulingObjective,
}

impl<'a, O: RoutingOracle> ItineraryScheduler<'a, O> {
    /// Create a new scheduler.
    pub fn new(oracle: &'a O, config: &'a PlannerConfig, objective: SchedulingObjective) -> Self {
        Self {
            oracle,
            config,
            objective,
        }
    }

    /// Order `journeys` into a non-overlapping sequence.
    ///
    /// A repair whose refresh query fails keeps the stale travel time and
    /// is reported in `degraded`. A repair that would push the journey past
    /// the end of the calendar drops it into `unplaced`.
    pub async fn schedule(&self, journeys: Vec<Journey>) -> ScheduleResult {
        let mut remaining = journeys;
        let mut placed = Vec::with_capacity(remaining.len());
        let mut degraded = Vec::new();
        let mut unplaced = Vec::new();
        let mut last_end: Option<NaiveDateTime> = None;

        while let Some(placement) = next_placement(&remaining, last_end) {
            let journey = match placement {
                Placement::AsPlanned { index } => remaining.remove(index),
                Placement::Repair { index, departure } => {
                    let mut journey = remaining.remove(index);
                    match self.repair(&mut journey, departure).await {
                        Ok(report) => degraded.extend(report),
                        Err(failure) => {
                            warn!(
                                original_index = failure.original_index,
                                error = %failure,
                                "Dropping journey that cannot be repaired"
                            );
                            unplaced.push(failure);
                            continue;
                        }
                    }
                    journey
                }
            };

            last_end = Some(journey.end_time());
            placed.push(journey);
        }

        ScheduleResult {
            journeys: placed,
            degraded,
            unplaced,
        }
    }

    /// Move `journey` to `departure` with a fresh estimate if one can be had.
    async fn repair(
        &self,
        journey: &mut Journey,
        departure: NaiveDateTime,
    ) -> Result<Option<RepairDegraded>, RepairFailure> {
        debug!(
            original_index = journey.original_index(),
            from = %journey.departure_time(),
            to = %departure,
            "Repairing overlap"
        );

        let request = journey.request();
        let limit = Instant::now() + self.config.query_timeout();
        let refreshed = query_until(
            self.oracle,
            request.start_point(),
            request.end_point(),
            departure,
            limit,
        )
        .await;

        let original_index = journey.original_index();
        let unplaceable = |error: DomainError| RepairFailure {
            original_index,
            departure,
            error,
        };

        match refreshed {
            Ok(estimate) => {
                journey
                    .reschedule(departure, Some(estimate), self.objective)
                    .map_err(unplaceable)?;
                Ok(None)
            }
            Err(error) => {
                warn!(
                    original_index = journey.original_index(),
                    departure = %departure,
                    error = %error,
                    "Refresh query failed, keeping stale travel time"
                );
                journey
                    .reschedule(departure, None, self.objective)
                    .map_err(unplaceable)?;
                Ok(Some(RepairDegraded {
                    original_index: journey.original_index(),
                    departure,
                    error,
                }))
            }
        }
    }
}

#[cfg(test)]
#[path = "schedule_tests.rs"]
mod tests;
