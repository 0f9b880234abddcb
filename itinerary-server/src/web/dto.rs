//! Data transfer objects for web requests and responses.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::{
    DomainError, Journey, JourneyRequest, Location, SchedulingObjective, TimeError, TimePolicy,
    dwell_from_parts, format_hhmm, parse_date, parse_hhmm,
};
use crate::planner::{PlanOutcome, PlanRequest, RepairDegraded, RepairFailure, SearchFailure};

/// Request to plan an itinerary.
#[derive(Debug, Deserialize)]
pub struct PlanItineraryRequest {
    /// Travel date in YYYY-MM-DD format
    pub travel_date: String,

    /// How candidate departures are ranked (defaults to shortest time)
    #[serde(default)]
    pub objective: SchedulingObjective,

    /// Journeys in the order the user entered them
    pub journeys: Vec<JourneyRequestDto>,
}

/// One journey as entered by the user.
#[derive(Debug, Deserialize)]
pub struct JourneyRequestDto {
    pub start_point: String,
    pub end_point: String,

    /// Whether `preferred_time` is a departure or an arrival time
    pub time_policy: TimePolicy,

    /// Preferred time in HH:MM format
    pub preferred_time: String,

    /// Hours to stay at the destination. The whole dwell is capped at a day.
    #[serde(default)]
    pub dwell_hours: u32,

    /// Minutes to stay at the destination, on top of `dwell_hours`
    #[serde(default)]
    pub dwell_minutes: u32,
}

/// Why a plan request was rejected.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RequestError {
    #[error("travel_date: {0}")]
    Date(#[source] TimeError),

    #[error("journey {index}: {source}")]
    Journey { index: usize, source: DomainError },
}

impl PlanItineraryRequest {
    /// Validate the request and convert it for the planner.
    pub fn into_plan_request(self) -> Result<PlanRequest, RequestError> {
        let travel_date = parse_date(&self.travel_date).map_err(RequestError::Date)?;

        let journeys = self
            .journeys
            .into_iter()
            .enumerate()
            .map(|(index, dto)| {
                dto.into_journey_request()
                    .map_err(|source| RequestError::Journey { index, source })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(PlanRequest::new(travel_date, self.objective, journeys))
    }
}

impl JourneyRequestDto {
    fn into_journey_request(self) -> Result<JourneyRequest, DomainError> {
        JourneyRequest::new(
            Location::parse(&self.start_point)?,
            Location::parse(&self.end_point)?,
            self.time_policy,
            parse_hhmm(&self.preferred_time)?,
            dwell_from_parts(self.dwell_hours, self.dwell_minutes),
        )
    }
}

/// Response for itinerary planning.
#[derive(Debug, Serialize)]
pub struct PlanItineraryResponse {
    pub travel_date: String,
    pub objective: SchedulingObjective,

    /// Scheduled journeys in itinerary order
    pub journeys: Vec<JourneyResult>,

    /// Journeys that could not be planned
    pub dropped: Vec<FailureResult>,

    /// Journeys moved to a new departure with a stale travel time
    pub degraded: Vec<FailureResult>,
}

/// A journey in the itinerary.
#[derive(Debug, Serialize)]
pub struct JourneyResult {
    /// Position of the journey in the request
    pub original_index: usize,

    pub start_point: String,
    pub end_point: String,
    pub time_policy: TimePolicy,

    /// Departure time (HH:MM)
    pub departure_time: String,

    /// Arrival time (HH:MM)
    pub arrival_time: String,

    /// Time the stay at the destination ends (HH:MM)
    pub end_time: String,

    /// Days after the travel date the journey departs (0 for the same day)
    pub day_offset: i64,

    /// Days after the travel date the journey arrives
    pub arrival_day_offset: i64,

    /// Days after the travel date the stay at the destination ends
    pub end_day_offset: i64,

    /// Travel time in whole minutes
    pub travel_minutes: i64,

    /// Stay at the destination in whole minutes
    pub dwell_minutes: i64,

    /// Provider's display text for the travel time
    pub summary: Option<String>,

    /// Provider's route, passed through for rendering
    pub route: serde_json::Value,

    /// Moved later to avoid overlapping the previous journey
    pub repaired: bool,

    /// Repaired, but the travel time could not be refreshed
    pub degraded: bool,
}

/// A journey-level problem report.
#[derive(Debug, Serialize)]
pub struct FailureResult {
    pub original_index: usize,
    pub reason: String,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

// Conversion implementations

impl PlanItineraryResponse {
    /// Create from a planner outcome.
    ///
    /// Journeys dropped by the search and by the scheduler are reported
    /// together, sorted by original index.
    pub fn from_outcome(outcome: &PlanOutcome) -> Self {
        let mut dropped: Vec<FailureResult> = outcome
            .dropped
            .iter()
            .map(FailureResult::from_failure)
            .chain(outcome.unplaced.iter().map(FailureResult::from_unplaced))
            .collect();
        dropped.sort_by_key(|f| f.original_index);

        Self {
            travel_date: outcome.travel_date.format("%Y-%m-%d").to_string(),
            objective: outcome.objective,
            journeys: outcome
                .itinerary
                .iter()
                .map(|j| JourneyResult::from_journey(j, outcome))
                .collect(),
            dropped,
            degraded: outcome.degraded.iter().map(FailureResult::from_degraded).collect(),
        }
    }
}

impl JourneyResult {
    /// Create from a scheduled journey.
    pub fn from_journey(journey: &Journey, outcome: &PlanOutcome) -> Self {
        let request = journey.request();
        let estimate = journey.estimate();
        let days_after = |instant: NaiveDateTime| (instant.date() - outcome.travel_date).num_days();

        Self {
            original_index: journey.original_index(),
            start_point: request.start_point().to_string(),
            end_point: request.end_point().to_string(),
            time_policy: request.time_policy(),
            departure_time: format_hhmm(journey.departure_time()),
            arrival_time: format_hhmm(journey.arrival_time()),
            end_time: format_hhmm(journey.end_time()),
            day_offset: days_after(journey.departure_time()),
            arrival_day_offset: days_after(journey.arrival_time()),
            end_day_offset: days_after(journey.end_time()),
            travel_minutes: journey.travel_duration().num_minutes(),
            dwell_minutes: request.dwell().num_minutes(),
            summary: estimate.summary().map(str::to_string),
            route: estimate.route().clone(),
            repaired: journey.is_repaired(),
            degraded: journey.is_degraded(),
        }
    }
}

impl FailureResult {
    pub fn from_failure(failure: &SearchFailure) -> Self {
        Self {
            original_index: failure.original_index,
            reason: failure.to_string(),
        }
    }

    pub fn from_unplaced(failure: &RepairFailure) -> Self {
        Self {
            original_index: failure.original_index,
            reason: failure.to_string(),
        }
    }

    pub fn from_degraded(report: &RepairDegraded) -> Self {
        Self {
            original_index: report.original_index,
            reason: report.to_string(),
        }
    }
}
