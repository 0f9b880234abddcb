//! Journey records.
//!
//! A `Journey` is a planned trip with a concrete departure instant, the
//! estimate chosen for it, and the derived arrival and end instants. It is
//! created once by [`Journey::build`] after a departure search succeeds, and
//! may be re-timed once more by the itinerary scheduler during overlap
//! repair.

use std::sync::Arc;

use chrono::{Duration, NaiveDateTime};

use super::{DomainError, JourneyRequest, SchedulingObjective, TravelEstimate};

/// Arrival and end instants for a trip leaving at `departure`.
///
/// `arrival = departure + travel`, `end = arrival + dwell`.
///
/// # Errors
///
/// Returns `DomainError::OutOfRange` if either instant is not representable.
pub fn journey_times(
    departure: NaiveDateTime,
    travel: Duration,
    dwell: Duration,
) -> Result<(NaiveDateTime, NaiveDateTime), DomainError> {
    let arrival = departure
        .checked_add_signed(travel)
        .ok_or(DomainError::OutOfRange)?;
    let end = arrival
        .checked_add_signed(dwell)
        .ok_or(DomainError::OutOfRange)?;
    Ok((arrival, end))
}

/// A fully dated trip.
///
/// # Invariants
///
/// - `departure_time <= arrival_time <= end_time`
/// - `arrival_time - departure_time == travel_duration`
/// - `end_time - arrival_time == request.dwell()`
#[derive(Debug, Clone)]
pub struct Journey {
    request: Arc<JourneyRequest>,
    original_index: usize,
    departure_time: NaiveDateTime,
    arrival_time: NaiveDateTime,
    end_time: NaiveDateTime,
    travel_duration: Duration,
    estimate: TravelEstimate,
    repaired: bool,
    degraded: bool,
}

impl Journey {
    /// Build a journey from a chosen departure and its estimate.
    ///
    /// The travel duration is the estimate's authoritative duration under
    /// `objective`; the dwell comes from the request.
    pub fn build(
        request: Arc<JourneyRequest>,
        original_index: usize,
        departure_time: NaiveDateTime,
        estimate: TravelEstimate,
        objective: SchedulingObjective,
    ) -> Result<Self, DomainError> {
        let travel_duration = estimate.duration(objective);
        let (arrival_time, end_time) =
            journey_times(departure_time, travel_duration, request.dwell())?;

        Ok(Self {
            request,
            original_index,
            departure_time,
            arrival_time,
            end_time,
            travel_duration,
            estimate,
            repaired: false,
            degraded: false,
        })
    }

    /// Move the journey to a new departure instant.
    ///
    /// With a fresh estimate the travel duration is replaced; without one
    /// the previous duration is kept and the journey is flagged degraded.
    /// On error the journey is left untouched.
    pub(crate) fn reschedule(
        &mut self,
        departure_time: NaiveDateTime,
        refreshed: Option<TravelEstimate>,
        objective: SchedulingObjective,
    ) -> Result<(), DomainError> {
        let travel_duration = refreshed
            .as_ref()
            .map_or(self.travel_duration, |e| e.duration(objective));
        let (arrival_time, end_time) =
            journey_times(departure_time, travel_duration, self.request.dwell())?;

        match refreshed {
            Some(estimate) => self.estimate = estimate,
            None => self.degraded = true,
        }
        self.travel_duration = travel_duration;
        self.departure_time = departure_time;
        self.arrival_time = arrival_time;
        self.end_time = end_time;
        self.repaired = true;
        Ok(())
    }

    pub fn request(&self) -> &JourneyRequest {
        &self.request
    }

    /// Position of the originating request in the caller's input list.
    pub fn original_index(&self) -> usize {
        self.original_index
    }

    pub fn departure_time(&self) -> NaiveDateTime {
        self.departure_time
    }

    pub fn arrival_time(&self) -> NaiveDateTime {
        self.arrival_time
    }

    /// Arrival plus dwell: when the destination is left again.
    pub fn end_time(&self) -> NaiveDateTime {
        self.end_time
    }

    pub fn travel_duration(&self) -> Duration {
        self.travel_duration
    }

    pub fn estimate(&self) -> &TravelEstimate {
        &self.estimate
    }

    /// True if overlap repair moved this journey.
    pub fn is_repaired(&self) -> bool {
        self.repaired
    }

    /// True if overlap repair had to reuse a stale travel duration.
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::domain::{Location, TimePolicy};
    use chrono::{NaiveDate, NaiveTime};
    use proptest::prelude::*;

    fn request(dwell_mins: u32) -> Arc<JourneyRequest> {
        Arc::new(
            JourneyRequest::new(
                Location::parse("A").unwrap(),
                Location::parse("B").unwrap(),
                TimePolicy::StartPreferred,
                NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
                Duration::minutes(i64::from(dwell_mins)),
            )
            .unwrap(),
        )
    }

    fn instant(mins: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            + Duration::minutes(i64::from(mins))
    }

    proptest! {
        #[test]
        fn build_preserves_containment(
            dep_mins in 0u32..1440,
            travel_secs in 0u32..20_000,
            traffic_secs in proptest::option::of(0u32..20_000),
            dwell_mins in 0u32..600,
        ) {
            let mut estimate = TravelEstimate::from_secs(travel_secs);
            if let Some(secs) = traffic_secs {
                estimate = estimate.with_traffic_secs(secs);
            }

            let journey = Journey::build(
                request(dwell_mins),
                0,
                instant(dep_mins),
                estimate,
                SchedulingObjective::ShortestTime,
            )
            .unwrap();

            prop_assert!(journey.departure_time() <= journey.arrival_time());
            prop_assert!(journey.arrival_time() <= journey.end_time());
            prop_assert_eq!(
                journey.arrival_time() - journey.departure_time(),
                journey.travel_duration()
            );
            prop_assert_eq!(
                journey.end_time() - journey.arrival_time(),
                Duration::minutes(i64::from(dwell_mins))
            );
        }

        #[test]
        fn reschedule_preserves_containment(
            dep_mins in 0u32..1440,
            new_dep_mins in 0u32..1440,
            travel_mins in 0u32..300,
            fresh_mins in proptest::option::of(0u32..300),
            dwell_mins in 0u32..600,
        ) {
            let mut journey = Journey::build(
                request(dwell_mins),
                0,
                instant(dep_mins),
                TravelEstimate::from_mins(travel_mins),
                SchedulingObjective::MinimalTraffic,
            )
            .unwrap();

            journey.reschedule(
                instant(new_dep_mins),
                fresh_mins.map(TravelEstimate::from_mins),
                SchedulingObjective::MinimalTraffic,
            )
            .unwrap();

            prop_assert_eq!(journey.departure_time(), instant(new_dep_mins));
            prop_assert!(journey.departure_time() <= journey.arrival_time());
            prop_assert!(journey.arrival_time() <= journey.end_time());
            prop_assert_eq!(journey.is_degraded(), fresh_mins.is_none());
        }
    }
}
