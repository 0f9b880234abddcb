//! Unit tests for the itinerary scheduler.

use super::*;
use crate::domain::{JourneyRequest, Location, TimePolicy, TravelEstimate};
use chrono::{Duration, NaiveDate, NaiveTime};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
}

fn at(hour: u32, min: u32) -> NaiveDateTime {
    date().and_hms_opt(hour, min, 0).unwrap()
}

fn journey(origin: &str, index: usize, dep: NaiveDateTime, travel_mins: u32, dwell_mins: i64) -> Journey {
    let request = JourneyRequest::new(
        Location::parse(origin).unwrap(),
        Location::parse("Elsewhere").unwrap(),
        TimePolicy::StartPreferred,
        NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
        Duration::minutes(dwell_mins),
    )
    .unwrap();

    Journey::build(
        Arc::new(request),
        index,
        dep,
        TravelEstimate::from_mins(travel_mins),
        SchedulingObjective::ShortestTime,
    )
    .unwrap()
}

/// Oracle keyed by (origin, departure), recording every call.
struct RefreshOracle {
    answers: HashMap<(String, NaiveDateTime), Result<TravelEstimate, OracleError>>,
    otherwise: Result<TravelEstimate, OracleError>,
    calls: Mutex<Vec<(String, NaiveDateTime)>>,
}

impl RefreshOracle {
    fn new(otherwise: Result<TravelEstimate, OracleError>) -> Self {
        Self {
            answers: HashMap::new(),
            otherwise,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn on(
        mut self,
        origin: &str,
        departure: NaiveDateTime,
        answer: Result<TravelEstimate, OracleError>,
    ) -> Self {
        self.answers.insert((origin.to_string(), departure), answer);
        self
    }

    fn calls(&self) -> Vec<(String, NaiveDateTime)> {
        self.calls.lock().unwrap().clone()
    }
}

impl RoutingOracle for RefreshOracle {
    async fn estimate_travel(
        &self,
        origin: &Location,
        _destination: &Location,
        departure: NaiveDateTime,
    ) -> Result<TravelEstimate, OracleError> {
        let key = (origin.as_str().to_string(), departure);
        self.calls.lock().unwrap().push(key.clone());
        self.answers
            .get(&key)
            .cloned()
            .unwrap_or_else(|| self.otherwise.clone())
    }
}

fn order(journeys: &[Journey]) -> Vec<usize> {
    journeys.iter().map(|j| j.original_index()).collect()
}

// ========== next_placement ==========

#[test]
fn nothing_to_place() {
    assert_eq!(next_placement(&[], None), None);
    assert_eq!(next_placement(&[], Some(at(9, 0))), None);
}

#[test]
fn first_pick_is_earliest_departure() {
    let remaining = vec![
        journey("A", 0, at(9, 0), 10, 0),
        journey("B", 1, at(8, 0), 10, 0),
        journey("C", 2, at(8, 30), 10, 0),
    ];

    assert_eq!(
        next_placement(&remaining, None),
        Some(Placement::AsPlanned { index: 1 })
    );
}

#[test]
fn skips_journeys_starting_before_last_end() {
    let remaining = vec![
        journey("A", 0, at(8, 10), 10, 0),
        journey("B", 1, at(9, 0), 10, 0),
    ];

    assert_eq!(
        next_placement(&remaining, Some(at(8, 30))),
        Some(Placement::AsPlanned { index: 1 })
    );
}

#[test]
fn departure_equal_to_last_end_is_on_time() {
    let remaining = vec![journey("A", 0, at(8, 30), 10, 0)];

    assert_eq!(
        next_placement(&remaining, Some(at(8, 30))),
        Some(Placement::AsPlanned { index: 0 })
    );
}

#[test]
fn repairs_earliest_when_all_overlap() {
    let remaining = vec![
        journey("A", 0, at(8, 20), 10, 0),
        journey("B", 1, at(8, 10), 10, 0),
    ];

    assert_eq!(
        next_placement(&remaining, Some(at(8, 30))),
        Some(Placement::Repair {
            index: 1,
            departure: at(8, 30)
        })
    );
}

#[test]
fn ties_go_to_lower_original_index() {
    let remaining = vec![
        journey("A", 4, at(8, 0), 10, 0),
        journey("B", 2, at(8, 0), 10, 0),
    ];

    assert_eq!(
        next_placement(&remaining, None),
        Some(Placement::AsPlanned { index: 1 })
    );
}

// ========== schedule ==========

#[tokio::test]
async fn empty_input_gives_empty_itinerary() {
    let oracle = RefreshOracle::new(Ok(TravelEstimate::from_mins(10)));
    let config = PlannerConfig::default();
    let scheduler = ItineraryScheduler::new(&oracle, &config, SchedulingObjective::ShortestTime);

    let result = scheduler.schedule(Vec::new()).await;

    assert!(result.journeys.is_empty());
    assert!(result.degraded.is_empty());
    assert!(result.unplaced.is_empty());
    assert!(oracle.calls().is_empty());
}

#[tokio::test]
async fn disjoint_journeys_are_sorted_and_untouched() {
    let oracle = RefreshOracle::new(Ok(TravelEstimate::from_mins(99)));
    let config = PlannerConfig::default();
    let scheduler = ItineraryScheduler::new(&oracle, &config, SchedulingObjective::ShortestTime);

    let result = scheduler
        .schedule(vec![
            journey("A", 0, at(13, 0), 20, 60),
            journey("B", 1, at(8, 0), 15, 30),
            journey("C", 2, at(10, 0), 25, 0),
        ])
        .await;

    assert_eq!(order(&result.journeys), vec![1, 2, 0]);
    assert!(result.journeys.iter().all(|j| !j.is_repaired()));
    assert_eq!(result.journeys[2].departure_time(), at(13, 0));
    assert!(oracle.calls().is_empty());
}

#[tokio::test]
async fn overlap_is_repaired_with_fresh_query() {
    let oracle = RefreshOracle::new(Ok(TravelEstimate::from_mins(99)))
        .on("B", at(9, 15), Ok(TravelEstimate::from_mins(25)));
    let config = PlannerConfig::default();
    let scheduler = ItineraryScheduler::new(&oracle, &config, SchedulingObjective::ShortestTime);

    // A occupies 08:00-09:15; B wants to leave at 08:30.
    let result = scheduler
        .schedule(vec![
            journey("A", 0, at(8, 0), 15, 60),
            journey("B", 1, at(8, 30), 10, 5),
        ])
        .await;

    assert_eq!(order(&result.journeys), vec![0, 1]);
    let b = &result.journeys[1];
    assert_eq!(b.departure_time(), result.journeys[0].end_time());
    assert_eq!(b.departure_time(), at(9, 15));
    assert_eq!(b.travel_duration(), Duration::minutes(25));
    assert_eq!(b.end_time(), at(9, 45));
    assert!(b.is_repaired());
    assert!(!b.is_degraded());
    assert_eq!(oracle.calls(), vec![("B".to_string(), at(9, 15))]);
    assert!(result.degraded.is_empty());
}

#[tokio::test]
async fn failed_refresh_keeps_stale_duration() {
    let oracle = RefreshOracle::new(Err(OracleError::RateLimited));
    let config = PlannerConfig::default();
    let scheduler = ItineraryScheduler::new(&oracle, &config, SchedulingObjective::ShortestTime);

    let result = scheduler
        .schedule(vec![
            journey("A", 0, at(8, 0), 15, 45),
            journey("B", 1, at(8, 10), 20, 0),
        ])
        .await;

    let b = &result.journeys[1];
    assert_eq!(b.departure_time(), at(9, 0));
    assert_eq!(b.travel_duration(), Duration::minutes(20));
    assert_eq!(b.end_time(), at(9, 20));
    assert!(b.is_degraded());

    assert_eq!(
        result.degraded,
        vec![RepairDegraded {
            original_index: 1,
            departure: at(9, 0),
            error: OracleError::RateLimited,
        }]
    );
}

#[tokio::test]
async fn repair_past_the_end_of_the_calendar_drops_the_journey() {
    let last_day = |hour, min| NaiveDate::MAX.and_hms_opt(hour, min, 0).unwrap();
    let oracle = RefreshOracle::new(Ok(TravelEstimate::from_mins(40)));
    let config = PlannerConfig::default();
    let scheduler = ItineraryScheduler::new(&oracle, &config, SchedulingObjective::ShortestTime);

    let result = scheduler
        .schedule(vec![
            journey("A", 0, last_day(23, 0), 30, 0),
            journey("B", 1, last_day(23, 10), 10, 0),
            journey("C", 2, last_day(23, 15), 5, 0),
        ])
        .await;

    assert_eq!(order(&result.journeys), vec![0]);
    assert!(result.degraded.is_empty());
    assert_eq!(
        result.unplaced,
        vec![
            RepairFailure {
                original_index: 1,
                departure: last_day(23, 30),
                error: DomainError::OutOfRange,
            },
            RepairFailure {
                original_index: 2,
                departure: last_day(23, 30),
                error: DomainError::OutOfRange,
            },
        ]
    );
}

#[tokio::test]
async fn later_on_time_journey_is_preferred_over_repair() {
    // C starts after A ends, so it goes before the overlapping B is repaired.
    let oracle = RefreshOracle::new(Ok(TravelEstimate::from_mins(10)));
    let config = PlannerConfig::default();
    let scheduler = ItineraryScheduler::new(&oracle, &config, SchedulingObjective::ShortestTime);

    let result = scheduler
        .schedule(vec![
            journey("A", 0, at(8, 0), 30, 0),
            journey("B", 1, at(8, 10), 10, 0),
            journey("C", 2, at(8, 40), 10, 0),
        ])
        .await;

    assert_eq!(order(&result.journeys), vec![0, 2, 1]);
    assert_eq!(result.journeys[2].departure_time(), at(8, 50));
    assert_eq!(oracle.calls(), vec![("B".to_string(), at(8, 50))]);
}

#[tokio::test]
async fn chained_repairs_stack_back_to_back() {
    let oracle = RefreshOracle::new(Ok(TravelEstimate::from_mins(10)));
    let config = PlannerConfig::default();
    let scheduler = ItineraryScheduler::new(&oracle, &config, SchedulingObjective::ShortestTime);

    let result = scheduler
        .schedule(vec![
            journey("A", 0, at(8, 0), 10, 20),
            journey("B", 1, at(8, 0), 10, 20),
            journey("C", 2, at(8, 0), 10, 20),
        ])
        .await;

    assert_eq!(order(&result.journeys), vec![0, 1, 2]);
    assert_eq!(result.journeys[1].departure_time(), at(8, 30));
    assert_eq!(result.journeys[2].departure_time(), at(9, 0));
    assert_eq!(result.journeys[2].end_time(), at(9, 30));
}

#[tokio::test(start_paused = true)]
async fn slow_refresh_degrades_instead_of_blocking() {
    struct Stalled;

    impl RoutingOracle for Stalled {
        async fn estimate_travel(
            &self,
            _origin: &Location,
            _destination: &Location,
            _departure: NaiveDateTime,
        ) -> Result<TravelEstimate, OracleError> {
            tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
            Ok(TravelEstimate::from_mins(1))
        }
    }

    let config = PlannerConfig::default();
    let scheduler = ItineraryScheduler::new(&Stalled, &config, SchedulingObjective::ShortestTime);

    let result = scheduler
        .schedule(vec![
            journey("A", 0, at(8, 0), 30, 0),
            journey("B", 1, at(8, 0), 10, 0),
        ])
        .await;

    assert_eq!(result.degraded.len(), 1);
    assert_eq!(result.degraded[0].error, OracleError::Timeout);
    assert_eq!(result.journeys[1].travel_duration(), Duration::minutes(10));
}

mod proptests {
    use super::*;
    use proptest::prelude::*;

    /// Oracle whose answer depends only on the departure minute.
    struct MinuteOracle;

    impl RoutingOracle for MinuteOracle {
        async fn estimate_travel(
            &self,
            _origin: &Location,
            _destination: &Location,
            departure: NaiveDateTime,
        ) -> Result<TravelEstimate, OracleError> {
            use chrono::Timelike;
            match departure.minute() % 7 {
                0 => Err(OracleError::Unavailable("flaky".into())),
                m => Ok(TravelEstimate::from_mins(5 * m)),
            }
        }
    }

    fn journeys_strategy() -> impl Strategy<Value = Vec<Journey>> {
        prop::collection::vec((0u32..1000, 0u32..120, 0i64..180), 0..12).prop_map(|specs| {
            specs
                .into_iter()
                .enumerate()
                .map(|(i, (dep, travel, dwell))| {
                    let departure = at(6, 0) + Duration::minutes(i64::from(dep));
                    journey("X", i, departure, travel, dwell)
                })
                .collect()
        })
    }

    fn run(journeys: Vec<Journey>) -> ScheduleResult {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap();
        let config = PlannerConfig::default();
        rt.block_on(async {
            ItineraryScheduler::new(&MinuteOracle, &config, SchedulingObjective::ShortestTime)
                .schedule(journeys)
                .await
        })
    }

    proptest! {
        #[test]
        fn schedule_never_overlaps(journeys in journeys_strategy()) {
            let result = run(journeys);

            for pair in result.journeys.windows(2) {
                prop_assert!(
                    pair[0].end_time() <= pair[1].departure_time(),
                    "journey {} ends {} after journey {} departs {}",
                    pair[0].original_index(),
                    pair[0].end_time(),
                    pair[1].original_index(),
                    pair[1].departure_time()
                );
            }
        }

        #[test]
        fn schedule_preserves_containment(journeys in journeys_strategy()) {
            let result = run(journeys);

            for j in &result.journeys {
                prop_assert!(j.departure_time() <= j.arrival_time());
                prop_assert!(j.arrival_time() <= j.end_time());
            }
        }

        #[test]
        fn schedule_keeps_every_journey(journeys in journeys_strategy()) {
            let mut expected: Vec<usize> = journeys.iter().map(|j| j.original_index()).collect();
            let result = run(journeys);

            prop_assert!(result.unplaced.is_empty());
            let mut got = order(&result.journeys);
            got.sort_unstable();
            expected.sort_unstable();
            prop_assert_eq!(got, expected);
        }

        #[test]
        fn only_repairs_move_journeys(journeys in journeys_strategy()) {
            let before: HashMap<usize, NaiveDateTime> = journeys
                .iter()
                .map(|j| (j.original_index(), j.departure_time()))
                .collect();
            let result = run(journeys);

            for j in &result.journeys {
                if !j.is_repaired() {
                    prop_assert_eq!(j.departure_time(), before[&j.original_index()]);
                } else {
                    prop_assert!(j.departure_time() > before[&j.original_index()]);
                }
            }
            let degraded = result.journeys.iter().filter(|j| j.is_degraded()).count();
            prop_assert_eq!(degraded, result.degraded.len());
        }
    }
}
