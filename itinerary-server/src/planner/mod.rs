//! Itinerary planner.
//!
//! Each journey is planned on its own first: the departure search probes
//! the routing oracle across a window around the preferred time and picks
//! the fastest qualifying departure. The scheduler then orders the built
//! journeys greedily and pushes back any that would overlap the one before.

mod config;
mod oracle;
mod plan;
mod schedule;
mod search;

pub use config::PlannerConfig;
pub use oracle::{OracleError, RoutingOracle};
pub use plan::{ItineraryPlanner, PlanOutcome, PlanRequest};
pub use schedule::{
    ItineraryScheduler, Placement, RepairDegraded, RepairFailure, ScheduleResult, next_placement,
};
pub use search::{
    DepartureSearch, Probe, SearchError, SearchFailure, candidate_departures, fallback_departure,
    qualifies, select_departure,
};
