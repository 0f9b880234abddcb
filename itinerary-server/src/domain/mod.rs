//! Domain types for the itinerary planner.
//!
//! This module contains the core domain model types. All types enforce
//! their invariants at construction time, so code that receives these
//! types can trust their validity.

mod error;
mod estimate;
mod journey;
mod location;
mod request;
mod time;

pub use error::DomainError;
pub use estimate::TravelEstimate;
pub use journey::{Journey, journey_times};
pub use location::{InvalidLocation, Location};
pub use request::{JourneyRequest, MAX_DWELL, SchedulingObjective, TimePolicy};
pub use time::{TimeError, dwell_from_parts, format_hhmm, parse_date, parse_hhmm};
