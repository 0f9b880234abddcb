//! Routing provider client.
//!
//! This module provides the live routing oracle, an HTTP client for a
//! Google-style directions API, and a fixture-backed mock.
//!
//! Key characteristics of the provider:
//! - Departure times are unix seconds, and must not be in the past
//! - `duration_in_traffic` is only returned when a departure time is given
//! - Failures come back as HTTP 200 with a non-`OK` `status` field

mod client;
mod convert;
mod error;
mod mock;
mod types;

pub use client::{RoutingClient, RoutingConfig, departure_param};
pub use convert::convert_directions;
pub use error::RoutingError;
pub use mock::MockOracle;
pub use types::{DirectionsResponse, Leg, Route, TextValue};
