//! Directions API response DTOs.
//!
//! These types map directly to the provider's JSON. Fields the planner does
//! not read are left out; the whole route object is also kept as raw JSON so
//! it can be passed through for rendering.

use serde::Deserialize;

/// Top-level directions response.
#[derive(Debug, Clone, Deserialize)]
pub struct DirectionsResponse {
    /// Provider status code, e.g. `OK`, `ZERO_RESULTS`, `OVER_QUERY_LIMIT`.
    pub status: String,

    /// Extra detail the provider attaches to non-OK statuses.
    pub error_message: Option<String>,

    /// Candidate routes, best first. Kept raw; see [`Route`].
    #[serde(default)]
    pub routes: Vec<serde_json::Value>,
}

/// The parts of a route the planner reads.
#[derive(Debug, Clone, Deserialize)]
pub struct Route {
    #[serde(default)]
    pub legs: Vec<Leg>,
}

/// One leg of a route. Requests have no waypoints, so there is one leg.
#[derive(Debug, Clone, Deserialize)]
pub struct Leg {
    /// Traffic-free travel time.
    pub duration: TextValue,

    /// Travel time given predicted traffic. Only present when a departure
    /// time was requested.
    pub duration_in_traffic: Option<TextValue>,
}

/// A measured quantity: display text plus its value in seconds.
#[derive(Debug, Clone, Deserialize)]
pub struct TextValue {
    pub text: String,
    pub value: u64,
}
