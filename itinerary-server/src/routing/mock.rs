//! Mock routing oracle for running without API access.
//!
//! Serves travel times from a JSON fixture file:
//!
//! ```json
//! {
//!   "default_minutes": 20,
//!   "routes": [
//!     { "origin": "Home", "destination": "Office", "minutes": 25,
//!       "at": { "08:00": 40, "08:05": null } }
//!   ]
//! }
//! ```
//!
//! A route's `at` entries override its `minutes` for that departure time;
//! a `null` entry makes the query fail as if the provider were down.

use std::collections::HashMap;
use std::path::Path;

use chrono::{NaiveDateTime, NaiveTime};
use serde::Deserialize;

use crate::domain::{Location, TravelEstimate, parse_hhmm};
use crate::planner::{OracleError, RoutingOracle};

use super::error::RoutingError;

#[derive(Debug, Deserialize)]
struct MockFile {
    default_minutes: Option<u32>,
    #[serde(default)]
    routes: Vec<MockRouteEntry>,
}

#[derive(Debug, Deserialize)]
struct MockRouteEntry {
    origin: String,
    destination: String,
    minutes: Option<u32>,
    #[serde(default)]
    at: HashMap<String, Option<u32>>,
}

#[derive(Debug, Clone)]
struct MockRoute {
    minutes: Option<u32>,
    at: HashMap<NaiveTime, Option<u32>>,
}

/// Mock routing oracle that serves travel times from a fixture.
#[derive(Debug, Clone)]
pub struct MockOracle {
    default_minutes: Option<u32>,
    routes: HashMap<(String, String), MockRoute>,
}

impl MockOracle {
    /// Load a fixture file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, RoutingError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            RoutingError::NotConfigured(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_json(&json)
    }

    /// Parse a fixture from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, RoutingError> {
        let file: MockFile = serde_json::from_str(json).map_err(|e| RoutingError::Json {
            message: e.to_string(),
            body: None,
        })?;

        let mut routes = HashMap::with_capacity(file.routes.len());
        for entry in file.routes {
            let mut at = HashMap::with_capacity(entry.at.len());
            for (time, minutes) in entry.at {
                let time = parse_hhmm(&time).map_err(|e| {
                    RoutingError::NotConfigured(format!(
                        "bad time in mock route {} -> {}: {e}",
                        entry.origin, entry.destination
                    ))
                })?;
                at.insert(time, minutes);
            }

            routes.insert(
                (entry.origin.trim().to_string(), entry.destination.trim().to_string()),
                MockRoute {
                    minutes: entry.minutes,
                    at,
                },
            );
        }

        Ok(Self {
            default_minutes: file.default_minutes,
            routes,
        })
    }

    /// Number of scripted routes.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    fn lookup(
        &self,
        origin: &Location,
        destination: &Location,
        departure: NaiveDateTime,
    ) -> Result<TravelEstimate, OracleError> {
        let key = (origin.as_str().to_string(), destination.as_str().to_string());
        let minutes = match self.routes.get(&key) {
            Some(route) => match route.at.get(&departure.time()) {
                Some(Some(minutes)) => Some(*minutes),
                Some(None) => {
                    return Err(OracleError::Unavailable(format!(
                        "mock failure for {origin} -> {destination} at {departure}"
                    )));
                }
                None => route.minutes.or(self.default_minutes),
            },
            None => self.default_minutes,
        };

        minutes
            .map(|m| TravelEstimate::from_mins(m).with_summary(format!("{m} mins")))
            .ok_or(OracleError::NotFound)
    }
}

impl RoutingOracle for MockOracle {
    async fn estimate_travel(
        &self,
        origin: &Location,
        destination: &Location,
        departure: NaiveDateTime,
    ) -> Result<TravelEstimate, OracleError> {
        self.lookup(origin, destination, departure)
    }
}
