//! Directions API HTTP client.
//!
//! Provides the live routing oracle. Handles authentication, rate limiting,
//! time zone conversion of departures, and conversion to travel estimates.

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};
use tokio::sync::Semaphore;
use tracing::debug;

use crate::domain::{Location, TravelEstimate};
use crate::planner::{OracleError, RoutingOracle};

use super::convert::convert_directions;
use super::error::RoutingError;
use super::types::DirectionsResponse;

/// Default base URL for the directions API.
const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api/directions";

/// Default maximum concurrent requests.
const DEFAULT_MAX_CONCURRENT: usize = 5;

/// Configuration for the routing client.
#[derive(Debug, Clone)]
pub struct RoutingConfig {
    /// API key, sent as the `key` query parameter
    pub api_key: String,
    /// Base URL for the API (defaults to the production endpoint)
    pub base_url: String,
    /// Maximum concurrent requests
    pub max_concurrent: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// UTC offset of the travel date's wall-clock times, in minutes
    pub utc_offset_mins: i32,
}

impl RoutingConfig {
    /// Create a new config with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            timeout_secs: 10,
            utc_offset_mins: 0,
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set maximum concurrent requests.
    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n;
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Set the UTC offset local times are interpreted in.
    pub fn with_utc_offset_mins(mut self, mins: i32) -> Self {
        self.utc_offset_mins = mins;
        self
    }
}

/// The `departure_time` query value for a local departure.
///
/// The provider rejects departures in the past, so anything at or before
/// `now` is sent as `now`.
pub fn departure_param(
    departure: NaiveDateTime,
    offset: FixedOffset,
    now: DateTime<Utc>,
) -> Result<String, RoutingError> {
    let instant = departure
        .and_local_timezone(offset)
        .single()
        .ok_or_else(|| RoutingError::NotConfigured(format!("departure {departure} out of range")))?;

    if instant.timestamp() <= now.timestamp() {
        Ok("now".to_string())
    } else {
        Ok(instant.timestamp().to_string())
    }
}

/// Directions API client.
///
/// Uses a semaphore to limit concurrent requests and avoid rate limiting.
#[derive(Debug, Clone)]
pub struct RoutingClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    offset: FixedOffset,
    semaphore: Arc<Semaphore>,
}

impl RoutingClient {
    /// Create a new routing client with the given configuration.
    pub fn new(config: RoutingConfig) -> Result<Self, RoutingError> {
        let offset = FixedOffset::east_opt(config.utc_offset_mins.saturating_mul(60)).ok_or_else(
            || RoutingError::NotConfigured(format!("invalid UTC offset: {} minutes", config.utc_offset_mins)),
        )?;

        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url,
            api_key: config.api_key,
            offset,
            semaphore: Arc::new(Semaphore::new(config.max_concurrent.max(1))),
        })
    }

    /// Get driving directions leaving at `departure` (local wall-clock time).
    pub async fn directions(
        &self,
        origin: &Location,
        destination: &Location,
        departure: NaiveDateTime,
    ) -> Result<TravelEstimate, RoutingError> {
        let departure_time = departure_param(departure, self.offset, Utc::now())?;

        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| RoutingError::NotConfigured("semaphore closed".to_string()))?;

        let url = format!("{}/json", self.base_url);

        let response = self
            .http
            .get(&url)
            .query(&[
                ("origin", origin.as_str()),
                ("destination", destination.as_str()),
                ("mode", "driving"),
                ("departure_time", departure_time.as_str()),
                ("traffic_model", "best_guess"),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(timeout_or_http)?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(RoutingError::RateLimited);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RoutingError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await.map_err(timeout_or_http)?;

        let directions: DirectionsResponse =
            serde_json::from_str(&body).map_err(|e| RoutingError::Json {
                message: e.to_string(),
                body: Some(body.chars().take(500).collect()),
            })?;

        convert_directions(directions)
    }
}

fn timeout_or_http(err: reqwest::Error) -> RoutingError {
    if err.is_timeout() {
        RoutingError::Timeout
    } else {
        RoutingError::Http(err)
    }
}

impl RoutingOracle for RoutingClient {
    async fn estimate_travel(
        &self,
        origin: &Location,
        destination: &Location,
        departure: NaiveDateTime,
    ) -> Result<TravelEstimate, OracleError> {
        self.directions(origin, destination, departure)
            .await
            .map_err(|e| {
                debug!(%origin, %destination, %departure, error = %e, "Directions request failed");
                OracleError::from(e)
            })
    }
}
