//! Conversion from directions DTOs to travel estimates.

use crate::domain::TravelEstimate;

use super::error::RoutingError;
use super::types::{DirectionsResponse, Route, TextValue};

/// Turn a directions response into an estimate for its first route.
///
/// The first leg's `duration` becomes the baseline and its
/// `duration_in_traffic`, when present, the traffic figure. The raw route
/// object is kept as the estimate's route payload.
pub fn convert_directions(response: DirectionsResponse) -> Result<TravelEstimate, RoutingError> {
    check_status(&response.status, response.error_message)?;

    let raw = response
        .routes
        .into_iter()
        .next()
        .ok_or_else(|| RoutingError::NoRoute("no routes in response".to_string()))?;

    let route: Route = serde_json::from_value(raw.clone()).map_err(|e| RoutingError::Json {
        message: e.to_string(),
        body: None,
    })?;

    let leg = route.legs.first().ok_or_else(|| RoutingError::Json {
        message: "route has no legs".to_string(),
        body: None,
    })?;

    let mut estimate = TravelEstimate::from_secs(seconds(&leg.duration)?);
    let summary = match &leg.duration_in_traffic {
        Some(traffic) => {
            estimate = estimate.with_traffic_secs(seconds(traffic)?);
            &traffic.text
        }
        None => &leg.duration.text,
    };

    Ok(estimate.with_summary(summary.as_str()).with_route(raw))
}

/// Map a provider status string onto an error, or `Ok` for `OK`.
fn check_status(status: &str, message: Option<String>) -> Result<(), RoutingError> {
    match status {
        "OK" => Ok(()),
        "OVER_QUERY_LIMIT" | "OVER_DAILY_LIMIT" => Err(RoutingError::RateLimited),
        "NOT_FOUND" | "ZERO_RESULTS" | "INVALID_REQUEST" => {
            Err(RoutingError::NoRoute(status.to_string()))
        }
        _ => Err(RoutingError::Status {
            status: status.to_string(),
            message,
        }),
    }
}

fn seconds(value: &TextValue) -> Result<u32, RoutingError> {
    u32::try_from(value.value).map_err(|_| RoutingError::Json {
        message: format!("duration out of range: {}", value.value),
        body: None,
    })
}
