//! HTTP route handlers.

use axum::body::Bytes;
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tracing::warn;

use crate::planner::ItineraryPlanner;

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/itinerary/plan", post(plan_itinerary))
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Plan an itinerary for one day.
///
/// Journeys that cannot be planned are reported in the response rather
/// than failing the request.
async fn plan_itinerary(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<PlanItineraryResponse>, AppError> {
    // Parse JSON manually so we can log the body on failure
    let req: PlanItineraryRequest = serde_json::from_slice(&body).map_err(|e| {
        warn!(error = %e, body = %String::from_utf8_lossy(&body), "Invalid plan request JSON");
        AppError::BadRequest {
            message: format!("Invalid JSON: {e}"),
        }
    })?;

    let plan = req.into_plan_request()?;

    let planner = ItineraryPlanner::new(state.oracle.as_ref(), &state.config);
    let outcome = planner.plan(plan).await;

    Ok(Json(PlanItineraryResponse::from_outcome(&outcome)))
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
}

impl From<RequestError> for AppError {
    fn from(e: RequestError) -> Self {
        AppError::BadRequest {
            message: e.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
        };

        warn!(%status, %message, "Request rejected");

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
