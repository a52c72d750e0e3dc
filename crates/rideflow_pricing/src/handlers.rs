//! HTTP handlers for fare estimation

use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error};

use crate::client::FarePricer;
use crate::logic::location_query;
use rideflow_common::error::{ErrorBody, HttpStatusCode};

/// Shared state for pricing handlers
pub struct PricingState {
    /// The fare pricer used to quote estimates
    pub pricer: Arc<dyn FarePricer>,
}

/// Request body for a fare estimate
///
/// Places are accepted in the same shape the ride endpoints store them:
/// either a bare address string or an object with an `address` field.
#[derive(Debug, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct EstimateRequest {
    /// The pickup place
    pub from: Value,

    /// The dropoff place
    pub to: Value,
}

/// Handler for quoting a fare between two places
///
/// # Responses
///
/// - 200 OK: The fare estimate
/// - 400 Bad Request: Missing or empty places
/// - 422 Unprocessable Entity: The provider found no route
/// - 502 Bad Gateway: The routing provider failed
pub async fn estimate_handler(
    State(state): State<Arc<PricingState>>,
    Json(payload): Json<EstimateRequest>,
) -> Response {
    let origin = location_query(&payload.from);
    let destination = location_query(&payload.to);

    if origin.trim().is_empty() || destination.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorBody::message("Both from and to are required")),
        )
            .into_response();
    }

    debug!(%origin, %destination, "Quoting fare");

    match state.pricer.quote(&origin, &destination).await {
        Ok(estimate) => Json(estimate).into_response(),
        Err(err) => {
            error!("Fare quote failed: {:?}", err);
            let status = StatusCode::from_u16(err.status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (status, Json(ErrorBody::message(err.to_string()))).into_response()
        }
    }
}
