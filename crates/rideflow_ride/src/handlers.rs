//! HTTP handlers for the ride dispatch API
//!
//! Request payloads are explicit structs validated at the boundary;
//! malformed input never reaches the engine. Handlers are generic over
//! the ride repository so the same surface serves the SQL store in
//! production and the in-memory store in tests.

use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::str::FromStr;
use std::sync::Arc;
use tracing::error;

use crate::engine::{CreateRide, RideEngine};
use crate::error::RideError;
use rideflow_common::error::{ErrorBody, HttpStatusCode};
use rideflow_common::models::RideStatus;
use rideflow_db::repositories::RideRepository;

/// Request body for driver-initiated transitions (accept, reject, end)
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct DriverAction {
    /// The driver performing the transition
    pub driver_id: String,
}

/// Optional status filter carried in the query string
#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    pub status: Option<String>,
}

fn parse_status(raw: &str) -> Result<RideStatus, RideError> {
    RideStatus::from_str(raw)
        .map_err(|_| RideError::Validation(format!("Unknown ride status: {}", raw)))
}

fn parse_status_filter(query: &StatusQuery) -> Result<Option<RideStatus>, RideError> {
    match query.status.as_deref() {
        Some(raw) => Ok(Some(parse_status(raw)?)),
        None => Ok(None),
    }
}

/// Map an engine error onto the wire: 400 for validation, 404 for
/// missing rides, 400 with the conflicting ride attached for conflicts,
/// 500 for pricing and storage failures.
fn error_response(err: RideError) -> Response {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    match err {
        RideError::Conflict { message, ride } => {
            (status, Json(ErrorBody::with_data(message, *ride))).into_response()
        }
        other => {
            if status.is_server_error() {
                error!("Ride operation failed: {:?}", other);
            }
            (status, Json(ErrorBody::message(other.to_string()))).into_response()
        }
    }
}

/// Handler for creating a ride
///
/// # Responses
///
/// - 201 Created: The stored ride, with its eligible driver set
/// - 400 Bad Request: Missing customer id or dropoff
/// - 500 Internal Server Error: Fare quote or storage failure
pub async fn create_ride_handler<R>(
    State(engine): State<Arc<RideEngine<R>>>,
    Json(payload): Json<CreateRide>,
) -> Response
where
    R: RideRepository + 'static,
{
    match engine.create_ride(payload).await {
        Ok(ride) => (StatusCode::CREATED, Json(ride)).into_response(),
        Err(err) => error_response(err),
    }
}

/// Handler for a driver accepting a ride
///
/// # Responses
///
/// - 200 OK: The accepted ride
/// - 400 Bad Request: Conflict, with the conflicting ride in `data`
/// - 404 Not Found: Unknown ride
pub async fn accept_ride_handler<R>(
    State(engine): State<Arc<RideEngine<R>>>,
    Path(ride_id): Path<String>,
    Json(payload): Json<DriverAction>,
) -> Response
where
    R: RideRepository + 'static,
{
    match engine.accept_ride(&ride_id, &payload.driver_id).await {
        Ok(ride) => Json(ride).into_response(),
        Err(err) => error_response(err),
    }
}

/// Handler for a driver rejecting a ride request
///
/// # Responses
///
/// - 200 OK: The ride with its membership sets updated
/// - 404 Not Found: Unknown ride
pub async fn reject_ride_handler<R>(
    State(engine): State<Arc<RideEngine<R>>>,
    Path(ride_id): Path<String>,
    Json(payload): Json<DriverAction>,
) -> Response
where
    R: RideRepository + 'static,
{
    match engine.reject_ride(&ride_id, &payload.driver_id).await {
        Ok(ride) => Json(ride).into_response(),
        Err(err) => error_response(err),
    }
}

/// Handler for a driver ending a ride
///
/// # Responses
///
/// - 200 OK: The closure result (ride, re-offer count, deliveries)
/// - 404 Not Found: Unknown ride
pub async fn end_ride_handler<R>(
    State(engine): State<Arc<RideEngine<R>>>,
    Path(ride_id): Path<String>,
    Json(payload): Json<DriverAction>,
) -> Response
where
    R: RideRepository + 'static,
{
    match engine.end_ride(&ride_id, &payload.driver_id).await {
        Ok(closure) => Json(closure).into_response(),
        Err(err) => error_response(err),
    }
}

/// Handler for cancelling a ride (or forcing another status)
///
/// # Responses
///
/// - 200 OK: The updated ride
/// - 400 Bad Request: Unknown status value
/// - 404 Not Found: Unknown ride
pub async fn cancel_ride_handler<R>(
    State(engine): State<Arc<RideEngine<R>>>,
    Path(ride_id): Path<String>,
    Query(query): Query<StatusQuery>,
) -> Response
where
    R: RideRepository + 'static,
{
    let status = match parse_status_filter(&query) {
        Ok(status) => status,
        Err(err) => return error_response(err),
    };

    match engine.cancel_ride(&ride_id, status).await {
        Ok(ride) => Json(ride).into_response(),
        Err(err) => error_response(err),
    }
}

/// Handler for fetching a ride by id
pub async fn get_ride_handler<R>(
    State(engine): State<Arc<RideEngine<R>>>,
    Path(ride_id): Path<String>,
) -> Response
where
    R: RideRepository + 'static,
{
    match engine.get_ride(&ride_id).await {
        Ok(ride) => Json(ride).into_response(),
        Err(err) => error_response(err),
    }
}

/// Handler for listing rides by status
pub async fn rides_by_status_handler<R>(
    State(engine): State<Arc<RideEngine<R>>>,
    Path(status): Path<String>,
) -> Response
where
    R: RideRepository + 'static,
{
    let status = match parse_status(&status) {
        Ok(status) => status,
        Err(err) => return error_response(err),
    };

    match engine.rides_by_status(status).await {
        Ok(rides) => Json(rides).into_response(),
        Err(err) => error_response(err),
    }
}

/// Handler for listing a customer's rides
///
/// Without a `status` filter, terminal rides are excluded.
pub async fn rides_for_customer_handler<R>(
    State(engine): State<Arc<RideEngine<R>>>,
    Path(customer_id): Path<String>,
    Query(query): Query<StatusQuery>,
) -> Response
where
    R: RideRepository + 'static,
{
    let status = match parse_status_filter(&query) {
        Ok(status) => status,
        Err(err) => return error_response(err),
    };

    match engine.rides_for_customer(&customer_id, status).await {
        Ok(rides) => Json(rides).into_response(),
        Err(err) => error_response(err),
    }
}

/// Handler for listing the pending requests a driver can accept
pub async fn driver_requests_handler<R>(
    State(engine): State<Arc<RideEngine<R>>>,
    Path(driver_id): Path<String>,
) -> Response
where
    R: RideRepository + 'static,
{
    match engine.requests_for_driver(&driver_id).await {
        Ok(rides) => Json(rides).into_response(),
        Err(err) => error_response(err),
    }
}

/// Handler for listing the rides assigned to a driver
pub async fn driver_rides_handler<R>(
    State(engine): State<Arc<RideEngine<R>>>,
    Path(driver_id): Path<String>,
    Query(query): Query<StatusQuery>,
) -> Response
where
    R: RideRepository + 'static,
{
    let status = match parse_status_filter(&query) {
        Ok(status) => status,
        Err(err) => return error_response(err),
    };

    match engine.rides_for_driver(&driver_id, status).await {
        Ok(rides) => Json(rides).into_response(),
        Err(err) => error_response(err),
    }
}
