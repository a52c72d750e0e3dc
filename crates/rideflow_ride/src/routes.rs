use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tracing::info;

use crate::engine::RideEngine;
use crate::handlers::{
    accept_ride_handler, cancel_ride_handler, create_ride_handler, driver_requests_handler,
    driver_rides_handler, end_ride_handler, get_ride_handler, reject_ride_handler,
    rides_by_status_handler, rides_for_customer_handler,
};
use rideflow_db::repositories::RideRepository;

/// Create ride dispatch routes for the API
///
/// # Arguments
///
/// * `engine` - The shared ride lifecycle engine
///
/// # Returns
///
/// An Axum router with the ride API endpoints
pub fn routes<R>(engine: Arc<RideEngine<R>>) -> Router
where
    R: RideRepository + 'static,
{
    info!("Ride routes initialized");

    Router::new()
        .route("/ride/", post(create_ride_handler::<R>))
        .route("/ride/{rideId}/accept", put(accept_ride_handler::<R>))
        .route("/ride/{rideId}/reject", put(reject_ride_handler::<R>))
        .route("/ride/{rideId}/end", put(end_ride_handler::<R>))
        .route("/ride/{rideId}/cancel", put(cancel_ride_handler::<R>))
        .route("/ride/{rideId}", get(get_ride_handler::<R>))
        .route("/ride/status/{status}", get(rides_by_status_handler::<R>))
        .route(
            "/ride/customer/{customerId}",
            get(rides_for_customer_handler::<R>),
        )
        .route(
            "/ride/driver/{driverId}/requests",
            get(driver_requests_handler::<R>),
        )
        .route(
            "/ride/driver/{driverId}/rides",
            get(driver_rides_handler::<R>),
        )
        .with_state(engine)
}
