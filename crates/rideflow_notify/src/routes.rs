use axum::{
    routing::{delete, post},
    Router,
};
use std::sync::Arc;
use tracing::info;

use crate::handlers::{
    notify_handler, register_device_handler, unregister_device_handler, NotifyState,
};
use rideflow_db::repositories::DeviceRegistrationRepository;

/// Create notification routes for the API
///
/// Builds a router with the device registration and fan-out endpoints.
/// The caller supplies the shared state, which wires a concrete device
/// registration repository to the fan-out service.
///
/// # Arguments
///
/// * `state` - Shared handler state holding the repository and fan-out service
///
/// # Returns
///
/// An Axum router with the notification API endpoints
pub fn routes<D>(state: Arc<NotifyState<D>>) -> Router
where
    D: DeviceRegistrationRepository + Send + Sync + 'static,
{
    info!("Notification routes initialized");

    Router::new()
        .route("/notification/register", post(register_device_handler::<D>))
        .route("/notification/notify", post(notify_handler::<D>))
        .route(
            "/notification/unregister/{id}",
            delete(unregister_device_handler::<D>),
        )
        .with_state(state)
}
