use axum::{routing::post, Router};
use std::sync::Arc;
use tracing::info;

use crate::handlers::{estimate_handler, PricingState};

/// Create pricing routes for the API
///
/// # Arguments
///
/// * `state` - Shared handler state holding the fare pricer
///
/// # Returns
///
/// An Axum router with the pricing API endpoints
pub fn routes(state: Arc<PricingState>) -> Router {
    info!("Pricing routes initialized");

    Router::new()
        .route("/price/estimate", post(estimate_handler))
        .with_state(state)
}
