//! Routing provider client
//!
//! Resolves an origin/destination pair to road distance and duration via
//! the Google Distance Matrix API, and exposes the [`FarePricer`] seam the
//! ride engine quotes fares through. Tests substitute a static provider;
//! production wires [`GoogleRoutingClient`] behind [`FareService`].

use crate::error::PricingError;
use crate::logic::{estimate_for_route, FareEstimate};
use reqwest::Client;
use rideflow_common::http::{create_client, DEFAULT_TIMEOUT_SECS, HTTP_CLIENT};
use rideflow_common::services::BoxFuture;
use rideflow_config::RoutingConfig;
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

/// Default Distance Matrix endpoint. Overridable via `RoutingConfig::base_url`.
const DEFAULT_ROUTING_BASE_URL: &str = "https://maps.googleapis.com/maps/api/distancematrix";

/// Raw route metrics from the routing provider.
#[derive(Debug, Clone, Copy)]
pub struct RouteMetrics {
    /// Road distance in meters.
    pub distance_meters: i64,

    /// Travel time in seconds.
    pub duration_seconds: i64,
}

/// Seam between fare computation and the concrete routing provider.
pub trait RoutingProvider: Send + Sync {
    /// Resolve the route between two free-form place queries.
    fn route<'a>(
        &'a self,
        origin: &'a str,
        destination: &'a str,
    ) -> BoxFuture<'a, RouteMetrics, PricingError>;
}

/// Seam the ride engine quotes fares through.
///
/// The fare attached to a ride is computed exactly once, at creation; the
/// engine never re-quotes on accept or end.
pub trait FarePricer: Send + Sync {
    /// Quote the flat fare for a trip between two place queries.
    fn quote<'a>(
        &'a self,
        origin: &'a str,
        destination: &'a str,
    ) -> BoxFuture<'a, FareEstimate, PricingError>;
}

/// [`FarePricer`] backed by any [`RoutingProvider`].
pub struct FareService<P> {
    provider: Arc<P>,
}

impl<P: RoutingProvider> FareService<P> {
    /// Create a fare service over the given routing provider.
    pub fn new(provider: Arc<P>) -> Self {
        Self { provider }
    }
}

impl<P: RoutingProvider + 'static> FarePricer for FareService<P> {
    fn quote<'a>(
        &'a self,
        origin: &'a str,
        destination: &'a str,
    ) -> BoxFuture<'a, FareEstimate, PricingError> {
        Box::pin(async move {
            let metrics = self.provider.route(origin, destination).await?;
            debug!(
                distance_meters = metrics.distance_meters,
                duration_seconds = metrics.duration_seconds,
                "Route resolved"
            );
            Ok(estimate_for_route(
                metrics.distance_meters,
                metrics.duration_seconds,
            ))
        })
    }
}

// Response shapes for the Distance Matrix JSON API. Only the fields the
// fare computation needs are modeled.
#[derive(Debug, Deserialize)]
struct DistanceMatrixResponse {
    status: String,
    #[serde(default)]
    rows: Vec<DistanceMatrixRow>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DistanceMatrixRow {
    #[serde(default)]
    elements: Vec<DistanceMatrixElement>,
}

#[derive(Debug, Deserialize)]
struct DistanceMatrixElement {
    status: String,
    distance: Option<DistanceMatrixValue>,
    duration: Option<DistanceMatrixValue>,
}

#[derive(Debug, Deserialize)]
struct DistanceMatrixValue {
    value: i64,
}

/// Client for the Google Distance Matrix API
pub struct GoogleRoutingClient {
    /// HTTP client with a bounded request timeout
    client: Client,

    /// Routing provider configuration, including the API key
    config: RoutingConfig,
}

impl GoogleRoutingClient {
    /// Creates a new routing client with the given configuration
    ///
    /// # Arguments
    ///
    /// * `config` - The routing configuration, including API key and optional base URL
    pub fn new(config: RoutingConfig) -> Self {
        let timeout = config.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);
        // Falls back to the shared client if the custom one cannot be built.
        let client = create_client(timeout).unwrap_or_else(|_| HTTP_CLIENT.clone());
        Self { client, config }
    }

    async fn fetch_route(
        &self,
        origin: &str,
        destination: &str,
    ) -> Result<RouteMetrics, PricingError> {
        let api_key = self.config.api_key.as_deref().ok_or_else(|| {
            PricingError::ConfigError("Missing api_key in RoutingConfig".to_string())
        })?;

        let base_url = self
            .config
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_ROUTING_BASE_URL);

        let response = self
            .client
            .get(format!("{}/json", base_url))
            .query(&[
                ("origins", origin),
                ("destinations", destination),
                ("key", api_key),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            return Err(PricingError::ApiError(error_text));
        }

        let matrix: DistanceMatrixResponse = response.json().await?;

        if matrix.status != "OK" {
            let detail = matrix.error_message.unwrap_or(matrix.status);
            return Err(PricingError::ApiError(detail));
        }

        let element = matrix
            .rows
            .first()
            .and_then(|row| row.elements.first())
            .ok_or_else(|| PricingError::NoRoute("Empty distance matrix".to_string()))?;

        if element.status != "OK" {
            return Err(PricingError::NoRoute(element.status.clone()));
        }

        match (&element.distance, &element.duration) {
            (Some(distance), Some(duration)) => Ok(RouteMetrics {
                distance_meters: distance.value,
                duration_seconds: duration.value,
            }),
            _ => Err(PricingError::NoRoute(
                "Route element missing distance or duration".to_string(),
            )),
        }
    }
}

impl RoutingProvider for GoogleRoutingClient {
    fn route<'a>(
        &'a self,
        origin: &'a str,
        destination: &'a str,
    ) -> BoxFuture<'a, RouteMetrics, PricingError> {
        Box::pin(self.fetch_route(origin, destination))
    }
}
