//! Error types for the pricing crate

use rideflow_common::error::HttpStatusCode;
use thiserror::Error;

/// Errors that can occur while computing a fare estimate
#[derive(Error, Debug)]
pub enum PricingError {
    /// Missing required configuration
    #[error("Missing configuration: {0}")]
    ConfigError(String),

    /// Error during HTTP request to the routing provider
    #[error("HTTP request error: {0}")]
    RequestError(#[from] reqwest::Error),

    /// Error returned by the routing provider API
    #[error("Routing API error: {0}")]
    ApiError(String),

    /// The provider could not produce a route between the two places
    #[error("No route found: {0}")]
    NoRoute(String),
}

impl HttpStatusCode for PricingError {
    fn status_code(&self) -> u16 {
        match self {
            PricingError::ConfigError(_) => 500,
            PricingError::RequestError(_) => 502,
            PricingError::ApiError(_) => 502,
            PricingError::NoRoute(_) => 422,
        }
    }
}
