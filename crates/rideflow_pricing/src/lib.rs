//! Distance-based fare pricing for the Rideflow dispatch service
//!
//! Fares are flat per distance band: short trips, medium trips, and
//! everything longer, quoted in INR. Road distance comes from a routing
//! provider behind the [`RoutingProvider`] seam; the ride engine quotes
//! through [`FarePricer`] so tests can run without the network.

pub mod client;
pub mod error;
pub mod handlers;
pub mod logic;
pub mod routes;

#[cfg(feature = "openapi")]
pub mod doc;

pub use client::{FarePricer, FareService, GoogleRoutingClient, RouteMetrics, RoutingProvider};
pub use error::PricingError;
pub use handlers::PricingState;
pub use logic::{estimate_for_route, location_query, price_for_distance, FareEstimate, CURRENCY};
pub use routes::routes;
