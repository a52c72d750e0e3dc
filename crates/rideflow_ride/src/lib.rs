//! Ride lifecycle engine and dispatch API for the Rideflow service
//!
//! The heart of the service: the state machine that takes a ride from
//! creation through driver matching, acceptance, execution, and
//! completion, with best-effort push notifications at each transition.
//! See [`engine::RideEngine`] for the transition rules.

pub mod engine;
pub mod error;
pub mod handlers;
pub mod routes;

#[cfg(feature = "openapi")]
pub mod doc;

pub use engine::{CreateRide, RideClosure, RideEngine};
pub use error::RideError;
pub use routes::routes;

#[cfg(test)]
mod test_support;

#[cfg(test)]
mod engine_test;

#[cfg(test)]
mod handlers_test;
