//! PostgreSQL persistence for the Rideflow dispatch service
//!
//! This crate provides the database client and the repositories backing
//! the ride lifecycle engine and the notification fan-out:
//!
//! - [`DbClient`]: SQLx connection pool with bounded acquire timeout
//! - [`RideRepository`] / [`SqlRideRepository`]: the ride table, with the
//!   conditional-accept and close-and-reoffer semantics the engine's
//!   concurrency model relies on
//! - [`DeviceRegistrationRepository`] / [`SqlDeviceRegistrationRepository`]:
//!   push token storage keyed by owner id

pub mod client;
pub mod error;
pub mod repositories;
pub mod repository;

// Re-export the client and repository traits for ease of use
pub use client::{DbClient, DbTransaction};
pub use error::DbError;
pub use repository::RepositoryFactory;

// Re-export the repositories module components for ease of use
pub use repositories::{
    DeviceRegistration, DeviceRegistrationRepository, DeviceRegistrationRepositoryFactory, Ride,
    RideRepository, RideRepositoryFactory, RideStatus, SqlDeviceRegistrationRepository,
    SqlRideRepository,
};
