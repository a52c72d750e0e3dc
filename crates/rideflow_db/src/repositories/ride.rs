//! Repository trait for the ride table
//!
//! The ride table is the source of truth for every lifecycle transition.
//! All mutating operations that the engine's concurrency model depends on
//! (conditional accept, server-side array updates, the close-and-reoffer
//! transaction) live behind this trait so they can be implemented with a
//! single SQL statement or transaction, never a read-modify-write from the
//! application side.

use crate::error::DbError;

// Re-export the ride model from rideflow_common for convenience
pub use rideflow_common::models::{Ride, RideStatus};

/// Repository for rides and driver eligibility reads.
pub trait RideRepository: Send + Sync {
    /// Create the ride and driver tables if they don't already exist.
    fn init_schema(&self) -> impl std::future::Future<Output = Result<(), DbError>> + Send;

    /// Persist a freshly created ride and return the stored row.
    fn insert(&self, ride: Ride) -> impl std::future::Future<Output = Result<Ride, DbError>> + Send;

    /// Fetch a ride by id.
    fn find_by_id(
        &self,
        ride_id: &str,
    ) -> impl std::future::Future<Output = Result<Option<Ride>, DbError>> + Send;

    /// Fetch all rides with the given status.
    fn find_by_status(
        &self,
        status: RideStatus,
    ) -> impl std::future::Future<Output = Result<Vec<Ride>, DbError>> + Send;

    /// Fetch rides for a customer. Without a status filter, terminal rides
    /// (`ended`, `cancel`) are excluded.
    fn find_by_customer(
        &self,
        customer_id: &str,
        status: Option<RideStatus>,
    ) -> impl std::future::Future<Output = Result<Vec<Ride>, DbError>> + Send;

    /// Fetch pending requests for a driver: rides whose `requested_to`
    /// contains the driver and whose status is `created`.
    fn find_requests_for_driver(
        &self,
        driver_id: &str,
    ) -> impl std::future::Future<Output = Result<Vec<Ride>, DbError>> + Send;

    /// Fetch rides assigned to a driver, optionally filtered by status.
    fn find_by_driver(
        &self,
        driver_id: &str,
        status: Option<RideStatus>,
    ) -> impl std::future::Future<Output = Result<Vec<Ride>, DbError>> + Send;

    /// All known driver ids. The driver table is populated by the external
    /// auth service; this service only reads it.
    fn list_driver_ids(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<String>, DbError>> + Send;

    /// Ids of drivers currently assigned to a `started` ride.
    fn busy_driver_ids(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<String>, DbError>> + Send;

    /// The driver's current `started` ride, if any.
    fn active_ride_for_driver(
        &self,
        driver_id: &str,
    ) -> impl std::future::Future<Output = Result<Option<Ride>, DbError>> + Send;

    /// Atomically accept a ride: assign the driver and move to `started`
    /// in one conditional update guarded by the ride's current status.
    ///
    /// Returns `None` when the guard fails, either because the ride does
    /// not exist or because another driver won the race; the caller
    /// re-reads to distinguish the two.
    fn try_accept(
        &self,
        ride_id: &str,
        driver_id: &str,
    ) -> impl std::future::Future<Output = Result<Option<Ride>, DbError>> + Send;

    /// Record a driver's rejection: append to `rejected_by` (idempotent)
    /// and remove from `requested_to`, both server-side in one statement.
    ///
    /// Returns `None` if the ride does not exist.
    fn reject(
        &self,
        ride_id: &str,
        driver_id: &str,
    ) -> impl std::future::Future<Output = Result<Option<Ride>, DbError>> + Send;

    /// Set the ride's status unconditionally. Returns `None` if the ride
    /// does not exist.
    fn set_status(
        &self,
        ride_id: &str,
        status: RideStatus,
    ) -> impl std::future::Future<Output = Result<Option<Ride>, DbError>> + Send;

    /// End a ride and re-offer the freed driver to every other `created`
    /// ride that has the driver in neither `requested_to` nor
    /// `rejected_by`, all within a single transaction.
    ///
    /// Returns the ended ride and the number of rides the driver was
    /// re-added to, or `None` if the ride does not exist.
    fn close_and_reoffer(
        &self,
        ride_id: &str,
        driver_id: &str,
    ) -> impl std::future::Future<Output = Result<Option<(Ride, u64)>, DbError>> + Send;
}
