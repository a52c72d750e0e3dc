//! Repository for device registrations
//!
//! Stores the push notification tokens the fan-out component resolves
//! recipient ids against. One active token per owner id at a time: a later
//! registration overwrites the earlier token for the same id.

use crate::error::DbError;

// Re-export DeviceRegistration from rideflow_common for convenience
pub use rideflow_common::models::DeviceRegistration;

/// Repository for device registrations, keyed by owner id.
pub trait DeviceRegistrationRepository: Send + Sync {
    /// Create the device registration table if it doesn't already exist.
    fn init_schema(&self) -> impl std::future::Future<Output = Result<(), DbError>> + Send;

    /// Upsert a registration. An existing row for the same id has its
    /// token and device type overwritten and is re-activated.
    fn register_device(
        &self,
        registration: DeviceRegistration,
    ) -> impl std::future::Future<Output = Result<DeviceRegistration, DbError>> + Send;

    /// Find a registration by owner id.
    fn find_by_id(
        &self,
        id: &str,
    ) -> impl std::future::Future<Output = Result<Option<DeviceRegistration>, DbError>> + Send;

    /// Find the active registrations for a set of owner ids. Ids without
    /// a registration are simply absent from the result.
    fn find_by_ids(
        &self,
        ids: &[String],
    ) -> impl std::future::Future<Output = Result<Vec<DeviceRegistration>, DbError>> + Send;

    /// Stamp `last_notified` for the given owner ids.
    fn mark_notified(
        &self,
        ids: &[String],
    ) -> impl std::future::Future<Output = Result<(), DbError>> + Send;

    /// Delete a registration. Returns `true` if a row was removed.
    fn delete_registration(
        &self,
        id: &str,
    ) -> impl std::future::Future<Output = Result<bool, DbError>> + Send;
}
