//! Factories for the SQL repositories

use crate::repositories::device_registration_sql::SqlDeviceRegistrationRepository;
use crate::repositories::ride_sql::SqlRideRepository;
use crate::{DbClient, RepositoryFactory};

/// Factory for creating ride repositories
#[derive(Debug, Clone, Default)]
pub struct RideRepositoryFactory;

impl RideRepositoryFactory {
    /// Create a new ride repository factory.
    pub fn new() -> Self {
        Self
    }
}

impl RepositoryFactory<SqlRideRepository, DbClient> for RideRepositoryFactory {
    fn create_repository(&self, db_client: DbClient) -> SqlRideRepository {
        SqlRideRepository::new(db_client)
    }
}

/// Factory for creating device registration repositories
#[derive(Debug, Clone, Default)]
pub struct DeviceRegistrationRepositoryFactory;

impl DeviceRegistrationRepositoryFactory {
    /// Create a new device registration repository factory.
    pub fn new() -> Self {
        Self
    }
}

impl RepositoryFactory<SqlDeviceRegistrationRepository, DbClient>
    for DeviceRegistrationRepositoryFactory
{
    fn create_repository(&self, db_client: DbClient) -> SqlDeviceRegistrationRepository {
        SqlDeviceRegistrationRepository::new(db_client)
    }
}
