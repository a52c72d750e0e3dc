//! Repository modules for database access

pub mod device_registration;
pub mod device_registration_sql;
pub mod factories;
pub mod ride;
pub mod ride_sql;

// Re-export the repositories and factories for ease of use
pub use device_registration::{DeviceRegistration, DeviceRegistrationRepository};
pub use device_registration_sql::SqlDeviceRegistrationRepository;
pub use factories::{DeviceRegistrationRepositoryFactory, RideRepositoryFactory};
pub use ride::{Ride, RideRepository, RideStatus};
pub use ride_sql::SqlRideRepository;
