
// Declare modules within this crate
pub mod error; // Error handling
pub mod http; // HTTP utilities
pub mod logging; // Logging utilities
pub mod models; // Data structures and models
pub mod services; // Service abstractions

// Re-export error types and utilities for easier access
pub use error::{ErrorBody, HttpStatusCode};

// Re-export HTTP utilities for easier access
pub use http::{create_client, HTTP_CLIENT};

// Re-export logging utilities for easier access
pub use logging::{init, init_with_level};

// Re-export the shared models for easier access
pub use models::{
    DeliveryOutcome, DeviceRegistration, FanoutReport, NotificationMessage, Ride, RideStatus,
};

// Re-export the service seams for easier access
pub use services::{BoxFuture, NotificationFanout, PaymentConfirmation, PaymentVerifier};
