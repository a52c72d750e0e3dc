//! Error types for the ride lifecycle engine

use rideflow_common::error::HttpStatusCode;
use rideflow_common::models::Ride;
use rideflow_db::error::DbError;
use rideflow_pricing::PricingError;
use thiserror::Error;

/// Errors that can occur during ride lifecycle operations
#[derive(Error, Debug)]
pub enum RideError {
    /// Invalid input rejected at the boundary
    #[error("Validation error: {0}")]
    Validation(String),

    /// The referenced ride does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// The transition is not allowed from the ride's current state.
    ///
    /// Carries the conflicting ride so clients can reconcile their
    /// optimistic local state against what the server holds.
    #[error("Conflict: {message}")]
    Conflict {
        message: String,
        ride: Box<Ride>,
    },

    /// Fare computation failed; creation is aborted since the price is
    /// persisted immutably at creation time.
    #[error("Pricing error: {0}")]
    Pricing(#[from] PricingError),

    /// Storage failure
    #[error("Database error: {0}")]
    Db(#[from] DbError),
}

impl RideError {
    /// Shorthand for a conflict carrying the current ride.
    pub fn conflict(message: impl Into<String>, ride: Ride) -> Self {
        RideError::Conflict {
            message: message.into(),
            ride: Box::new(ride),
        }
    }
}

impl HttpStatusCode for RideError {
    fn status_code(&self) -> u16 {
        match self {
            RideError::Validation(_) => 400,
            RideError::NotFound(_) => 404,
            RideError::Conflict { .. } => 400,
            RideError::Pricing(_) => 500,
            RideError::Db(_) => 500,
        }
    }
}
