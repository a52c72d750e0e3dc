//! Service abstractions for external collaborators.
//!
//! These traits decouple the ride lifecycle engine from the concrete push
//! provider and payment gateway, allowing dependency injection and easier
//! testing. The fan-out seam is deliberately infallible at the type level:
//! notification delivery is best-effort and must never roll back a ride
//! state transition.

use crate::models::{FanoutReport, NotificationMessage};
use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::future::Future;
use std::pin::Pin;

/// Type alias for a boxed future that returns a Result
pub type BoxFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// Type alias for a boxed future without a failure channel
pub type InfallibleFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Best-effort push notification dispatch to a set of owner identifiers.
///
/// Implementations resolve each id to at most one registered device token
/// and send independently per token. Failures are collected into the
/// [`FanoutReport`], never raised: the caller's primary transaction has
/// already committed by the time fan-out runs.
pub trait NotificationFanout: Send + Sync {
    /// Send `message` to every id in `ids` that has a registered device.
    fn send_to_ids(
        &self,
        ids: Vec<String>,
        message: NotificationMessage,
    ) -> InfallibleFuture<'_, FanoutReport>;
}

/// Result of a payment confirmation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentConfirmation {
    /// The gateway's payment reference.
    pub payment_id: String,
    /// The gateway-reported status (e.g. "captured").
    pub status: String,
    /// The confirmed amount in minor units.
    pub amount: i64,
}

/// Seam for the external payment gateway.
///
/// The dispatch core only ever asks the gateway to confirm a payment for a
/// ride; checkout itself happens in the mobile client.
pub trait PaymentVerifier: Send + Sync {
    /// Error type returned by payment operations.
    type Error: StdError + Send + Sync + 'static;

    /// Confirm that a payment of `amount` exists for `ride_id`.
    fn confirm_payment(
        &self,
        ride_id: &str,
        amount: i64,
    ) -> BoxFuture<'_, PaymentConfirmation, Self::Error>;
}
