//! Fallback collaborators for runtime-disabled integrations
//!
//! The engine always needs a fan-out and a pricer. When the corresponding
//! config section is absent or the runtime flag is off, these stand-ins
//! keep the ride API functional: notifications silently resolve to "no
//! devices" and fare quotes fail loudly so callers supply a price.

use rideflow_common::models::{FanoutReport, NotificationMessage};
use rideflow_common::services::{BoxFuture, InfallibleFuture, NotificationFanout};
use rideflow_pricing::{FareEstimate, FarePricer, PricingError};
use tracing::debug;

/// Fan-out used when push notifications are disabled.
pub struct DisabledFanout;

impl NotificationFanout for DisabledFanout {
    fn send_to_ids(
        &self,
        ids: Vec<String>,
        message: NotificationMessage,
    ) -> InfallibleFuture<'_, FanoutReport> {
        debug!(
            recipients = ids.len(),
            title = %message.title,
            "Notifications disabled, dropping fan-out"
        );
        Box::pin(async { FanoutReport::no_devices() })
    }
}

/// Pricer used when the routing integration is disabled.
///
/// Ride creation still works as long as the client supplies a price; a
/// quote request surfaces a configuration error instead.
pub struct DisabledPricer;

impl FarePricer for DisabledPricer {
    fn quote<'a>(
        &'a self,
        _origin: &'a str,
        _destination: &'a str,
    ) -> BoxFuture<'a, FareEstimate, PricingError> {
        Box::pin(async {
            Err(PricingError::ConfigError(
                "Pricing is disabled; supply a price at creation".to_string(),
            ))
        })
    }
}
