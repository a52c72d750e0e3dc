//! Best-effort notification fan-out
//!
//! Resolves recipient ids to registered device tokens and sends one push
//! per token, collecting per-recipient outcomes into a [`FanoutReport`].
//! Delivery failures are recorded, never raised: by the time fan-out runs
//! the ride state transition that triggered it has already committed.

use crate::client::{Notification, PushSender};
use rideflow_common::models::{DeliveryOutcome, FanoutReport, NotificationMessage};
use rideflow_common::services::{InfallibleFuture, NotificationFanout};
use rideflow_db::repositories::DeviceRegistrationRepository;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Fan-out service wiring a [`PushSender`] to the device registration store.
pub struct FanoutService<S, D> {
    sender: Arc<S>,
    devices: D,
}

impl<S, D> FanoutService<S, D>
where
    S: PushSender,
    D: DeviceRegistrationRepository,
{
    /// Create a new fan-out service.
    pub fn new(sender: Arc<S>, devices: D) -> Self {
        Self { sender, devices }
    }

    /// Resolve `ids` to device tokens and send `message` to each.
    ///
    /// Ids without an active registration are silently skipped. Each send
    /// is independent: one failed token does not affect the others.
    pub async fn dispatch(&self, ids: Vec<String>, message: NotificationMessage) -> FanoutReport {
        if ids.is_empty() {
            debug!("Fan-out requested with no recipient ids");
            return FanoutReport::no_devices();
        }

        let registrations = match self.devices.find_by_ids(&ids).await {
            Ok(registrations) => registrations,
            Err(err) => {
                // Lookup failure degrades to an empty fan-out.
                error!(error = %err, "Failed to resolve device registrations");
                return FanoutReport::no_devices();
            }
        };

        if registrations.is_empty() {
            debug!(requested = ids.len(), "No registered devices for recipients");
            return FanoutReport::no_devices();
        }

        let notification = Notification {
            title: message.title.clone(),
            body: message.body.clone(),
        };

        let mut responses = Vec::with_capacity(registrations.len());
        let mut success_count = 0;
        let mut notified_ids = Vec::with_capacity(registrations.len());

        for registration in &registrations {
            let outcome = match self
                .sender
                .send(
                    &registration.fcm_token,
                    notification.clone(),
                    message.data.clone(),
                )
                .await
            {
                Ok(message_id) => {
                    success_count += 1;
                    notified_ids.push(registration.id.clone());
                    DeliveryOutcome {
                        recipient_id: registration.id.clone(),
                        success: true,
                        message_id: Some(message_id),
                        error: None,
                    }
                }
                Err(err) => {
                    error!(recipient = %registration.id, error = %err, "Push delivery failed");
                    DeliveryOutcome {
                        recipient_id: registration.id.clone(),
                        success: false,
                        message_id: None,
                        error: Some(err.to_string()),
                    }
                }
            };
            responses.push(outcome);
        }

        if !notified_ids.is_empty() {
            if let Err(err) = self.devices.mark_notified(&notified_ids).await {
                // Bookkeeping only; the pushes already went out.
                error!(error = %err, "Failed to stamp last_notified");
            }
        }

        let total_devices = registrations.len();
        info!(
            total_devices,
            success_count,
            failure_count = total_devices - success_count,
            "Fan-out complete"
        );

        FanoutReport {
            total_devices,
            success_count,
            failure_count: total_devices - success_count,
            responses,
        }
    }
}

impl<S, D> NotificationFanout for FanoutService<S, D>
where
    S: PushSender + 'static,
    D: DeviceRegistrationRepository + 'static,
{
    fn send_to_ids(
        &self,
        ids: Vec<String>,
        message: NotificationMessage,
    ) -> InfallibleFuture<'_, FanoutReport> {
        Box::pin(self.dispatch(ids, message))
    }
}
