//! Data structures shared across the application: the ride entity, its
//! status machine, device registrations and the notification fan-out
//! result types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Lifecycle status of a ride.
///
/// `created` and `started` are the only states from which forward
/// transitions fire; `ended` and `cancel` are terminal. There is no
/// separate `accepted` state: acceptance and `started` are the same
/// transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum RideStatus {
    Created,
    Started,
    Ended,
    Cancel,
}

impl RideStatus {
    /// The wire/database representation of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            RideStatus::Created => "created",
            RideStatus::Started => "started",
            RideStatus::Ended => "ended",
            RideStatus::Cancel => "cancel",
        }
    }

    /// Whether no further forward transition can fire from this status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, RideStatus::Ended | RideStatus::Cancel)
    }
}

impl fmt::Display for RideStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RideStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created" => Ok(RideStatus::Created),
            "started" => Ok(RideStatus::Started),
            "ended" => Ok(RideStatus::Ended),
            "cancel" => Ok(RideStatus::Cancel),
            other => Err(format!("unknown ride status: {other}")),
        }
    }
}

/// A single customer transport request, tracked from creation to a
/// terminal state. This is the central entity of the dispatch service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Ride {
    /// Unique identifier, generated at creation, immutable.
    pub ride_id: String,

    /// Identifier of the requesting rider. Immutable.
    pub customer_id: String,

    /// Identifier of the assigned driver; `None` until accepted.
    pub driver_id: Option<String>,

    /// Mirrors `driver_id` once set. Redundant field retained for
    /// compatibility with existing clients; set exactly once.
    pub accepted_by: Option<String>,

    /// Opaque serialized destination descriptor. Immutable after creation.
    pub place_to: serde_json::Value,

    /// Opaque serialized origin descriptor. Immutable after creation.
    pub place_from: Option<serde_json::Value>,

    /// Fare estimate computed at creation time. Never recomputed.
    pub price: i64,

    /// Pool of drivers currently eligible to accept this ride. Shrinks as
    /// drivers reject or the ride leaves `created`.
    pub requested_to: Vec<String>,

    /// Drivers who have explicitly declined this ride. Monotonically
    /// grows; a rejected driver is never re-added to `requested_to`.
    pub rejected_by: Vec<String>,

    pub status: RideStatus,

    pub created_at: Option<DateTime<Utc>>,
}

/// Represents a registered push notification target.
///
/// Each registration is keyed by the owner identifier (driver or rider id);
/// a later registration overwrites the earlier token for the same id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct DeviceRegistration {
    /// The owner identifier this device belongs to.
    pub id: String,

    /// The FCM registration token.
    pub fcm_token: String,

    /// Device platform (ios, android, web); `unknown` if unreported.
    pub device_type: String,

    /// Whether this registration should receive notifications.
    pub active: bool,

    pub created_at: Option<DateTime<Utc>>,
    pub last_updated: Option<DateTime<Utc>>,
    pub last_notified: Option<DateTime<Utc>>,
}

impl DeviceRegistration {
    /// Create a new active registration for the given owner.
    pub fn new(id: String, fcm_token: String, device_type: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            fcm_token,
            device_type: device_type.unwrap_or_else(|| "unknown".to_string()),
            active: true,
            created_at: Some(now),
            last_updated: Some(now),
            last_notified: None,
        }
    }
}

/// A notification payload addressed by owner id rather than device token.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct NotificationMessage {
    /// The title of the notification.
    pub title: String,

    /// The body text of the notification.
    pub body: String,

    /// Custom key-value data delivered alongside the notification. FCM
    /// requires string values, so callers stringify anything richer.
    pub data: Option<HashMap<String, String>>,
}

impl NotificationMessage {
    /// Convenience constructor carrying a single `rideId` data entry,
    /// which is what every lifecycle notification sends.
    pub fn for_ride(title: &str, body: &str, ride_id: &str) -> Self {
        let mut data = HashMap::new();
        data.insert("rideId".to_string(), ride_id.to_string());
        Self {
            title: title.to_string(),
            body: body.to_string(),
            data: Some(data),
        }
    }
}

/// Delivery outcome for a single recipient of a fan-out.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct DeliveryOutcome {
    /// The owner identifier the delivery was addressed to.
    pub recipient_id: String,

    /// Whether the push provider accepted the message.
    pub success: bool,

    /// Provider message id on success.
    pub message_id: Option<String>,

    /// Provider error text on failure.
    pub error: Option<String>,
}

/// Aggregate result of a notification fan-out.
///
/// Fan-out is explicitly best-effort: this report is returned instead of
/// an error so callers of state-changing operations can observe delivery
/// outcomes without a failed push rolling anything back.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct FanoutReport {
    /// Number of registrations resolved for the requested ids.
    pub total_devices: usize,

    /// Number of sends the provider accepted.
    pub success_count: usize,

    /// Number of sends that failed.
    pub failure_count: usize,

    /// Per-recipient outcomes, in no particular order.
    pub responses: Vec<DeliveryOutcome>,
}

impl FanoutReport {
    /// Report for a fan-out that resolved no registered devices.
    pub fn no_devices() -> Self {
        Self::default()
    }
}
