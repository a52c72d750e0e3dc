//! HTTP handlers for device registration and notification fan-out
//!
//! This module provides the REST surface of the notification component:
//! registering a device token for an owner id, removing a registration,
//! and pushing a notification to one or more owner ids.
//!
//! The handlers are designed to be used with the Axum web framework and
//! include OpenAPI documentation when the `openapi` feature is enabled.

use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info};

use rideflow_common::models::{DeviceRegistration, FanoutReport, NotificationMessage};
use rideflow_common::services::NotificationFanout;
use rideflow_db::repositories::DeviceRegistrationRepository;

/// Shared state for notification handlers
///
/// Holds the device registration repository and the fan-out service the
/// handlers dispatch through.
pub struct NotifyState<D> {
    /// Repository for device registrations
    pub devices: D,

    /// Fan-out service used to deliver notifications
    pub fanout: Arc<dyn NotificationFanout>,
}

/// Request body for registering a device
///
/// This struct represents the JSON payload that should be sent to the
/// `/notification/register` endpoint to register a device token for an
/// owner id (a customer or driver id).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RegisterDeviceRequest {
    /// The owner id (customer or driver id) to register the token under
    pub id: String,

    /// The Firebase Cloud Messaging registration token
    pub token: String,

    /// The device platform, e.g. "android" or "ios"
    #[serde(default)]
    pub device_type: Option<String>,
}

/// Response body for the register device endpoint
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RegisterDeviceResponse {
    /// Whether the device was registered successfully
    pub success: bool,

    /// The stored registration, if successful
    pub device: Option<DeviceRegistration>,

    /// Error message if registration failed
    pub error: Option<String>,
}

/// Request body for sending a notification
///
/// Either `id` (single recipient) or `ids` (multiple recipients) must be
/// provided. Recipients without a registered device are skipped.
#[derive(Debug, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct NotifyRequest {
    /// A single recipient owner id
    pub id: Option<String>,

    /// Multiple recipient owner ids
    pub ids: Option<Vec<String>>,

    /// The title of the notification
    pub title: String,

    /// The body text of the notification
    pub body: String,

    /// Custom key-value data to be sent with the message
    pub data: Option<HashMap<String, String>>,
}

/// Response body for the notify endpoint
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct NotifyResponse {
    /// Whether at least one notification was delivered
    pub success: bool,

    /// Human-readable summary of the outcome
    pub message: String,

    /// Per-recipient delivery outcomes
    pub result: FanoutReport,
}

/// Response body for the unregister endpoint
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UnregisterDeviceResponse {
    /// Whether a registration was removed
    pub success: bool,

    /// Error message if removal failed
    pub error: Option<String>,
}

/// Handler for registering a device token
///
/// Upserts the token for the given owner id. A later registration for the
/// same id overwrites the earlier token.
///
/// # Responses
///
/// - 200 OK: Device registered successfully
/// - 400 Bad Request: Missing id or token
/// - 500 Internal Server Error: Storage failure
pub async fn register_device_handler<D>(
    State(state): State<Arc<NotifyState<D>>>,
    Json(payload): Json<RegisterDeviceRequest>,
) -> Response
where
    D: DeviceRegistrationRepository + Send + Sync + 'static,
{
    if payload.id.trim().is_empty() || payload.token.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(RegisterDeviceResponse {
                success: false,
                device: None,
                error: Some("Both id and token are required".to_string()),
            }),
        )
            .into_response();
    }

    debug!("Registering device for id: {}", payload.id);

    let registration = DeviceRegistration::new(payload.id, payload.token, payload.device_type);

    match state.devices.register_device(registration).await {
        Ok(device) => {
            info!("Successfully registered device for id: {}", device.id);
            Json(RegisterDeviceResponse {
                success: true,
                device: Some(device),
                error: None,
            })
            .into_response()
        }
        Err(err) => {
            error!("Failed to register device: {:?}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(RegisterDeviceResponse {
                    success: false,
                    device: None,
                    error: Some(err.to_string()),
                }),
            )
                .into_response()
        }
    }
}

/// Handler for sending a push notification to one or more owner ids
///
/// Resolves each id to its registered device token and sends one push per
/// token. Per-recipient outcomes are reported; a failed delivery to one
/// recipient does not affect the others.
///
/// # Responses
///
/// - 200 OK: Fan-out ran, see the per-recipient report
/// - 400 Bad Request: No recipients, or missing title/body
/// - 404 Not Found: None of the recipients have a registered device
pub async fn notify_handler<D>(
    State(state): State<Arc<NotifyState<D>>>,
    Json(payload): Json<NotifyRequest>,
) -> Response
where
    D: DeviceRegistrationRepository + Send + Sync + 'static,
{
    let mut ids: Vec<String> = Vec::new();
    if let Some(id) = payload.id {
        if !id.trim().is_empty() {
            ids.push(id);
        }
    }
    if let Some(more) = payload.ids {
        ids.extend(more.into_iter().filter(|id| !id.trim().is_empty()));
    }

    if ids.is_empty() || payload.title.trim().is_empty() || payload.body.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(NotifyResponse {
                success: false,
                message: "Recipient id(s), title and body are required".to_string(),
                result: FanoutReport::no_devices(),
            }),
        )
            .into_response();
    }

    debug!(recipients = ids.len(), "Dispatching notification");

    let message = NotificationMessage {
        title: payload.title,
        body: payload.body,
        data: payload.data,
    };

    let report = state.fanout.send_to_ids(ids, message).await;

    if report.total_devices == 0 {
        return (
            StatusCode::NOT_FOUND,
            Json(NotifyResponse {
                success: false,
                message: "No registered devices found for the given id(s)".to_string(),
                result: report,
            }),
        )
            .into_response();
    }

    let success = report.success_count > 0;
    Json(NotifyResponse {
        success,
        message: format!(
            "Delivered to {} of {} devices",
            report.success_count, report.total_devices
        ),
        result: report,
    })
    .into_response()
}

/// Handler for removing a device registration
///
/// # Responses
///
/// - 200 OK: Registration removed
/// - 404 Not Found: No registration for the given id
/// - 500 Internal Server Error: Storage failure
pub async fn unregister_device_handler<D>(
    State(state): State<Arc<NotifyState<D>>>,
    Path(id): Path<String>,
) -> Response
where
    D: DeviceRegistrationRepository + Send + Sync + 'static,
{
    debug!("Unregistering device for id: {}", id);

    match state.devices.delete_registration(&id).await {
        Ok(true) => Json(UnregisterDeviceResponse {
            success: true,
            error: None,
        })
        .into_response(),
        Ok(false) => (
            StatusCode::NOT_FOUND,
            Json(UnregisterDeviceResponse {
                success: false,
                error: Some(format!("No registration for id: {}", id)),
            }),
        )
            .into_response(),
        Err(err) => {
            error!("Failed to unregister device: {:?}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(UnregisterDeviceResponse {
                    success: false,
                    error: Some(err.to_string()),
                }),
            )
                .into_response()
        }
    }
}
