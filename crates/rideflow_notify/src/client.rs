//! Firebase Cloud Messaging client module
//!
//! This module provides a client for the Firebase Cloud Messaging (FCM)
//! HTTP v1 API, used to deliver push notifications to registered devices.
//!
//! The main component is the `FcmClient` struct, which handles
//! authentication and communication with the FCM API. It also includes the
//! data structures for FCM messages, notifications, and responses, and the
//! [`PushSender`] trait that lets the fan-out service run against a mock
//! sender in tests.

use crate::auth::get_fcm_auth_token;
use reqwest::{header, Client};
use rideflow_common::services::BoxFuture;
use rideflow_config::FirebaseConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Default FCM API endpoint. Overridable via `FirebaseConfig::endpoint`.
const DEFAULT_FCM_ENDPOINT: &str = "https://fcm.googleapis.com";

/// Errors that can occur when interacting with the Firebase Cloud Messaging API
#[derive(Error, Debug)]
pub enum FcmError {
    /// Error during authentication with Firebase
    #[error("Authentication error: {0}")]
    AuthError(String),

    /// Error during HTTP request to the FCM API
    #[error("HTTP request error: {0}")]
    RequestError(#[from] reqwest::Error),

    /// Missing required configuration
    #[error("Missing configuration: {0}")]
    ConfigError(String),

    /// Error returned by the FCM API
    #[error("FCM API error: {0}")]
    ApiError(String),
}

/// A message to be sent via Firebase Cloud Messaging
///
/// This is the top-level structure that wraps a Message object
/// according to the FCM HTTP v1 API format.
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct FcmMessage {
    /// The message payload
    pub message: Message,
}

/// The message payload for Firebase Cloud Messaging
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Message {
    /// Registration token identifying the target device
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// The notification to be displayed on the user's device
    ///
    /// If not provided, the message will be a data-only message.
    pub notification: Option<Notification>,

    /// Custom key-value data to be sent with the message
    ///
    /// This data will be available to the client app that receives the
    /// message. The dispatch core uses it to carry the ride id.
    pub data: Option<HashMap<String, String>>,
}

/// The notification to be displayed on the user's device
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Notification {
    /// The title of the notification
    pub title: String,

    /// The body text of the notification
    pub body: String,
}

/// Response from the Firebase Cloud Messaging API
#[derive(Debug, Deserialize)]
pub struct FcmResponse {
    /// The unique ID of the message
    ///
    /// This is a string in the format "projects/{project_id}/messages/{message_id}"
    pub name: String,
}

/// Seam between the fan-out service and the concrete push provider.
///
/// The production implementation is [`FcmClient`]; tests substitute an
/// in-memory sender that records deliveries.
pub trait PushSender: Send + Sync {
    /// Send one notification to one device token. Returns the provider's
    /// message id on success.
    fn send<'a>(
        &'a self,
        token: &'a str,
        notification: Notification,
        data: Option<HashMap<String, String>>,
    ) -> BoxFuture<'a, String, FcmError>;
}

/// Client for the Firebase Cloud Messaging HTTP v1 API
///
/// This struct handles authentication and communication with FCM. It
/// provides a method for sending push notifications to a single device
/// token; fan-out across many recipients lives in
/// [`crate::fanout::FanoutService`].
pub struct FcmClient {
    /// HTTP client for making requests to the FCM API
    client: Client,

    /// Configuration for Firebase, including project ID and service account key path
    config: FirebaseConfig,
}

impl FcmClient {
    /// Creates a new FCM client with the given configuration
    ///
    /// # Arguments
    ///
    /// * `config` - The Firebase configuration, including project ID and service account key path
    ///
    /// # Returns
    ///
    /// A new `FcmClient` instance
    pub fn new(config: FirebaseConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Sends a push notification message via Firebase Cloud Messaging
    ///
    /// This method authenticates with Firebase, constructs the appropriate
    /// HTTP request, and sends the message to the FCM API.
    ///
    /// # Arguments
    ///
    /// * `message` - The message to send, including target token, notification content, and data
    ///
    /// # Returns
    ///
    /// * `Result<String, FcmError>` - On success, returns the message ID as a String.
    ///
    /// # Errors
    ///
    /// This method will return an error if:
    /// * The project_id is missing from the FirebaseConfig
    /// * Authentication fails
    /// * The HTTP request fails
    /// * The FCM API returns an error response
    pub async fn send_message(&self, message: FcmMessage) -> Result<String, FcmError> {
        let project_id = self.config.project_id.as_deref().ok_or_else(|| {
            FcmError::ConfigError("Missing project_id in FirebaseConfig".to_string())
        })?;

        let endpoint = self
            .config
            .endpoint
            .as_deref()
            .unwrap_or(DEFAULT_FCM_ENDPOINT);

        let url = format!("{}/v1/projects/{}/messages:send", endpoint, project_id);

        let token = get_fcm_auth_token(&self.config)
            .await
            .map_err(|e| FcmError::AuthError(e.to_string()))?;

        let response = self
            .client
            .post(&url)
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .json(&message)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            return Err(FcmError::ApiError(error_text));
        }

        let fcm_response: FcmResponse = response.json().await?;
        Ok(fcm_response.name)
    }
}

impl PushSender for FcmClient {
    fn send<'a>(
        &'a self,
        token: &'a str,
        notification: Notification,
        data: Option<HashMap<String, String>>,
    ) -> BoxFuture<'a, String, FcmError> {
        Box::pin(async move {
            let message = FcmMessage {
                message: Message {
                    token: Some(token.to_string()),
                    notification: Some(notification),
                    data,
                },
            };
            self.send_message(message).await
        })
    }
}
