//! Authentication module for Firebase Cloud Messaging
//!
//! Generates OAuth2 tokens from a service account key file for
//! authenticating requests to the FCM HTTP v1 API.

use rideflow_config::FirebaseConfig;
use std::{error::Error, path::Path};
use yup_oauth2::{read_service_account_key, ServiceAccountAuthenticator};

/// Obtains an OAuth2 access token for Firebase Cloud Messaging.
///
/// Reads the service account key at `config.key_path` and requests a token
/// scoped to FCM messaging.
///
/// # Errors
///
/// Returns an error if the key path is missing, the key file cannot be
/// read, or authentication with Google's OAuth2 service fails.
pub async fn get_fcm_auth_token(
    config: &FirebaseConfig,
) -> Result<String, Box<dyn Error + Send + Sync>> {
    let key_path = config
        .key_path
        .as_deref()
        .ok_or("Missing key_path in FirebaseConfig")?;

    let sa_key = read_service_account_key(Path::new(key_path)).await?;

    let auth = ServiceAccountAuthenticator::builder(sa_key).build().await?;

    // FCM requires the "https://www.googleapis.com/auth/firebase.messaging" scope
    let auth_token = auth
        .token(&["https://www.googleapis.com/auth/firebase.messaging"])
        .await?;

    match auth_token.token() {
        Some(token) => Ok(token.to_string()),
        None => Err("No access token returned by authenticator".into()),
    }
}
