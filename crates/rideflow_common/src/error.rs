use serde::Serialize;

/// A trait for converting errors to HTTP status codes.
///
/// Implemented by every crate-level error enum so handlers can map
/// failures to responses uniformly.
pub trait HttpStatusCode {
    /// Returns the HTTP status code for this error.
    fn status_code(&self) -> u16;
}

/// JSON body for error responses.
///
/// `data` carries the conflicting resource on 4xx conflicts so mobile
/// clients can reconcile optimistic local state.
#[derive(Debug, Serialize)]
pub struct ErrorBody<T: Serialize = serde_json::Value> {
    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl ErrorBody {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            data: None,
        }
    }
}

impl<T: Serialize> ErrorBody<T> {
    pub fn with_data(message: impl Into<String>, data: T) -> Self {
        Self {
            message: message.into(),
            data: Some(data),
        }
    }
}
