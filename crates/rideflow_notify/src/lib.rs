//! Push notification delivery for the Rideflow dispatch service
//!
//! This crate integrates Firebase Cloud Messaging (HTTP v1 API) and
//! provides:
//!
//! - [`FcmClient`]: authenticated FCM client behind the [`PushSender`] seam
//! - [`FanoutService`]: best-effort fan-out of one message to many
//!   recipients, implementing the `NotificationFanout` trait the ride
//!   engine dispatches through
//! - HTTP handlers and routes for registering device tokens and sending
//!   notifications directly

pub mod auth;
pub mod client;
pub mod fanout;
pub mod handlers;
pub mod routes;

#[cfg(feature = "openapi")]
pub mod doc;

pub use client::{FcmClient, FcmError, FcmMessage, Message, Notification, PushSender};
pub use fanout::FanoutService;
pub use handlers::NotifyState;
pub use routes::routes;
