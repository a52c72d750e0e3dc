#![allow(dead_code)]
use utoipa::OpenApi;

use crate::client::{FcmMessage, Message, Notification};
use crate::handlers::{
    NotifyRequest, NotifyResponse, RegisterDeviceRequest, RegisterDeviceResponse,
    UnregisterDeviceResponse,
};

#[utoipa::path(
    post,
    path = "/notification/register",
    request_body(content = RegisterDeviceRequest, example = json!({
        "id": "driver42",
        "token": "fcm-registration-token-example",
        "deviceType": "android"
    })),
    responses(
        (status = 200, description = "Device registered successfully", body = RegisterDeviceResponse,
         example = json!({
             "success": true,
             "device": {
                 "id": "driver42",
                 "fcmToken": "fcm-registration-token-example",
                 "deviceType": "android",
                 "active": true
             },
             "error": null
         })
        ),
        (status = 400, description = "Bad Request",
         example = json!({
             "success": false,
             "device": null,
             "error": "Both id and token are required"
         })
        ),
        (status = 500, description = "Internal Server Error")
    ),
    tag = "Notification"
)]
fn doc_register_device_handler() {}

#[utoipa::path(
    post,
    path = "/notification/notify",
    request_body(content = NotifyRequest, example = json!({
        "ids": ["driver1", "driver2"],
        "title": "New ride request",
        "body": "Pickup near you",
        "data": { "rideId": "a1b2c3" }
    })),
    responses(
        (status = 200, description = "Notification fan-out completed", body = NotifyResponse,
         example = json!({
             "success": true,
             "message": "Delivered to 2 of 2 devices",
             "result": {
                 "totalDevices": 2,
                 "successCount": 2,
                 "failureCount": 0,
                 "responses": []
             }
         })
        ),
        (status = 400, description = "Bad Request"),
        (status = 404, description = "No registered devices for the recipients")
    ),
    tag = "Notification"
)]
fn doc_notify_handler() {}

#[utoipa::path(
    delete,
    path = "/notification/unregister/{id}",
    params(
        ("id" = String, Path, description = "Owner id whose registration should be removed")
    ),
    responses(
        (status = 200, description = "Registration removed", body = UnregisterDeviceResponse),
        (status = 404, description = "No registration for the given id"),
        (status = 500, description = "Internal Server Error")
    ),
    tag = "Notification"
)]
fn doc_unregister_device_handler() {}

#[derive(OpenApi)]
#[openapi(
    paths(
        doc_register_device_handler,
        doc_notify_handler,
        doc_unregister_device_handler,
    ),
    components(
        schemas(
            RegisterDeviceRequest,
            RegisterDeviceResponse,
            NotifyRequest,
            NotifyResponse,
            UnregisterDeviceResponse,
            FcmMessage,
            Message,
            Notification,
        )
    ),
    tags(
        (name = "Notification", description = "Device registration and push fan-out API")
    ),
    servers(
        (url = "/", description = "Notification API server")
    )
)]
pub struct NotifyApiDoc;
