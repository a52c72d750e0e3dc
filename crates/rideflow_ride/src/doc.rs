#![allow(dead_code)]
use utoipa::OpenApi;

use crate::engine::{CreateRide, RideClosure};
use crate::handlers::DriverAction;
use rideflow_common::models::{Ride, RideStatus};

#[utoipa::path(
    post,
    path = "/ride/",
    request_body(content = CreateRide, example = json!({
        "customerId": "customer1",
        "placeTo": { "address": "Kempegowda International Airport" },
        "placeFrom": "MG Road, Bengaluru"
    })),
    responses(
        (status = 201, description = "Ride created and broadcast to eligible drivers", body = Ride),
        (status = 400, description = "Missing customerId or placeTo"),
        (status = 500, description = "Fare quote or storage failure")
    ),
    tag = "Ride"
)]
fn doc_create_ride_handler() {}

#[utoipa::path(
    put,
    path = "/ride/{rideId}/accept",
    params(("rideId" = String, Path, description = "Ride identifier")),
    request_body(content = DriverAction, example = json!({ "driverId": "driver1" })),
    responses(
        (status = 200, description = "Ride accepted", body = Ride),
        (status = 400, description = "Conflict; the conflicting ride is attached in data"),
        (status = 404, description = "Unknown ride")
    ),
    tag = "Ride"
)]
fn doc_accept_ride_handler() {}

#[utoipa::path(
    put,
    path = "/ride/{rideId}/reject",
    params(("rideId" = String, Path, description = "Ride identifier")),
    request_body(content = DriverAction, example = json!({ "driverId": "driver1" })),
    responses(
        (status = 200, description = "Rejection recorded", body = Ride),
        (status = 404, description = "Unknown ride")
    ),
    tag = "Ride"
)]
fn doc_reject_ride_handler() {}

#[utoipa::path(
    put,
    path = "/ride/{rideId}/end",
    params(("rideId" = String, Path, description = "Ride identifier")),
    request_body(content = DriverAction, example = json!({ "driverId": "driver1" })),
    responses(
        (status = 200, description = "Ride ended and driver re-offered", body = RideClosure),
        (status = 404, description = "Unknown ride")
    ),
    tag = "Ride"
)]
fn doc_end_ride_handler() {}

#[utoipa::path(
    put,
    path = "/ride/{rideId}/cancel",
    params(
        ("rideId" = String, Path, description = "Ride identifier"),
        ("status" = Option<String>, Query, description = "Target status, default cancel")
    ),
    responses(
        (status = 200, description = "Ride status updated", body = Ride),
        (status = 400, description = "Unknown status value"),
        (status = 404, description = "Unknown ride")
    ),
    tag = "Ride"
)]
fn doc_cancel_ride_handler() {}

#[utoipa::path(
    get,
    path = "/ride/{rideId}",
    params(("rideId" = String, Path, description = "Ride identifier")),
    responses(
        (status = 200, description = "The ride", body = Ride),
        (status = 404, description = "Unknown ride")
    ),
    tag = "Ride"
)]
fn doc_get_ride_handler() {}

#[utoipa::path(
    get,
    path = "/ride/status/{status}",
    params(("status" = String, Path, description = "Ride status filter")),
    responses(
        (status = 200, description = "Rides with the given status", body = [Ride]),
        (status = 400, description = "Unknown status value")
    ),
    tag = "Ride"
)]
fn doc_rides_by_status_handler() {}

#[utoipa::path(
    get,
    path = "/ride/customer/{customerId}",
    params(
        ("customerId" = String, Path, description = "Customer identifier"),
        ("status" = Option<String>, Query, description = "Optional status filter; without it terminal rides are excluded")
    ),
    responses(
        (status = 200, description = "The customer's rides", body = [Ride])
    ),
    tag = "Ride"
)]
fn doc_rides_for_customer_handler() {}

#[utoipa::path(
    get,
    path = "/ride/driver/{driverId}/requests",
    params(("driverId" = String, Path, description = "Driver identifier")),
    responses(
        (status = 200, description = "Pending requests the driver can accept", body = [Ride])
    ),
    tag = "Ride"
)]
fn doc_driver_requests_handler() {}

#[utoipa::path(
    get,
    path = "/ride/driver/{driverId}/rides",
    params(
        ("driverId" = String, Path, description = "Driver identifier"),
        ("status" = Option<String>, Query, description = "Optional status filter")
    ),
    responses(
        (status = 200, description = "Rides assigned to the driver", body = [Ride])
    ),
    tag = "Ride"
)]
fn doc_driver_rides_handler() {}

#[derive(OpenApi)]
#[openapi(
    paths(
        doc_create_ride_handler,
        doc_accept_ride_handler,
        doc_reject_ride_handler,
        doc_end_ride_handler,
        doc_cancel_ride_handler,
        doc_get_ride_handler,
        doc_rides_by_status_handler,
        doc_rides_for_customer_handler,
        doc_driver_requests_handler,
        doc_driver_rides_handler,
    ),
    components(
        schemas(
            CreateRide,
            DriverAction,
            Ride,
            RideClosure,
            RideStatus,
        )
    ),
    tags(
        (name = "Ride", description = "Ride lifecycle and dispatch API")
    ),
    servers(
        (url = "/", description = "Ride dispatch API server")
    )
)]
pub struct RideApiDoc;
