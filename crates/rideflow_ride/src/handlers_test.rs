//! Tests for the ride HTTP surface: routing, status codes and error bodies

use crate::engine::RideEngine;
use crate::routes::routes;
use crate::test_support::{MemoryRideRepository, RecordingFanout, StaticPricer};
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn app(drivers: &[&str]) -> Router {
    let repo = MemoryRideRepository::new();
    for driver in drivers {
        repo.add_driver(driver);
    }
    let engine = Arc::new(RideEngine::new(
        repo,
        RecordingFanout::new(),
        StaticPricer::new(137),
    ));
    routes(engine)
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn create_body() -> Value {
    json!({
        "customerId": "customer1",
        "placeTo": { "address": "Airport" },
        "placeFrom": "Downtown",
        "price": 150
    })
}

#[tokio::test]
async fn post_ride_returns_created_ride() {
    let app = app(&["driver1", "driver2"]);

    let response = app
        .oneshot(json_request("POST", "/ride/", create_body()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let ride = body_json(response).await;
    assert_eq!(ride["customerId"], "customer1");
    assert_eq!(ride["status"], "created");
    assert_eq!(ride["price"], 150);
    assert_eq!(ride["requestedTo"], json!(["driver1", "driver2"]));
    assert!(!ride["rideId"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn post_ride_without_customer_is_bad_request() {
    let app = app(&["driver1"]);
    let mut body = create_body();
    body["customerId"] = json!("");

    let response = app
        .oneshot(json_request("POST", "/ride/", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error = body_json(response).await;
    assert!(error["message"].as_str().unwrap().contains("customerId"));
}

#[tokio::test]
async fn get_unknown_ride_is_not_found() {
    let app = app(&["driver1"]);

    let response = app.oneshot(get_request("/ride/nope")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn accept_conflict_carries_the_current_ride() {
    let app = app(&["driver1", "driver2"]);

    let created = app
        .clone()
        .oneshot(json_request("POST", "/ride/", create_body()))
        .await
        .unwrap();
    let ride = body_json(created).await;
    let ride_id = ride["rideId"].as_str().unwrap().to_string();

    let first = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/ride/{}/accept", ride_id),
            json!({ "driverId": "driver1" }),
        ))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let second = app
        .oneshot(json_request(
            "PUT",
            &format!("/ride/{}/accept", ride_id),
            json!({ "driverId": "driver2" }),
        ))
        .await
        .unwrap();

    assert_eq!(second.status(), StatusCode::BAD_REQUEST);
    let error = body_json(second).await;
    assert_eq!(error["data"]["driverId"], "driver1");
    assert_eq!(error["data"]["status"], "started");
}

#[tokio::test]
async fn cancel_with_unknown_status_is_bad_request() {
    let app = app(&["driver1"]);

    let created = app
        .clone()
        .oneshot(json_request("POST", "/ride/", create_body()))
        .await
        .unwrap();
    let ride = body_json(created).await;
    let ride_id = ride["rideId"].as_str().unwrap().to_string();

    let response = app
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri(format!("/ride/{}/cancel?status=bogus", ride_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn cancel_defaults_to_cancel_status() {
    let app = app(&["driver1"]);

    let created = app
        .clone()
        .oneshot(json_request("POST", "/ride/", create_body()))
        .await
        .unwrap();
    let ride = body_json(created).await;
    let ride_id = ride["rideId"].as_str().unwrap().to_string();

    let response = app
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri(format!("/ride/{}/cancel", ride_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let cancelled = body_json(response).await;
    assert_eq!(cancelled["status"], "cancel");
}

#[tokio::test]
async fn status_and_driver_queries_route_correctly() {
    let app = app(&["driver1", "driver2"]);

    let created = app
        .clone()
        .oneshot(json_request("POST", "/ride/", create_body()))
        .await
        .unwrap();
    let ride = body_json(created).await;
    let ride_id = ride["rideId"].as_str().unwrap().to_string();

    let by_status = app
        .clone()
        .oneshot(get_request("/ride/status/created"))
        .await
        .unwrap();
    assert_eq!(by_status.status(), StatusCode::OK);
    let rides = body_json(by_status).await;
    assert_eq!(rides.as_array().unwrap().len(), 1);

    let requests = app
        .clone()
        .oneshot(get_request("/ride/driver/driver1/requests"))
        .await
        .unwrap();
    assert_eq!(requests.status(), StatusCode::OK);
    let pending = body_json(requests).await;
    assert_eq!(pending[0]["rideId"], ride_id.as_str());

    let accepted = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/ride/{}/accept", ride_id),
            json!({ "driverId": "driver1" }),
        ))
        .await
        .unwrap();
    assert_eq!(accepted.status(), StatusCode::OK);

    let driver_rides = app
        .oneshot(get_request("/ride/driver/driver1/rides?status=started"))
        .await
        .unwrap();
    let assigned = body_json(driver_rides).await;
    assert_eq!(assigned.as_array().unwrap().len(), 1);
    assert_eq!(assigned[0]["driverId"], "driver1");
}

#[tokio::test]
async fn customer_query_supports_status_filter() {
    let app = app(&["driver1"]);

    let created = app
        .clone()
        .oneshot(json_request("POST", "/ride/", create_body()))
        .await
        .unwrap();
    let ride = body_json(created).await;
    let ride_id = ride["rideId"].as_str().unwrap().to_string();

    app.clone()
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri(format!("/ride/{}/cancel", ride_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    // Terminal rides are hidden without an explicit filter.
    let open = app
        .clone()
        .oneshot(get_request("/ride/customer/customer1"))
        .await
        .unwrap();
    let open_rides = body_json(open).await;
    assert!(open_rides.as_array().unwrap().is_empty());

    let cancelled = app
        .oneshot(get_request("/ride/customer/customer1?status=cancel"))
        .await
        .unwrap();
    let cancelled_rides = body_json(cancelled).await;
    assert_eq!(cancelled_rides.as_array().unwrap().len(), 1);
}
