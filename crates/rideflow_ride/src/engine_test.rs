//! Tests for the ride lifecycle engine
//!
//! The engine runs against the in-memory repository, which mirrors the
//! SQL repository's guard and re-offer semantics, so every transition
//! rule is exercised without a database.

use crate::engine::{CreateRide, RideEngine};
use crate::error::RideError;
use crate::test_support::{MemoryRideRepository, RecordingFanout, StaticPricer};
use rideflow_common::models::RideStatus;
use serde_json::json;
use std::sync::Arc;

struct Harness {
    fanout: Arc<RecordingFanout>,
    engine: RideEngine<MemoryRideRepository>,
}

fn harness(drivers: &[&str]) -> Harness {
    let repo = MemoryRideRepository::new();
    for driver in drivers {
        repo.add_driver(driver);
    }
    let fanout = RecordingFanout::new();
    let engine = RideEngine::new(repo, fanout.clone(), StaticPricer::new(137));
    Harness { fanout, engine }
}

fn request(customer: &str, price: Option<i64>) -> CreateRide {
    CreateRide {
        customer_id: customer.to_string(),
        place_to: json!({ "address": "Airport" }),
        place_from: Some(json!("Downtown")),
        price,
    }
}

#[tokio::test]
async fn create_ride_broadcasts_to_non_busy_drivers() {
    let h = harness(&["driver1", "driver2", "driver3"]);

    // Make driver3 busy with a started ride.
    let busy = h.engine.create_ride(request("other", Some(129))).await.unwrap();
    h.engine.accept_ride(&busy.ride_id, "driver3").await.unwrap();

    let ride = h.engine.create_ride(request("customer1", Some(150))).await.unwrap();

    assert_eq!(ride.status, RideStatus::Created);
    assert_eq!(ride.price, 150);
    assert_eq!(ride.requested_to, vec!["driver1", "driver2"]);
    assert!(ride.rejected_by.is_empty());
    assert!(ride.driver_id.is_none());

    let (recipients, title) = h.fanout.sent().last().unwrap().clone();
    assert_eq!(recipients, vec!["driver1", "driver2"]);
    assert_eq!(title, "New Ride Request");
}

#[tokio::test]
async fn create_ride_quotes_fare_when_price_absent() {
    let h = harness(&["driver1"]);

    let ride = h.engine.create_ride(request("customer1", None)).await.unwrap();

    // StaticPricer quotes 137.
    assert_eq!(ride.price, 137);
}

#[tokio::test]
async fn create_ride_rejects_invalid_input() {
    let h = harness(&["driver1"]);

    let missing_customer = h.engine.create_ride(request("  ", Some(129))).await;
    assert!(matches!(missing_customer, Err(RideError::Validation(_))));

    let mut no_destination = request("customer1", Some(129));
    no_destination.place_to = serde_json::Value::Null;
    let result = h.engine.create_ride(no_destination).await;
    assert!(matches!(result, Err(RideError::Validation(_))));

    let mut unquotable = request("customer1", None);
    unquotable.place_from = None;
    let result = h.engine.create_ride(unquotable).await;
    assert!(matches!(result, Err(RideError::Validation(_))));

    let negative = h.engine.create_ride(request("customer1", Some(-5))).await;
    assert!(matches!(negative, Err(RideError::Validation(_))));
}

#[tokio::test]
async fn accept_assigns_driver_and_notifies_customer() {
    let h = harness(&["driver1", "driver2"]);
    let ride = h.engine.create_ride(request("customer1", Some(129))).await.unwrap();

    let accepted = h.engine.accept_ride(&ride.ride_id, "driver1").await.unwrap();

    assert_eq!(accepted.status, RideStatus::Started);
    assert_eq!(accepted.driver_id.as_deref(), Some("driver1"));
    assert_eq!(accepted.accepted_by.as_deref(), Some("driver1"));
    assert_eq!(h.fanout.titles_for("customer1"), vec!["Ride Accepted"]);
}

#[tokio::test]
async fn accept_on_started_ride_conflicts_and_leaves_ride_unchanged() {
    let h = harness(&["driver1", "driver2"]);
    let ride = h.engine.create_ride(request("customer1", Some(129))).await.unwrap();
    h.engine.accept_ride(&ride.ride_id, "driver1").await.unwrap();

    let result = h.engine.accept_ride(&ride.ride_id, "driver2").await;

    match result {
        Err(RideError::Conflict { ride: current, .. }) => {
            assert_eq!(current.driver_id.as_deref(), Some("driver1"));
        }
        other => panic!("expected conflict, got {:?}", other.map(|r| r.status)),
    }

    let unchanged = h.engine.get_ride(&ride.ride_id).await.unwrap();
    assert_eq!(unchanged.driver_id.as_deref(), Some("driver1"));
    assert_eq!(unchanged.status, RideStatus::Started);
}

#[tokio::test]
async fn accept_conflicts_when_driver_already_driving() {
    let h = harness(&["driver1"]);
    let first = h.engine.create_ride(request("customer1", Some(129))).await.unwrap();
    let second = h.engine.create_ride(request("customer2", Some(129))).await.unwrap();

    h.engine.accept_ride(&first.ride_id, "driver1").await.unwrap();
    let result = h.engine.accept_ride(&second.ride_id, "driver1").await;

    match result {
        Err(RideError::Conflict { ride: active, .. }) => {
            assert_eq!(active.ride_id, first.ride_id);
        }
        other => panic!("expected conflict, got {:?}", other.map(|r| r.status)),
    }
}

#[tokio::test]
async fn accept_conflicts_on_cancelled_ride() {
    let h = harness(&["driver1"]);
    let ride = h.engine.create_ride(request("customer1", Some(129))).await.unwrap();
    h.engine.cancel_ride(&ride.ride_id, None).await.unwrap();

    let result = h.engine.accept_ride(&ride.ride_id, "driver1").await;
    assert!(matches!(result, Err(RideError::Conflict { .. })));
}

#[tokio::test]
async fn accept_unknown_ride_is_not_found() {
    let h = harness(&["driver1"]);
    let result = h.engine.accept_ride("missing", "driver1").await;
    assert!(matches!(result, Err(RideError::NotFound(_))));
}

#[tokio::test]
async fn reject_moves_driver_between_sets() {
    let h = harness(&["driver1", "driver2"]);
    let ride = h.engine.create_ride(request("customer1", Some(129))).await.unwrap();

    let updated = h.engine.reject_ride(&ride.ride_id, "driver1").await.unwrap();

    assert_eq!(updated.requested_to, vec!["driver2"]);
    assert_eq!(updated.rejected_by, vec!["driver1"]);

    // The rejected driver no longer sees the ride as a pending request.
    let requests = h.engine.requests_for_driver("driver1").await.unwrap();
    assert!(requests.is_empty());

    // Idempotent: a second reject changes nothing.
    let again = h.engine.reject_ride(&ride.ride_id, "driver1").await.unwrap();
    assert_eq!(again.rejected_by, vec!["driver1"]);
    assert!(again
        .rejected_by
        .iter()
        .all(|d| !again.requested_to.contains(d)));
}

#[tokio::test]
async fn end_ride_closes_and_reoffers_freed_driver() {
    let h = harness(&["driver1", "driver2"]);
    let first = h.engine.create_ride(request("customer1", Some(129))).await.unwrap();
    h.engine.accept_ride(&first.ride_id, "driver1").await.unwrap();

    // Created while driver1 was busy, so driver1 is not in its pool.
    let second = h.engine.create_ride(request("customer2", Some(129))).await.unwrap();
    assert_eq!(second.requested_to, vec!["driver2"]);

    let closure = h.engine.end_ride(&first.ride_id, "driver1").await.unwrap();

    assert_eq!(closure.ride.status, RideStatus::Ended);
    assert_eq!(closure.updated_rides_count, 1);
    assert_eq!(closure.notifications_sent, 2);

    let reoffered = h.engine.get_ride(&second.ride_id).await.unwrap();
    assert!(reoffered.requested_to.iter().any(|d| d == "driver1"));

    assert_eq!(
        h.fanout.titles_for("customer1"),
        vec!["Ride Accepted", "Ride Ended"]
    );
    assert_eq!(
        h.fanout.titles_for("driver1").last().unwrap(),
        "New Ride Request"
    );
}

#[tokio::test]
async fn end_ride_notifies_freed_driver_even_without_pending_rides() {
    let h = harness(&["driver1"]);
    let ride = h.engine.create_ride(request("customer1", Some(129))).await.unwrap();
    h.engine.accept_ride(&ride.ride_id, "driver1").await.unwrap();

    let closure = h.engine.end_ride(&ride.ride_id, "driver1").await.unwrap();

    // Nothing to re-offer, but the availability push still goes out.
    assert_eq!(closure.updated_rides_count, 0);
    assert_eq!(closure.notifications_sent, 2);
    let pushes = h.fanout.titles_for("driver1");
    assert_eq!(
        pushes.iter().filter(|t| *t == "New Ride Request").count(),
        2
    );
}

#[tokio::test]
async fn end_ride_skips_rides_that_already_saw_the_driver() {
    let h = harness(&["driver1", "driver2"]);
    let first = h.engine.create_ride(request("customer1", Some(129))).await.unwrap();
    let second = h.engine.create_ride(request("customer2", Some(129))).await.unwrap();

    // driver1 declined the second ride, then took the first.
    h.engine.reject_ride(&second.ride_id, "driver1").await.unwrap();
    h.engine.accept_ride(&first.ride_id, "driver1").await.unwrap();

    let closure = h.engine.end_ride(&first.ride_id, "driver1").await.unwrap();

    // A rejected driver is never re-added to that ride's pool.
    assert_eq!(closure.updated_rides_count, 0);
    let untouched = h.engine.get_ride(&second.ride_id).await.unwrap();
    assert!(!untouched.requested_to.iter().any(|d| d == "driver1"));
    assert_eq!(untouched.rejected_by, vec!["driver1"]);
}

#[tokio::test]
async fn cancel_notifies_each_pending_driver() {
    let h = harness(&["driver1", "driver2"]);
    let ride = h.engine.create_ride(request("customer1", Some(129))).await.unwrap();

    let cancelled = h.engine.cancel_ride(&ride.ride_id, None).await.unwrap();

    assert_eq!(cancelled.status, RideStatus::Cancel);

    let (recipients, title) = h.fanout.sent().last().unwrap().clone();
    assert_eq!(title, "Ride Cancelled");
    assert_eq!(recipients, vec!["driver1", "driver2"]);
    assert!(h.fanout.titles_for("driver1").contains(&"Ride Cancelled".to_string()));
    assert!(h.fanout.titles_for("driver2").contains(&"Ride Cancelled".to_string()));
}

#[tokio::test]
async fn cancel_with_explicit_status_skips_cancellation_notice() {
    let h = harness(&["driver1"]);
    let ride = h.engine.create_ride(request("customer1", Some(129))).await.unwrap();

    let updated = h
        .engine
        .cancel_ride(&ride.ride_id, Some(RideStatus::Ended))
        .await
        .unwrap();

    assert_eq!(updated.status, RideStatus::Ended);
    assert!(!h.fanout.titles_for("driver1").contains(&"Ride Cancelled".to_string()));
}

#[tokio::test]
async fn customer_query_excludes_terminal_rides_by_default() {
    let h = harness(&["driver1"]);
    let active = h.engine.create_ride(request("customer1", Some(129))).await.unwrap();
    let cancelled = h.engine.create_ride(request("customer1", Some(129))).await.unwrap();
    h.engine.cancel_ride(&cancelled.ride_id, None).await.unwrap();

    let open = h.engine.rides_for_customer("customer1", None).await.unwrap();
    assert_eq!(open.len(), 1);
    assert_eq!(open[0].ride_id, active.ride_id);

    let terminal = h
        .engine
        .rides_for_customer("customer1", Some(RideStatus::Cancel))
        .await
        .unwrap();
    assert_eq!(terminal.len(), 1);
    assert_eq!(terminal[0].ride_id, cancelled.ride_id);
}

#[tokio::test]
async fn busy_driver_snapshot_is_advisory_but_accept_guard_holds() {
    let h = harness(&["driver1", "driver2"]);
    let ride = h.engine.create_ride(request("customer1", Some(129))).await.unwrap();
    assert!(ride.requested_to.iter().any(|d| d == "driver1"));

    // driver1 goes busy after being included in the snapshot.
    let other = h.engine.create_ride(request("customer2", Some(129))).await.unwrap();
    h.engine.accept_ride(&other.ride_id, "driver1").await.unwrap();

    // The stale pool membership does not let driver1 double-book.
    let result = h.engine.accept_ride(&ride.ride_id, "driver1").await;
    assert!(matches!(result, Err(RideError::Conflict { .. })));
}

#[tokio::test]
async fn full_dispatch_scenario() {
    let h = harness(&["driver1", "driver2", "driver3"]);

    // driver3 is on a trip already.
    let busy = h.engine.create_ride(request("someone", Some(129))).await.unwrap();
    h.engine.accept_ride(&busy.ride_id, "driver3").await.unwrap();

    // Customer books a ride to the airport at a fixed 150 fare.
    let ride = h
        .engine
        .create_ride(CreateRide {
            customer_id: "customerC".to_string(),
            place_to: json!({ "address": "Airport" }),
            place_from: Some(json!("Home")),
            price: Some(150),
        })
        .await
        .unwrap();
    assert_eq!(ride.requested_to, vec!["driver1", "driver2"]);
    assert_eq!(ride.price, 150);

    // driver1 declines.
    let after_reject = h.engine.reject_ride(&ride.ride_id, "driver1").await.unwrap();
    assert_eq!(after_reject.requested_to, vec!["driver2"]);
    assert_eq!(after_reject.rejected_by, vec!["driver1"]);

    // driver2 takes it.
    let started = h.engine.accept_ride(&ride.ride_id, "driver2").await.unwrap();
    assert_eq!(started.status, RideStatus::Started);
    assert_eq!(started.driver_id.as_deref(), Some("driver2"));

    // driver1's late accept bounces without disturbing the assignment.
    let late = h.engine.accept_ride(&ride.ride_id, "driver1").await;
    assert!(matches!(late, Err(RideError::Conflict { .. })));
    let unchanged = h.engine.get_ride(&ride.ride_id).await.unwrap();
    assert_eq!(unchanged.driver_id.as_deref(), Some("driver2"));

    // A new request appears while driver2 is still on the trip.
    let pending = h.engine.create_ride(request("customerD", Some(129))).await.unwrap();
    assert!(!pending.requested_to.iter().any(|d| d == "driver2"));

    // driver2 finishes; the ride closes and driver2 rejoins the pool.
    let closure = h.engine.end_ride(&ride.ride_id, "driver2").await.unwrap();
    assert_eq!(closure.ride.status, RideStatus::Ended);
    assert!(closure.updated_rides_count >= 1);

    let reoffered = h.engine.get_ride(&pending.ride_id).await.unwrap();
    assert!(reoffered.requested_to.iter().any(|d| d == "driver2"));
}
