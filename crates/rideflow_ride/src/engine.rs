//! Ride lifecycle engine
//!
//! The state machine governing a ride from creation through acceptance,
//! execution, and completion:
//!
//! ```text
//! [created] --accept--> [started] --end--> [ended]
//!     |                     |
//!     +------ cancel -------+-----> [cancel]
//! ```
//!
//! `ended` and `cancel` are terminal. Rejection mutates the membership
//! sets (`requested_to`, `rejected_by`) without changing status.
//!
//! Every transition that two parties can race on is pushed down to the
//! store as a single conditional statement or transaction; the engine
//! itself never does read-modify-write on contended state. Notifications
//! always run after the store has committed and are best-effort.

use crate::error::RideError;
use rideflow_common::models::{NotificationMessage, Ride, RideStatus};
use rideflow_common::services::NotificationFanout;
use rideflow_db::repositories::RideRepository;
use rideflow_pricing::{location_query, FarePricer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Input for creating a ride.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreateRide {
    /// The rider requesting the trip.
    pub customer_id: String,

    /// The dropoff place, as sent by the mobile client.
    pub place_to: Value,

    /// The pickup place. Required when no price is supplied, since the
    /// fare is quoted from the route between the two places.
    #[serde(default)]
    pub place_from: Option<Value>,

    /// Pre-quoted fare. When absent the engine quotes one itself.
    #[serde(default)]
    pub price: Option<i64>,
}

/// Result of ending a ride.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RideClosure {
    /// The ended ride.
    pub ride: Ride,

    /// How many pending rides the freed driver was re-offered to.
    pub updated_rides_count: u64,

    /// How many notification deliveries the push provider accepted.
    pub notifications_sent: usize,
}

/// The ride lifecycle engine.
///
/// Generic over the ride repository so the full state machine runs
/// against an in-memory store in tests. The fan-out and pricer seams are
/// trait objects; both are external collaborators the engine treats as
/// black boxes.
pub struct RideEngine<R> {
    repo: R,
    fanout: Arc<dyn NotificationFanout>,
    pricer: Arc<dyn FarePricer>,
}

impl<R: RideRepository> RideEngine<R> {
    /// Create an engine over the given repository and collaborator seams.
    pub fn new(repo: R, fanout: Arc<dyn NotificationFanout>, pricer: Arc<dyn FarePricer>) -> Self {
        Self {
            repo,
            fanout,
            pricer,
        }
    }

    /// Create a ride and broadcast the request to every eligible driver.
    ///
    /// Eligibility is all known drivers minus those currently on a
    /// `started` ride. The snapshot is advisory and taken without
    /// locking: a driver may go busy between snapshot and delivery, and
    /// the accept-time preconditions catch the conflict there.
    ///
    /// # Errors
    ///
    /// * [`RideError::Validation`] for an empty customer id, a missing
    ///   dropoff, or a quote request without a pickup
    /// * [`RideError::Pricing`] when no price was supplied and the quote
    ///   fails; the fare is persisted immutably so creation aborts
    pub async fn create_ride(&self, input: CreateRide) -> Result<Ride, RideError> {
        if input.customer_id.trim().is_empty() {
            return Err(RideError::Validation("customerId is required".to_string()));
        }
        if input.place_to.is_null() {
            return Err(RideError::Validation("placeTo is required".to_string()));
        }

        let price = match input.price {
            Some(price) if price > 0 => price,
            Some(_) => {
                return Err(RideError::Validation(
                    "price must be positive".to_string(),
                ))
            }
            None => {
                let place_from = input.place_from.as_ref().ok_or_else(|| {
                    RideError::Validation(
                        "placeFrom is required when no price is supplied".to_string(),
                    )
                })?;
                let origin = location_query(place_from);
                let destination = location_query(&input.place_to);
                self.pricer.quote(&origin, &destination).await?.price
            }
        };

        let all_drivers = self.repo.list_driver_ids().await?;
        let busy: HashSet<String> = self.repo.busy_driver_ids().await?.into_iter().collect();
        let requested_to: Vec<String> = all_drivers
            .into_iter()
            .filter(|driver| !busy.contains(driver))
            .collect();

        debug!(
            customer = %input.customer_id,
            eligible = requested_to.len(),
            "Computed eligible drivers"
        );

        let ride = Ride {
            ride_id: Uuid::new_v4().to_string(),
            customer_id: input.customer_id,
            driver_id: None,
            accepted_by: None,
            place_to: input.place_to,
            place_from: input.place_from,
            price,
            requested_to,
            rejected_by: Vec::new(),
            status: RideStatus::Created,
            created_at: None,
        };

        let stored = self.repo.insert(ride).await?;
        info!(ride_id = %stored.ride_id, price = stored.price, "Ride created");

        if !stored.requested_to.is_empty() {
            let message = NotificationMessage::for_ride(
                "New Ride Request",
                "A new ride is waiting for a driver",
                &stored.ride_id,
            );
            let report = self
                .fanout
                .send_to_ids(stored.requested_to.clone(), message)
                .await;
            debug!(
                ride_id = %stored.ride_id,
                delivered = report.success_count,
                "Ride request broadcast"
            );
        }

        Ok(stored)
    }

    /// Accept a ride on behalf of a driver.
    ///
    /// The transition itself is a single conditional update guarded by
    /// the ride's current status, so two concurrent accepts cannot both
    /// win; the loser observes the guard failure and gets the winner's
    /// ride back in the conflict.
    ///
    /// # Errors
    ///
    /// * [`RideError::NotFound`] for an unknown ride
    /// * [`RideError::Conflict`] when the ride is already `started` or
    ///   `cancel`, or when the driver already has a `started` ride (the
    ///   conflicting ride rides along in the error)
    pub async fn accept_ride(&self, ride_id: &str, driver_id: &str) -> Result<Ride, RideError> {
        if driver_id.trim().is_empty() {
            return Err(RideError::Validation("driverId is required".to_string()));
        }

        let ride = self
            .repo
            .find_by_id(ride_id)
            .await?
            .ok_or_else(|| RideError::NotFound(format!("No ride with id: {}", ride_id)))?;

        match ride.status {
            RideStatus::Started => {
                return Err(RideError::conflict("Ride already accepted", ride));
            }
            RideStatus::Cancel => {
                return Err(RideError::conflict("Ride has been cancelled", ride));
            }
            _ => {}
        }

        if let Some(active) = self.repo.active_ride_for_driver(driver_id).await? {
            return Err(RideError::conflict(
                "Driver already has a ride in progress",
                active,
            ));
        }

        match self.repo.try_accept(ride_id, driver_id).await? {
            Some(accepted) => {
                info!(ride_id = %accepted.ride_id, driver = %driver_id, "Ride accepted");
                let message = NotificationMessage::for_ride(
                    "Ride Accepted",
                    "A driver has accepted your ride",
                    &accepted.ride_id,
                );
                self.fanout
                    .send_to_ids(vec![accepted.customer_id.clone()], message)
                    .await;
                Ok(accepted)
            }
            None => {
                // Guard failed between the read above and the update:
                // either another driver won or the ride vanished.
                warn!(ride_id = %ride_id, driver = %driver_id, "Accept lost the race");
                match self.repo.find_by_id(ride_id).await? {
                    Some(current) => Err(RideError::conflict("Ride already accepted", current)),
                    None => Err(RideError::NotFound(format!("No ride with id: {}", ride_id))),
                }
            }
        }
    }

    /// Record a driver's rejection of a ride request.
    ///
    /// The membership updates run server-side in one statement: append to
    /// `rejected_by` iff absent, remove from `requested_to`. Idempotent;
    /// no notification is sent.
    ///
    /// # Errors
    ///
    /// Returns [`RideError::NotFound`] for an unknown ride.
    pub async fn reject_ride(&self, ride_id: &str, driver_id: &str) -> Result<Ride, RideError> {
        if driver_id.trim().is_empty() {
            return Err(RideError::Validation("driverId is required".to_string()));
        }

        let ride = self
            .repo
            .reject(ride_id, driver_id)
            .await?
            .ok_or_else(|| RideError::NotFound(format!("No ride with id: {}", ride_id)))?;

        debug!(ride_id = %ride.ride_id, driver = %driver_id, "Ride rejected");
        Ok(ride)
    }

    /// End a ride and return the freed driver to the pool.
    ///
    /// Closing the ride and re-offering the driver to every other pending
    /// ride happen in one store transaction. After commit the customer is
    /// told the ride ended and the driver gets a single "new ride request"
    /// push regardless of how many rides they were re-offered to.
    ///
    /// # Errors
    ///
    /// Returns [`RideError::NotFound`] for an unknown ride.
    pub async fn end_ride(&self, ride_id: &str, driver_id: &str) -> Result<RideClosure, RideError> {
        if driver_id.trim().is_empty() {
            return Err(RideError::Validation("driverId is required".to_string()));
        }

        let (ride, updated_rides_count) = self
            .repo
            .close_and_reoffer(ride_id, driver_id)
            .await?
            .ok_or_else(|| RideError::NotFound(format!("No ride with id: {}", ride_id)))?;

        info!(
            ride_id = %ride.ride_id,
            driver = %driver_id,
            reoffered = updated_rides_count,
            "Ride ended"
        );

        let mut notifications_sent = 0;

        let ended = NotificationMessage::for_ride(
            "Ride Ended",
            "Your ride has been completed",
            &ride.ride_id,
        );
        notifications_sent += self
            .fanout
            .send_to_ids(vec![ride.customer_id.clone()], ended)
            .await
            .success_count;

        // The freed driver gets exactly one availability push, whether or
        // not any pending ride picked them up.
        let reoffer = NotificationMessage {
            title: "New Ride Request".to_string(),
            body: "Pending rides are waiting for a driver".to_string(),
            data: None,
        };
        notifications_sent += self
            .fanout
            .send_to_ids(vec![driver_id.to_string()], reoffer)
            .await
            .success_count;

        Ok(RideClosure {
            ride,
            updated_rides_count,
            notifications_sent,
        })
    }

    /// Move a ride to the given status, default `cancel`.
    ///
    /// When the target is `cancel`, every driver still in `requested_to`
    /// is told the request is gone, each as their own recipient.
    ///
    /// # Errors
    ///
    /// Returns [`RideError::NotFound`] for an unknown ride.
    pub async fn cancel_ride(
        &self,
        ride_id: &str,
        status: Option<RideStatus>,
    ) -> Result<Ride, RideError> {
        let target = status.unwrap_or(RideStatus::Cancel);

        // Snapshot the recipients before the status wipes relevance.
        let previous = self
            .repo
            .find_by_id(ride_id)
            .await?
            .ok_or_else(|| RideError::NotFound(format!("No ride with id: {}", ride_id)))?;

        let updated = self
            .repo
            .set_status(ride_id, target)
            .await?
            .ok_or_else(|| RideError::NotFound(format!("No ride with id: {}", ride_id)))?;

        info!(ride_id = %updated.ride_id, status = %updated.status, "Ride status set");

        if target == RideStatus::Cancel && !previous.requested_to.is_empty() {
            let message = NotificationMessage::for_ride(
                "Ride Cancelled",
                "The ride request has been cancelled",
                &updated.ride_id,
            );
            self.fanout
                .send_to_ids(previous.requested_to.clone(), message)
                .await;
        }

        Ok(updated)
    }

    // Read side. Store-direct, no caching.

    /// Fetch a ride by id.
    pub async fn get_ride(&self, ride_id: &str) -> Result<Ride, RideError> {
        self.repo
            .find_by_id(ride_id)
            .await?
            .ok_or_else(|| RideError::NotFound(format!("No ride with id: {}", ride_id)))
    }

    /// All rides with the given status.
    pub async fn rides_by_status(&self, status: RideStatus) -> Result<Vec<Ride>, RideError> {
        Ok(self.repo.find_by_status(status).await?)
    }

    /// A customer's rides. Without a filter, terminal rides are excluded.
    pub async fn rides_for_customer(
        &self,
        customer_id: &str,
        status: Option<RideStatus>,
    ) -> Result<Vec<Ride>, RideError> {
        Ok(self.repo.find_by_customer(customer_id, status).await?)
    }

    /// Pending requests a driver can still accept.
    pub async fn requests_for_driver(&self, driver_id: &str) -> Result<Vec<Ride>, RideError> {
        Ok(self.repo.find_requests_for_driver(driver_id).await?)
    }

    /// Rides assigned to a driver, optionally filtered by status.
    pub async fn rides_for_driver(
        &self,
        driver_id: &str,
        status: Option<RideStatus>,
    ) -> Result<Vec<Ride>, RideError> {
        Ok(self.repo.find_by_driver(driver_id, status).await?)
    }
}
