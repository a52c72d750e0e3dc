//! In-memory test doubles for the engine and handler tests
//!
//! [`MemoryRideRepository`] mirrors the SQL repository's semantics,
//! including the conditional accept guard and the close-and-reoffer
//! update, so the full state machine runs without a database.

use chrono::Utc;
use rideflow_common::models::{
    DeliveryOutcome, FanoutReport, NotificationMessage, Ride, RideStatus,
};
use rideflow_common::services::{BoxFuture, InfallibleFuture, NotificationFanout};
use rideflow_db::error::DbError;
use rideflow_db::repositories::RideRepository;
use rideflow_pricing::{FareEstimate, FarePricer, PricingError};
use std::sync::{Arc, Mutex};

/// In-memory ride store. Cloning shares the underlying state, so tests
/// can keep a handle for assertions after handing one to the engine.
#[derive(Clone, Default)]
pub struct MemoryRideRepository {
    rides: Arc<Mutex<Vec<Ride>>>,
    drivers: Arc<Mutex<Vec<String>>>,
}

impl MemoryRideRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a known driver, as the external auth service would.
    pub fn add_driver(&self, driver_id: &str) {
        self.drivers.lock().unwrap().push(driver_id.to_string());
    }
}

impl RideRepository for MemoryRideRepository {
    async fn init_schema(&self) -> Result<(), DbError> {
        Ok(())
    }

    async fn insert(&self, mut ride: Ride) -> Result<Ride, DbError> {
        ride.created_at = Some(Utc::now());
        self.rides.lock().unwrap().push(ride.clone());
        Ok(ride)
    }

    async fn find_by_id(&self, ride_id: &str) -> Result<Option<Ride>, DbError> {
        Ok(self
            .rides
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.ride_id == ride_id)
            .cloned())
    }

    async fn find_by_status(&self, status: RideStatus) -> Result<Vec<Ride>, DbError> {
        Ok(self
            .rides
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.status == status)
            .cloned()
            .collect())
    }

    async fn find_by_customer(
        &self,
        customer_id: &str,
        status: Option<RideStatus>,
    ) -> Result<Vec<Ride>, DbError> {
        Ok(self
            .rides
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.customer_id == customer_id)
            .filter(|r| match status {
                Some(wanted) => r.status == wanted,
                None => !r.status.is_terminal(),
            })
            .cloned()
            .collect())
    }

    async fn find_requests_for_driver(&self, driver_id: &str) -> Result<Vec<Ride>, DbError> {
        Ok(self
            .rides
            .lock()
            .unwrap()
            .iter()
            .filter(|r| {
                r.status == RideStatus::Created
                    && r.requested_to.iter().any(|d| d == driver_id)
            })
            .cloned()
            .collect())
    }

    async fn find_by_driver(
        &self,
        driver_id: &str,
        status: Option<RideStatus>,
    ) -> Result<Vec<Ride>, DbError> {
        Ok(self
            .rides
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.driver_id.as_deref() == Some(driver_id))
            .filter(|r| status.map_or(true, |wanted| r.status == wanted))
            .cloned()
            .collect())
    }

    async fn list_driver_ids(&self) -> Result<Vec<String>, DbError> {
        Ok(self.drivers.lock().unwrap().clone())
    }

    async fn busy_driver_ids(&self) -> Result<Vec<String>, DbError> {
        Ok(self
            .rides
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.status == RideStatus::Started)
            .filter_map(|r| r.driver_id.clone())
            .collect())
    }

    async fn active_ride_for_driver(&self, driver_id: &str) -> Result<Option<Ride>, DbError> {
        Ok(self
            .rides
            .lock()
            .unwrap()
            .iter()
            .find(|r| {
                r.status == RideStatus::Started && r.driver_id.as_deref() == Some(driver_id)
            })
            .cloned())
    }

    async fn try_accept(&self, ride_id: &str, driver_id: &str) -> Result<Option<Ride>, DbError> {
        let mut rides = self.rides.lock().unwrap();
        let Some(ride) = rides.iter_mut().find(|r| r.ride_id == ride_id) else {
            return Ok(None);
        };
        // Same guard as the SQL conditional update.
        if matches!(ride.status, RideStatus::Started | RideStatus::Cancel) {
            return Ok(None);
        }
        ride.driver_id = Some(driver_id.to_string());
        ride.accepted_by = Some(driver_id.to_string());
        ride.status = RideStatus::Started;
        Ok(Some(ride.clone()))
    }

    async fn reject(&self, ride_id: &str, driver_id: &str) -> Result<Option<Ride>, DbError> {
        let mut rides = self.rides.lock().unwrap();
        let Some(ride) = rides.iter_mut().find(|r| r.ride_id == ride_id) else {
            return Ok(None);
        };
        if !ride.rejected_by.iter().any(|d| d == driver_id) {
            ride.rejected_by.push(driver_id.to_string());
        }
        ride.requested_to.retain(|d| d != driver_id);
        Ok(Some(ride.clone()))
    }

    async fn set_status(
        &self,
        ride_id: &str,
        status: RideStatus,
    ) -> Result<Option<Ride>, DbError> {
        let mut rides = self.rides.lock().unwrap();
        let Some(ride) = rides.iter_mut().find(|r| r.ride_id == ride_id) else {
            return Ok(None);
        };
        ride.status = status;
        Ok(Some(ride.clone()))
    }

    async fn close_and_reoffer(
        &self,
        ride_id: &str,
        driver_id: &str,
    ) -> Result<Option<(Ride, u64)>, DbError> {
        let mut rides = self.rides.lock().unwrap();

        let Some(ride) = rides.iter_mut().find(|r| r.ride_id == ride_id) else {
            return Ok(None);
        };
        ride.status = RideStatus::Ended;
        let ended = ride.clone();

        let mut updated = 0;
        for other in rides.iter_mut() {
            if other.ride_id != ride_id
                && other.status == RideStatus::Created
                && !other.requested_to.iter().any(|d| d == driver_id)
                && !other.rejected_by.iter().any(|d| d == driver_id)
            {
                other.requested_to.push(driver_id.to_string());
                updated += 1;
            }
        }

        Ok(Some((ended, updated)))
    }
}

/// Fan-out double that records every dispatch and reports full success.
#[derive(Default)]
pub struct RecordingFanout {
    sent: Mutex<Vec<(Vec<String>, String)>>,
}

impl RecordingFanout {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Every (recipients, title) pair dispatched so far.
    pub fn sent(&self) -> Vec<(Vec<String>, String)> {
        self.sent.lock().unwrap().clone()
    }

    /// Titles sent to a specific recipient, in dispatch order.
    pub fn titles_for(&self, id: &str) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|(ids, _)| ids.iter().any(|i| i == id))
            .map(|(_, title)| title.clone())
            .collect()
    }
}

impl NotificationFanout for RecordingFanout {
    fn send_to_ids(
        &self,
        ids: Vec<String>,
        message: NotificationMessage,
    ) -> InfallibleFuture<'_, FanoutReport> {
        self.sent
            .lock()
            .unwrap()
            .push((ids.clone(), message.title.clone()));

        let responses: Vec<DeliveryOutcome> = ids
            .iter()
            .map(|id| DeliveryOutcome {
                recipient_id: id.clone(),
                success: true,
                message_id: Some(format!("msg-{}", id)),
                error: None,
            })
            .collect();

        let report = FanoutReport {
            total_devices: ids.len(),
            success_count: ids.len(),
            failure_count: 0,
            responses,
        };
        Box::pin(async move { report })
    }
}

/// Pricer double that quotes a fixed fare.
pub struct StaticPricer {
    pub price: i64,
}

impl StaticPricer {
    pub fn new(price: i64) -> Arc<Self> {
        Arc::new(Self { price })
    }
}

impl FarePricer for StaticPricer {
    fn quote<'a>(
        &'a self,
        _origin: &'a str,
        _destination: &'a str,
    ) -> BoxFuture<'a, FareEstimate, PricingError> {
        let price = self.price;
        Box::pin(async move {
            Ok(FareEstimate {
                distance_meters: 10_000,
                duration_seconds: 900,
                price,
                currency: "INR".to_string(),
            })
        })
    }
}
