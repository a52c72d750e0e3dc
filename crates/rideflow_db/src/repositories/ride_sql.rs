//! SQL implementation of the ride repository
//!
//! Every mutation that matters for correctness under concurrent access is
//! expressed as a single statement (or a single transaction for
//! close-and-reoffer), with the array membership logic evaluated inside
//! PostgreSQL rather than read-modify-write from the application.

use crate::error::DbError;
use crate::repositories::ride::{Ride, RideRepository, RideStatus};
use crate::DbClient;
use sqlx::postgres::PgRow;
use sqlx::Row;
use std::str::FromStr;
use tracing::{debug, error, info};

const RIDE_COLUMNS: &str = "ride_id, customer_id, driver_id, accepted_by, place_to, place_from, \
                            price, requested_to, rejected_by, status, created_at";

/// SQL implementation of the ride repository
#[derive(Debug, Clone)]
pub struct SqlRideRepository {
    /// The database client
    db_client: DbClient,
}

impl SqlRideRepository {
    /// Create a new SQL ride repository.
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }
}

fn map_ride(row: &PgRow) -> Result<Ride, DbError> {
    let status_text: String = row
        .try_get("status")
        .map_err(|e| DbError::QueryError(e.to_string()))?;
    let status = RideStatus::from_str(&status_text).map_err(DbError::QueryError)?;

    Ok(Ride {
        ride_id: row
            .try_get("ride_id")
            .map_err(|e| DbError::QueryError(e.to_string()))?,
        customer_id: row
            .try_get("customer_id")
            .map_err(|e| DbError::QueryError(e.to_string()))?,
        driver_id: row.try_get("driver_id").ok().flatten(),
        accepted_by: row.try_get("accepted_by").ok().flatten(),
        place_to: row
            .try_get("place_to")
            .map_err(|e| DbError::QueryError(e.to_string()))?,
        place_from: row.try_get("place_from").ok().flatten(),
        price: row
            .try_get("price")
            .map_err(|e| DbError::QueryError(e.to_string()))?,
        requested_to: row
            .try_get("requested_to")
            .map_err(|e| DbError::QueryError(e.to_string()))?,
        rejected_by: row
            .try_get("rejected_by")
            .map_err(|e| DbError::QueryError(e.to_string()))?,
        status,
        created_at: row.try_get("created_at").ok().flatten(),
    })
}

fn map_rides(rows: Vec<PgRow>) -> Result<Vec<Ride>, DbError> {
    rows.iter().map(map_ride).collect()
}

impl RideRepository for SqlRideRepository {
    async fn init_schema(&self) -> Result<(), DbError> {
        debug!("Initializing ride schema");

        self.db_client
            .execute(
                r#"
                CREATE TABLE IF NOT EXISTS ride (
                    ride_id TEXT PRIMARY KEY,
                    customer_id TEXT NOT NULL,
                    driver_id TEXT,
                    accepted_by TEXT,
                    place_to JSONB NOT NULL,
                    place_from JSONB,
                    price BIGINT NOT NULL DEFAULT 0,
                    requested_to TEXT[] NOT NULL DEFAULT '{}',
                    rejected_by TEXT[] NOT NULL DEFAULT '{}',
                    status TEXT NOT NULL DEFAULT 'created',
                    created_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP
                )
                "#,
            )
            .await?;

        self.db_client
            .execute("CREATE INDEX IF NOT EXISTS ride_status_idx ON ride (status)")
            .await?;

        // Populated by the auth service; read here for eligibility only.
        self.db_client
            .execute("CREATE TABLE IF NOT EXISTS driver (id TEXT PRIMARY KEY)")
            .await?;

        info!("Ride schema initialized successfully");
        Ok(())
    }

    async fn insert(&self, ride: Ride) -> Result<Ride, DbError> {
        debug!("Inserting ride {} for customer {}", ride.ride_id, ride.customer_id);

        let query = format!(
            r#"
            INSERT INTO ride (ride_id, customer_id, place_to, place_from, price,
                              requested_to, rejected_by, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {RIDE_COLUMNS}
            "#
        );

        let row = sqlx::query(&query)
            .bind(&ride.ride_id)
            .bind(&ride.customer_id)
            .bind(&ride.place_to)
            .bind(&ride.place_from)
            .bind(ride.price)
            .bind(&ride.requested_to)
            .bind(&ride.rejected_by)
            .bind(ride.status.as_str())
            .fetch_one(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to insert ride: {}", e);
                DbError::QueryError(e.to_string())
            })?;

        map_ride(&row)
    }

    async fn find_by_id(&self, ride_id: &str) -> Result<Option<Ride>, DbError> {
        let query = format!("SELECT {RIDE_COLUMNS} FROM ride WHERE ride_id = $1");

        let row = sqlx::query(&query)
            .bind(ride_id)
            .fetch_optional(self.db_client.pool())
            .await
            .map_err(|e| DbError::QueryError(e.to_string()))?;

        row.as_ref().map(map_ride).transpose()
    }

    async fn find_by_status(&self, status: RideStatus) -> Result<Vec<Ride>, DbError> {
        let query = format!("SELECT {RIDE_COLUMNS} FROM ride WHERE status = $1");

        let rows = sqlx::query(&query)
            .bind(status.as_str())
            .fetch_all(self.db_client.pool())
            .await
            .map_err(|e| DbError::QueryError(e.to_string()))?;

        map_rides(rows)
    }

    async fn find_by_customer(
        &self,
        customer_id: &str,
        status: Option<RideStatus>,
    ) -> Result<Vec<Ride>, DbError> {
        let rows = match status {
            Some(status) => {
                let query = format!(
                    "SELECT {RIDE_COLUMNS} FROM ride WHERE customer_id = $1 AND status = $2"
                );
                sqlx::query(&query)
                    .bind(customer_id)
                    .bind(status.as_str())
                    .fetch_all(self.db_client.pool())
                    .await
            }
            None => {
                let query = format!(
                    "SELECT {RIDE_COLUMNS} FROM ride \
                     WHERE customer_id = $1 AND status NOT IN ('ended', 'cancel')"
                );
                sqlx::query(&query)
                    .bind(customer_id)
                    .fetch_all(self.db_client.pool())
                    .await
            }
        }
        .map_err(|e| DbError::QueryError(e.to_string()))?;

        map_rides(rows)
    }

    async fn find_requests_for_driver(&self, driver_id: &str) -> Result<Vec<Ride>, DbError> {
        let query = format!(
            "SELECT {RIDE_COLUMNS} FROM ride \
             WHERE $1 = ANY(requested_to) AND status = 'created'"
        );

        let rows = sqlx::query(&query)
            .bind(driver_id)
            .fetch_all(self.db_client.pool())
            .await
            .map_err(|e| DbError::QueryError(e.to_string()))?;

        map_rides(rows)
    }

    async fn find_by_driver(
        &self,
        driver_id: &str,
        status: Option<RideStatus>,
    ) -> Result<Vec<Ride>, DbError> {
        let rows = match status {
            Some(status) => {
                let query =
                    format!("SELECT {RIDE_COLUMNS} FROM ride WHERE driver_id = $1 AND status = $2");
                sqlx::query(&query)
                    .bind(driver_id)
                    .bind(status.as_str())
                    .fetch_all(self.db_client.pool())
                    .await
            }
            None => {
                let query = format!("SELECT {RIDE_COLUMNS} FROM ride WHERE driver_id = $1");
                sqlx::query(&query)
                    .bind(driver_id)
                    .fetch_all(self.db_client.pool())
                    .await
            }
        }
        .map_err(|e| DbError::QueryError(e.to_string()))?;

        map_rides(rows)
    }

    async fn list_driver_ids(&self) -> Result<Vec<String>, DbError> {
        let rows = sqlx::query("SELECT id FROM driver")
            .fetch_all(self.db_client.pool())
            .await
            .map_err(|e| DbError::QueryError(e.to_string()))?;

        rows.iter()
            .map(|row| {
                row.try_get("id")
                    .map_err(|e| DbError::QueryError(e.to_string()))
            })
            .collect()
    }

    async fn busy_driver_ids(&self) -> Result<Vec<String>, DbError> {
        let rows = sqlx::query(
            "SELECT driver_id FROM ride WHERE status = 'started' AND driver_id IS NOT NULL",
        )
        .fetch_all(self.db_client.pool())
        .await
        .map_err(|e| DbError::QueryError(e.to_string()))?;

        rows.iter()
            .map(|row| {
                row.try_get("driver_id")
                    .map_err(|e| DbError::QueryError(e.to_string()))
            })
            .collect()
    }

    async fn active_ride_for_driver(&self, driver_id: &str) -> Result<Option<Ride>, DbError> {
        let query = format!(
            "SELECT {RIDE_COLUMNS} FROM ride WHERE driver_id = $1 AND status = 'started'"
        );

        let row = sqlx::query(&query)
            .bind(driver_id)
            .fetch_optional(self.db_client.pool())
            .await
            .map_err(|e| DbError::QueryError(e.to_string()))?;

        row.as_ref().map(map_ride).transpose()
    }

    async fn try_accept(&self, ride_id: &str, driver_id: &str) -> Result<Option<Ride>, DbError> {
        debug!("Driver {} accepting ride {}", driver_id, ride_id);

        // Status guard and assignment in one statement closes the
        // double-accept race: only one of two concurrent accepts can
        // match the WHERE clause.
        let query = format!(
            r#"
            UPDATE ride
            SET driver_id = $2, accepted_by = $2, status = 'started'
            WHERE ride_id = $1 AND status NOT IN ('started', 'cancel')
            RETURNING {RIDE_COLUMNS}
            "#
        );

        let row = sqlx::query(&query)
            .bind(ride_id)
            .bind(driver_id)
            .fetch_optional(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to accept ride: {}", e);
                DbError::QueryError(e.to_string())
            })?;

        row.as_ref().map(map_ride).transpose()
    }

    async fn reject(&self, ride_id: &str, driver_id: &str) -> Result<Option<Ride>, DbError> {
        debug!("Driver {} rejecting ride {}", driver_id, ride_id);

        let query = format!(
            r#"
            UPDATE ride
            SET rejected_by = CASE
                    WHEN $2 = ANY(rejected_by) THEN rejected_by
                    ELSE array_append(rejected_by, $2)
                END,
                requested_to = array_remove(requested_to, $2)
            WHERE ride_id = $1
            RETURNING {RIDE_COLUMNS}
            "#
        );

        let row = sqlx::query(&query)
            .bind(ride_id)
            .bind(driver_id)
            .fetch_optional(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to reject ride: {}", e);
                DbError::QueryError(e.to_string())
            })?;

        row.as_ref().map(map_ride).transpose()
    }

    async fn set_status(
        &self,
        ride_id: &str,
        status: RideStatus,
    ) -> Result<Option<Ride>, DbError> {
        debug!("Setting ride {} status to {}", ride_id, status);

        let query =
            format!("UPDATE ride SET status = $2 WHERE ride_id = $1 RETURNING {RIDE_COLUMNS}");

        let row = sqlx::query(&query)
            .bind(ride_id)
            .bind(status.as_str())
            .fetch_optional(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to update ride status: {}", e);
                DbError::QueryError(e.to_string())
            })?;

        row.as_ref().map(map_ride).transpose()
    }

    async fn close_and_reoffer(
        &self,
        ride_id: &str,
        driver_id: &str,
    ) -> Result<Option<(Ride, u64)>, DbError> {
        debug!("Ending ride {} and re-offering driver {}", ride_id, driver_id);

        // Ending the ride and rejoining the pool must be one atomic unit:
        // a crash between the two steps would leave the driver neither
        // assigned nor offered anywhere.
        let mut tx = self.db_client.begin().await?;

        let close_query =
            format!("UPDATE ride SET status = 'ended' WHERE ride_id = $1 RETURNING {RIDE_COLUMNS}");

        let row = sqlx::query(&close_query)
            .bind(ride_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| {
                error!("Failed to end ride: {}", e);
                DbError::QueryError(e.to_string())
            })?;

        let Some(row) = row else {
            tx.rollback()
                .await
                .map_err(|e| DbError::TransactionError(e.to_string()))?;
            return Ok(None);
        };
        let ended = map_ride(&row)?;

        let reoffer = sqlx::query(
            r#"
            UPDATE ride
            SET requested_to = array_append(requested_to, $2)
            WHERE status = 'created'
              AND ride_id <> $1
              AND NOT ($2 = ANY(requested_to))
              AND NOT ($2 = ANY(rejected_by))
            "#,
        )
        .bind(ride_id)
        .bind(driver_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            error!("Failed to re-offer driver to pending rides: {}", e);
            DbError::QueryError(e.to_string())
        })?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionError(e.to_string()))?;

        info!(
            "Ride {} ended; driver {} re-offered to {} pending rides",
            ride_id,
            driver_id,
            reoffer.rows_affected()
        );

        Ok(Some((ended, reoffer.rows_affected())))
    }
}
