//! SQL implementation of the device registration repository

use crate::error::DbError;
use crate::repositories::device_registration::{DeviceRegistration, DeviceRegistrationRepository};
use crate::DbClient;
use sqlx::postgres::PgRow;
use sqlx::Row;
use tracing::{debug, error, info};

const DEVICE_COLUMNS: &str =
    "id, fcm_token, device_type, active, created_at, last_updated, last_notified";

/// SQL implementation of the device registration repository
#[derive(Debug, Clone)]
pub struct SqlDeviceRegistrationRepository {
    /// The database client
    db_client: DbClient,
}

impl SqlDeviceRegistrationRepository {
    /// Create a new SQL device registration repository.
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }
}

fn map_device(row: &PgRow) -> Result<DeviceRegistration, DbError> {
    Ok(DeviceRegistration {
        id: row
            .try_get("id")
            .map_err(|e| DbError::QueryError(e.to_string()))?,
        fcm_token: row
            .try_get("fcm_token")
            .map_err(|e| DbError::QueryError(e.to_string()))?,
        device_type: row
            .try_get("device_type")
            .map_err(|e| DbError::QueryError(e.to_string()))?,
        active: row
            .try_get("active")
            .map_err(|e| DbError::QueryError(e.to_string()))?,
        created_at: row.try_get("created_at").ok().flatten(),
        last_updated: row.try_get("last_updated").ok().flatten(),
        last_notified: row.try_get("last_notified").ok().flatten(),
    })
}

impl DeviceRegistrationRepository for SqlDeviceRegistrationRepository {
    async fn init_schema(&self) -> Result<(), DbError> {
        debug!("Initializing device registration schema");

        self.db_client
            .execute(
                r#"
                CREATE TABLE IF NOT EXISTS device_registration (
                    id TEXT PRIMARY KEY,
                    fcm_token TEXT NOT NULL,
                    device_type TEXT NOT NULL DEFAULT 'unknown',
                    active BOOLEAN NOT NULL DEFAULT TRUE,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP,
                    last_updated TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP,
                    last_notified TIMESTAMPTZ
                )
                "#,
            )
            .await?;

        info!("Device registration schema initialized successfully");
        Ok(())
    }

    async fn register_device(
        &self,
        registration: DeviceRegistration,
    ) -> Result<DeviceRegistration, DbError> {
        debug!("Registering device for owner: {}", registration.id);

        // The owner id is the natural key; registration is an upsert.
        let query = format!(
            r#"
            INSERT INTO device_registration (id, fcm_token, device_type, active)
            VALUES ($1, $2, $3, TRUE)
            ON CONFLICT (id) DO UPDATE
            SET fcm_token = EXCLUDED.fcm_token,
                device_type = EXCLUDED.device_type,
                active = TRUE,
                last_updated = CURRENT_TIMESTAMP
            RETURNING {DEVICE_COLUMNS}
            "#
        );

        let row = sqlx::query(&query)
            .bind(&registration.id)
            .bind(&registration.fcm_token)
            .bind(&registration.device_type)
            .fetch_one(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to register device: {}", e);
                DbError::QueryError(e.to_string())
            })?;

        map_device(&row)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<DeviceRegistration>, DbError> {
        let query = format!("SELECT {DEVICE_COLUMNS} FROM device_registration WHERE id = $1");

        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(self.db_client.pool())
            .await
            .map_err(|e| DbError::QueryError(e.to_string()))?;

        row.as_ref().map(map_device).transpose()
    }

    async fn find_by_ids(&self, ids: &[String]) -> Result<Vec<DeviceRegistration>, DbError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let query = format!(
            "SELECT {DEVICE_COLUMNS} FROM device_registration \
             WHERE id = ANY($1) AND active = TRUE"
        );

        let rows = sqlx::query(&query)
            .bind(ids)
            .fetch_all(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to find devices: {}", e);
                DbError::QueryError(e.to_string())
            })?;

        rows.iter().map(map_device).collect()
    }

    async fn mark_notified(&self, ids: &[String]) -> Result<(), DbError> {
        if ids.is_empty() {
            return Ok(());
        }

        sqlx::query(
            "UPDATE device_registration SET last_notified = CURRENT_TIMESTAMP WHERE id = ANY($1)",
        )
        .bind(ids)
        .execute(self.db_client.pool())
        .await
        .map_err(|e| DbError::QueryError(e.to_string()))?;

        Ok(())
    }

    async fn delete_registration(&self, id: &str) -> Result<bool, DbError> {
        debug!("Deleting device registration for owner: {}", id);

        let result = sqlx::query("DELETE FROM device_registration WHERE id = $1")
            .bind(id)
            .execute(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to delete device registration: {}", e);
                DbError::QueryError(e.to_string())
            })?;

        Ok(result.rows_affected() > 0)
    }
}
