use serde::{Deserialize, Serialize};
use sqlx::Executor;

use crate::{inserted_id, DbBackend};

pub const KIND_LOW_HUMIDITY: &str = "low_humidity";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct AlertsRow {
    pub id: i64,
    pub sensor_id: i64,
    pub recorded_at: String,
    pub value: f64,
    pub kind: String,
}

pub async fn insert<'e, E>(
    executor: E,
    sensor_id: i64,
    recorded_at: &str,
    value: f64,
    kind: &str,
) -> Result<i64, sqlx::Error>
where
    E: Executor<'e, Database = DbBackend>,
{
    let result =
        sqlx::query("INSERT INTO alerts (sensor_id, recorded_at, value, kind) VALUES (?, ?, ?, ?)")
            .bind(sensor_id)
            .bind(recorded_at)
            .bind(value)
            .bind(kind)
            .execute(executor)
            .await?;
    Ok(inserted_id(&result))
}

/// Alerts newest first, optionally for one sensor.
pub async fn list<'e, E>(executor: E, sensor_id: Option<i64>) -> Result<Vec<AlertsRow>, sqlx::Error>
where
    E: Executor<'e, Database = DbBackend>,
{
    match sensor_id {
        Some(sensor_id) => {
            sqlx::query_as(
                "SELECT id, sensor_id, recorded_at, value, kind FROM alerts WHERE sensor_id = ? ORDER BY recorded_at DESC, id DESC",
            )
            .bind(sensor_id)
            .fetch_all(executor)
            .await
        }
        None => {
            sqlx::query_as(
                "SELECT id, sensor_id, recorded_at, value, kind FROM alerts ORDER BY recorded_at DESC, id DESC",
            )
            .fetch_all(executor)
            .await
        }
    }
}

pub async fn delete_by_id<'e, E>(executor: E, id: i64) -> Result<u64, sqlx::Error>
where
    E: Executor<'e, Database = DbBackend>,
{
    let result = sqlx::query("DELETE FROM alerts WHERE id = ?")
        .bind(id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}
