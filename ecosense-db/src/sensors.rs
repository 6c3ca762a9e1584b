use serde::{Deserialize, Serialize};
use sqlx::Executor;

use crate::{inserted_id, DbBackend};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct SensorsRow {
    pub id: i64,
    pub location: String,
    pub zone: String,
    pub status: String,
    /// Readings below this value raise a `low_humidity` alert.
    pub humidity_threshold: Option<f64>,
}

/// Writable sensor columns, shared by insert and update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorFields {
    pub location: String,
    pub zone: String,
    pub status: String,
    #[serde(default)]
    pub humidity_threshold: Option<f64>,
}

impl SensorsRow {
    pub fn from_fields(id: i64, fields: SensorFields) -> Self {
        Self {
            id,
            location: fields.location,
            zone: fields.zone,
            status: fields.status,
            humidity_threshold: fields.humidity_threshold,
        }
    }
}

pub async fn insert<'e, E>(executor: E, fields: &SensorFields) -> Result<i64, sqlx::Error>
where
    E: Executor<'e, Database = DbBackend>,
{
    let result = sqlx::query(
        "INSERT INTO sensors (location, zone, status, humidity_threshold) VALUES (?, ?, ?, ?)",
    )
    .bind(&fields.location)
    .bind(&fields.zone)
    .bind(&fields.status)
    .bind(fields.humidity_threshold)
    .execute(executor)
    .await?;
    Ok(inserted_id(&result))
}

pub async fn find_by_id<'e, E>(executor: E, id: i64) -> Result<Option<SensorsRow>, sqlx::Error>
where
    E: Executor<'e, Database = DbBackend>,
{
    sqlx::query_as(
        "SELECT id, location, zone, status, humidity_threshold FROM sensors WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

/// List sensors, optionally restricted to one zone.
pub async fn list<'e, E>(executor: E, zone: Option<&str>) -> Result<Vec<SensorsRow>, sqlx::Error>
where
    E: Executor<'e, Database = DbBackend>,
{
    match zone {
        Some(zone) => {
            sqlx::query_as(
                "SELECT id, location, zone, status, humidity_threshold FROM sensors WHERE zone = ? ORDER BY id",
            )
            .bind(zone)
            .fetch_all(executor)
            .await
        }
        None => {
            sqlx::query_as(
                "SELECT id, location, zone, status, humidity_threshold FROM sensors ORDER BY id",
            )
            .fetch_all(executor)
            .await
        }
    }
}

pub async fn update<'e, E>(executor: E, id: i64, fields: &SensorFields) -> Result<u64, sqlx::Error>
where
    E: Executor<'e, Database = DbBackend>,
{
    let result = sqlx::query(
        "UPDATE sensors SET location = ?, zone = ?, status = ?, humidity_threshold = ? WHERE id = ?",
    )
    .bind(&fields.location)
    .bind(&fields.zone)
    .bind(&fields.status)
    .bind(fields.humidity_threshold)
    .bind(id)
    .execute(executor)
    .await?;
    Ok(result.rows_affected())
}

pub async fn delete_by_id<'e, E>(executor: E, id: i64) -> Result<u64, sqlx::Error>
where
    E: Executor<'e, Database = DbBackend>,
{
    let result = sqlx::query("DELETE FROM sensors WHERE id = ?")
        .bind(id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}
