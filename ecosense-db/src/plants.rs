use serde::{Deserialize, Serialize};
use sqlx::Executor;

use crate::{inserted_id, DbBackend};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct PlantsRow {
    pub id: i64,
    pub name: String,
    pub sensor_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlantFields {
    pub name: String,
    #[serde(default)]
    pub sensor_id: Option<i64>,
}

/// A plant joined with the zone of the sensor watching it.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct PlantWithZoneRow {
    pub id: i64,
    pub name: String,
    pub sensor_id: Option<i64>,
    pub zone: Option<String>,
}

pub async fn insert<'e, E>(executor: E, fields: &PlantFields) -> Result<i64, sqlx::Error>
where
    E: Executor<'e, Database = DbBackend>,
{
    let result = sqlx::query("INSERT INTO plants (name, sensor_id) VALUES (?, ?)")
        .bind(&fields.name)
        .bind(fields.sensor_id)
        .execute(executor)
        .await?;
    Ok(inserted_id(&result))
}

pub async fn find_by_id<'e, E>(executor: E, id: i64) -> Result<Option<PlantsRow>, sqlx::Error>
where
    E: Executor<'e, Database = DbBackend>,
{
    sqlx::query_as("SELECT id, name, sensor_id FROM plants WHERE id = ?")
        .bind(id)
        .fetch_optional(executor)
        .await
}

/// The plant associated with a sensor, if any. At most one exists.
pub async fn find_by_sensor<'e, E>(
    executor: E,
    sensor_id: i64,
) -> Result<Option<PlantsRow>, sqlx::Error>
where
    E: Executor<'e, Database = DbBackend>,
{
    sqlx::query_as("SELECT id, name, sensor_id FROM plants WHERE sensor_id = ?")
        .bind(sensor_id)
        .fetch_optional(executor)
        .await
}

pub async fn list<'e, E>(executor: E) -> Result<Vec<PlantsRow>, sqlx::Error>
where
    E: Executor<'e, Database = DbBackend>,
{
    sqlx::query_as("SELECT id, name, sensor_id FROM plants ORDER BY id")
        .fetch_all(executor)
        .await
}

/// Every plant with its sensor's zone, ordered by zone then plant name.
/// Plants without a sensor come last with a NULL zone.
pub async fn list_with_zone<'e, E>(executor: E) -> Result<Vec<PlantWithZoneRow>, sqlx::Error>
where
    E: Executor<'e, Database = DbBackend>,
{
    sqlx::query_as(
        r#"SELECT p.id, p.name, p.sensor_id, s.zone
           FROM plants p
           LEFT JOIN sensors s ON s.id = p.sensor_id
           ORDER BY s.zone IS NULL, s.zone, p.name, p.id"#,
    )
    .fetch_all(executor)
    .await
}

pub async fn update<'e, E>(executor: E, id: i64, fields: &PlantFields) -> Result<u64, sqlx::Error>
where
    E: Executor<'e, Database = DbBackend>,
{
    let result = sqlx::query("UPDATE plants SET name = ?, sensor_id = ? WHERE id = ?")
        .bind(&fields.name)
        .bind(fields.sensor_id)
        .bind(id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}

pub async fn delete_by_id<'e, E>(executor: E, id: i64) -> Result<u64, sqlx::Error>
where
    E: Executor<'e, Database = DbBackend>,
{
    let result = sqlx::query("DELETE FROM plants WHERE id = ?")
        .bind(id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}
