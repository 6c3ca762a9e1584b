use serde::{Deserialize, Serialize};
use sqlx::{Executor, QueryBuilder};

use crate::{inserted_id, DbBackend};

/// Soil humidity sample reported by a sensor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ReadingsRow {
    pub id: i64,
    pub sensor_id: i64,
    pub value: f64,
    /// RFC 3339 UTC timestamp assigned by the server.
    pub recorded_at: String,
}

/// Optional filters for [`list`]. Bounds are inclusive and compared as
/// RFC 3339 strings in the same format the server writes.
#[derive(Debug, Clone, Default)]
pub struct ReadingFilter {
    pub sensor_id: Option<i64>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub limit: u32,
}

pub async fn insert<'e, E>(
    executor: E,
    sensor_id: i64,
    value: f64,
    recorded_at: &str,
) -> Result<i64, sqlx::Error>
where
    E: Executor<'e, Database = DbBackend>,
{
    let result =
        sqlx::query("INSERT INTO humidity_readings (sensor_id, value, recorded_at) VALUES (?, ?, ?)")
            .bind(sensor_id)
            .bind(value)
            .bind(recorded_at)
            .execute(executor)
            .await?;
    Ok(inserted_id(&result))
}

/// Most recent readings of one sensor, newest first.
pub async fn latest_for_sensor<'e, E>(
    executor: E,
    sensor_id: i64,
    limit: u32,
) -> Result<Vec<ReadingsRow>, sqlx::Error>
where
    E: Executor<'e, Database = DbBackend>,
{
    sqlx::query_as(
        r#"SELECT id, sensor_id, value, recorded_at FROM humidity_readings
           WHERE sensor_id = ?
           ORDER BY recorded_at DESC, id DESC
           LIMIT ?"#,
    )
    .bind(sensor_id)
    .bind(i64::from(limit))
    .fetch_all(executor)
    .await
}

pub async fn list<'e, E>(executor: E, filter: &ReadingFilter) -> Result<Vec<ReadingsRow>, sqlx::Error>
where
    E: Executor<'e, Database = DbBackend>,
{
    let mut qb: QueryBuilder<DbBackend> = QueryBuilder::new(
        "SELECT id, sensor_id, value, recorded_at FROM humidity_readings WHERE 1=1",
    );
    if let Some(sensor_id) = filter.sensor_id {
        qb.push(" AND sensor_id = ").push_bind(sensor_id);
    }
    if let Some(start) = &filter.start {
        qb.push(" AND recorded_at >= ").push_bind(start.clone());
    }
    if let Some(end) = &filter.end {
        qb.push(" AND recorded_at <= ").push_bind(end.clone());
    }
    qb.push(" ORDER BY recorded_at DESC, id DESC LIMIT ")
        .push_bind(i64::from(filter.limit));

    qb.build_query_as::<ReadingsRow>().fetch_all(executor).await
}
