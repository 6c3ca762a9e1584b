use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::{Extension, Json};
use serde::Serialize;
use serde_json::Value;

use ecosense_db::plants::{self as db_plants, PlantWithZoneRow, PlantsRow};

use crate::{error::ApiError, state::AppState};

/// Plants sharing one sensor zone. `zone` is `None` for plants without a sensor.
#[derive(Debug, Serialize, PartialEq)]
pub struct ZoneGroup {
    pub zone: Option<String>,
    pub plants: Vec<PlantsRow>,
}

/// Group joined rows by zone: named zones in ascending order, then the
/// unassigned group if it has any plants.
pub fn group_by_zone(rows: Vec<PlantWithZoneRow>) -> Vec<ZoneGroup> {
    let mut named: BTreeMap<String, Vec<PlantsRow>> = BTreeMap::new();
    let mut unassigned = Vec::new();

    for row in rows {
        let plant = PlantsRow {
            id: row.id,
            name: row.name,
            sensor_id: row.sensor_id,
        };
        match row.zone {
            Some(zone) => named.entry(zone).or_default().push(plant),
            None => unassigned.push(plant),
        }
    }

    let mut groups: Vec<ZoneGroup> = named
        .into_iter()
        .map(|(zone, plants)| ZoneGroup {
            zone: Some(zone),
            plants,
        })
        .collect();
    if !unassigned.is_empty() {
        groups.push(ZoneGroup {
            zone: None,
            plants: unassigned,
        });
    }
    groups
}

/// GET /plants/zones
pub async fn zones(Extension(state): Extension<Arc<AppState>>) -> Result<Json<Value>, ApiError> {
    let rows = db_plants::list_with_zone(&*state.db_pool)
        .await
        .map_err(ApiError::from)?;
    let groups = group_by_zone(rows);
    Ok(Json(serde_json::to_value(&groups).map_err(ApiError::from)?))
}
