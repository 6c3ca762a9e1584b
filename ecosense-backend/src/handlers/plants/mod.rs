pub mod create;
pub mod delete;
pub mod dto;
pub mod get;
pub mod list;
pub mod update;
pub mod zones;

use ecosense_db::plants::{self as db_plants, PlantFields};
use ecosense_db::sensors as db_sensors;

use crate::error::ApiError;
use crate::state::AppState;

pub(crate) const SENSOR_TAKEN: &str = "sensor already assigned to another plant";

/// Check that the referenced sensor exists before a plant points at it.
async fn ensure_sensor_exists(state: &AppState, fields: &PlantFields) -> Result<(), ApiError> {
    if let Some(sensor_id) = fields.sensor_id {
        if db_sensors::find_by_id(&*state.db_pool, sensor_id)
            .await
            .map_err(ApiError::from)?
            .is_none()
        {
            return Err(ApiError::not_found("sensor not found"));
        }
    }
    Ok(())
}

/// Unique violations on `plants.sensor_id` mean the sensor is already taken.
fn map_write_error(err: sqlx::Error) -> ApiError {
    if ecosense_db::is_unique_violation(&err) {
        ApiError::conflict(SENSOR_TAKEN)
    } else {
        ApiError::from(err)
    }
}

/// Insert a plant, returning its id.
pub(crate) async fn insert_plant(state: &AppState, fields: &PlantFields) -> Result<i64, ApiError> {
    ensure_sensor_exists(state, fields).await?;
    db_plants::insert(&*state.db_pool, fields)
        .await
        .map_err(map_write_error)
}

/// Update a plant, returning whether it existed.
pub(crate) async fn update_plant(
    state: &AppState,
    id: i64,
    fields: &PlantFields,
) -> Result<bool, ApiError> {
    ensure_sensor_exists(state, fields).await?;
    let affected = db_plants::update(&*state.db_pool, id, fields)
        .await
        .map_err(map_write_error)?;
    Ok(affected > 0)
}
