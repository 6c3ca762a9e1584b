use ecosense_db::plants::PlantFields;
use serde::{Deserialize, Serialize};

use crate::validation::{require_text, ValidationIssue};

/// Body of `POST /plants` and `PUT /plants/{plantId}`.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct PlantInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub sensor_id: Option<i64>,
}

impl PlantInput {
    pub fn validate(&self) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        require_text(&mut issues, "name", &self.name);
        issues
    }

    pub fn into_fields(self) -> PlantFields {
        PlantFields {
            name: self.name.trim().to_owned(),
            sensor_id: self.sensor_id,
        }
    }
}
