use ecosense_db::sensors::SensorFields;
use serde::{Deserialize, Serialize};

use crate::validation::{require_text, ValidationIssue};

/// Body of `POST /sensors` and `PUT /sensors/{sensorId}`.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct SensorInput {
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub zone: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub humidity_threshold: Option<f64>,
}

impl SensorInput {
    pub fn validate(&self) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        require_text(&mut issues, "location", &self.location);
        require_text(&mut issues, "zone", &self.zone);
        require_text(&mut issues, "status", &self.status);
        if let Some(threshold) = self.humidity_threshold {
            if !threshold.is_finite() || threshold < 0.0 {
                issues.push(ValidationIssue::new(
                    "humidity_threshold",
                    "out_of_range",
                    "humidity_threshold must be a non-negative number",
                ));
            }
        }
        issues
    }

    pub fn into_fields(self) -> SensorFields {
        SensorFields {
            location: self.location.trim().to_owned(),
            zone: self.zone.trim().to_owned(),
            status: self.status.trim().to_owned(),
            humidity_threshold: self.humidity_threshold,
        }
    }
}
