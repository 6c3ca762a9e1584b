use serde::{Deserialize, Serialize};

use crate::validation::ValidationIssue;

/// Body of `POST /readings`.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ReadingInput {
    pub sensor_id: Option<i64>,
    pub value: Option<f64>,
}

impl ReadingInput {
    pub fn validate(&self) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        if self.sensor_id.is_none() {
            issues.push(ValidationIssue::new(
                "sensor_id",
                "missing",
                "sensor_id is required",
            ));
        }
        match self.value {
            None => issues.push(ValidationIssue::new("value", "missing", "value is required")),
            Some(v) if !v.is_finite() => issues.push(ValidationIssue::new(
                "value",
                "invalid",
                "value must be a finite number",
            )),
            Some(_) => {}
        }
        issues
    }
}

/// Whether a reading should raise a low-humidity alert for its sensor.
pub fn is_below_threshold(value: f64, threshold: Option<f64>) -> bool {
    threshold.is_some_and(|limit| value < limit)
}
