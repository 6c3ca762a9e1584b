use serde::Serialize;

use crate::error::ApiError;

#[derive(Debug, Serialize, Clone)]
pub struct ValidationIssue {
    pub field: String,
    pub code: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(
        field: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            code: code.into(),
            message: message.into(),
        }
    }
}

pub fn to_payload(issues: &[ValidationIssue]) -> serde_json::Value {
    let mut map = serde_json::Map::new();
    for issue in issues {
        map.insert(
            issue.field.clone(),
            serde_json::json!({ "code": issue.code, "message": issue.message }),
        );
    }
    serde_json::json!({ "validation": serde_json::Value::Object(map) })
}

/// `Ok` when there are no issues, otherwise the field-keyed validation error.
pub fn ensure_valid(issues: Vec<ValidationIssue>) -> Result<(), ApiError> {
    if issues.is_empty() {
        Ok(())
    } else {
        Err(ApiError::Validation(to_payload(&issues)))
    }
}

/// Record a `missing` issue when `value` is blank.
pub fn require_text(issues: &mut Vec<ValidationIssue>, field: &str, value: &str) {
    if value.trim().is_empty() {
        issues.push(ValidationIssue::new(
            field,
            "missing",
            format!("{field} is required"),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_is_keyed_by_field() {
        let payload = to_payload(&[
            ValidationIssue::new("zone", "missing", "zone is required"),
            ValidationIssue::new("value", "out_of_range", "value must be between 0 and 100"),
        ]);
        assert_eq!(payload["validation"]["zone"]["code"], "missing");
        assert_eq!(payload["validation"]["value"]["code"], "out_of_range");
    }

    #[test]
    fn blank_text_is_missing() {
        let mut issues = Vec::new();
        require_text(&mut issues, "location", "   ");
        require_text(&mut issues, "zone", "north");
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].field, "location");
        assert!(ensure_valid(issues).is_err());
        assert!(ensure_valid(Vec::new()).is_ok());
    }
}
