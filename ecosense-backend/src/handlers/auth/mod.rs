pub mod dto;
pub mod login;
pub mod register;

use ecosense_auth::{Outcome, Principal, Rejection};

use crate::error::ApiError;
use crate::validation::{to_payload, ValidationIssue};

/// Map an authentication outcome onto the HTTP error taxonomy.
pub fn into_principal(outcome: Outcome) -> Result<Principal, ApiError> {
    match outcome {
        Outcome::Accepted(principal) => Ok(principal),
        Outcome::Rejected(rejection) => Err(rejection_error(rejection)),
        Outcome::SystemError(detail) => {
            tracing::error!(%detail, "credential store failure");
            Err(ApiError::unavailable("credential store unavailable"))
        }
    }
}

pub fn rejection_error(rejection: Rejection) -> ApiError {
    if let Some(field) = rejection.field() {
        let code = match rejection {
            Rejection::InvalidEmail => "invalid",
            _ => "too_short",
        };
        return ApiError::Validation(to_payload(&[ValidationIssue::new(
            field,
            code,
            rejection.to_string(),
        )]));
    }
    // TODO: collapse these two reasons into one once clients stop depending
    // on them; telling them apart reveals which emails are registered.
    match rejection {
        Rejection::UserNotFound | Rejection::IncorrectPassword => {
            ApiError::unauthorized(rejection.to_string())
        }
        Rejection::EmailAlreadyRegistered => ApiError::conflict(rejection.to_string()),
        _ => ApiError::bad_request(rejection.to_string()),
    }
}
