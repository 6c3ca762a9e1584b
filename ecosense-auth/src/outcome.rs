use serde::Serialize;
use thiserror::Error;

/// The authenticated (or freshly registered) user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub user_id: i64,
    pub name: String,
    pub email: String,
}

/// Why a login or registration attempt was turned down.
///
/// The `Display` strings are the client-facing reasons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("missing credentials")]
    MissingCredentials,
    #[error("user not found")]
    UserNotFound,
    #[error("incorrect password")]
    IncorrectPassword,
    #[error("invalid email")]
    InvalidEmail,
    #[error("name too short")]
    NameTooShort,
    #[error("surname too short")]
    SurnameTooShort,
    #[error("password too short")]
    PasswordTooShort,
    #[error("email already registered")]
    EmailAlreadyRegistered,
}

impl Rejection {
    /// Input field a validation rejection refers to, if any.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Rejection::InvalidEmail => Some("email"),
            Rejection::NameTooShort => Some("name"),
            Rejection::SurnameTooShort => Some("surname"),
            Rejection::PasswordTooShort => Some("password"),
            _ => None,
        }
    }

    /// Whether the rejection is about who the caller is rather than what they sent.
    pub fn is_authentication_failure(&self) -> bool {
        matches!(self, Rejection::UserNotFound | Rejection::IncorrectPassword)
    }
}

/// Result of [`Authenticator::verify_and_migrate`] and [`Authenticator::register`].
///
/// [`Authenticator::verify_and_migrate`]: crate::Authenticator::verify_and_migrate
/// [`Authenticator::register`]: crate::Authenticator::register
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Accepted(Principal),
    Rejected(Rejection),
    /// The credential store could not be reached or failed.
    SystemError(String),
}

impl Outcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Outcome::Accepted(_))
    }

    pub fn principal(&self) -> Option<&Principal> {
        match self {
            Outcome::Accepted(p) => Some(p),
            _ => None,
        }
    }

    pub fn rejection(&self) -> Option<Rejection> {
        match self {
            Outcome::Rejected(r) => Some(*r),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_reasons_are_stable() {
        assert_eq!(Rejection::MissingCredentials.to_string(), "missing credentials");
        assert_eq!(Rejection::UserNotFound.to_string(), "user not found");
        assert_eq!(Rejection::IncorrectPassword.to_string(), "incorrect password");
        assert_eq!(
            Rejection::EmailAlreadyRegistered.to_string(),
            "email already registered"
        );
    }

    #[test]
    fn validation_rejections_name_their_field() {
        assert_eq!(Rejection::InvalidEmail.field(), Some("email"));
        assert_eq!(Rejection::PasswordTooShort.field(), Some("password"));
        assert_eq!(Rejection::UserNotFound.field(), None);
        assert!(Rejection::IncorrectPassword.is_authentication_failure());
        assert!(!Rejection::NameTooShort.is_authentication_failure());
    }
}
