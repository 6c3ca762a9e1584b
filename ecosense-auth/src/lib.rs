//! Credential handling for the Ecosense backend.
//!
//! Provides:
//! - Password hashing with Argon2id
//! - The [`CredentialStore`] seam the HTTP layer implements over SQL
//! - [`Authenticator`], which verifies logins (upgrading legacy plaintext
//!   secrets on the fly) and registers new users
//! - The tagged [`Outcome`] returned by both operations

mod authenticator;
mod outcome;
mod password;
mod store;

pub use authenticator::{
    capitalize_words, normalize_email, Authenticator, MIN_NAME_CHARS, MIN_SECRET_CHARS,
};
pub use outcome::{Outcome, Principal, Rejection};
pub use password::{is_phc_hash, Argon2Hasher, PasswordError};
pub use store::{CredentialRecord, CredentialStore, MemoryCredentialStore, NewCredential, StoreError};
