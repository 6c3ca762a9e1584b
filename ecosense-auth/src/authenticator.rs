use std::sync::atomic::{AtomicU64, Ordering};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::outcome::{Outcome, Principal, Rejection};
use crate::password::{Argon2Hasher, PasswordError};
use crate::store::{CredentialRecord, CredentialStore, NewCredential, StoreError};

/// Minimum length of a name or surname, counted after trimming.
pub const MIN_NAME_CHARS: usize = 2;
/// Minimum length of a raw secret at registration.
pub const MIN_SECRET_CHARS: usize = 6;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap());

/// Trimmed, lowercased form used as the uniqueness and lookup key.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Capitalize the first letter of each word and lowercase the rest.
pub fn capitalize_words(value: &str) -> String {
    value
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Login verification and registration over an injected [`CredentialStore`].
///
/// Holds no store of its own: every call receives the store handle it should
/// use. Legacy plaintext secrets are rewritten as Argon2 hashes on the first
/// successful login; failures of that rewrite are counted and never block the
/// login.
#[derive(Debug, Default)]
pub struct Authenticator {
    hasher: Argon2Hasher,
    migrated: AtomicU64,
    migration_failures: AtomicU64,
}

impl Authenticator {
    pub fn new(hasher: Argon2Hasher) -> Self {
        Self {
            hasher,
            migrated: AtomicU64::new(0),
            migration_failures: AtomicU64::new(0),
        }
    }

    pub fn hasher(&self) -> &Argon2Hasher {
        &self.hasher
    }

    /// Legacy secrets successfully rewritten as hashes.
    pub fn migrated_count(&self) -> u64 {
        self.migrated.load(Ordering::Relaxed)
    }

    /// Legacy logins whose hash rewrite could not be persisted.
    pub fn migration_failures(&self) -> u64 {
        self.migration_failures.load(Ordering::Relaxed)
    }

    /// Check a login attempt, upgrading a matching legacy plaintext secret.
    pub async fn verify_and_migrate<S>(&self, store: &S, email: &str, candidate: &str) -> Outcome
    where
        S: CredentialStore + ?Sized,
    {
        let email = normalize_email(email);
        if email.is_empty() || candidate.is_empty() {
            return Outcome::Rejected(Rejection::MissingCredentials);
        }

        let record = match store.find_by_email(&email).await {
            Ok(Some(record)) => record,
            Ok(None) => {
                tracing::debug!(email = %email, "login for unknown email");
                return Outcome::Rejected(Rejection::UserNotFound);
            }
            Err(err) => {
                tracing::error!(error = %err, "credential lookup failed");
                return Outcome::SystemError(err.to_string());
            }
        };

        match self.verify_off_thread(candidate, &record.stored_secret).await {
            Ok(()) => Outcome::Accepted(principal_of(&record)),
            Err(PasswordError::HashingFailed(detail)) => {
                tracing::error!(error = %detail, "password verification task failed");
                Outcome::SystemError(detail)
            }
            Err(PasswordError::InvalidHashFormat)
                if candidate.as_bytes() == record.stored_secret.as_bytes() =>
            {
                self.migrate_legacy(store, &record, candidate).await;
                Outcome::Accepted(principal_of(&record))
            }
            Err(_) => {
                tracing::debug!(user_id = record.user_id, "login with incorrect password");
                Outcome::Rejected(Rejection::IncorrectPassword)
            }
        }
    }

    /// Validate and create a new credential with a freshly hashed secret.
    pub async fn register<S>(
        &self,
        store: &S,
        name: &str,
        surname: &str,
        email: &str,
        raw_secret: &str,
    ) -> Outcome
    where
        S: CredentialStore + ?Sized,
    {
        let email = normalize_email(email);
        if !EMAIL_RE.is_match(&email) {
            return Outcome::Rejected(Rejection::InvalidEmail);
        }
        let name = name.trim();
        if name.chars().count() < MIN_NAME_CHARS {
            return Outcome::Rejected(Rejection::NameTooShort);
        }
        let surname = surname.trim();
        if surname.chars().count() < MIN_NAME_CHARS {
            return Outcome::Rejected(Rejection::SurnameTooShort);
        }
        if raw_secret.chars().count() < MIN_SECRET_CHARS {
            return Outcome::Rejected(Rejection::PasswordTooShort);
        }

        match store.email_exists(&email).await {
            Ok(true) => return Outcome::Rejected(Rejection::EmailAlreadyRegistered),
            Ok(false) => {}
            Err(err) => {
                tracing::error!(error = %err, "email lookup failed during registration");
                return Outcome::SystemError(err.to_string());
            }
        }

        let stored_secret = match self.hash_off_thread(raw_secret).await {
            Ok(hash) => hash,
            Err(err) => {
                tracing::error!(error = %err, "hashing new secret failed");
                return Outcome::SystemError(err.to_string());
            }
        };

        let new = NewCredential {
            name: capitalize_words(name),
            surname: capitalize_words(surname),
            email,
            stored_secret,
        };

        match store.insert(&new).await {
            Ok(user_id) => {
                tracing::info!(user_id, "registered user");
                Outcome::Accepted(Principal {
                    user_id,
                    name: new.name,
                    email: new.email,
                })
            }
            Err(StoreError::DuplicateEmail) => Outcome::Rejected(Rejection::EmailAlreadyRegistered),
            Err(err) => {
                tracing::error!(error = %err, "inserting credential failed");
                Outcome::SystemError(err.to_string())
            }
        }
    }

    async fn migrate_legacy<S>(&self, store: &S, record: &CredentialRecord, candidate: &str)
    where
        S: CredentialStore + ?Sized,
    {
        let result = match self.hash_off_thread(candidate).await {
            Ok(hash) => store
                .update_secret(record.user_id, &hash)
                .await
                .map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };

        match result {
            Ok(()) => {
                self.migrated.fetch_add(1, Ordering::Relaxed);
                tracing::info!(user_id = record.user_id, "migrated legacy plaintext secret");
            }
            Err(error) => {
                let failures = self.migration_failures.fetch_add(1, Ordering::Relaxed) + 1;
                tracing::warn!(
                    user_id = record.user_id,
                    error = %error,
                    failures,
                    "legacy secret migration failed; login allowed"
                );
            }
        }
    }

    /// Argon2 work runs on the blocking pool, off the async workers.
    async fn hash_off_thread(&self, secret: &str) -> Result<String, PasswordError> {
        let hasher = self.hasher.clone();
        let secret = secret.to_owned();
        tokio::task::spawn_blocking(move || hasher.hash(&secret))
            .await
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))?
    }

    async fn verify_off_thread(&self, secret: &str, stored: &str) -> Result<(), PasswordError> {
        let hasher = self.hasher.clone();
        let (secret, stored) = (secret.to_owned(), stored.to_owned());
        tokio::task::spawn_blocking(move || hasher.verify(&secret, &stored))
            .await
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))?
    }
}

fn principal_of(record: &CredentialRecord) -> Principal {
    Principal {
        user_id: record.user_id,
        name: record.display_name.clone(),
        email: record.email.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::password::is_phc_hash;
    use crate::store::MemoryCredentialStore;

    fn authenticator() -> Authenticator {
        Authenticator::new(Argon2Hasher::new().with_memory_cost(1024).with_time_cost(1))
    }

    #[tokio::test]
    async fn hashed_record_accepts_correct_and_rejects_wrong() {
        let auth = authenticator();
        let store = MemoryCredentialStore::new();
        let hash = auth.hasher().hash("correct horse").unwrap();
        let id = store.seed("Jo", "jo@x.com", &hash);

        let ok = auth.verify_and_migrate(&store, "jo@x.com", "correct horse").await;
        assert_eq!(
            ok,
            Outcome::Accepted(Principal {
                user_id: id,
                name: "Jo".into(),
                email: "jo@x.com".into(),
            })
        );

        let bad = auth.verify_and_migrate(&store, "jo@x.com", "wrong").await;
        assert_eq!(bad, Outcome::Rejected(Rejection::IncorrectPassword));
        assert_eq!(store.secret_updates(), 0);
    }

    #[tokio::test]
    async fn legacy_plaintext_is_migrated_on_login() {
        let auth = authenticator();
        let store = MemoryCredentialStore::new();
        store.seed("Ana", "ana@x.com", "abc123");

        let outcome = auth.verify_and_migrate(&store, "ana@x.com", "abc123").await;
        assert!(outcome.is_accepted());

        let stored = store.get("ana@x.com").unwrap().stored_secret;
        assert_ne!(stored, "abc123");
        assert!(is_phc_hash(&stored));
        assert_eq!(auth.migrated_count(), 1);
        assert_eq!(store.secret_updates(), 1);
    }

    #[tokio::test]
    async fn dollar_prefixed_legacy_secret_is_migrated() {
        let auth = authenticator();
        let store = MemoryCredentialStore::new();
        for (i, secret) in ["$abc123", "$pass$word", "$money$2024"].into_iter().enumerate() {
            let email = format!("user{i}@x.com");
            store.seed("Ana", &email, secret);

            let outcome = auth.verify_and_migrate(&store, &email, secret).await;
            assert!(outcome.is_accepted(), "{secret:?}: {outcome:?}");
            let stored = store.get(&email).unwrap().stored_secret;
            assert!(is_phc_hash(&stored));
            assert!(auth.hasher().verify(secret, &stored).is_ok());
        }
        assert_eq!(auth.migrated_count(), 3);
    }

    #[tokio::test]
    async fn concurrent_logins_share_the_blocking_pool() {
        let auth = std::sync::Arc::new(authenticator());
        let store = std::sync::Arc::new(MemoryCredentialStore::new());
        let hash = auth.hasher().hash("abc123").unwrap();
        store.seed("Jo", "jo@x.com", &hash);

        let tasks: Vec<_> = (0..4)
            .map(|_| {
                let (auth, store) = (auth.clone(), store.clone());
                tokio::spawn(async move {
                    auth.verify_and_migrate(&*store, "jo@x.com", "abc123").await
                })
            })
            .collect();
        for task in tasks {
            assert!(task.await.unwrap().is_accepted());
        }
    }

    #[tokio::test]
    async fn second_login_after_migration_uses_hash_path() {
        let auth = authenticator();
        let store = MemoryCredentialStore::new();
        store.seed("Ana", "ana@x.com", "abc123");

        assert!(auth.verify_and_migrate(&store, "ana@x.com", "abc123").await.is_accepted());
        let migrated = store.get("ana@x.com").unwrap().stored_secret;

        assert!(auth.verify_and_migrate(&store, "ana@x.com", "abc123").await.is_accepted());
        assert_eq!(store.secret_updates(), 1);
        assert_eq!(store.get("ana@x.com").unwrap().stored_secret, migrated);
    }

    #[tokio::test]
    async fn legacy_mismatch_is_rejected_without_write() {
        let auth = authenticator();
        let store = MemoryCredentialStore::new();
        store.seed("Ana", "ana@x.com", "abc123");

        let outcome = auth.verify_and_migrate(&store, "ana@x.com", "abc124").await;
        assert_eq!(outcome, Outcome::Rejected(Rejection::IncorrectPassword));
        assert_eq!(store.get("ana@x.com").unwrap().stored_secret, "abc123");
    }

    #[tokio::test]
    async fn hash_string_itself_is_not_a_password() {
        let auth = authenticator();
        let store = MemoryCredentialStore::new();
        let hash = auth.hasher().hash("abc123").unwrap();
        store.seed("Jo", "jo@x.com", &hash);

        let outcome = auth.verify_and_migrate(&store, "jo@x.com", &hash).await;
        assert_eq!(outcome, Outcome::Rejected(Rejection::IncorrectPassword));
    }

    #[tokio::test]
    async fn unknown_email_is_reported() {
        let auth = authenticator();
        let store = MemoryCredentialStore::new();
        let outcome = auth.verify_and_migrate(&store, "missing@x.com", "anything").await;
        assert_eq!(outcome, Outcome::Rejected(Rejection::UserNotFound));
    }

    #[tokio::test]
    async fn empty_inputs_skip_the_store() {
        let auth = authenticator();
        let store = MemoryCredentialStore::new();
        store.fail_reads(true);

        for (email, secret) in [("", "abc123"), ("jo@x.com", ""), ("   ", "abc123")] {
            assert_eq!(
                auth.verify_and_migrate(&store, email, secret).await,
                Outcome::Rejected(Rejection::MissingCredentials)
            );
        }
    }

    #[tokio::test]
    async fn lookup_is_case_insensitive() {
        let auth = authenticator();
        let store = MemoryCredentialStore::new();
        store.seed("Ana", "ana@x.com", "abc123");

        let outcome = auth.verify_and_migrate(&store, "  ANA@x.com ", "abc123").await;
        assert!(outcome.is_accepted());
    }

    #[tokio::test]
    async fn failed_migration_still_logs_in() {
        let auth = authenticator();
        let store = MemoryCredentialStore::new();
        store.seed("Ana", "ana@x.com", "abc123");
        store.fail_writes(true);

        let outcome = auth.verify_and_migrate(&store, "ana@x.com", "abc123").await;
        assert!(outcome.is_accepted());
        assert_eq!(auth.migration_failures(), 1);
        assert_eq!(auth.migrated_count(), 0);
        assert_eq!(store.get("ana@x.com").unwrap().stored_secret, "abc123");
    }

    #[tokio::test]
    async fn lookup_failure_is_a_system_error() {
        let auth = authenticator();
        let store = MemoryCredentialStore::new();
        store.fail_reads(true);

        let outcome = auth.verify_and_migrate(&store, "ana@x.com", "abc123").await;
        assert!(matches!(outcome, Outcome::SystemError(_)));
    }

    #[tokio::test]
    async fn register_normalizes_email_and_names() {
        let auth = authenticator();
        let store = MemoryCredentialStore::new();

        let outcome = auth.register(&store, "jo", "doe", "JO@X.COM", "secret1").await;
        let principal = outcome.principal().cloned().expect("accepted");
        assert_eq!(principal.email, "jo@x.com");
        assert_eq!(principal.name, "Jo");

        let record = store.get("jo@x.com").expect("stored");
        assert_eq!(record.display_name, "Jo");
        assert_eq!(store.surname_of("jo@x.com").as_deref(), Some("Doe"));
        assert!(auth.hasher().verify("secret1", &record.stored_secret).is_ok());
    }

    #[tokio::test]
    async fn short_secret_is_rejected_without_mutation() {
        let auth = authenticator();
        let store = MemoryCredentialStore::new();
        let outcome = auth.register(&store, "jo", "doe", "jo@x.com", "short").await;
        assert_eq!(outcome, Outcome::Rejected(Rejection::PasswordTooShort));
        assert!(store.is_empty());
        assert_eq!(store.inserts(), 0);
    }

    #[tokio::test]
    async fn validation_order_and_reasons() {
        let auth = authenticator();
        let store = MemoryCredentialStore::new();
        store.fail_reads(true);

        let cases = [
            (("jo", "doe", "not-an-email", "secret1"), Rejection::InvalidEmail),
            (("j", "d", "bad", "x"), Rejection::InvalidEmail),
            ((" j ", "doe", "jo@x.com", "secret1"), Rejection::NameTooShort),
            (("jo", "d", "jo@x.com", "x"), Rejection::SurnameTooShort),
            (("jo", "doe", "jo@x.com", "12345"), Rejection::PasswordTooShort),
        ];
        for ((name, surname, email, secret), expected) in cases {
            assert_eq!(
                auth.register(&store, name, surname, email, secret).await,
                Outcome::Rejected(expected),
                "register({name:?}, {surname:?}, {email:?})"
            );
        }
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let auth = authenticator();
        let store = MemoryCredentialStore::new();

        assert!(auth.register(&store, "jo", "doe", "jo@x.com", "secret1").await.is_accepted());
        let second = auth.register(&store, "Jane", "Roe", " Jo@X.com", "secret2").await;
        assert_eq!(second, Outcome::Rejected(Rejection::EmailAlreadyRegistered));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn capitalize_each_word() {
        assert_eq!(capitalize_words("mARIA  jose"), "Maria Jose");
        assert_eq!(capitalize_words("jo"), "Jo");
        assert_eq!(capitalize_words("élodie"), "Élodie");
    }
}
