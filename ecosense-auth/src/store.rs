use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use thiserror::Error;

/// A stored login credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialRecord {
    pub user_id: i64,
    pub display_name: String,
    pub email: String,
    /// Either an Argon2 PHC string or a legacy plaintext secret.
    pub stored_secret: String,
}

/// Values for a credential about to be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCredential {
    pub name: String,
    pub surname: String,
    pub email: String,
    pub stored_secret: String,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("email already registered")]
    DuplicateEmail,
    #[error("no credential with id {0}")]
    MissingRecord(i64),
    #[error("credential store unavailable: {0}")]
    Unavailable(String),
}

/// Persistence seam for credentials. Emails are passed already normalized.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<CredentialRecord>, StoreError>;

    async fn email_exists(&self, email: &str) -> Result<bool, StoreError>;

    /// Create a record, returning its id. A unique-email conflict must be
    /// reported as [`StoreError::DuplicateEmail`].
    async fn insert(&self, new: &NewCredential) -> Result<i64, StoreError>;

    async fn update_secret(&self, user_id: i64, stored_secret: &str) -> Result<(), StoreError>;
}

#[derive(Debug, Clone)]
struct MemoryEntry {
    record: CredentialRecord,
    surname: String,
}

/// In-process [`CredentialStore`] for tests and tooling.
///
/// Reads and writes can be made to fail independently to exercise error paths.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    entries: Mutex<Vec<MemoryEntry>>,
    next_id: AtomicU64,
    secret_updates: AtomicU64,
    inserts: AtomicU64,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record with an arbitrary stored secret, bypassing hashing.
    pub fn seed(&self, display_name: &str, email: &str, stored_secret: &str) -> i64 {
        let user_id = self.allocate_id();
        self.lock().push(MemoryEntry {
            record: CredentialRecord {
                user_id,
                display_name: display_name.to_owned(),
                email: email.to_owned(),
                stored_secret: stored_secret.to_owned(),
            },
            surname: String::new(),
        });
        user_id
    }

    pub fn get(&self, email: &str) -> Option<CredentialRecord> {
        self.lock()
            .iter()
            .find(|e| e.record.email == email)
            .map(|e| e.record.clone())
    }

    pub fn surname_of(&self, email: &str) -> Option<String> {
        self.lock()
            .iter()
            .find(|e| e.record.email == email)
            .map(|e| e.surname.clone())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of successful `update_secret` calls.
    pub fn secret_updates(&self) -> u64 {
        self.secret_updates.load(Ordering::Relaxed)
    }

    /// Number of successful `insert` calls.
    pub fn inserts(&self) -> u64 {
        self.inserts.load(Ordering::Relaxed)
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::Relaxed);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::Relaxed);
    }

    fn allocate_id(&self) -> i64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        i64::try_from(id).unwrap_or(i64::MAX)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<MemoryEntry>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn check_reads(&self) -> Result<(), StoreError> {
        if self.fail_reads.load(Ordering::Relaxed) {
            return Err(StoreError::Unavailable("reads disabled".to_owned()));
        }
        Ok(())
    }

    fn check_writes(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::Relaxed) {
            return Err(StoreError::Unavailable("writes disabled".to_owned()));
        }
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<CredentialRecord>, StoreError> {
        self.check_reads()?;
        Ok(self.get(email))
    }

    async fn email_exists(&self, email: &str) -> Result<bool, StoreError> {
        self.check_reads()?;
        Ok(self.lock().iter().any(|e| e.record.email == email))
    }

    async fn insert(&self, new: &NewCredential) -> Result<i64, StoreError> {
        self.check_writes()?;
        let mut entries = self.lock();
        if entries.iter().any(|e| e.record.email == new.email) {
            return Err(StoreError::DuplicateEmail);
        }
        let user_id = self.allocate_id();
        entries.push(MemoryEntry {
            record: CredentialRecord {
                user_id,
                display_name: new.name.clone(),
                email: new.email.clone(),
                stored_secret: new.stored_secret.clone(),
            },
            surname: new.surname.clone(),
        });
        self.inserts.fetch_add(1, Ordering::Relaxed);
        Ok(user_id)
    }

    async fn update_secret(&self, user_id: i64, stored_secret: &str) -> Result<(), StoreError> {
        self.check_writes()?;
        let mut entries = self.lock();
        let entry = entries
            .iter_mut()
            .find(|e| e.record.user_id == user_id)
            .ok_or(StoreError::MissingRecord(user_id))?;
        entry.record.stored_secret = stored_secret.to_owned();
        self.secret_updates.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
