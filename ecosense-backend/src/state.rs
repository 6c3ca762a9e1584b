use std::sync::Arc;

use ecosense_auth::Authenticator;

use crate::credential_store::SqlCredentialStore;

/// Shared application state passed to every route handler.
pub struct AppState {
    pub db_pool: Arc<ecosense_db::DbPool>,
    authenticator: Arc<Authenticator>,
}

impl Clone for AppState {
    fn clone(&self) -> Self {
        Self {
            db_pool: Arc::clone(&self.db_pool),
            authenticator: Arc::clone(&self.authenticator),
        }
    }
}

impl AppState {
    /// Build a fully initialised state container from its constituent parts.
    pub fn new(db_pool: ecosense_db::DbPool, authenticator: Authenticator) -> Self {
        Self {
            db_pool: Arc::new(db_pool),
            authenticator: Arc::new(authenticator),
        }
    }

    pub fn authenticator(&self) -> &Authenticator {
        &self.authenticator
    }

    /// Credential store over this state's pool, handed to each auth call.
    pub fn credential_store(&self) -> SqlCredentialStore<'_> {
        SqlCredentialStore::new(&self.db_pool)
    }
}
