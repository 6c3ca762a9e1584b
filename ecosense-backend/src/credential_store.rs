//! SQL-backed [`CredentialStore`] over the `users` table.

use async_trait::async_trait;
use ecosense_auth::{CredentialRecord, CredentialStore, NewCredential, StoreError};
use ecosense_db::users as db_users;
use ecosense_db::DbPool;

/// Borrowing adapter handed to the authenticator for the length of one request.
#[derive(Debug, Clone, Copy)]
pub struct SqlCredentialStore<'a> {
    pool: &'a DbPool,
}

impl<'a> SqlCredentialStore<'a> {
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }
}

fn unavailable(err: sqlx::Error) -> StoreError {
    StoreError::Unavailable(err.to_string())
}

fn to_record(row: db_users::UsersRow) -> CredentialRecord {
    CredentialRecord {
        user_id: row.id,
        display_name: row.name,
        email: row.email,
        stored_secret: row.password,
    }
}

#[async_trait]
impl<'a> CredentialStore for SqlCredentialStore<'a> {
    async fn find_by_email(&self, email: &str) -> Result<Option<CredentialRecord>, StoreError> {
        let row = db_users::find_by_email(self.pool, email)
            .await
            .map_err(unavailable)?;
        Ok(row.map(to_record))
    }

    async fn email_exists(&self, email: &str) -> Result<bool, StoreError> {
        db_users::email_exists(self.pool, email)
            .await
            .map_err(unavailable)
    }

    async fn insert(&self, new: &NewCredential) -> Result<i64, StoreError> {
        let user = db_users::NewUser {
            name: new.name.clone(),
            surname: new.surname.clone(),
            email: new.email.clone(),
            password: new.stored_secret.clone(),
        };
        db_users::insert(self.pool, &user).await.map_err(|err| {
            if ecosense_db::is_unique_violation(&err) {
                StoreError::DuplicateEmail
            } else {
                unavailable(err)
            }
        })
    }

    async fn update_secret(&self, user_id: i64, stored_secret: &str) -> Result<(), StoreError> {
        let affected = db_users::update_password(self.pool, user_id, stored_secret)
            .await
            .map_err(unavailable)?;
        if affected == 0 {
            return Err(StoreError::MissingRecord(user_id));
        }
        Ok(())
    }
}
