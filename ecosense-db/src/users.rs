use serde::{Deserialize, Serialize};
use sqlx::Executor;

use crate::{inserted_id, DbBackend};

/// Row of the `users` table. `password` holds either an Argon2 PHC string or,
/// for rows predating hashing, the raw password.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UsersRow {
    pub id: i64,
    pub name: String,
    pub surname: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub surname: String,
    pub email: String,
    pub password: String,
}

pub async fn find_by_id<'e, E>(executor: E, id: i64) -> Result<Option<UsersRow>, sqlx::Error>
where
    E: Executor<'e, Database = DbBackend>,
{
    sqlx::query_as("SELECT id, name, surname, email, password FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(executor)
        .await
}

pub async fn find_by_email<'e, E>(
    executor: E,
    email: &str,
) -> Result<Option<UsersRow>, sqlx::Error>
where
    E: Executor<'e, Database = DbBackend>,
{
    sqlx::query_as("SELECT id, name, surname, email, password FROM users WHERE email = ?")
        .bind(email)
        .fetch_optional(executor)
        .await
}

pub async fn email_exists<'e, E>(executor: E, email: &str) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = DbBackend>,
{
    let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM users WHERE email = ? LIMIT 1")
        .bind(email)
        .fetch_optional(executor)
        .await?;
    Ok(found.is_some())
}

pub async fn list<'e, E>(executor: E) -> Result<Vec<UsersRow>, sqlx::Error>
where
    E: Executor<'e, Database = DbBackend>,
{
    sqlx::query_as("SELECT id, name, surname, email, password FROM users ORDER BY id")
        .fetch_all(executor)
        .await
}

/// Insert a user and return the generated id.
pub async fn insert<'e, E>(executor: E, user: &NewUser) -> Result<i64, sqlx::Error>
where
    E: Executor<'e, Database = DbBackend>,
{
    let result =
        sqlx::query("INSERT INTO users (name, surname, email, password) VALUES (?, ?, ?, ?)")
            .bind(&user.name)
            .bind(&user.surname)
            .bind(&user.email)
            .bind(&user.password)
            .execute(executor)
            .await?;
    Ok(inserted_id(&result))
}

/// Replace the stored password of one user. Returns the number of rows touched.
pub async fn update_password<'e, E>(
    executor: E,
    id: i64,
    password: &str,
) -> Result<u64, sqlx::Error>
where
    E: Executor<'e, Database = DbBackend>,
{
    let result = sqlx::query("UPDATE users SET password = ? WHERE id = ?")
        .bind(password)
        .bind(id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}

pub async fn delete_by_id<'e, E>(executor: E, id: i64) -> Result<u64, sqlx::Error>
where
    E: Executor<'e, Database = DbBackend>,
{
    let result = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}
