#[cfg(not(any(feature = "mysql", feature = "sqlite")))]
compile_error!("Enable exactly one of the `mysql` or `sqlite` features for ecosense-db.");

#[cfg(all(feature = "mysql", feature = "sqlite"))]
compile_error!("Activate only one backend feature (`mysql` or `sqlite`) for ecosense-db.");

#[cfg(feature = "mysql")]
pub type DbBackend = sqlx::MySql;
#[cfg(feature = "sqlite")]
pub type DbBackend = sqlx::Sqlite;

/// Result of an `execute` call on the selected backend.
pub type DbQueryResult = <DbBackend as sqlx::Database>::QueryResult;

pub mod alerts;
pub mod plants;
pub mod readings;
pub mod sensors;
pub mod users;

pub use ecosense_db_connection::{create_pool, DbConnectionConfig, DbConnectionError, DbPool};

/// Primary key assigned by the database to the row just inserted.
#[cfg(feature = "sqlite")]
#[inline]
pub fn inserted_id(result: &DbQueryResult) -> i64 {
    result.last_insert_rowid()
}

/// Primary key assigned by the database to the row just inserted.
#[cfg(feature = "mysql")]
#[inline]
pub fn inserted_id(result: &DbQueryResult) -> i64 {
    result.last_insert_id() as i64
}

/// True when the error is a UNIQUE constraint violation.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => db.is_unique_violation(),
        _ => false,
    }
}
