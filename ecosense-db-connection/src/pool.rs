#[cfg(feature = "mysql")]
use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
#[cfg(feature = "sqlite")]
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

use crate::config::DbConnectionConfig;
use crate::error::DbConnectionError;
use crate::utils::sanitize_database_url;

#[cfg(not(any(feature = "mysql", feature = "sqlite")))]
compile_error!("Enable exactly one of the `mysql` or `sqlite` features for ecosense-db-connection.");

#[cfg(all(feature = "mysql", feature = "sqlite"))]
compile_error!("Activate only one backend feature (`mysql` or `sqlite`) for ecosense-db-connection.");

#[cfg(feature = "mysql")]
pub type DbPool = MySqlPool;
#[cfg(feature = "sqlite")]
pub type DbPool = SqlitePool;

#[cfg(feature = "mysql")]
type DbPoolOptions = MySqlPoolOptions;
#[cfg(feature = "sqlite")]
type DbPoolOptions = SqlitePoolOptions;

/// Creates a new backend-specific connection pool using the provided configuration.
///
/// Attempts and failures are reported through `tracing` with credentials
/// redacted from the URL.
pub async fn create_pool(config: &DbConnectionConfig) -> Result<DbPool, DbConnectionError> {
    let redacted = sanitize_database_url(config.url.trim()).into_owned();
    tracing::debug!(
        database_url = %redacted,
        max_connections = config.max_connections,
        "creating database pool"
    );

    match create_pool_inner(config).await {
        Ok(pool) => {
            tracing::info!(database_url = %redacted, "database pool ready");
            Ok(pool)
        }
        Err(err) => {
            tracing::error!(database_url = %redacted, error = %err, "database pool creation failed");
            Err(err)
        }
    }
}

async fn create_pool_inner(config: &DbConnectionConfig) -> Result<DbPool, DbConnectionError> {
    let url = config.url.trim();
    if url.is_empty() {
        return Err(DbConnectionError::EmptyDatabaseUrl);
    }
    config.validate()?;

    // sqlx refuses to open a missing database file, so create it up front.
    #[cfg(feature = "sqlite")]
    ensure_sqlite_db_file_exists(url)?;

    let mut opts = DbPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(config.connect_timeout())
        .idle_timeout(config.idle_timeout());

    #[cfg(not(feature = "sqlite"))]
    {
        opts = opts.test_before_acquire(config.test_before_acquire);
    }

    opts.connect(url).await.map_err(Into::into)
}

/// Extract the file path from a SQLite connection URL.
/// Returns None for in-memory databases or empty paths.
#[cfg(feature = "sqlite")]
pub(crate) fn sqlite_file_path(url: &str) -> Option<&str> {
    let url_bytes = url.as_bytes();
    for &pattern in SQLITE_MEMORY_PATTERNS {
        if url_bytes
            .windows(pattern.len())
            .any(|w| w.eq_ignore_ascii_case(pattern))
        {
            return None;
        }
    }

    let mut path = url;
    path = path
        .strip_prefix("sqlite://")
        .or_else(|| path.strip_prefix("sqlite:"))
        .unwrap_or(path);
    path = path.strip_prefix("file:").unwrap_or(path);

    if let Some(idx) = path.find('?') {
        path = &path[..idx];
    }

    let path = path.trim();
    if path.is_empty() {
        None
    } else {
        Some(path)
    }
}

#[cfg(feature = "sqlite")]
fn ensure_sqlite_db_file_exists(database_url: &str) -> Result<(), DbConnectionError> {
    use std::fs::{create_dir_all, File};
    use std::io;
    use std::path::Path;

    let Some(clean_path) = sqlite_file_path(database_url) else {
        return Ok(());
    };

    let db_path = Path::new(clean_path);
    if let Some(parent) = db_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty() && !p.exists())
    {
        create_dir_all(parent).map_err(|e| {
            DbConnectionError::FileCreation(format!(
                "failed to create parent directory '{}': {e}",
                parent.display()
            ))
        })?;
    }

    if !db_path.exists() {
        File::create(db_path).map_err(|e| {
            let msg = if e.kind() == io::ErrorKind::PermissionDenied {
                format!("permission denied creating '{}': {e}", db_path.display())
            } else {
                format!("failed to create DB file '{}': {e}", db_path.display())
            };
            DbConnectionError::FileCreation(msg)
        })?;
        tracing::info!(path = %db_path.display(), "created sqlite database file");
    }

    Ok(())
}

#[cfg(feature = "sqlite")]
pub const SQLITE_MEMORY_PATTERNS: &[&[u8]] = &[b":memory:", b"mode=memory"];
