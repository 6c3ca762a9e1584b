use sqlx::migrate::Migrator;

pub static SQLITE_MIGRATOR: Migrator = sqlx_macros::migrate!("src/migrations_sqlite");
pub static MYSQL_MIGRATOR: Migrator = sqlx_macros::migrate!("src/migrations_mysql");

pub fn sqlite_migrator() -> &'static Migrator {
    &SQLITE_MIGRATOR
}

pub fn mysql_migrator() -> &'static Migrator {
    &MYSQL_MIGRATOR
}

/// Migrator matching the backend this workspace was compiled for.
#[cfg(feature = "mysql")]
pub fn migrator() -> &'static Migrator {
    mysql_migrator()
}

/// Migrator matching the backend this workspace was compiled for.
#[cfg(not(feature = "mysql"))]
pub fn migrator() -> &'static Migrator {
    sqlite_migrator()
}
