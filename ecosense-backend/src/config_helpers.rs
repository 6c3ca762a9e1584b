use std::net::{IpAddr, Ipv6Addr, SocketAddr};

use anyhow::bail;
use ecosense_auth::Argon2Hasher;
use ecosense_config::{AuthConfig, Config, ENV_PREFIX};
use ecosense_db::DbConnectionConfig;

/// Database driver this binary was compiled for.
#[cfg(feature = "mysql")]
pub const COMPILED_DRIVER: &str = "mysql";
#[cfg(not(feature = "mysql"))]
pub const COMPILED_DRIVER: &str = "sqlite";

/// Build database connection config from application config.
///
/// `ECOSENSE_DATABASE_URL` (with the `ECOSENSE_DB_*` pool variables) replaces
/// the `database` section entirely when set.
pub fn database_config_from_config(cfg: &Config) -> anyhow::Result<DbConnectionConfig> {
    if std::env::var_os(format!("{ENV_PREFIX}_DATABASE_URL")).is_some() {
        return Ok(DbConnectionConfig::from_env(ENV_PREFIX)?);
    }

    if cfg.database.driver != COMPILED_DRIVER {
        bail!(
            "database.driver is '{}' but this build only supports '{COMPILED_DRIVER}'",
            cfg.database.driver
        );
    }

    let mut db = DbConnectionConfig::new(cfg.database.connection_url()?);
    if let Some(max) = cfg.database.max_connections {
        db.max_connections = max;
        db.min_connections = db.min_connections.min(max);
    }
    Ok(db)
}

/// Argon2id cost parameters for newly hashed secrets.
pub fn hasher_from_config(cfg: &AuthConfig) -> Argon2Hasher {
    Argon2Hasher::new()
        .with_memory_cost(cfg.argon2_memory_kib)
        .with_time_cost(cfg.argon2_iterations)
        .with_parallelism(cfg.argon2_parallelism)
}

/// Parse host:port into a SocketAddr, with fallback to 0.0.0.0.
pub fn parse_bind_address(host: &str, port: u16) -> SocketAddr {
    host.parse::<IpAddr>()
        .map(|ip| SocketAddr::new(ip, port))
        .or_else(|_| host.parse::<SocketAddr>())
        .or_else(|_| host.parse::<Ipv6Addr>().map(|ip| SocketAddr::new(IpAddr::V6(ip), port)))
        .unwrap_or_else(|_| SocketAddr::from(([0, 0, 0, 0], port)))
}
