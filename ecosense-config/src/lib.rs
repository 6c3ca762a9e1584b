use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

/// Pre-compiled regex for hostname validation (compiled once at first use)
static HOSTNAME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9][-a-zA-Z0-9\.]*[a-zA-Z0-9]$").unwrap());

/// Environment variable prefix shared by every override.
pub const ENV_PREFIX: &str = "ECOSENSE";

#[derive(Debug, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub database: Option<DatabaseSection>,
    #[serde(default)]
    pub server: Option<ServerSection>,
    #[serde(default)]
    pub logging: Option<LoggingSection>,
    #[serde(default)]
    pub cors: Option<CorsSection>,
    #[serde(default)]
    pub static_files: Option<StaticFilesSection>,
    #[serde(default)]
    pub auth: Option<AuthSection>,
}

#[derive(Debug, Deserialize)]
pub struct LoggingSection {
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub json: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct ServerSection {
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
}

#[derive(Debug, Deserialize)]
pub struct CorsSection {
    #[serde(default)]
    pub allowed_origins: Option<Vec<String>>,
    #[serde(default)]
    pub allow_all_origins: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct DatabaseSection {
    pub driver: String,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub database: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub max_connections: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct StaticFilesSection {
    #[serde(default)]
    pub directory: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AuthSection {
    #[serde(default)]
    pub argon2_memory_kib: Option<u32>,
    #[serde(default)]
    pub argon2_iterations: Option<u32>,
    #[serde(default)]
    pub argon2_parallelism: Option<u32>,
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Load a RawConfigFile from a path. The format is inferred from the extension: .toml, .yaml/.yml, .json
pub fn load_raw_from_file<P: AsRef<Path>>(path: P) -> Result<RawConfigFile, ConfigError> {
    let path = path.as_ref();
    let s = fs::read_to_string(path)?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_ascii_lowercase());
    parse_config_str(&s, ext.as_deref())
}

#[inline]
fn parse_config_str(s: &str, ext: Option<&str>) -> Result<RawConfigFile, ConfigError> {
    match ext {
        #[cfg(feature = "toml")]
        Some("toml") => toml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string())),
        #[cfg(feature = "yaml")]
        Some("yaml" | "yml") => {
            serde_yaml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))
        }
        #[cfg(feature = "json")]
        Some("json") => serde_json::from_str(s).map_err(|e| ConfigError::Parse(e.to_string())),
        _ => parse_config_auto(s),
    }
}

/// Try each enabled format in turn.
#[inline]
fn parse_config_auto(s: &str) -> Result<RawConfigFile, ConfigError> {
    #[cfg(feature = "yaml")]
    if let Ok(cfg) = serde_yaml::from_str(s) {
        return Ok(cfg);
    }

    #[cfg(feature = "toml")]
    if let Ok(cfg) = toml::from_str(s) {
        return Ok(cfg);
    }

    #[cfg(feature = "json")]
    if let Ok(cfg) = serde_json::from_str(s) {
        return Ok(cfg);
    }

    #[cfg(any(feature = "yaml", feature = "toml", feature = "json"))]
    {
        Err(ConfigError::Parse(
            "failed to parse config as any supported format".into(),
        ))
    }

    #[cfg(not(any(feature = "yaml", feature = "toml", feature = "json")))]
    {
        let _ = s;
        Err(ConfigError::Parse("no config format enabled".into()))
    }
}

/// Concrete application configuration with defaults.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub cors: CorsConfig,
    pub database: DatabaseConfig,
    pub static_files: StaticFilesConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allow_all_origins: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatabaseConfig {
    pub driver: String,
    pub path: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub database: Option<String>,
    pub username: Option<String>,
    #[serde(skip_serializing)]
    pub password: Option<String>,
    pub max_connections: Option<u32>,
}

impl DatabaseConfig {
    /// Build the sqlx connection URL for the configured driver.
    ///
    /// SQLite uses `path` (default `ecosense.sqlite`); MySQL requires `host` and
    /// `database` and defaults the port to 3306.
    pub fn connection_url(&self) -> Result<String, ConfigError> {
        match self.driver.as_str() {
            "sqlite" => {
                let path = self.path.as_deref().unwrap_or("ecosense.sqlite");
                if path.starts_with("sqlite:") {
                    Ok(path.to_string())
                } else {
                    Ok(format!("sqlite://{path}"))
                }
            }
            "mysql" => {
                let host = self.host.as_deref().filter(|h| !h.is_empty()).ok_or_else(|| {
                    ConfigError::Validation("database.host must be set for mysql".into())
                })?;
                let database = self
                    .database
                    .as_deref()
                    .filter(|d| !d.is_empty())
                    .ok_or_else(|| {
                        ConfigError::Validation("database.database must be set for mysql".into())
                    })?;
                let port = self.port.unwrap_or(3306);
                let credentials = match (&self.username, &self.password) {
                    (Some(user), Some(pass)) => format!("{user}:{pass}@"),
                    (Some(user), None) => format!("{user}@"),
                    _ => String::new(),
                };
                Ok(format!("mysql://{credentials}{host}:{port}/{database}"))
            }
            other => Err(ConfigError::Validation(format!(
                "unsupported database driver: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StaticFilesConfig {
    pub directory: String,
}

/// Argon2id cost parameters used when hashing new secrets.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthConfig {
    pub argon2_memory_kib: u32,
    pub argon2_iterations: u32,
    pub argon2_parallelism: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8000,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                json: false,
            },
            cors: CorsConfig {
                allowed_origins: Vec::new(),
                allow_all_origins: true,
            },
            database: DatabaseConfig {
                driver: "sqlite".to_string(),
                path: Some("ecosense.sqlite".to_string()),
                host: None,
                port: None,
                database: None,
                username: None,
                password: None,
                max_connections: None,
            },
            static_files: StaticFilesConfig {
                directory: "./static".to_string(),
            },
            auth: AuthConfig {
                argon2_memory_kib: 19456,
                argon2_iterations: 2,
                argon2_parallelism: 1,
            },
        }
    }
}

#[inline]
fn parse_bool(s: &str) -> Result<bool, ()> {
    let bytes = s.as_bytes();
    match bytes {
        b"1" | b"true" | b"TRUE" | b"True" | b"yes" | b"YES" | b"Yes" | b"y" | b"Y" => Ok(true),
        b"0" | b"false" | b"FALSE" | b"False" | b"no" | b"NO" | b"No" | b"n" | b"N" => Ok(false),
        _ => match s.to_ascii_lowercase().as_str() {
            "true" | "yes" | "y" => Ok(true),
            "false" | "no" | "n" => Ok(false),
            _ => Err(()),
        },
    }
}

#[inline]
fn split_csv(s: &str) -> Vec<String> {
    s.split(',')
        .filter_map(|p| {
            let trimmed = p.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        })
        .collect()
}

/// Helper macro to apply optional value if present
macro_rules! apply_opt {
    ($target:expr, $source:expr) => {
        if let Some(v) = $source {
            $target = v;
        }
    };
}

/// Helper macro to apply option field directly if it has a value
macro_rules! apply_opt_field {
    ($target:expr, $source:expr) => {
        if $source.is_some() {
            $target = $source;
        }
    };
}

/// Load concrete `Config` from optional file and environment variables.
/// Environment variables take precedence over file values and defaults.
pub fn load_config<P: AsRef<Path>>(path: Option<P>) -> Result<Config, ConfigError> {
    let mut cfg = Config::default();

    if let Some(p) = path {
        let raw = load_raw_from_file(p)?;
        if let Some(server) = raw.server {
            apply_opt!(cfg.server.host, server.host);
            apply_opt!(cfg.server.port, server.port);
        }
        if let Some(logging) = raw.logging {
            apply_opt!(cfg.logging.level, logging.level);
            apply_opt!(cfg.logging.json, logging.json);
        }
        if let Some(cors) = raw.cors {
            apply_opt!(cfg.cors.allowed_origins, cors.allowed_origins);
            apply_opt!(cfg.cors.allow_all_origins, cors.allow_all_origins);
        }
        if let Some(db) = raw.database {
            cfg.database.driver = db.driver;
            apply_opt_field!(cfg.database.path, db.path);
            apply_opt_field!(cfg.database.host, db.host);
            apply_opt_field!(cfg.database.port, db.port);
            apply_opt_field!(cfg.database.database, db.database);
            apply_opt_field!(cfg.database.username, db.username);
            apply_opt_field!(cfg.database.password, db.password);
            apply_opt_field!(cfg.database.max_connections, db.max_connections);
        }
        if let Some(static_files) = raw.static_files {
            apply_opt!(cfg.static_files.directory, static_files.directory);
        }
        if let Some(auth) = raw.auth {
            apply_opt!(cfg.auth.argon2_memory_kib, auth.argon2_memory_kib);
            apply_opt!(cfg.auth.argon2_iterations, auth.argon2_iterations);
            apply_opt!(cfg.auth.argon2_parallelism, auth.argon2_parallelism);
        }
    }

    apply_env_overrides(&mut cfg)?;

    Ok(cfg)
}

#[inline]
fn env_parse<T: std::str::FromStr>(key: &str) -> Result<Option<T>, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(v) => v
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::Parse(format!("invalid {}: {}", key, e))),
        Err(_) => Ok(None),
    }
}

#[inline]
fn env_bool(key: &str) -> Result<Option<bool>, ConfigError> {
    match env::var(key) {
        Ok(v) => parse_bool(&v)
            .map(Some)
            .map_err(|_| ConfigError::Parse(format!("invalid {}", key))),
        Err(_) => Ok(None),
    }
}

#[inline]
fn env_str(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn apply_env_overrides(cfg: &mut Config) -> Result<(), ConfigError> {
    // Server
    if let Some(v) = env_str("ECOSENSE_SERVER_HOST") {
        cfg.server.host = v;
    }
    if let Some(v) = env_parse::<u16>("ECOSENSE_SERVER_PORT")? {
        cfg.server.port = v;
    }

    // Logging
    if let Some(v) = env_str("ECOSENSE_LOG_LEVEL") {
        cfg.logging.level = v;
    }
    if let Some(v) = env_bool("ECOSENSE_LOG_JSON")? {
        cfg.logging.json = v;
    }

    // CORS
    if let Some(v) = env_str("ECOSENSE_CORS_ALLOWED_ORIGINS") {
        cfg.cors.allowed_origins = split_csv(&v);
    }
    if let Some(v) = env_bool("ECOSENSE_CORS_ALLOW_ALL_ORIGINS")? {
        cfg.cors.allow_all_origins = v;
    }

    // Database
    if let Some(v) = env_str("ECOSENSE_DATABASE_DRIVER") {
        cfg.database.driver = v;
    }
    if let Some(v) = env_str("ECOSENSE_DATABASE_PATH") {
        cfg.database.path = Some(v);
    }
    if let Some(v) = env_str("ECOSENSE_DATABASE_HOST") {
        cfg.database.host = Some(v);
    }
    if let Some(v) = env_parse::<u16>("ECOSENSE_DATABASE_PORT")? {
        cfg.database.port = Some(v);
    }
    if let Some(v) = env_str("ECOSENSE_DATABASE_NAME") {
        cfg.database.database = Some(v);
    }
    if let Some(v) = env_str("ECOSENSE_DATABASE_USERNAME") {
        cfg.database.username = Some(v);
    }
    if let Some(v) = env_str("ECOSENSE_DATABASE_PASSWORD") {
        cfg.database.password = Some(v);
    }
    if let Some(v) = env_parse::<u32>("ECOSENSE_DATABASE_MAX_CONNECTIONS")? {
        cfg.database.max_connections = Some(v);
    }

    // Static files
    if let Some(v) = env_str("ECOSENSE_STATIC_DIRECTORY") {
        cfg.static_files.directory = v;
    }

    // Auth
    if let Some(v) = env_parse::<u32>("ECOSENSE_ARGON2_MEMORY_KIB")? {
        cfg.auth.argon2_memory_kib = v;
    }
    if let Some(v) = env_parse::<u32>("ECOSENSE_ARGON2_ITERATIONS")? {
        cfg.auth.argon2_iterations = v;
    }
    if let Some(v) = env_parse::<u32>("ECOSENSE_ARGON2_PARALLELISM")? {
        cfg.auth.argon2_parallelism = v;
    }

    Ok(())
}

/// Validate higher-level constraints on the resolved configuration.
pub fn validate_config(cfg: &Config) -> Result<(), ConfigError> {
    if cfg.server.port == 0 {
        return Err(ConfigError::Validation("server.port must be > 0".into()));
    }
    let host_ok = cfg.server.host.parse::<std::net::IpAddr>().is_ok()
        || HOSTNAME_REGEX.is_match(&cfg.server.host);
    if !host_ok {
        return Err(ConfigError::Validation(format!(
            "invalid server.host: {}",
            cfg.server.host
        )));
    }

    // Also rejects unknown drivers and mysql without host/database.
    cfg.database.connection_url()?;

    if cfg.database.max_connections == Some(0) {
        return Err(ConfigError::Validation(
            "database.max_connections must be > 0".into(),
        ));
    }

    if cfg.auth.argon2_iterations == 0 || cfg.auth.argon2_parallelism == 0 {
        return Err(ConfigError::Validation(
            "auth.argon2_iterations and auth.argon2_parallelism must be > 0".into(),
        ));
    }

    for origin in &cfg.cors.allowed_origins {
        if origin == "*" {
            continue;
        }
        match url::Url::parse(origin) {
            Ok(u) => {
                let scheme = u.scheme();
                if scheme != "http" && scheme != "https" {
                    return Err(ConfigError::Validation(format!(
                        "CORS origin must be http or https: {}",
                        origin
                    )));
                }
            }
            Err(_) => {
                return Err(ConfigError::Validation(format!(
                    "invalid CORS origin: {}",
                    origin
                )))
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn parse_toml() {
        let f = NamedTempFile::new().expect("tmpfile");
        std::fs::write(
            f.path(),
            r#"
[server]
host = "127.0.0.1"
port = 8000

[database]
driver = "sqlite"
path = "db.sqlite"

[auth]
argon2_memory_kib = 4096
"#,
        )
        .unwrap();
        let cfg = load_raw_from_file(f.path()).expect("load");
        let s = cfg.server.unwrap();
        assert_eq!(s.host.unwrap(), "127.0.0.1");
        assert_eq!(s.port.unwrap(), 8000);
        assert_eq!(cfg.database.unwrap().path.as_deref(), Some("db.sqlite"));
        assert_eq!(cfg.auth.unwrap().argon2_memory_kib, Some(4096));
    }

    #[test]
    fn parse_yaml() {
        let f = NamedTempFile::new().expect("tmpfile");
        std::fs::write(
            f.path(),
            r#"
server:
  host: 0.0.0.0
  port: 9000
database:
  driver: mysql
  host: 192.168.41.5
  port: 3306
  database: ecosense
"#,
        )
        .unwrap();
        let cfg = load_raw_from_file(f.path()).expect("load");
        let s = cfg.server.unwrap();
        assert_eq!(s.host.unwrap(), "0.0.0.0");
        assert_eq!(s.port.unwrap(), 9000);
        let db = cfg.database.unwrap();
        assert_eq!(db.driver, "mysql");
        assert_eq!(db.database.as_deref(), Some("ecosense"));
    }

    #[test]
    fn env_overrides() {
        let keys = [
            "ECOSENSE_SERVER_HOST",
            "ECOSENSE_SERVER_PORT",
            "ECOSENSE_LOG_LEVEL",
            "ECOSENSE_LOG_JSON",
            "ECOSENSE_STATIC_DIRECTORY",
        ];
        for k in &keys {
            std::env::remove_var(k);
        }

        std::env::set_var("ECOSENSE_SERVER_HOST", "10.1.2.3");
        std::env::set_var("ECOSENSE_SERVER_PORT", "1234");
        std::env::set_var("ECOSENSE_LOG_LEVEL", "debug");
        std::env::set_var("ECOSENSE_LOG_JSON", "true");
        std::env::set_var("ECOSENSE_STATIC_DIRECTORY", "/srv/ecosense");

        let cfg = load_config::<&Path>(None).expect("load config");
        assert_eq!(cfg.server.host, "10.1.2.3");
        assert_eq!(cfg.server.port, 1234);
        assert_eq!(cfg.logging.level, "debug");
        assert!(cfg.logging.json);
        assert_eq!(cfg.static_files.directory, "/srv/ecosense");

        for k in &keys {
            std::env::remove_var(k);
        }
    }

    #[test]
    fn csv_split() {
        let s = "https://a.example, https://b.example, , https://c.example";
        let parts = split_csv(s);
        assert_eq!(
            parts,
            vec!["https://a.example", "https://b.example", "https://c.example"]
        );
    }

    #[test]
    fn sqlite_url_from_path() {
        let cfg = Config::default();
        assert_eq!(
            cfg.database.connection_url().unwrap(),
            "sqlite://ecosense.sqlite"
        );

        let mut db = cfg.database.clone();
        db.path = Some("sqlite::memory:".into());
        assert_eq!(db.connection_url().unwrap(), "sqlite::memory:");
    }

    #[test]
    fn mysql_url_requires_host_and_database() {
        let mut db = Config::default().database;
        db.driver = "mysql".into();
        assert!(db.connection_url().is_err());

        db.host = Some("db".into());
        db.database = Some("ecosense".into());
        db.username = Some("usuari".into());
        db.password = Some("secret".into());
        assert_eq!(
            db.connection_url().unwrap(),
            "mysql://usuari:secret@db:3306/ecosense"
        );
    }

    #[test]
    fn validation_rejects_bad_values() {
        assert!(validate_config(&Config::default()).is_ok());

        let mut cfg = Config::default();
        cfg.database.driver = "oracle".into();
        assert!(validate_config(&cfg).is_err());

        let mut cfg = Config::default();
        cfg.server.host = "bad host!".into();
        assert!(validate_config(&cfg).is_err());

        let mut cfg = Config::default();
        cfg.cors.allowed_origins = vec!["ftp://example.com".into()];
        assert!(validate_config(&cfg).is_err());
    }
}
