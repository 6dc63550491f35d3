use crate::app_config::{AppConfig, StoreBackend};
use crate::ConfigError;

pub const DEFAULT_BASE_URL: &str = "https://www.landlordregistrationscotland.gov.uk";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let log_level = or_default("LORDSCRAPER_LOG_LEVEL", "info");

    let store_backend = parse_store_backend(&or_default("LORDSCRAPER_STORE", "postgres"))?;
    // A missing URL only matters once the Postgres store is opened.
    let database_url = lookup("DATABASE_URL").ok();

    let json_store_path = PathBuf::from(or_default("LORDSCRAPER_JSON_STORE_PATH", "data.json"));
    let postcodes_path = PathBuf::from(or_default("LORDSCRAPER_POSTCODES_PATH", "postcodes.txt"));
    let error_log_path = PathBuf::from(or_default("LORDSCRAPER_ERROR_LOG_PATH", "error.log"));
    let base_url = or_default("LORDSCRAPER_BASE_URL", DEFAULT_BASE_URL);

    let max_workers = parse_usize("LORDSCRAPER_MAX_WORKERS", "3")?;
    if max_workers == 0 {
        return Err(invalid(
            "LORDSCRAPER_MAX_WORKERS",
            "must be at least 1".to_string(),
        ));
    }

    let request_timeout_secs = parse_u64("LORDSCRAPER_REQUEST_TIMEOUT_SECS", "30")?;
    let max_attempts = parse_u32("LORDSCRAPER_MAX_ATTEMPTS", "3")?;
    if max_attempts == 0 {
        return Err(invalid(
            "LORDSCRAPER_MAX_ATTEMPTS",
            "must be at least 1".to_string(),
        ));
    }
    let retry_delay_ms = parse_u64("LORDSCRAPER_RETRY_DELAY_MS", "1000")?;

    let db_max_connections = parse_u32("LORDSCRAPER_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("LORDSCRAPER_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("LORDSCRAPER_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    Ok(AppConfig {
        log_level,
        store_backend,
        database_url,
        json_store_path,
        postcodes_path,
        error_log_path,
        base_url,
        max_workers,
        request_timeout_secs,
        max_attempts,
        retry_delay_ms,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
    })
}

fn parse_store_backend(s: &str) -> Result<StoreBackend, ConfigError> {
    match s.to_ascii_lowercase().as_str() {
        "postgres" => Ok(StoreBackend::Postgres),
        "json" => Ok(StoreBackend::Json),
        other => Err(ConfigError::InvalidEnvVar {
            var: "LORDSCRAPER_STORE".to_string(),
            reason: format!("expected \"postgres\" or \"json\", got \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
