use std::path::PathBuf;

/// Which persistence backend holds stored registrations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// `registrations` table in Postgres, reached through `DATABASE_URL`.
    Postgres,
    /// A single JSON document keyed by postcode.
    Json,
}

impl std::fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreBackend::Postgres => write!(f, "postgres"),
            StoreBackend::Json => write!(f, "json"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub store_backend: StoreBackend,
    /// Checked when the Postgres store is opened, not at load time.
    pub database_url: Option<String>,
    pub json_store_path: PathBuf,
    pub postcodes_path: PathBuf,
    /// Receives the full body of the most recent non-200 response.
    pub error_log_path: PathBuf,
    pub base_url: String,
    pub max_workers: usize,
    pub request_timeout_secs: u64,
    /// Total attempts per request, including the first.
    pub max_attempts: u32,
    pub retry_delay_ms: u64,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("log_level", &self.log_level)
            .field("store_backend", &self.store_backend)
            .field(
                "database_url",
                &self.database_url.as_ref().map(|_| "[redacted]"),
            )
            .field("json_store_path", &self.json_store_path)
            .field("postcodes_path", &self.postcodes_path)
            .field("error_log_path", &self.error_log_path)
            .field("base_url", &self.base_url)
            .field("max_workers", &self.max_workers)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("max_attempts", &self.max_attempts)
            .field("retry_delay_ms", &self.retry_delay_ms)
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .finish()
    }
}
