//! Offline tests for lordscraper-db pool configuration and row conversion.
//! These tests do not require a live database connection.

use chrono::Utc;
use lordscraper_core::{AppConfig, StoreBackend, StoredRecord};
use lordscraper_db::{PoolConfig, RegistrationRow, StoreSummary};
use std::path::PathBuf;

fn app_config() -> AppConfig {
    AppConfig {
        log_level: "info".to_string(),
        store_backend: StoreBackend::Postgres,
        database_url: Some("postgres://example".to_string()),
        json_store_path: PathBuf::from("data.json"),
        postcodes_path: PathBuf::from("postcodes.txt"),
        error_log_path: PathBuf::from("error.log"),
        base_url: "https://example.test".to_string(),
        max_workers: 3,
        request_timeout_secs: 30,
        max_attempts: 3,
        retry_delay_ms: 1000,
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
    }
}

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let pool_config = PoolConfig::from_app_config(&app_config());
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

#[tokio::test]
async fn connect_without_database_url_is_a_setup_error() {
    let mut config = app_config();
    config.database_url = None;

    let err = lordscraper_db::connect_pool_from_config(&config)
        .await
        .expect_err("connecting without a URL should fail");
    assert!(matches!(err, lordscraper_db::DbError::MissingDatabaseUrl));
}

#[test]
fn registration_row_converts_to_stored_record() {
    let created_at = Utc::now();
    let row = RegistrationRow {
        id: 1,
        postcode: "EH1 1AA".to_string(),
        application_by: Some("Jane Smith".to_string()),
        joint_owners: None,
        agent_details: None,
        local_authority: Some("City of Edinburgh Council".to_string()),
        contact_address: None,
        address: "1 Main St".to_string(),
        created_at,
    };

    let record = StoredRecord::from(row);
    assert_eq!(record.postcode, "EH1 1AA");
    assert_eq!(record.details.address, "1 Main St");
    assert_eq!(
        record.details.fields.application_by.as_deref(),
        Some("Jane Smith")
    );
    assert!(record.details.fields.joint_owners.is_none());
    assert_eq!(record.created_at, created_at);
}

#[test]
fn store_summary_defaults_to_empty() {
    let summary = StoreSummary::default();
    assert_eq!(summary.distinct_postcodes, 0);
    assert_eq!(summary.total_records, 0);
    assert!(summary.last_postcode.is_none());
}
