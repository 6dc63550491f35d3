//! Opening and closing the configured record store.

use std::sync::Arc;

use lordscraper_core::{AppConfig, StoreBackend};
use lordscraper_db::{JsonRecordStore, PgRecordStore, RecordStore};

/// The store handed to workers, plus what is needed to shut it down.
pub(crate) struct OpenStore {
    pub store: Arc<dyn RecordStore>,
    postgres: Option<PgRecordStore>,
}

impl OpenStore {
    /// Opens the backend selected by `config.store_backend`.
    ///
    /// An unreachable store is a setup fault and is returned as an error.
    pub(crate) async fn open(config: &AppConfig) -> anyhow::Result<Self> {
        match config.store_backend {
            StoreBackend::Postgres => {
                let pg = PgRecordStore::connect(config).await?;
                lordscraper_db::run_migrations(pg.pool()).await?;
                tracing::info!("connected to postgres record store");
                Ok(Self {
                    store: Arc::new(pg.clone()),
                    postgres: Some(pg),
                })
            }
            StoreBackend::Json => {
                let json = JsonRecordStore::open(&config.json_store_path).await?;
                tracing::info!(path = %json.path().display(), "opened json record store");
                Ok(Self {
                    store: Arc::new(json),
                    postgres: None,
                })
            }
        }
    }

    /// Logs the resume summary: distinct postcodes, records, last postcode.
    pub(crate) async fn log_summary(&self) -> anyhow::Result<()> {
        let summary = self.store.summary().await?;
        tracing::info!(
            distinct_postcodes = summary.distinct_postcodes,
            total_records = summary.total_records,
            last_postcode = summary.last_postcode.as_deref().unwrap_or("-"),
            "record store summary"
        );
        Ok(())
    }

    pub(crate) async fn close(self) {
        if let Some(pg) = self.postgres {
            pg.close().await;
        }
    }
}
