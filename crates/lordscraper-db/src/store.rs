//! The persistence seam shared by every crawl worker.

use async_trait::async_trait;
use lordscraper_core::AddressDetails;

use crate::DbError;

/// Result of an idempotent insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    /// A record with the same address already exists, under any postcode.
    AlreadyPresent,
}

/// Counts reported at startup so an operator can see where a run resumes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreSummary {
    pub distinct_postcodes: u64,
    pub total_records: u64,
    /// Lexicographically greatest stored postcode. Informational only.
    pub last_postcode: Option<String>,
}

/// Storage for scraped registrations.
///
/// `address` is unique across the whole store. Implementations enforce that
/// themselves and report a clash as [`InsertOutcome::AlreadyPresent`] rather
/// than an error. Concurrent callers are expected; writes are serialized by
/// the implementation.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Whether `(postcode, address)` has already been stored.
    async fn exists(&self, postcode: &str, address: &str) -> Result<bool, DbError>;

    async fn insert(
        &self,
        postcode: &str,
        details: &AddressDetails,
    ) -> Result<InsertOutcome, DbError>;

    async fn count_summary(&self) -> Result<(u64, u64), DbError>;

    async fn last_postcode(&self) -> Result<Option<String>, DbError>;

    /// Collects [`count_summary`](Self::count_summary) and
    /// [`last_postcode`](Self::last_postcode) into one value.
    async fn summary(&self) -> Result<StoreSummary, DbError> {
        let (distinct_postcodes, total_records) = self.count_summary().await?;
        let last_postcode = self.last_postcode().await?;
        Ok(StoreSummary {
            distinct_postcodes,
            total_records,
            last_postcode,
        })
    }
}
