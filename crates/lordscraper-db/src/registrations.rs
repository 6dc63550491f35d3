//! Database operations for the `registrations` table.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lordscraper_core::{AddressDetails, AppConfig, RegistrationFields, StoredRecord};
use sqlx::PgPool;

use crate::store::{InsertOutcome, RecordStore};
use crate::DbError;

/// A row from the `registrations` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RegistrationRow {
    pub id: i64,
    pub postcode: String,
    pub application_by: Option<String>,
    pub joint_owners: Option<String>,
    pub agent_details: Option<String>,
    pub local_authority: Option<String>,
    pub contact_address: Option<String>,
    /// Unique across the table.
    pub address: String,
    pub created_at: DateTime<Utc>,
}

impl From<RegistrationRow> for StoredRecord {
    fn from(row: RegistrationRow) -> Self {
        let fields = RegistrationFields {
            application_by: row.application_by,
            joint_owners: row.joint_owners,
            agent_details: row.agent_details,
            local_authority: row.local_authority,
            contact_address: row.contact_address,
        };
        StoredRecord {
            postcode: row.postcode,
            details: fields.with_address(row.address),
            created_at: row.created_at,
        }
    }
}

// ---------------------------------------------------------------------------
// registrations operations
// ---------------------------------------------------------------------------

/// Returns `true` if a row exists for exactly this `(postcode, address)` pair.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn registration_exists(
    pool: &PgPool,
    postcode: &str,
    address: &str,
) -> Result<bool, DbError> {
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (SELECT 1 FROM registrations WHERE postcode = $1 AND address = $2)",
    )
    .bind(postcode)
    .bind(address)
    .fetch_one(pool)
    .await?;

    Ok(exists)
}

/// Inserts one registration inside a transaction.
///
/// A unique violation on `address` rolls the transaction back and is reported
/// as [`InsertOutcome::AlreadyPresent`].
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] for any failure other than the unique violation.
pub async fn insert_registration(
    pool: &PgPool,
    postcode: &str,
    details: &AddressDetails,
) -> Result<InsertOutcome, DbError> {
    let mut tx = pool.begin().await?;
    let fields = &details.fields;

    let result = sqlx::query(
        "INSERT INTO registrations \
             (postcode, application_by, joint_owners, agent_details, \
              local_authority, contact_address, address) \
         VALUES ($1, $2, $3, $4, $5, $6, $7)",
    )
    .bind(postcode)
    .bind(fields.application_by.as_deref())
    .bind(fields.joint_owners.as_deref())
    .bind(fields.agent_details.as_deref())
    .bind(fields.local_authority.as_deref())
    .bind(fields.contact_address.as_deref())
    .bind(&details.address)
    .execute(&mut *tx)
    .await;

    match result {
        Ok(_) => {
            tx.commit().await?;
            Ok(InsertOutcome::Inserted)
        }
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            tx.rollback().await?;
            tracing::info!(
                postcode,
                address = %details.address,
                "registration already present"
            );
            Ok(InsertOutcome::AlreadyPresent)
        }
        Err(e) => Err(DbError::from(e)),
    }
}

/// Returns `(distinct postcodes, total rows)`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn count_registration_summary(pool: &PgPool) -> Result<(u64, u64), DbError> {
    let (distinct_postcodes, total_records) = sqlx::query_as::<_, (i64, i64)>(
        "SELECT COUNT(DISTINCT postcode), COUNT(*) FROM registrations",
    )
    .fetch_one(pool)
    .await?;

    Ok((
        u64::try_from(distinct_postcodes).unwrap_or(0),
        u64::try_from(total_records).unwrap_or(0),
    ))
}

/// Returns the lexicographically greatest stored postcode, if any.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn last_registered_postcode(pool: &PgPool) -> Result<Option<String>, DbError> {
    let postcode = sqlx::query_scalar::<_, Option<String>>("SELECT MAX(postcode) FROM registrations")
        .fetch_one(pool)
        .await?;

    Ok(postcode)
}

/// Lists every registration stored under `postcode`, oldest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_registrations_for_postcode(
    pool: &PgPool,
    postcode: &str,
) -> Result<Vec<RegistrationRow>, DbError> {
    let rows = sqlx::query_as::<_, RegistrationRow>(
        "SELECT id, postcode, application_by, joint_owners, agent_details, \
                local_authority, contact_address, address, created_at \
         FROM registrations \
         WHERE postcode = $1 \
         ORDER BY id",
    )
    .bind(postcode)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

// ---------------------------------------------------------------------------
// RecordStore over Postgres
// ---------------------------------------------------------------------------

/// [`RecordStore`] backed by the `registrations` table.
///
/// Owns its connection pool from startup until [`close`](Self::close).
#[derive(Debug, Clone)]
pub struct PgRecordStore {
    pool: PgPool,
}

impl PgRecordStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a pool from `config` and wraps it.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::MissingDatabaseUrl`] or [`DbError::Sqlx`] when the
    /// store is unreachable.
    pub async fn connect(config: &AppConfig) -> Result<Self, DbError> {
        let pool = crate::connect_pool_from_config(config).await?;
        Ok(Self::new(pool))
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn exists(&self, postcode: &str, address: &str) -> Result<bool, DbError> {
        registration_exists(&self.pool, postcode, address).await
    }

    async fn insert(
        &self,
        postcode: &str,
        details: &AddressDetails,
    ) -> Result<InsertOutcome, DbError> {
        insert_registration(&self.pool, postcode, details).await
    }

    async fn count_summary(&self) -> Result<(u64, u64), DbError> {
        count_registration_summary(&self.pool).await
    }

    async fn last_postcode(&self) -> Result<Option<String>, DbError> {
        last_registered_postcode(&self.pool).await
    }
}
