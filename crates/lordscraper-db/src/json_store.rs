//! [`RecordStore`] kept as a single JSON document on disk.
//!
//! Layout: `{"postcodes": {"<postcode>": [ {details...}, ... ]}}`. The whole
//! document lives in memory behind a lock and is rewritten through a temp
//! file and rename after every insert, so readers never see a torn file.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use lordscraper_core::AddressDetails;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::store::{InsertOutcome, RecordStore};
use crate::DbError;

#[derive(Debug, Default, Serialize, Deserialize)]
struct Document {
    #[serde(default)]
    postcodes: BTreeMap<String, Vec<AddressDetails>>,
}

#[derive(Debug, Default)]
struct State {
    document: Document,
    addresses: HashSet<String>,
}

impl State {
    fn from_document(document: Document) -> Self {
        let addresses = document
            .postcodes
            .values()
            .flatten()
            .map(|details| details.address.clone())
            .collect();
        Self {
            document,
            addresses,
        }
    }
}

#[derive(Debug)]
pub struct JsonRecordStore {
    path: PathBuf,
    state: Mutex<State>,
}

impl JsonRecordStore {
    /// Loads the document at `path`. A missing or empty file starts an empty
    /// store; the file is created on the first insert.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Io`] if the file exists but cannot be read, or
    /// [`DbError::Json`] if its contents are not a registration document.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, DbError> {
        let path = path.into();
        let document = match tokio::fs::read(&path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Document::default(),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| DbError::Json {
                path: path.display().to_string(),
                source: e,
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Document::default(),
            Err(e) => {
                return Err(DbError::Io {
                    path: path.display().to_string(),
                    source: e,
                })
            }
        };

        Ok(Self {
            path,
            state: Mutex::new(State::from_document(document)),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Records stored under `postcode`, in insertion order.
    pub async fn records_for(&self, postcode: &str) -> Vec<AddressDetails> {
        let state = self.state.lock().await;
        state
            .document
            .postcodes
            .get(postcode)
            .cloned()
            .unwrap_or_default()
    }

    async fn persist(&self, document: &Document) -> Result<(), DbError> {
        let io_err = |source| DbError::Io {
            path: self.path.display().to_string(),
            source,
        };
        let bytes = serde_json::to_vec_pretty(document).map_err(|e| DbError::Json {
            path: self.path.display().to_string(),
            source: e,
        })?;

        let mut tmp_name = self.path.file_name().unwrap_or_default().to_os_string();
        tmp_name.push(".tmp");
        let tmp_path = self.path.with_file_name(tmp_name);

        tokio::fs::write(&tmp_path, bytes).await.map_err(io_err)?;
        tokio::fs::rename(&tmp_path, &self.path)
            .await
            .map_err(io_err)?;
        Ok(())
    }
}

#[async_trait]
impl RecordStore for JsonRecordStore {
    async fn exists(&self, postcode: &str, address: &str) -> Result<bool, DbError> {
        let state = self.state.lock().await;
        Ok(state
            .document
            .postcodes
            .get(postcode)
            .is_some_and(|records| records.iter().any(|r| r.address == address)))
    }

    async fn insert(
        &self,
        postcode: &str,
        details: &AddressDetails,
    ) -> Result<InsertOutcome, DbError> {
        let mut state = self.state.lock().await;
        if state.addresses.contains(&details.address) {
            tracing::info!(
                postcode,
                address = %details.address,
                "registration already present"
            );
            return Ok(InsertOutcome::AlreadyPresent);
        }

        state
            .document
            .postcodes
            .entry(postcode.to_owned())
            .or_default()
            .push(details.clone());

        if let Err(e) = self.persist(&state.document).await {
            // Roll back the in-memory push so memory matches disk.
            if let Some(records) = state.document.postcodes.get_mut(postcode) {
                records.pop();
                if records.is_empty() {
                    state.document.postcodes.remove(postcode);
                }
            }
            return Err(e);
        }

        state.addresses.insert(details.address.clone());
        Ok(InsertOutcome::Inserted)
    }

    async fn count_summary(&self) -> Result<(u64, u64), DbError> {
        let state = self.state.lock().await;
        let postcodes = &state.document.postcodes;
        let distinct = postcodes.values().filter(|r| !r.is_empty()).count();
        let total: usize = postcodes.values().map(Vec::len).sum();
        Ok((
            u64::try_from(distinct).unwrap_or(u64::MAX),
            u64::try_from(total).unwrap_or(u64::MAX),
        ))
    }

    async fn last_postcode(&self) -> Result<Option<String>, DbError> {
        let state = self.state.lock().await;
        Ok(state
            .document
            .postcodes
            .iter()
            .rev()
            .find(|(_, records)| !records.is_empty())
            .map(|(postcode, _)| postcode.clone()))
    }
}

#[cfg(test)]
#[path = "json_store_test.rs"]
mod tests;
