//! State store - sole owner of the persisted audit document
//!
//! # Semantics
//!
//! - [`StateStore::load_document`] never fails: a missing, unparseable or
//!   incomplete document is replaced by a fresh empty one.
//! - [`StateStore::save_document`] stamps `lastSaved` and replaces the stored
//!   value in a single write.
//! - [`StateStore::update_document`] is load → mutate → save, returning the
//!   exact persisted value.
//!
//! The store performs no cross-entity validation; transformers own the
//! Finding ↔ CAPA link invariant.
//!
//! # Concurrency
//!
//! Single writer. Two processes updating the same database race on
//! load/save and the last save wins; the other process's changes are lost.

use std::sync::Arc;

use shared::AppState;
use shared::error::AppError;
use thiserror::Error;

use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::storage::{DocumentBackend, RedbBackend, StorageError};

/// Default key of the document slot
pub const DEFAULT_STORAGE_KEY: &str = "comar-audit-state";

/// State store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        tracing::error!(error = %err, "State store failure");
        AppError::storage(err.to_string())
    }
}

/// Owner of the persisted [`AppState`]
#[derive(Clone)]
pub struct StateStore {
    /// `None` when no persistence medium is available
    backend: Option<Arc<dyn DocumentBackend>>,
    key: String,
    clock: Arc<dyn Clock>,
}

impl StateStore {
    /// Store over the given backend using the default key and wall clock
    pub fn new(backend: impl DocumentBackend + 'static) -> Self {
        Self {
            backend: Some(Arc::new(backend)),
            key: DEFAULT_STORAGE_KEY.to_string(),
            clock: Arc::new(SystemClock),
        }
    }

    /// Store without a persistence medium
    ///
    /// Loads always return the empty document and saves are no-ops.
    pub fn detached() -> Self {
        Self {
            backend: None,
            key: DEFAULT_STORAGE_KEY.to_string(),
            clock: Arc::new(SystemClock),
        }
    }

    /// Open the store described by the configuration
    pub fn open(config: &Config) -> StoreResult<Self> {
        if !config.persist {
            tracing::info!("Persistence disabled, using detached store");
            return Ok(Self::detached().with_key(&config.storage_key));
        }

        let path = config.database_path();
        let backend = RedbBackend::open(&path)?;
        tracing::debug!(path = %path.display(), key = %config.storage_key, "State store opened");

        Ok(Self::new(backend).with_key(&config.storage_key))
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub fn is_detached(&self) -> bool {
        self.backend.is_none()
    }

    fn empty_document(&self) -> AppState {
        AppState::empty(self.clock.now_iso())
    }

    /// Read the persisted document, falling back to a fresh empty one
    pub fn load_document(&self) -> AppState {
        let Some(backend) = &self.backend else {
            return self.empty_document();
        };

        let raw = match backend.read(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return self.empty_document(),
            Err(e) => {
                tracing::warn!(
                    key = %self.key,
                    error = %e,
                    "Failed to read document, using empty document"
                );
                return self.empty_document();
            }
        };

        match serde_json::from_slice::<AppState>(&raw) {
            Ok(doc) => doc,
            Err(e) => {
                tracing::warn!(
                    key = %self.key,
                    bytes = raw.len(),
                    error = %e,
                    "Discarding malformed document"
                );
                self.empty_document()
            }
        }
    }

    /// Stamp `lastSaved` and replace the persisted document
    ///
    /// Returns the value as written. A detached store writes nothing.
    pub fn save_document(&self, mut doc: AppState) -> StoreResult<AppState> {
        doc.last_saved = self.clock.now_iso();

        let Some(backend) = &self.backend else {
            return Ok(doc);
        };

        let bytes = serde_json::to_vec(&doc)?;
        backend.write(&self.key, &bytes)?;

        tracing::debug!(
            findings = doc.findings.len(),
            capas = doc.capas.len(),
            evidence = doc.evidence.len(),
            last_saved = %doc.last_saved,
            "Document saved"
        );
        Ok(doc)
    }

    /// Load, transform and persist in one step
    pub fn update_document<F>(&self, mutate: F) -> StoreResult<AppState>
    where
        F: FnOnce(AppState) -> AppState,
    {
        let current = self.load_document();
        let next = mutate(current);
        self.save_document(next)
    }

    /// Like [`update_document`](Self::update_document) for transformers that
    /// can reject the change; on rejection nothing is written.
    pub fn try_update_document<F, E>(&self, mutate: F) -> Result<AppState, E>
    where
        F: FnOnce(AppState) -> Result<AppState, E>,
        E: From<StoreError>,
    {
        let current = self.load_document();
        let next = mutate(current)?;
        Ok(self.save_document(next)?)
    }

    /// Raw stored bytes, without any fallback (export/diagnostics)
    pub fn read_raw(&self) -> StoreResult<Option<Vec<u8>>> {
        match &self.backend {
            Some(backend) => Ok(backend.read(&self.key)?),
            None => Ok(None),
        }
    }

    /// Delete the stored document; the next load returns the empty document
    pub fn reset(&self) -> StoreResult<bool> {
        match &self.backend {
            Some(backend) => Ok(backend.remove(&self.key)?),
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use chrono::Duration;
    use shared::models::{Category, Finding, FindingCreate, Severity};

    fn store_with_clock() -> (StateStore, Arc<FixedClock>, RedbBackend) {
        let clock = Arc::new(FixedClock::at("2025-01-01T00:00:00Z"));
        let backend = RedbBackend::open_in_memory().unwrap();
        let store = StateStore::new(backend.clone()).with_clock(clock.clone());
        (store, clock, backend)
    }

    fn finding(id: &str, title: &str) -> Finding {
        Finding::new(
            id.into(),
            FindingCreate::titled(title, Severity::Minor, Category::Other),
            "2025-01-01T00:00:00.000Z",
        )
    }

    #[test]
    fn test_load_without_document_is_empty() {
        let (store, _, _) = store_with_clock();
        let doc = store.load_document();
        assert!(doc.is_empty());
        assert_eq!(doc.last_saved, "2025-01-01T00:00:00.000Z");
    }

    #[test]
    fn test_load_is_idempotent() {
        let (store, _, _) = store_with_clock();
        store
            .update_document(|mut d| {
                d.findings.push(finding("f-1", "A"));
                d
            })
            .unwrap();

        assert_eq!(store.load_document(), store.load_document());
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let (store, clock, _) = store_with_clock();
        let mut doc = AppState::empty("1999-01-01T00:00:00.000Z");
        doc.findings.push(finding("f-1", "A"));

        clock.advance(Duration::seconds(30));
        let saved = store.save_document(doc.clone()).unwrap();
        let loaded = store.load_document();

        assert_eq!(loaded, saved);
        assert_eq!(loaded.findings, doc.findings);
        assert_eq!(loaded.last_saved, "2025-01-01T00:00:30.000Z");
    }

    #[test]
    fn test_corrupted_payload_yields_empty_document() {
        let (store, _, backend) = store_with_clock();
        backend.write(DEFAULT_STORAGE_KEY, b"{not json").unwrap();

        let doc = store.load_document();
        assert!(doc.findings.is_empty());
        assert!(doc.capas.is_empty());
        assert!(doc.evidence.is_empty());
    }

    #[test]
    fn test_partial_document_yields_full_default() {
        let (store, _, backend) = store_with_clock();
        backend
            .write(
                DEFAULT_STORAGE_KEY,
                br#"{"findings": [{"id":"x"}], "capas": []}"#,
            )
            .unwrap();

        let doc = store.load_document();
        assert!(doc.is_empty());
        assert_eq!(doc.last_saved, "2025-01-01T00:00:00.000Z");
    }

    #[test]
    fn test_update_returns_persisted_value() {
        let (store, _, _) = store_with_clock();
        let returned = store
            .update_document(|mut d| {
                d.findings.push(finding("f-1", "A"));
                d
            })
            .unwrap();

        assert_eq!(returned, store.load_document());
    }

    #[test]
    fn test_try_update_rejection_writes_nothing() {
        let (store, _, _) = store_with_clock();
        let result: Result<AppState, AppError> =
            store.try_update_document(|_| Err(AppError::validation("nope")));

        assert!(result.is_err());
        assert!(store.read_raw().unwrap().is_none());
    }

    #[test]
    fn test_detached_store() {
        let store = StateStore::detached();
        let mut doc = store.load_document();
        doc.findings.push(finding("f-1", "A"));

        store.save_document(doc).unwrap();

        assert!(store.is_detached());
        assert!(store.load_document().is_empty());
        assert!(store.read_raw().unwrap().is_none());
    }

    #[test]
    fn test_custom_key_isolated() {
        let (store, _, backend) = store_with_clock();
        let other = StateStore::new(backend).with_key("other-facility");

        store
            .update_document(|mut d| {
                d.findings.push(finding("f-1", "A"));
                d
            })
            .unwrap();

        assert!(other.load_document().is_empty());
        assert_eq!(other.key(), "other-facility");
    }

    #[test]
    fn test_reset() {
        let (store, _, _) = store_with_clock();
        store.save_document(AppState::empty("")).unwrap();

        assert!(store.reset().unwrap());
        assert!(store.read_raw().unwrap().is_none());
    }
}
