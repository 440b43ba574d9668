//! redb-based persistence medium for the audit document
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `documents` | storage key | raw JSON bytes | Whole-document slot |
//!
//! The store keeps exactly one document under one key. Values are stored as
//! raw bytes, not decoded here: a corrupted payload must reach the state store
//! untouched so it can be discarded there.
//!
//! # Durability
//!
//! Every write is one redb write transaction. redb commits with copy-on-write
//! and an atomic pointer swap, so a reader sees either the previous value or
//! the new one, never a partial write.

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Document slots: key = storage key, value = serialized document
const DOCUMENTS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("documents");

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Key-value persistence medium holding whole-value slots
///
/// `write` must replace the previous value atomically.
pub trait DocumentBackend: Send + Sync {
    /// Read the raw value stored under `key`
    fn read(&self, key: &str) -> StorageResult<Option<Vec<u8>>>;

    /// Replace the value stored under `key`
    fn write(&self, key: &str, value: &[u8]) -> StorageResult<()>;

    /// Remove the value stored under `key`; returns whether it existed
    fn remove(&self, key: &str) -> StorageResult<bool>;
}

/// Document backend backed by redb
#[derive(Clone)]
pub struct RedbBackend {
    db: Arc<Database>,
}

impl RedbBackend {
    /// Open or create the database at the given path
    ///
    /// Parent directories are created when missing.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }

        let db = Database::create(path)?;
        Self::init(db)
    }

    /// Open an in-memory database (for tests and dry runs)
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init(db)
    }

    fn init(db: Database) -> StorageResult<Self> {
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(DOCUMENTS_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }
}

impl DocumentBackend for RedbBackend {
    fn read(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(DOCUMENTS_TABLE)?;

        Ok(table.get(key)?.map(|guard| guard.value().to_vec()))
    }

    fn write(&self, key: &str, value: &[u8]) -> StorageResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(DOCUMENTS_TABLE)?;
            table.insert(key, value)?;
        }
        write_txn.commit()?;

        tracing::trace!(key = %key, bytes = value.len(), "Document slot written");
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<bool> {
        let write_txn = self.db.begin_write()?;
        let existed = {
            let mut table = write_txn.open_table(DOCUMENTS_TABLE)?;
            table.remove(key)?.is_some()
        };
        write_txn.commit()?;
        Ok(existed)
    }
}
