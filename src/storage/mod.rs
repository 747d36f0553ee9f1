//! Storage module for persisting collected reports
//!
//! This module handles all database operations, including:
//! - SQLite database initialization and schema management
//! - Inserting reports together with their findings
//! - Filtered reads for the API and statistics

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{Storage, StorageError, StorageResult};

use crate::AuditError;
use serde::Serialize;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

/// Storage shared between the collector and the API threads
///
/// Holders must not keep the guard across an `.await`.
pub type SharedStorage = Arc<Mutex<SqliteStorage>>;

/// Initializes or opens a storage database, creating its parent directory
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(SharedStorage)` - Successfully initialized storage
/// * `Err(AuditError)` - Failed to initialize storage
pub fn open_storage(path: &Path) -> Result<SharedStorage, AuditError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    Ok(Arc::new(Mutex::new(SqliteStorage::new(path)?)))
}

/// Locks shared storage, mapping a poisoned lock to a storage error
pub fn lock(storage: &SharedStorage) -> StorageResult<MutexGuard<'_, SqliteStorage>> {
    storage.lock().map_err(|_| StorageError::LockPoisoned)
}

/// A stored report as served by the API
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub id: i64,
    pub platform: String,
    pub title: String,
    pub url: Option<String>,
    pub date_collected: String,
    pub date_published: Option<String>,
    pub prize_pool: Option<String>,
    pub participants: Option<u32>,
    pub findings: Vec<FindingRow>,
}

/// A stored finding as served by the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FindingRow {
    pub id: i64,
    pub report_id: i64,
    pub severity: String,
    pub title: Option<String>,
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_open_storage_creates_parent_dir() {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("nested").join("audit.db");

        let storage = open_storage(&db_path).unwrap();

        assert!(db_path.exists());
        assert_eq!(lock(&storage).unwrap().count_reports().unwrap(), 0);
    }
}
