//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::collector::{AuditReport, Severity};
use crate::storage::{FindingRow, ReportRow};
use std::collections::HashMap;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Report not found: {0}")]
    ReportNotFound(i64),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// Reports are insert-only: there is no update or delete, so readers and the
/// collector never race on the same row.
pub trait Storage {
    // ===== Writes =====

    /// Inserts a report and its findings atomically
    ///
    /// # Returns
    ///
    /// The ID of the new report row
    fn insert_report(&mut self, report: &AuditReport) -> StorageResult<i64>;

    // ===== Reads =====

    /// Lists reports newest first, optionally for one platform
    fn get_reports(&self, platform: Option<&str>, limit: usize) -> StorageResult<Vec<ReportRow>>;

    /// Gets a report with its findings
    fn get_report(&self, report_id: i64) -> StorageResult<Option<ReportRow>>;

    /// Lists findings in insertion order, optionally filtered
    ///
    /// `severity` is compared against the stored lowercase name.
    fn get_findings(
        &self,
        severity: Option<&str>,
        report_id: Option<i64>,
    ) -> StorageResult<Vec<FindingRow>>;

    /// Gets the stored raw dump of a report
    fn get_raw_data(&self, report_id: i64) -> StorageResult<String>;

    // ===== Statistics =====

    /// Gets total report count
    fn count_reports(&self) -> StorageResult<u64>;

    /// Gets total finding count
    fn count_findings(&self) -> StorageResult<u64>;

    /// Gets report count per platform
    fn count_reports_by_platform(&self) -> StorageResult<HashMap<String, u64>>;

    /// Gets finding count per severity
    fn count_findings_by_severity(&self) -> StorageResult<HashMap<Severity, u64>>;
}
