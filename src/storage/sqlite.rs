//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::collector::{AuditReport, Severity};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{FindingRow, ReportRow};
use crate::AuditError;
use chrono::SecondsFormat;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::HashMap;
use std::path::Path;

const REPORT_COLUMNS: &str = "id, platform, title, url, date_collected, date_published, \
     prize_pool, participants";

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(AuditError)` - Failed to open database
    pub fn new(path: &Path) -> Result<Self, AuditError> {
        let conn = Connection::open(path)?;

        // WAL lets the API read while the collector writes
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    pub fn new_in_memory() -> Result<Self, AuditError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    fn findings_for(&self, report_id: i64) -> StorageResult<Vec<FindingRow>> {
        self.get_findings(None, Some(report_id))
    }
}

fn report_from_row(row: &Row<'_>) -> rusqlite::Result<ReportRow> {
    Ok(ReportRow {
        id: row.get(0)?,
        platform: row.get(1)?,
        title: row.get(2)?,
        url: row.get(3)?,
        date_collected: row.get(4)?,
        date_published: row.get(5)?,
        prize_pool: row.get(6)?,
        participants: row.get(7)?,
        findings: Vec::new(),
    })
}

fn finding_from_row(row: &Row<'_>) -> rusqlite::Result<FindingRow> {
    Ok(FindingRow {
        id: row.get(0)?,
        report_id: row.get(1)?,
        severity: row.get(2)?,
        title: row.get(3)?,
        description: row.get(4)?,
    })
}

impl Storage for SqliteStorage {
    // ===== Writes =====

    fn insert_report(&mut self, report: &AuditReport) -> StorageResult<i64> {
        let raw_data = report.raw_data()?;
        let tx = self.conn.transaction()?;

        tx.execute(
            "INSERT INTO audit_reports
             (platform, title, url, date_collected, date_published, prize_pool, participants, raw_data)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                report.platform,
                report.title,
                report.url,
                report
                    .date_collected
                    .to_rfc3339_opts(SecondsFormat::Micros, true),
                report
                    .date_published
                    .map(|d| d.to_rfc3339_opts(SecondsFormat::Secs, true)),
                report.prize_pool,
                report.participants,
                raw_data
            ],
        )?;
        let report_id = tx.last_insert_rowid();

        {
            let mut stmt = tx.prepare(
                "INSERT INTO findings (report_id, severity, title, description)
                 VALUES (?1, ?2, ?3, ?4)",
            )?;
            for finding in &report.findings {
                stmt.execute(params![
                    report_id,
                    finding.severity.as_str(),
                    finding.title,
                    finding.description
                ])?;
            }
        }

        tx.commit()?;
        Ok(report_id)
    }

    // ===== Reads =====

    fn get_reports(&self, platform: Option<&str>, limit: usize) -> StorageResult<Vec<ReportRow>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM audit_reports
             WHERE (?1 IS NULL OR platform = ?1)
             ORDER BY date_collected DESC, id DESC
             LIMIT ?2",
            REPORT_COLUMNS
        ))?;

        let mut reports = stmt
            .query_map(params![platform, limit as i64], report_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        for report in &mut reports {
            report.findings = self.findings_for(report.id)?;
        }

        Ok(reports)
    }

    fn get_report(&self, report_id: i64) -> StorageResult<Option<ReportRow>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM audit_reports WHERE id = ?1",
            REPORT_COLUMNS
        ))?;

        let report = stmt
            .query_row(params![report_id], report_from_row)
            .optional()?;

        match report {
            Some(mut report) => {
                report.findings = self.findings_for(report.id)?;
                Ok(Some(report))
            }
            None => Ok(None),
        }
    }

    fn get_findings(
        &self,
        severity: Option<&str>,
        report_id: Option<i64>,
    ) -> StorageResult<Vec<FindingRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, report_id, severity, title, description FROM findings
             WHERE (?1 IS NULL OR severity = ?1) AND (?2 IS NULL OR report_id = ?2)
             ORDER BY id",
        )?;

        let findings = stmt
            .query_map(params![severity, report_id], finding_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(findings)
    }

    fn get_raw_data(&self, report_id: i64) -> StorageResult<String> {
        self.conn
            .query_row(
                "SELECT raw_data FROM audit_reports WHERE id = ?1",
                params![report_id],
                |row| row.get::<_, Option<String>>(0),
            )
            .optional()?
            .flatten()
            .ok_or(StorageError::ReportNotFound(report_id))
    }

    // ===== Statistics =====

    fn count_reports(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM audit_reports", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn count_findings(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM findings", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn count_reports_by_platform(&self) -> StorageResult<HashMap<String, u64>> {
        let mut stmt = self
            .conn
            .prepare("SELECT platform, COUNT(*) FROM audit_reports GROUP BY platform")?;

        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;

        let mut counts = HashMap::new();
        for row in rows {
            let (platform, count) = row?;
            counts.insert(platform, count as u64);
        }

        Ok(counts)
    }

    fn count_findings_by_severity(&self) -> StorageResult<HashMap<Severity, u64>> {
        let mut stmt = self
            .conn
            .prepare("SELECT severity, COUNT(*) FROM findings GROUP BY severity")?;

        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;

        let mut counts = HashMap::new();
        for row in rows {
            let (severity, count) = row?;
            *counts.entry(Severity::from_attr(&severity)).or_insert(0) += count as u64;
        }

        Ok(counts)
    }
}
