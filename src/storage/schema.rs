//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the Audit-Intel database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- One row per collected contest; never updated after insert
CREATE TABLE IF NOT EXISTS audit_reports (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    platform TEXT NOT NULL,
    title TEXT NOT NULL,
    url TEXT,
    date_collected TEXT NOT NULL,
    date_published TEXT,
    prize_pool TEXT,
    participants INTEGER,
    raw_data TEXT
);

CREATE INDEX IF NOT EXISTS idx_audit_reports_platform ON audit_reports(platform);
CREATE INDEX IF NOT EXISTS idx_audit_reports_collected ON audit_reports(date_collected);

-- Findings owned by a report, in page order
CREATE TABLE IF NOT EXISTS findings (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    report_id INTEGER NOT NULL REFERENCES audit_reports(id),
    severity TEXT NOT NULL,
    title TEXT,
    description TEXT
);

CREATE INDEX IF NOT EXISTS idx_findings_report ON findings(report_id);
CREATE INDEX IF NOT EXISTS idx_findings_severity ON findings(severity);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
