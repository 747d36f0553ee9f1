//! Raw dump of collected reports
//!
//! Each successfully collected contest is written verbatim as JSON next to
//! the relational rows, for replay and debugging.

use crate::collector::types::AuditReport;
use crate::AuditError;
use chrono::{DateTime, Utc};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// Suffixes tried when two dumps land on the same microsecond
const MAX_NAME_ATTEMPTS: u32 = 16;

/// Directory of raw JSON dumps, one file per collected contest
#[derive(Debug, Clone)]
pub struct RawDataSink {
    dir: PathBuf,
}

impl RawDataSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Creates the dump directory if it does not exist yet
    pub async fn ensure_dir(&self) -> Result<(), AuditError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        Ok(())
    }

    /// Writes `report` to `{dir}/{platform}_{slug}_{timestamp}.json`
    ///
    /// The file is created with create-new semantics; an existing dump is
    /// never overwritten, a numeric suffix is appended instead.
    pub async fn save(&self, report: &AuditReport, slug: &str) -> Result<PathBuf, AuditError> {
        self.ensure_dir().await?;

        let stem = dump_stem(&report.platform, slug, Utc::now());
        let body = report.raw_data()?;

        let mut attempt = 0;
        let (mut file, path) = loop {
            let name = if attempt == 0 {
                format!("{}.json", stem)
            } else {
                format!("{}-{}.json", stem, attempt)
            };
            let path = self.dir.join(name);

            match tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => break (file, path),
                Err(e) if e.kind() == ErrorKind::AlreadyExists && attempt < MAX_NAME_ATTEMPTS => {
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        };
        file.write_all(body.as_bytes()).await?;
        file.flush().await?;

        tracing::info!("Saved raw data to {}", path.display());
        Ok(path)
    }
}

/// `{platform}_{slug}_{YYYYmmdd_HHMMSS_micros}.json`, with path-unsafe characters replaced
pub fn dump_file_name(platform: &str, slug: &str, at: DateTime<Utc>) -> String {
    format!("{}.json", dump_stem(platform, slug, at))
}

fn dump_stem(platform: &str, slug: &str, at: DateTime<Utc>) -> String {
    format!(
        "{}_{}_{}",
        sanitize(platform),
        sanitize(slug),
        at.format("%Y%m%d_%H%M%S_%6f")
    )
}

fn sanitize(part: &str) -> String {
    part.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '-'
            }
        })
        .collect()
}
