//! Collector module for contest page retrieval and extraction
//!
//! This module contains the collection pipeline, including:
//! - HTTP fetching of contest index and detail pages
//! - HTML extraction into typed reports
//! - Report validation
//! - Raw JSON dumps and relational persistence
//!
//! Platforms plug in by implementing [`Collector`].

mod code4rena;
mod extractor;
mod fetcher;
mod sink;
mod types;
mod validate;

pub use code4rena::Code4renaCollector;
pub use extractor::{
    extract_findings, extract_participants, extract_prize_pool, extract_published_date,
    parse_contest_index, parse_report, PRIZE_POOL_UNAVAILABLE,
};
pub use fetcher::{build_http_client, Fetcher};
pub use sink::{dump_file_name, RawDataSink};
pub use types::{AuditReport, ContestSummary, FindingRecord, Severity};
pub use validate::validate_report;

use crate::{AuditError, ParseError};
use async_trait::async_trait;

/// Capability contract of a platform collector
#[async_trait]
pub trait Collector: Send + Sync {
    /// Platform name stored on every report (e.g. "Code4rena")
    fn platform(&self) -> &str;

    /// Collects up to `limit` contests and returns the reports that were stored
    ///
    /// Failures of individual contests are logged and skipped. An `Err` means
    /// the run as a whole could not proceed (index unreachable, storage down).
    async fn collect(&self, limit: usize) -> Result<Vec<AuditReport>, AuditError>;

    /// Parses one fetched contest page
    fn parse_report(&self, html: &str, contest: &ContestSummary) -> Result<AuditReport, ParseError>;
}

/// A contest that was skipped during a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContestFailure {
    pub slug: String,
    pub error: String,
}

/// Summary of a collection run
#[derive(Debug, Default)]
pub struct CollectOutcome {
    /// Reports that were validated and persisted, in index order
    pub reports: Vec<AuditReport>,

    /// Contests listed on the index for this run
    pub contest_total: usize,

    /// Contests that failed to fetch, parse, validate, or persist
    pub failures: Vec<ContestFailure>,
}

impl CollectOutcome {
    pub(crate) fn record_failure(&mut self, slug: &str, error: &dyn std::fmt::Display) {
        self.failures.push(ContestFailure {
            slug: slug.to_string(),
            error: error.to_string(),
        });
    }
}
