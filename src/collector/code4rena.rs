//! Code4rena collector - contest collection orchestration
//!
//! A run lists contests from the index page, then for each contest fetches
//! the detail page, extracts and validates a report, and persists it as a
//! raw dump plus relational rows. A contest that fails any of those steps is
//! logged and skipped; the rest of the batch continues.

use super::extractor;
use super::fetcher::{build_http_client, Fetcher};
use super::sink::RawDataSink;
use super::types::{AuditReport, ContestSummary};
use super::validate::validate_report;
use super::{CollectOutcome, Collector};
use crate::config::{CollectorConfig, Config};
use crate::storage::{lock, SharedStorage, Storage, StorageError};
use crate::{AuditError, CollectError, ParseError};
use async_trait::async_trait;
use chrono::Utc;
use futures::stream::{self, StreamExt};

/// Collector for Code4rena audit contests
pub struct Code4renaCollector {
    platform: String,
    contests_url: String,
    max_concurrent: usize,
    fetcher: Fetcher,
    sink: RawDataSink,
    storage: SharedStorage,
}

impl Code4renaCollector {
    /// Creates a collector from the full configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Code4renaCollector)` - Ready to collect
    /// * `Err(AuditError)` - The HTTP client could not be built
    pub fn new(config: &Config, storage: SharedStorage) -> Result<Self, AuditError> {
        let client = build_http_client(&config.user_agent, &config.collector)?;
        Ok(Self::with_parts(
            &config.collector,
            Fetcher::new(client),
            RawDataSink::new(&config.output.raw_data_dir),
            storage,
        ))
    }

    /// Creates a collector from already-built parts
    pub fn with_parts(
        config: &CollectorConfig,
        fetcher: Fetcher,
        sink: RawDataSink,
        storage: SharedStorage,
    ) -> Self {
        Self {
            platform: config.platform.clone(),
            contests_url: config.contests_url(),
            max_concurrent: config.max_concurrent.max(1),
            fetcher,
            sink,
            storage,
        }
    }

    /// Runs one collection and reports both successes and skipped contests
    ///
    /// Contest pages are processed in index order. With `max_concurrent > 1`
    /// several detail pages are fetched at once, but results are still
    /// persisted and returned in index order.
    pub async fn collect_detailed(&self, limit: usize) -> Result<CollectOutcome, AuditError> {
        tracing::info!(
            "Starting collection from {} (limit: {})",
            self.platform,
            limit
        );

        let contests = self.fetcher.list_contests(&self.contests_url, limit).await?;
        self.sink.ensure_dir().await?;

        let mut outcome = CollectOutcome {
            contest_total: contests.len(),
            ..CollectOutcome::default()
        };

        let mut results = stream::iter(contests)
            .map(|contest| async move {
                let result = self.collect_contest(&contest).await;
                (contest, result)
            })
            .buffered(self.max_concurrent);

        while let Some((contest, result)) = results.next().await {
            let report = match result {
                Ok(report) => report,
                Err(CollectError::Validation(e)) => {
                    tracing::warn!("Dropping invalid report for {}: {}", contest.slug, e);
                    outcome.record_failure(&contest.slug, &e);
                    continue;
                }
                Err(e) => {
                    tracing::warn!("Error collecting {}: {}", contest.slug, e);
                    outcome.record_failure(&contest.slug, &e);
                    continue;
                }
            };

            match self.persist(&report, &contest.slug).await {
                Ok(report_id) => {
                    tracing::debug!(
                        "Stored {} as report {} ({} findings)",
                        contest.slug,
                        report_id,
                        report.findings.len()
                    );
                    outcome.reports.push(report);
                }
                Err(e) if is_store_unusable(&e) => return Err(e),
                Err(e) => {
                    tracing::warn!("Error saving {}: {}", contest.slug, e);
                    outcome.record_failure(&contest.slug, &e);
                }
            }
        }

        tracing::info!(
            "Collected {} reports from {} ({} of {} contests failed)",
            outcome.reports.len(),
            self.platform,
            outcome.failures.len(),
            outcome.contest_total
        );

        Ok(outcome)
    }

    /// Fetch, extract and validate a single contest
    async fn collect_contest(&self, contest: &ContestSummary) -> Result<AuditReport, CollectError> {
        let html = self.fetcher.fetch(&contest.url).await?;
        let report = self.parse_report(&html, contest)?;
        validate_report(&report)?;
        Ok(report)
    }

    /// Writes the raw dump, then the relational rows
    ///
    /// A dump whose rows could not be inserted is removed again, so a
    /// contest is either fully persisted or not at all.
    async fn persist(&self, report: &AuditReport, slug: &str) -> Result<i64, AuditError> {
        let path = self.sink.save(report, slug).await?;

        let inserted = lock(&self.storage).and_then(|mut storage| storage.insert_report(report));
        match inserted {
            Ok(report_id) => Ok(report_id),
            Err(e) => {
                if let Err(remove_err) = tokio::fs::remove_file(&path).await {
                    tracing::warn!(
                        "Failed to remove raw data {}: {}",
                        path.display(),
                        remove_err
                    );
                }
                Err(e.into())
            }
        }
    }
}

/// Errors after which no further contest can be stored in this run
fn is_store_unusable(error: &AuditError) -> bool {
    matches!(error, AuditError::Storage(StorageError::LockPoisoned))
}

#[async_trait]
impl Collector for Code4renaCollector {
    fn platform(&self) -> &str {
        &self.platform
    }

    async fn collect(&self, limit: usize) -> Result<Vec<AuditReport>, AuditError> {
        Ok(self.collect_detailed(limit).await?.reports)
    }

    fn parse_report(&self, html: &str, contest: &ContestSummary) -> Result<AuditReport, ParseError> {
        extractor::parse_report(html, contest, &self.platform, Utc::now())
    }
}
