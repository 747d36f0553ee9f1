//! Statistics generation from the report database
//!
//! This module provides functionality for extracting and displaying
//! collection statistics from the storage layer.

use crate::collector::Severity;
use crate::storage::Storage;
use crate::AuditError;
use std::collections::HashMap;
use std::fmt::Write;

/// Collection statistics summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionStatistics {
    /// Total number of stored reports
    pub total_reports: u64,

    /// Total number of stored findings
    pub total_findings: u64,

    /// Report count per platform
    pub reports_by_platform: HashMap<String, u64>,

    /// Finding count per severity
    pub findings_by_severity: HashMap<Severity, u64>,
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `storage` - The storage backend to query
///
/// # Returns
///
/// * `Ok(CollectionStatistics)` - Successfully loaded statistics
/// * `Err(AuditError)` - Failed to query statistics
pub fn load_statistics(storage: &dyn Storage) -> Result<CollectionStatistics, AuditError> {
    Ok(CollectionStatistics {
        total_reports: storage.count_reports()?,
        total_findings: storage.count_findings()?,
        reports_by_platform: storage.count_reports_by_platform()?,
        findings_by_severity: storage.count_findings_by_severity()?,
    })
}

/// Renders statistics as the text printed by `--stats`
///
/// Platforms are sorted by report count (descending), severities from
/// critical down to unknown. Severities with no findings are omitted.
pub fn render_statistics(stats: &CollectionStatistics) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "=== Collection Statistics ===\n");
    let _ = writeln!(out, "Overview:");
    let _ = writeln!(out, "  Total reports: {}", stats.total_reports);
    let _ = writeln!(out, "  Total findings: {}", stats.total_findings);
    let _ = writeln!(out);

    if !stats.reports_by_platform.is_empty() {
        let _ = writeln!(out, "Reports by Platform:");
        let mut platforms: Vec<_> = stats.reports_by_platform.iter().collect();
        platforms.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
        for (platform, count) in platforms {
            let _ = writeln!(out, "  {}: {}", platform, count);
        }
        let _ = writeln!(out);
    }

    if !stats.findings_by_severity.is_empty() {
        let _ = writeln!(out, "Findings by Severity:");
        for severity in Severity::ALL {
            let Some(count) = stats.findings_by_severity.get(&severity) else {
                continue;
            };
            let percentage = if stats.total_findings > 0 {
                (*count as f64 / stats.total_findings as f64) * 100.0
            } else {
                0.0
            };
            let _ = writeln!(out, "  {}: {} ({:.1}%)", severity, count, percentage);
        }
    }

    out
}

/// Prints statistics to stdout
pub fn print_statistics(stats: &CollectionStatistics) {
    print!("{}", render_statistics(stats));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::{AuditReport, FindingRecord};
    use crate::storage::SqliteStorage;
    use chrono::Utc;

    fn report(platform: &str, severities: &[Severity]) -> AuditReport {
        AuditReport {
            platform: platform.to_string(),
            title: "Contest".to_string(),
            url: "https://code4rena.com/contests/contest".to_string(),
            date_collected: Utc::now(),
            date_published: None,
            prize_pool: "N/A".to_string(),
            participants: 0,
            findings: severities
                .iter()
                .map(|severity| FindingRecord {
                    severity: *severity,
                    title: "Issue".to_string(),
                    description: String::new(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_load_statistics() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        storage
            .insert_report(&report("Code4rena", &[Severity::High, Severity::High, Severity::Gas]))
            .unwrap();
        storage.insert_report(&report("Code4rena", &[])).unwrap();
        storage
            .insert_report(&report("Sherlock", &[Severity::Medium]))
            .unwrap();

        let stats = load_statistics(&storage).unwrap();

        assert_eq!(stats.total_reports, 3);
        assert_eq!(stats.total_findings, 4);
        assert_eq!(stats.reports_by_platform["Code4rena"], 2);
        assert_eq!(stats.reports_by_platform["Sherlock"], 1);
        assert_eq!(stats.findings_by_severity[&Severity::High], 2);
        assert!(!stats.findings_by_severity.contains_key(&Severity::Critical));
    }

    #[test]
    fn test_render_statistics() {
        let stats = CollectionStatistics {
            total_reports: 3,
            total_findings: 4,
            reports_by_platform: HashMap::from([
                ("Sherlock".to_string(), 1),
                ("Code4rena".to_string(), 2),
            ]),
            findings_by_severity: HashMap::from([(Severity::Gas, 1), (Severity::High, 3)]),
        };

        let text = render_statistics(&stats);

        assert!(text.contains("Total reports: 3"));
        assert!(text.contains("  high: 3 (75.0%)"));
        assert!(text.find("Code4rena: 2").unwrap() < text.find("Sherlock: 1").unwrap());
        assert!(text.find("high:").unwrap() < text.find("gas:").unwrap());
        assert!(!text.contains("critical"));
    }

    #[test]
    fn test_render_empty_statistics() {
        let text = render_statistics(&CollectionStatistics::default());
        assert!(text.contains("Total findings: 0"));
        assert!(!text.contains("Reports by Platform"));
    }
}
