//! Collection pipeline tests against a mock platform

use crate::support::TestPlatform;
use audit_intel::storage::{lock, SqliteStorage, Storage};
use audit_intel::{Collector, Severity};
use std::path::Path;
use std::time::Duration;

#[tokio::test]
async fn test_full_collection_persists_reports() {
    let platform = TestPlatform::start().await;
    platform
        .mount_index(&[("vault", "Vault Protocol"), ("dex", "DEX Router")])
        .await;
    platform.mount_contest("vault").await;
    platform.mount_contest("dex").await;

    let reports = platform.collector.collect(5).await.unwrap();

    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0].title, "Vault Protocol");
    assert_eq!(reports[0].url, format!("{}/contests/vault", platform.server.uri()));
    assert_eq!(reports[0].prize_pool, "$100,000 USDC");
    assert_eq!(reports[0].participants, 1204);
    assert!(reports[0].date_published.is_some());

    let severities: Vec<_> = reports[0].findings.iter().map(|f| f.severity).collect();
    assert_eq!(severities, vec![Severity::High, Severity::Medium, Severity::Gas]);

    // One raw dump per stored report
    assert_eq!(platform.raw_files(), 2);

    // Data survives reopening the database file
    let reopened = SqliteStorage::new(Path::new(&platform.config.output.database_path)).unwrap();
    assert_eq!(reopened.count_reports().unwrap(), 2);
    assert_eq!(reopened.count_findings().unwrap(), 6);
}

#[tokio::test]
async fn test_partial_failure_skips_one_contest() {
    let platform = TestPlatform::start().await;
    let contests = [
        ("c1", "Contest 1"),
        ("c2", "Contest 2"),
        ("c3", "Contest 3"),
        ("c4", "Contest 4"),
        ("c5", "Contest 5"),
    ];
    platform.mount_index(&contests).await;
    for (slug, _) in contests {
        if slug == "c3" {
            platform.mount_status(slug, 500).await;
        } else {
            platform.mount_contest(slug).await;
        }
    }

    let outcome = platform.collector.collect_detailed(5).await.unwrap();

    assert_eq!(outcome.contest_total, 5);
    let titles: Vec<_> = outcome.reports.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["Contest 1", "Contest 2", "Contest 4", "Contest 5"]);
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].slug, "c3");
    assert!(outcome.failures[0].error.contains("500"));

    assert_eq!(lock(&platform.storage).unwrap().count_reports().unwrap(), 4);
    assert_eq!(platform.raw_files(), 4);
}

#[tokio::test]
async fn test_detail_page_timeout_skips_one_contest() {
    let platform = TestPlatform::start_with(|config| {
        config.collector.request_timeout_secs = 1;
    })
    .await;
    platform
        .mount_index(&[("fast", "Fast"), ("stalled", "Stalled"), ("after", "After")])
        .await;
    platform.mount_contest("fast").await;
    platform
        .mount_slow_contest("stalled", Duration::from_secs(3))
        .await;
    platform.mount_contest("after").await;

    let outcome = platform.collector.collect_detailed(5).await.unwrap();

    let titles: Vec<_> = outcome.reports.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["Fast", "After"]);
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].slug, "stalled");
    assert!(outcome.failures[0].error.contains("timeout"));

    assert_eq!(lock(&platform.storage).unwrap().count_reports().unwrap(), 2);
}

#[tokio::test]
async fn test_report_without_title_is_dropped() {
    let platform = TestPlatform::start().await;
    platform
        .mount_index(&[("untitled", ""), ("named", "Named Contest")])
        .await;
    platform.mount_contest("untitled").await;
    platform.mount_contest("named").await;

    let outcome = platform.collector.collect_detailed(5).await.unwrap();

    assert_eq!(outcome.reports.len(), 1);
    assert_eq!(outcome.reports[0].title, "Named Contest");
    assert_eq!(outcome.failures[0].slug, "untitled");

    let storage = lock(&platform.storage).unwrap();
    let stored = storage.get_reports(None, 10).unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].title, "Named Contest");
    assert_eq!(platform.raw_files(), 1);
}

#[tokio::test]
async fn test_limit_caps_collection() {
    let platform = TestPlatform::start().await;
    let contests: Vec<(String, String)> = (1..=8)
        .map(|i| (format!("c{}", i), format!("Contest {}", i)))
        .collect();
    let borrowed: Vec<(&str, &str)> = contests
        .iter()
        .map(|(slug, title)| (slug.as_str(), title.as_str()))
        .collect();
    platform.mount_index(&borrowed).await;
    for (slug, _) in &borrowed {
        platform.mount_contest(slug).await;
    }

    let reports = platform.collector.collect(3).await.unwrap();

    assert_eq!(reports.len(), 3);
    assert_eq!(reports[2].title, "Contest 3");
}

#[tokio::test]
async fn test_fewer_contests_than_limit() {
    let platform = TestPlatform::start().await;
    platform.mount_index(&[("a", "A"), ("b", "B")]).await;
    platform.mount_contest("a").await;
    platform.mount_contest("b").await;

    let reports = platform.collector.collect(5).await.unwrap();

    assert_eq!(reports.len(), 2);
}

#[tokio::test]
async fn test_unreachable_platform_is_an_error() {
    let platform = TestPlatform::start().await;
    // Nothing mounted: the index answers 404

    let result = platform.collector.collect(5).await;

    assert!(result.is_err());
    assert_eq!(lock(&platform.storage).unwrap().count_reports().unwrap(), 0);
}
