//! Shared fixtures for the integration tests

use audit_intel::config::{
    ApiConfig, CollectorConfig, Config, OutputConfig, SchedulerConfig, UserAgentConfig,
};
use audit_intel::storage::{open_storage, SharedStorage};
use audit_intel::Code4renaCollector;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing at a mock platform
pub fn create_test_config(base_url: &str, dir: &Path) -> Config {
    Config {
        collector: CollectorConfig {
            platform: "Code4rena".to_string(),
            base_url: base_url.to_string(),
            contests_path: "/contests".to_string(),
            limit: 5,
            max_concurrent: 1,
            request_timeout_secs: 5,
            connect_timeout_secs: 2,
        },
        scheduler: SchedulerConfig::default(),
        user_agent: UserAgentConfig {
            crawler_name: "TestCollector".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
            contact_email: "test@example.com".to_string(),
        },
        api: ApiConfig {
            enabled: true,
            bind_address: "127.0.0.1".to_string(),
            port: 0,
            workers: 2,
        },
        output: OutputConfig {
            database_path: dir.join("audit.db").to_string_lossy().into_owned(),
            raw_data_dir: dir.join("raw").to_string_lossy().into_owned(),
        },
    }
}

/// A mock platform plus a collector and file-backed storage wired to it
pub struct TestPlatform {
    pub server: MockServer,
    pub dir: TempDir,
    pub config: Config,
    pub storage: SharedStorage,
    pub collector: Code4renaCollector,
}

impl TestPlatform {
    pub async fn start() -> Self {
        Self::start_with(|_| {}).await
    }

    /// Starts with the test configuration adjusted by `configure`
    pub async fn start_with(configure: impl FnOnce(&mut Config)) -> Self {
        let server = MockServer::start().await;
        let dir = TempDir::new().expect("Failed to create temp dir");
        let mut config = create_test_config(&server.uri(), dir.path());
        configure(&mut config);
        let storage = open_storage(Path::new(&config.output.database_path))
            .expect("Failed to open storage");
        let collector =
            Code4renaCollector::new(&config, storage.clone()).expect("Failed to build collector");

        Self {
            server,
            dir,
            config,
            storage,
            collector,
        }
    }

    /// Serves an index page listing `(slug, title)` cards
    pub async fn mount_index(&self, contests: &[(&str, &str)]) {
        let cards: String = contests
            .iter()
            .map(|(slug, title)| {
                format!(
                    r#"<div class="contest-card" data-slug="{}"><h3>{}</h3></div>"#,
                    slug, title
                )
            })
            .collect();

        Mock::given(method("GET"))
            .and(path("/contests"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(format!("<html><body>{}</body></html>", cards)),
            )
            .mount(&self.server)
            .await;
    }

    /// Serves a well-formed contest page for `slug`
    pub async fn mount_contest(&self, slug: &str) {
        Mock::given(method("GET"))
            .and(path(format!("/contests/{}", slug)))
            .respond_with(ResponseTemplate::new(200).set_body_string(contest_page()))
            .mount(&self.server)
            .await;
    }

    pub async fn mount_status(&self, slug: &str, status: u16) {
        Mock::given(method("GET"))
            .and(path(format!("/contests/{}", slug)))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.server)
            .await;
    }

    /// Serves a well-formed contest page only after `delay`
    pub async fn mount_slow_contest(&self, slug: &str, delay: Duration) {
        Mock::given(method("GET"))
            .and(path(format!("/contests/{}", slug)))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(contest_page())
                    .set_delay(delay),
            )
            .mount(&self.server)
            .await;
    }

    pub fn raw_files(&self) -> usize {
        std::fs::read_dir(self.dir.path().join("raw"))
            .map(|entries| entries.count())
            .unwrap_or(0)
    }
}

/// A contest page with a prize pool, participants, a date, and three findings
pub fn contest_page() -> String {
    r#"<html><body>
        <div class="contest-header"><h1>Contest</h1></div>
        <div class="prize-pool">$100,000 USDC</div>
        <span class="participants-count">1,204</span>
        <time class="published" datetime="2024-03-01">March 1</time>
        <div class="finding" data-severity="High"><h4>Reentrancy in withdraw</h4><p>State updated after call.</p></div>
        <div class="finding" data-severity="medium"><h4>Unchecked return</h4><p>transfer result ignored.</p></div>
        <div class="finding" data-severity="gas"><h4>Cache length</h4></div>
    </body></html>"#
        .to_string()
}
