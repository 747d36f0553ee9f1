use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Audit-Intel
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub collector: CollectorConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub api: ApiConfig,
    pub output: OutputConfig,
}

/// Collector behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CollectorConfig {
    /// Display name of the platform, stored on every report
    #[serde(default = "default_platform")]
    pub platform: String,

    /// Root URL of the platform (e.g. "https://code4rena.com")
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Path of the contest index page, relative to the base URL
    #[serde(rename = "contests-path", default = "default_contests_path")]
    pub contests_path: String,

    /// Number of contests collected per run
    #[serde(default = "default_limit")]
    pub limit: usize,

    /// Contest pages fetched in parallel within one run (1 = sequential)
    #[serde(rename = "max-concurrent", default = "default_max_concurrent")]
    pub max_concurrent: usize,

    /// Whole-request timeout in seconds
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// TCP connect timeout in seconds
    #[serde(rename = "connect-timeout-secs", default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

impl CollectorConfig {
    /// Full URL of the contest index page
    pub fn contests_url(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.contests_path.trim_start_matches('/')
        )
    }
}

/// Collection cadence
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerConfig {
    /// Delay between successful runs in seconds
    #[serde(rename = "interval-secs", default = "default_interval")]
    pub interval_secs: u64,

    /// Delay before retrying after a failed run in seconds
    #[serde(rename = "backoff-secs", default = "default_backoff")]
    pub backoff_secs: u64,
}

impl SchedulerConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn backoff(&self) -> Duration {
        Duration::from_secs(self.backoff_secs)
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval(),
            backoff_secs: default_backoff(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the collector
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the collector
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the collector
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for collector-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl UserAgentConfig {
    /// Formats the header value: Name/Version (+ContactURL; ContactEmail)
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

/// Read API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Whether to start the HTTP server alongside the scheduler
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(rename = "bind-address", default = "default_bind_address")]
    pub bind_address: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Number of threads serving requests
    #[serde(default = "default_workers")]
    pub workers: usize,
}

impl ApiConfig {
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bind_address: default_bind_address(),
            port: default_port(),
            workers: default_workers(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,

    /// Directory receiving one JSON dump per collected contest
    #[serde(rename = "raw-data-dir", default = "default_raw_data_dir")]
    pub raw_data_dir: String,
}

fn default_platform() -> String {
    "Code4rena".to_string()
}

fn default_contests_path() -> String {
    "/contests".to_string()
}

fn default_limit() -> usize {
    5
}

fn default_max_concurrent() -> usize {
    1
}

fn default_request_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_interval() -> u64 {
    3600
}

fn default_backoff() -> u64 {
    60
}

fn default_true() -> bool {
    true
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_workers() -> usize {
    4
}

fn default_raw_data_dir() -> String {
    "data/raw".to_string()
}
