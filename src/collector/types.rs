//! Records produced by a collection run

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A contest listed on the platform's index page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContestSummary {
    /// Platform identifier of the contest (from `data-slug`)
    pub slug: String,

    /// Contest name as shown on the index card
    pub title: String,

    /// Absolute URL of the contest detail page
    pub url: String,
}

/// Severity classification of a finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
    Qa,
    Gas,
    Unknown,
}

impl Severity {
    pub const ALL: [Severity; 7] = [
        Self::Critical,
        Self::High,
        Self::Medium,
        Self::Low,
        Self::Qa,
        Self::Gas,
        Self::Unknown,
    ];

    /// Parses a `data-severity` attribute value; anything unrecognised is `Unknown`
    pub fn from_attr(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "critical" => Self::Critical,
            "high" => Self::High,
            "medium" => Self::Medium,
            "low" => Self::Low,
            "qa" => Self::Qa,
            "gas" => Self::Gas,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
            Self::Qa => "qa",
            Self::Gas => "gas",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One reported vulnerability within a contest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindingRecord {
    pub severity: Severity,
    pub title: String,
    pub description: String,
}

/// Normalized record of one collected contest
///
/// Built once by a collector, persisted once, never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditReport {
    pub platform: String,
    pub title: String,
    pub url: String,
    pub date_collected: DateTime<Utc>,
    pub date_published: Option<DateTime<Utc>>,
    pub prize_pool: String,
    pub participants: u32,
    pub findings: Vec<FindingRecord>,
}

impl AuditReport {
    /// Serialized form of the whole record, stored as the raw dump
    pub fn raw_data(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
