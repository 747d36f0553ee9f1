//! HTML extraction for contest pages
//!
//! This module turns fetched platform pages into typed records:
//! - The contest index page into a list of [`ContestSummary`]
//! - A contest detail page into an [`AuditReport`]
//!
//! Every field extractor is tolerant on its own: a missing or malformed node
//! yields that field's default instead of failing the whole record, since the
//! platform's markup changes one field at a time.

use crate::collector::types::{AuditReport, ContestSummary, FindingRecord, Severity};
use crate::ParseError;
use chrono::{DateTime, NaiveDate, Utc};
use scraper::{ElementRef, Html, Selector};

const CONTEST_CARD: &str = "div.contest-card";
const FINDING: &str = "div.finding";
const PRIZE_POOL: &str = "div.prize-pool";
const PARTICIPANTS: &str = "span.participants-count";
const PUBLISHED: &str = "time.published[datetime]";
const CONTEST_HEADER: &str = ".contest-header";

/// Containers of which at least one must exist on a contest page
const CONTEST_CONTAINERS: [&str; 4] = [FINDING, PRIZE_POOL, PARTICIPANTS, CONTEST_HEADER];

/// Default prize pool text when the page does not show one
pub const PRIZE_POOL_UNAVAILABLE: &str = "N/A";

/// Parses a contest detail page into a report
///
/// The report title and URL come from the index card; everything else is read
/// from the page.
///
/// # Errors
///
/// * `ParseError::EmptyDocument` - The page has no content at all
/// * `ParseError::MissingContainer` - None of the contest containers are
///   present, which is what error and login pages look like
///
/// # Example
///
/// ```
/// use audit_intel::collector::{parse_report, ContestSummary};
/// use chrono::Utc;
///
/// let html = r#"<div class="prize-pool">$50,000 USDC</div>
///               <div class="finding" data-severity="high"><h4>Reentrancy</h4></div>"#;
/// let contest = ContestSummary {
///     slug: "vault".to_string(),
///     title: "Vault".to_string(),
///     url: "https://code4rena.com/contests/vault".to_string(),
/// };
/// let report = parse_report(html, &contest, "Code4rena", Utc::now()).unwrap();
/// assert_eq!(report.prize_pool, "$50,000 USDC");
/// assert_eq!(report.findings.len(), 1);
/// ```
pub fn parse_report(
    html: &str,
    contest: &ContestSummary,
    platform: &str,
    collected_at: DateTime<Utc>,
) -> Result<AuditReport, ParseError> {
    if html.trim().is_empty() {
        return Err(ParseError::EmptyDocument);
    }

    let document = Html::parse_document(html);

    if !has_contest_container(&document) {
        return Err(ParseError::MissingContainer {
            selectors: CONTEST_CONTAINERS.join(", "),
        });
    }

    Ok(AuditReport {
        platform: platform.to_string(),
        title: contest.title.clone(),
        url: contest.url.clone(),
        date_collected: collected_at,
        date_published: extract_published_date(&document),
        prize_pool: extract_prize_pool(&document),
        participants: extract_participants(&document),
        findings: extract_findings(&document),
    })
}

fn has_contest_container(document: &Html) -> bool {
    CONTEST_CONTAINERS.iter().any(|css| {
        Selector::parse(css)
            .map(|selector| document.select(&selector).next().is_some())
            .unwrap_or(false)
    })
}

/// Extracts every finding in document order
///
/// Severity defaults to `unknown`, title and description to an empty string.
pub fn extract_findings(document: &Html) -> Vec<FindingRecord> {
    let Ok(finding_selector) = Selector::parse(FINDING) else {
        return Vec::new();
    };

    document
        .select(&finding_selector)
        .map(|element| FindingRecord {
            severity: element
                .value()
                .attr("data-severity")
                .map(Severity::from_attr)
                .unwrap_or(Severity::Unknown),
            title: first_text(&element, "h4").unwrap_or_default(),
            description: first_text(&element, "p").unwrap_or_default(),
        })
        .collect()
}

/// Extracts the prize pool text, `"N/A"` if absent
pub fn extract_prize_pool(document: &Html) -> String {
    document_text(document, PRIZE_POOL).unwrap_or_else(|| PRIZE_POOL_UNAVAILABLE.to_string())
}

/// Extracts the participant count, `0` if absent or not a number
///
/// Thousands separators are ignored, so "1,204" reads as 1204.
pub fn extract_participants(document: &Html) -> u32 {
    document_text(document, PARTICIPANTS)
        .and_then(|text| text.replace(',', "").trim().parse::<u32>().ok())
        .unwrap_or(0)
}

/// Extracts the publication date from `<time class="published" datetime="...">`
///
/// Accepts RFC 3339 timestamps or plain `YYYY-MM-DD` dates (read as midnight UTC).
pub fn extract_published_date(document: &Html) -> Option<DateTime<Utc>> {
    let selector = Selector::parse(PUBLISHED).ok()?;
    let raw = document
        .select(&selector)
        .next()?
        .value()
        .attr("datetime")?
        .trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()?
        .and_hms_opt(0, 0, 0)
        .map(|naive| naive.and_utc())
}

/// Parses the contest index page into at most `limit` contests, in page order
///
/// Cards without a `data-slug` cannot be addressed and are skipped. A card
/// without a heading keeps an empty title; validation drops the resulting
/// report later.
pub fn parse_contest_index(html: &str, contests_url: &str, limit: usize) -> Vec<ContestSummary> {
    let document = Html::parse_document(html);
    let Ok(card_selector) = Selector::parse(CONTEST_CARD) else {
        return Vec::new();
    };
    let base = contests_url.trim_end_matches('/');

    document
        .select(&card_selector)
        .filter_map(|card| {
            let slug = card
                .value()
                .attr("data-slug")
                .map(str::trim)
                .filter(|s| !s.is_empty());

            let Some(slug) = slug else {
                tracing::debug!("Skipping contest card without data-slug");
                return None;
            };

            Some(ContestSummary {
                slug: slug.to_string(),
                title: first_text(&card, "h3").unwrap_or_default(),
                url: format!("{}/{}", base, slug),
            })
        })
        .take(limit)
        .collect()
}

/// Trimmed text of the first match of `css` anywhere in the document
fn document_text(document: &Html, css: &str) -> Option<String> {
    let selector = Selector::parse(css).ok()?;
    document
        .select(&selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
}

/// Trimmed text of the first descendant of `element` matching `css`
fn first_text(element: &ElementRef<'_>, css: &str) -> Option<String> {
    let selector = Selector::parse(css).ok()?;
    element
        .select(&selector)
        .next()
        .map(|child| child.text().collect::<String>().trim().to_string())
}
