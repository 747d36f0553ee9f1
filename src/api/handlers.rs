//! Request routing and endpoint handlers
//!
//! Routing is a pure function from method and URL to an [`ApiResponse`], so
//! every endpoint can be exercised without a socket.

use super::ApiState;
use crate::storage::{lock, Storage};
use crate::AuditError;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashMap;

/// Greeting served on `GET /`
pub const ROOT_MESSAGE: &str = "Web3 Audit Intelligence System API";

const DEFAULT_REPORT_LIMIT: i64 = 10;
const MAX_REPORT_LIMIT: i64 = 100;

/// Status code and JSON body of a response
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    fn ok<T: Serialize>(value: &T) -> Result<Self, AuditError> {
        Ok(Self::new(200, serde_json::to_value(value)?))
    }

    fn detail(status: u16, detail: &str) -> Self {
        Self::new(status, json!({ "detail": detail }))
    }

    fn not_found() -> Self {
        Self::detail(404, "Not Found")
    }

    /// A 422 naming the offending parameter
    fn invalid(location: &str, field: &str, msg: String) -> Self {
        Self::new(
            422,
            json!({ "detail": [{ "loc": [location, field], "msg": msg }] }),
        )
    }
}

/// Routes one request
///
/// Storage and serialization failures become a 500; the cause is logged but
/// not exposed.
pub fn route(state: &ApiState, method: &str, url: &str) -> ApiResponse {
    let (path, query) = url.split_once('?').unwrap_or((url, ""));
    let path = match path.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    };
    let params = parse_query(query);
    // Exactly one segment after /reports/
    let report_segment = path
        .strip_prefix("/reports/")
        .filter(|rest| !rest.contains('/'));

    let result = match (method, path, report_segment) {
        ("GET", "/", _) => Ok(ApiResponse::new(200, json!({ "message": ROOT_MESSAGE }))),
        ("GET", "/reports", _) => list_reports(state, &params),
        ("GET", "/findings", _) => list_findings(state, &params),
        ("POST", "/collect", _) => Ok(trigger_collection(state, &params)),
        ("GET", _, Some(raw_id)) => get_report(state, raw_id),
        (_, "/" | "/reports" | "/findings" | "/collect", _) | (_, _, Some(_)) => {
            Ok(ApiResponse::detail(405, "Method Not Allowed"))
        }
        _ => Ok(ApiResponse::not_found()),
    };

    result.unwrap_or_else(|e| {
        tracing::error!("Request {} {} failed: {}", method, url, e);
        ApiResponse::detail(500, "Internal Server Error")
    })
}

/// Decodes a query string; a repeated key keeps its last value
fn parse_query(query: &str) -> HashMap<String, String> {
    url::form_urlencoded::parse(query.as_bytes())
        .into_owned()
        .collect()
}

/// GET /reports?platform=&limit=
fn list_reports(
    state: &ApiState,
    params: &HashMap<String, String>,
) -> Result<ApiResponse, AuditError> {
    let limit = match params.get("limit") {
        None => DEFAULT_REPORT_LIMIT,
        Some(raw) => match raw.parse::<i64>() {
            Ok(limit) => limit,
            Err(_) => {
                return Ok(ApiResponse::invalid(
                    "query",
                    "limit",
                    "value is not a valid integer".to_string(),
                ))
            }
        },
    };

    if !(1..=MAX_REPORT_LIMIT).contains(&limit) {
        return Ok(ApiResponse::invalid(
            "query",
            "limit",
            format!("ensure this value is between 1 and {}", MAX_REPORT_LIMIT),
        ));
    }

    let platform = params.get("platform").map(String::as_str);
    let reports = lock(&state.storage)?.get_reports(platform, limit as usize)?;
    ApiResponse::ok(&reports)
}

/// GET /reports/{id}
fn get_report(state: &ApiState, raw_id: &str) -> Result<ApiResponse, AuditError> {
    let Ok(report_id) = raw_id.parse::<i64>() else {
        return Ok(ApiResponse::invalid(
            "path",
            "report_id",
            "value is not a valid integer".to_string(),
        ));
    };

    match lock(&state.storage)?.get_report(report_id)? {
        Some(report) => ApiResponse::ok(&report),
        None => Ok(ApiResponse::detail(404, "Report not found")),
    }
}

/// GET /findings?severity=&report_id=
fn list_findings(
    state: &ApiState,
    params: &HashMap<String, String>,
) -> Result<ApiResponse, AuditError> {
    let report_id = match params.get("report_id") {
        None => None,
        Some(raw) => match raw.parse::<i64>() {
            Ok(id) => Some(id),
            Err(_) => {
                return Ok(ApiResponse::invalid(
                    "query",
                    "report_id",
                    "value is not a valid integer".to_string(),
                ))
            }
        },
    };

    let severity = params.get("severity").map(String::as_str);
    let findings = lock(&state.storage)?.get_findings(severity, report_id)?;
    ApiResponse::ok(&findings)
}

/// POST /collect?platform=
///
/// Wakes the scheduler and returns without waiting for the collection.
fn trigger_collection(state: &ApiState, params: &HashMap<String, String>) -> ApiResponse {
    let Some(platform) = params.get("platform").filter(|p| !p.trim().is_empty()) else {
        return ApiResponse::invalid("query", "platform", "field required".to_string());
    };

    let Some(known) = state
        .platforms
        .iter()
        .find(|known| known.eq_ignore_ascii_case(platform))
    else {
        return ApiResponse::detail(404, &format!("No collector for platform {}", platform));
    };

    tracing::info!("Collection requested for {}", known);
    state.trigger.notify_one();

    ApiResponse::new(
        200,
        json!({ "message": format!("Collection started for {}", known) }),
    )
}
