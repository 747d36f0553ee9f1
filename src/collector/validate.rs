use crate::collector::types::AuditReport;
use crate::ValidationError;

/// Checks that a report carries every field a stored report needs
///
/// Title, platform and url must be non-blank. The collection date and the
/// findings list are always present on a typed report; an empty findings
/// list is valid.
pub fn validate_report(report: &AuditReport) -> Result<(), ValidationError> {
    if report.title.trim().is_empty() {
        return Err(ValidationError::MissingField("title"));
    }

    if report.platform.trim().is_empty() {
        return Err(ValidationError::MissingField("platform"));
    }

    if report.url.trim().is_empty() {
        return Err(ValidationError::MissingField("url"));
    }

    Ok(())
}
