use regex::Regex;

use crate::domain::models::{Platform, TestStatus};
use crate::error::CertError;
use crate::services::journal::LogSource;

/// Classification patterns in priority order; the first match wins.
///
/// The order is a policy, not an accident: a log window that carries both a
/// skip marker and a stale success marker must classify as skipped, and a
/// failure must never be shadowed by an unrelated success line.
fn status_patterns(service: &str) -> Vec<(TestStatus, Regex)> {
    let service = regex::escape(service);
    vec![
        (
            TestStatus::Failed,
            Regex::new(&format!("(?i)Failed to start {service} ")).expect("valid failure pattern"),
        ),
        (
            TestStatus::Skipped,
            Regex::new("(?i)was skipped").expect("valid skip pattern"),
        ),
        (
            TestStatus::Passed,
            Regex::new(&format!("(?i){service}: Deactivated successfully"))
                .expect("valid success pattern"),
        ),
    ]
}

/// Derive the tri-state status of a service from its raw unit log.
/// No recognized marker means `Unknown`; a failing query propagates.
pub fn classify_service(
    source: &dyn LogSource,
    platform: Platform,
    service: &str,
) -> Result<TestStatus, CertError> {
    let message = source.query(platform, &["-u", service, "-o", "cat"])?;
    for (status, pattern) in status_patterns(service) {
        if pattern.is_match(&message) {
            return Ok(status);
        }
    }
    Ok(TestStatus::Unknown)
}

/// Extract the one-line description from the journal line announcing the
/// unit start, i.e. the text after the first `- ` separator.
pub fn describe_service(
    source: &dyn LogSource,
    platform: Platform,
    service: &str,
) -> Result<String, CertError> {
    let journal = source.query(platform, &["-o", "cat"])?;
    let needle = service.to_lowercase();
    let line = journal.lines().find(|line| {
        let lowered = line.to_lowercase();
        lowered.contains("starting") && lowered.contains(&needle)
    });
    let Some(line) = line else {
        return Err(CertError::MalformedDescription {
            service: service.to_string(),
            detail: "no journal line announcing the unit start".to_string(),
        });
    };
    let separator = Regex::new(r"-\s+").expect("valid separator pattern");
    let result = match separator.splitn(line, 2).nth(1) {
        Some(description) => Ok(description.trim().to_string()),
        None => Err(CertError::MalformedDescription {
            service: service.to_string(),
            detail: format!("missing `- ` separator in {line:?}"),
        }),
    };
    result
}

/// Extract and clean the error body of a failed service: the whole unit
/// block minus systemd framework noise, with journal metadata prefixes
/// stripped. Best-effort cleanup; an empty result is valid.
pub fn extract_service_error(
    source: &dyn LogSource,
    platform: Platform,
    service: &str,
) -> Result<String, CertError> {
    let block = source.query(platform, &["-u", service])?;
    let cleaned: Vec<&str> = block
        .trim()
        .lines()
        .filter(|line| !line.to_lowercase().contains("systemd"))
        .map(|line| match line.rfind("]:") {
            Some(at) => &line[at + 2..],
            None => line,
        })
        .collect();
    Ok(cleaned.join("\n").trim().to_string())
}
