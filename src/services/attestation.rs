use serde_json::Value;

use crate::domain::models::{Platform, StepStatus};
use crate::error::CertError;
use crate::services::journal::LogSource;

/// Unit whose log stream carries the step-by-step attestation trace.
pub const ATTESTATION_SERVICE: &str = "fetch-snpguest-attestation-status.service";

/// Fetch and parse the guest attestation trace into an ordered
/// step → status mapping.
pub fn fetch_steps(source: &dyn LogSource) -> Result<Vec<(String, StepStatus)>, CertError> {
    let log = source.query(Platform::Guest, &["-u", ATTESTATION_SERVICE, "-o", "cat"])?;
    parse_steps(&log)
}

/// Parse every embedded `{...}` fragment as a JSON object of integer-like
/// status codes and merge them into one ordered mapping: later values
/// overwrite earlier ones, positions keep the first sighting of a key.
///
/// A fragment that fails to decode is a hard error. A corrupted attestation
/// trace must never be silently summarized as healthy.
pub fn parse_steps(log: &str) -> Result<Vec<(String, StepStatus)>, CertError> {
    let mut steps: Vec<(String, StepStatus)> = Vec::new();
    for fragment in extract_fragments(log) {
        let object: serde_json::Map<String, Value> =
            serde_json::from_str(fragment).map_err(|source| CertError::AttestationParse {
                fragment: fragment.to_string(),
                reason: source.to_string(),
            })?;
        for (step, code) in object {
            let status = step_status(&code).ok_or_else(|| CertError::AttestationParse {
                fragment: fragment.to_string(),
                reason: format!("status for {step:?} is not an integer"),
            })?;
            match steps.iter_mut().find(|(name, _)| *name == step) {
                Some(entry) => entry.1 = status,
                None => steps.push((step, status)),
            }
        }
    }
    Ok(steps)
}

/// Extract every brace-balanced `{...}` fragment. The scanner counts
/// nesting depth, so an object containing a nested object comes out as one
/// fragment. A `}` inside a JSON string value still terminates matching
/// early; the attestation trace format has no such values today.
fn extract_fragments(text: &str) -> Vec<&str> {
    let mut fragments = Vec::new();
    let mut open = None;
    let mut depth = 0usize;
    for (at, ch) in text.char_indices() {
        match ch {
            '{' => {
                if open.is_none() {
                    open = Some(at);
                }
                depth += 1;
            }
            '}' => {
                if let Some(start) = open {
                    depth -= 1;
                    if depth == 0 {
                        fragments.push(&text[start..=at]);
                        open = None;
                    }
                }
            }
            _ => {}
        }
    }
    fragments
}

fn step_status(code: &Value) -> Option<StepStatus> {
    let code = match code {
        Value::Number(number) => number.as_i64()?,
        Value::String(text) => text.trim().parse().ok()?,
        _ => return None,
    };
    Some(if code == 0 {
        StepStatus::Passed
    } else {
        StepStatus::Failed
    })
}
