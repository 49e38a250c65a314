use std::collections::HashSet;

use serde_json::Value;

use crate::domain::models::{Platform, ServiceRecord, TestGroupSummary, TestStatus};
use crate::error::CertError;
use crate::services::attestation::{self, ATTESTATION_SERVICE};
use crate::services::classify;
use crate::services::journal::LogSource;
use crate::services::text::{self, TAB_WIDTH};

/// List the services that logged the platform's discovery metadata field for
/// this suite version, in first-seen order. A service may log the field
/// several times across restarts within one window, so duplicates are
/// dropped through a seen-set while the first occurrence keeps its place.
pub fn discover_services(
    source: &dyn LogSource,
    platform: Platform,
    version: &str,
) -> Result<Vec<String>, CertError> {
    let filter = format!("{}={}", platform.discovery_field(), version);
    let listing = source.query(platform, &[&filter, "-o", "json"])?;
    let mut seen = HashSet::new();
    let mut services = Vec::new();
    for line in listing.lines().filter(|line| !line.trim().is_empty()) {
        let entry: Value = serde_json::from_str(line).map_err(|error| CertError::LogQuery {
            command: format!("journalctl {filter} -o json"),
            reason: format!("unparseable journal entry: {error}"),
        })?;
        let Some(unit) = entry.get("_SYSTEMD_UNIT").and_then(Value::as_str) else {
            continue;
        };
        if !unit.to_lowercase().contains("service") {
            continue;
        }
        if seen.insert(unit.to_string()) {
            services.push(unit.to_string());
        }
    }
    Ok(services)
}

/// Build the summary of one test group: classify and describe every
/// discovered service, attach failure detail to failed ones and the inline
/// attestation trace to the guest attestation unit, then reduce the
/// aggregate status.
pub fn build_group_summary(
    source: &dyn LogSource,
    platform: Platform,
    version: &str,
) -> Result<TestGroupSummary, CertError> {
    let mut services = Vec::new();
    let mut attestation_steps = None;
    for name in discover_services(source, platform, version)? {
        let status = classify::classify_service(source, platform, &name)?;
        let description = classify::describe_service(source, platform, &name)?;
        let error_detail = if status == TestStatus::Failed {
            Some(classify::extract_service_error(source, platform, &name)?)
        } else {
            None
        };
        // The attestation trace is inlined under its unit regardless of the
        // unit's own top-level status.
        let steps = if platform == Platform::Guest
            && name.to_lowercase().contains(ATTESTATION_SERVICE)
        {
            if attestation_steps.is_none() {
                attestation_steps = Some(attestation::fetch_steps(source)?);
            }
            attestation_steps.clone()
        } else {
            None
        };
        services.push(ServiceRecord {
            name,
            status,
            description,
            error_detail,
            attestation_steps: steps,
        });
    }
    let aggregate = aggregate_status(&services);
    Ok(TestGroupSummary {
        version_tag: version.to_string(),
        platform,
        services,
        aggregate,
    })
}

/// Reduce member statuses to one group status: any failure marks the group
/// failed; otherwise any skip marks it skipped; otherwise passed. Unknown
/// members carry no verdict and count toward passed. An empty group has
/// nothing to vouch for and stays unknown.
pub fn aggregate_status(services: &[ServiceRecord]) -> TestStatus {
    if services.is_empty() {
        return TestStatus::Unknown;
    }
    if services.iter().any(|s| s.status == TestStatus::Failed) {
        TestStatus::Failed
    } else if services.iter().any(|s| s.status == TestStatus::Skipped) {
        TestStatus::Skipped
    } else {
        TestStatus::Passed
    }
}

/// Render one group summary: a bracketed aggregate-glyph header, then one
/// line per service with attestation steps and failure detail nested under
/// it. Tabs are expanded as the final normalization step.
pub fn render_group_summary(summary: &TestGroupSummary) -> String {
    let mut content = String::new();
    for service in &summary.services {
        content.push_str(&format!("\t{} {} :", service.status.glyph(), service.name));
        content.push_str(&format!("  {}\n", service.description));
        if let Some(steps) = &service.attestation_steps {
            for (step, status) in steps {
                content.push_str(&format!("\t\t\t {} {}\n", status.glyph(), step));
            }
            content.push('\n');
        }
        if service.status == TestStatus::Failed {
            let detail = service.error_detail.as_deref().unwrap_or_default();
            content.push_str(&format!(
                "\t\t{} fails !!! Please check below for more details:",
                service.name
            ));
            content.push('\n');
            content.push_str(&text::indent(detail, "\t\t"));
            content.push('\n');
        }
    }
    let header = format!(
        "\n[ {} ] SEV VERSION {} SNP {} TESTS\n",
        summary.aggregate.glyph(),
        summary.version_tag,
        summary.platform.group_label(),
    );
    text::expand_tabs(&(header + &content), TAB_WIDTH)
}
