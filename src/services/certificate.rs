use crate::domain::models::{Certificate, Platform};
use crate::error::CertError;
use crate::services::environment::{self, EnvProbes};
use crate::services::journal::LogSource;
use crate::services::summary;
use crate::services::text::{self, TAB_WIDTH};

/// Assemble the certificate: environment snapshot, host and guest group
/// summaries, and the raw log excerpt for the version's time window.
/// Any classification, description or attestation error aborts here and no
/// partial certificate is emitted.
pub fn build_certificate(
    source: &dyn LogSource,
    probes: &dyn EnvProbes,
    version: &str,
) -> Result<Certificate, CertError> {
    let environment = environment::test_environment_details(source, probes)?;
    let host = summary::build_group_summary(source, Platform::Host, version)?;
    let guest = summary::build_group_summary(source, Platform::Guest, version)?;
    let log = version_log(source, version)?;
    Ok(Certificate {
        version: version.to_string(),
        environment,
        host_summary: summary::render_group_summary(&host),
        guest_summary: summary::render_group_summary(&guest),
        log,
    })
}

/// The verbatim journal excerpt for the version's window: UTC timestamps,
/// no hostname column.
pub fn version_log(source: &dyn LogSource, version: &str) -> Result<String, CertError> {
    let filter = format!("SEV_VERSION={version}");
    source.query(Platform::Host, &[&filter, "--no-hostname", "--utc"])
}

/// Concatenate the certificate sections in fixed order and expand tabs as
/// the last step. The returned text is the literal artifact to print,
/// persist or publish; nothing transforms it afterwards.
pub fn render_certificate(certificate: &Certificate) -> String {
    let mut content = String::from("\n ====== SEV CERTIFICATE ====== \n");
    content.push_str(&format!("\n SEV VERSION: {} \n", certificate.version));
    content.push_str("\n === TEST ENVIRONMENT DETAILS === \n");
    content.push_str(&certificate.environment);
    content.push_str("\n=== SUMMARY ===\n");
    content.push_str(&certificate.host_summary);
    content.push_str(&certificate.guest_summary);
    content.push_str(&format!("\n=== SEV VERSION {} LOG ===\n", certificate.version));
    content.push_str(&certificate.log);
    text::expand_tabs(&content, TAB_WIDTH)
}
