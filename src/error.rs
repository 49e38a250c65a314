use thiserror::Error;

/// Failure taxonomy for certificate generation.
///
/// Classification, description and attestation errors abort the whole run:
/// a report with an unreadable status for one service is not trustworthy.
/// The guest environment probe is the one fault-tolerant exception and
/// degrades inline instead of surfacing here.
#[derive(Debug, Error)]
pub enum CertError {
    #[error("journal query `{command}` failed: {reason}")]
    LogQuery { command: String, reason: String },
    #[error("malformed description for {service}: {detail}")]
    MalformedDescription { service: String, detail: String },
    #[error("attestation fragment {fragment:?} is invalid: {reason}")]
    AttestationParse { fragment: String, reason: String },
    #[error("environment probe failed: {0}")]
    Probe(String),
    #[error("certificate output failed: {0}")]
    Io(#[from] std::io::Error),
}
