use serde::Serialize;

pub const PASSED_GLYPH: &str = "✅";
pub const FAILED_GLYPH: &str = "❌";
pub const SKIPPED_GLYPH: &str = "⏩";
pub const UNKNOWN_GLYPH: &str = "?";

#[derive(Serialize)]
pub struct JsonOut<T: Serialize> {
    pub ok: bool,
    pub data: T,
}

/// Tri-state verdict for one test service, plus `Unknown` when the log
/// window carries none of the recognized markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Passed,
    Failed,
    Skipped,
    Unknown,
}

impl TestStatus {
    pub fn glyph(self) -> &'static str {
        match self {
            TestStatus::Passed => PASSED_GLYPH,
            TestStatus::Failed => FAILED_GLYPH,
            TestStatus::Skipped => SKIPPED_GLYPH,
            TestStatus::Unknown => UNKNOWN_GLYPH,
        }
    }
}

/// Status of one checkpoint in the guest attestation workflow.
/// Attestation status codes are binary: 0 is passed, anything else failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Passed,
    Failed,
}

impl StepStatus {
    pub fn glyph(self) -> &'static str {
        match self {
            StepStatus::Passed => PASSED_GLYPH,
            StepStatus::Failed => FAILED_GLYPH,
        }
    }
}

/// The two platform roles under test. Each owns its journal scoping and its
/// discovery metadata field instead of branching on raw strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Host,
    Guest,
}

impl Platform {
    pub fn discovery_field(self) -> &'static str {
        match self {
            Platform::Host => "SNPHOST_TEST",
            Platform::Guest => "SNPGUEST_TEST",
        }
    }

    pub fn group_label(self) -> &'static str {
        match self {
            Platform::Host => "HOST",
            Platform::Guest => "GUEST",
        }
    }
}

/// One discovered service with everything the summary renderer needs.
/// Immutable once built.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceRecord {
    pub name: String,
    pub status: TestStatus,
    pub description: String,
    pub error_detail: Option<String>,
    pub attestation_steps: Option<Vec<(String, StepStatus)>>,
}

/// All services of one platform for one suite version, in first-discovery
/// order. That order is the canonical report order, never sorted.
#[derive(Debug, Clone, Serialize)]
pub struct TestGroupSummary {
    pub version_tag: String,
    pub platform: Platform,
    pub services: Vec<ServiceRecord>,
    pub aggregate: TestStatus,
}

/// The composed certificate document. Assembled once per invocation and
/// never mutated afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct Certificate {
    pub version: String,
    pub environment: String,
    pub host_summary: String,
    pub guest_summary: String,
    pub log: String,
}
