use std::path::PathBuf;
use std::process::Command;

use crate::domain::models::Platform;
use crate::error::CertError;
use crate::services::journal::LogSource;
use crate::services::text::{self, TAB_WIDTH};

/// Guest journal metadata field carrying the environment detail entries.
const GUEST_ENVIRONMENT_FIELD: &str = "GUEST_ENVIRONMENT=3.0-0";

/// OS id → package name tables for the host components under test.
/// Process-wide constants; lookups are stateless per call.
const QEMU_PACKAGES: &[(&str, &str)] = &[("fedora", "qemu"), ("ubuntu", "qemu-system")];
const OVMF_PACKAGES: &[(&str, &str)] = &[("fedora", "edk2-ovmf"), ("ubuntu", "ovmf")];

/// Host environment lookups. Each call returns trimmed text or a probe
/// error; no state is held between calls.
pub trait EnvProbes {
    fn host_os_version(&self) -> Result<String, CertError>;
    fn host_os_id(&self) -> Result<String, CertError>;
    fn package_version(&self, package: &str) -> Result<String, CertError>;
    fn kernel_version(&self) -> Result<String, CertError>;
}

/// Probes backed by the host system: `hostnamectl`, the os-release file,
/// the distribution package database and `uname`.
pub struct SystemProbes;

impl SystemProbes {
    fn command_stdout(command: &mut Command, what: &str) -> Result<String, CertError> {
        let output = command
            .output()
            .map_err(|source| CertError::Probe(format!("{what}: {source}")))?;
        if !output.status.success() {
            return Err(CertError::Probe(format!(
                "{what}: exit code {:?}: {}",
                output.status.code(),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    fn os_release_path() -> PathBuf {
        std::env::var("SEVCERT_OS_RELEASE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/etc/os-release"))
    }
}

impl EnvProbes for SystemProbes {
    fn host_os_version(&self) -> Result<String, CertError> {
        let listing = Self::command_stdout(&mut Command::new("hostnamectl"), "hostnamectl")?;
        let line = listing
            .lines()
            .find(|line| line.contains("Operating System"))
            .ok_or_else(|| {
                CertError::Probe("hostnamectl reported no Operating System line".to_string())
            })?;
        let version = line.splitn(2, ':').nth(1).unwrap_or_default().trim();
        Ok(version.to_string())
    }

    fn host_os_id(&self) -> Result<String, CertError> {
        let path = Self::os_release_path();
        let release = std::fs::read_to_string(&path)
            .map_err(|source| CertError::Probe(format!("read {}: {source}", path.display())))?;
        release
            .lines()
            .find_map(|line| line.strip_prefix("ID="))
            .map(|id| id.trim().trim_matches('"').to_string())
            .ok_or_else(|| CertError::Probe(format!("no ID= entry in {}", path.display())))
    }

    fn package_version(&self, package: &str) -> Result<String, CertError> {
        let os_id = self.host_os_id()?;
        let mut command = match os_id.as_str() {
            "fedora" => {
                let mut command = Command::new("rpm");
                command.args(["-q", package]);
                command
            }
            "ubuntu" => {
                let mut command = Command::new("dpkg-query");
                command.args(["-W", "-f=${Version}", package]);
                command
            }
            other => {
                return Err(CertError::Probe(format!(
                    "no package query for OS id {other:?}"
                )))
            }
        };
        Self::command_stdout(&mut command, &format!("{package} version lookup"))
    }

    fn kernel_version(&self) -> Result<String, CertError> {
        Self::command_stdout(Command::new("uname").arg("-r"), "uname -r")
    }
}

fn package_for(
    table: &'static [(&'static str, &'static str)],
    component: &str,
    os_id: &str,
) -> Result<&'static str, CertError> {
    table
        .iter()
        .find(|(id, _)| *id == os_id)
        .map(|(_, package)| *package)
        .ok_or_else(|| {
            CertError::Probe(format!("no known {component} package for OS id {os_id:?}"))
        })
}

/// Render the host environment block: OS, OVMF, QEMU and kernel versions.
/// Any probe failure aborts; host environment detail is part of the test
/// record, not supplementary.
pub fn host_environment_details(probes: &dyn EnvProbes) -> Result<String, CertError> {
    let os_id = probes.host_os_id()?;
    let ovmf = probes.package_version(package_for(OVMF_PACKAGES, "OVMF", &os_id)?)?;
    let qemu = probes.package_version(package_for(QEMU_PACKAGES, "QEMU", &os_id)?)?;
    let mut details = String::new();
    details.push_str(&format!(
        "Host Operating System: {}\n",
        probes.host_os_version()?
    ));
    details.push_str(&format!("OVMF Version: {ovmf}\n"));
    details.push_str(&format!("QEMU Version: {qemu}\n"));
    details.push_str(&format!(
        "Host Kernel Version: {}",
        probes.kernel_version()?
    ));
    Ok(format!(
        "\n Host Environment Details: \n{}",
        text::indent(&details, "\t")
    ))
}

/// Render the guest environment block from the forwarded guest journal.
///
/// Deliberately fault-tolerant: environment detail is supplementary, not a
/// test verdict, so a failing query degrades to an inline error block
/// instead of aborting the whole report.
pub fn guest_environment_details(source: &dyn LogSource) -> Result<String, CertError> {
    let header = "\n Guest Environment Details:";
    let output = source.run(Platform::Guest, &[GUEST_ENVIRONMENT_FIELD, "-o", "cat"])?;
    if !output.success() {
        let code = output
            .code
            .map(|code| code.to_string())
            .unwrap_or_else(|| "none".to_string());
        let mut message = format!("{header}\n");
        message.push_str(&format!(
            "\tDisplay of guest environment detail fails with the exit code {code}\n"
        ));
        message.push_str(&format!("\t{}", output.stderr.trim()));
        return Ok(text::expand_tabs(&message, TAB_WIDTH));
    }
    let details: Vec<&str> = output
        .stdout
        .trim()
        .lines()
        .filter(|line| !line.contains(".service"))
        .collect();
    Ok(format!(
        "{header}\n{}",
        text::indent(&details.join("\n"), "\t")
    ))
}

/// The full test environment section: host details then guest details.
pub fn test_environment_details(
    source: &dyn LogSource,
    probes: &dyn EnvProbes,
) -> Result<String, CertError> {
    Ok(format!(
        "{}\n{}\n",
        host_environment_details(probes)?,
        guest_environment_details(source)?
    ))
}
