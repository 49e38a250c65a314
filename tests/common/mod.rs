use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use serde_json::Value;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const SEV_VERSION: &str = "2.0.0-0";

/// Isolated run environment: a scratch HOME, a fixture guest-log directory
/// and a stub bin directory shadowing `journalctl` and the host probes.
pub struct TestEnv {
    _tmp: TempDir,
    pub home: PathBuf,
    pub bin: PathBuf,
    pub guest_logs: PathBuf,
    os_release: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let home = tmp.path().join("home");
        fs::create_dir_all(&home).expect("create isolated home");
        let bin = tmp.path().join("bin");
        fs::create_dir_all(&bin).expect("create stub bin dir");
        let guest_logs = tmp.path().join("guest-logs");
        fs::create_dir_all(&guest_logs).expect("create guest log dir");

        let os_release = tmp.path().join("os-release");
        fs::write(&os_release, "NAME=\"Fedora Linux\"\nID=fedora\n").expect("write os-release");

        write_stub(
            &bin,
            "hostnamectl",
            "printf '%s\\n' ' Static hostname: sevhost' '   Operating System: Fedora Linux 40'\n",
        );
        write_stub(&bin, "uname", "echo 6.8.5-test\n");
        write_stub(&bin, "rpm", "echo \"$2-1.fc40\"\n");
        write_stub(&bin, "journalctl", &journalctl_stub(&guest_logs));

        Self {
            _tmp: tmp,
            home,
            bin,
            guest_logs,
            os_release,
        }
    }

    /// Mark the guest journal unreadable so the GUEST_ENVIRONMENT query
    /// fails with exit code 3, exercising the degraded environment path.
    pub fn break_guest_environment(&self) {
        fs::write(self.guest_logs.join("offline"), "").expect("mark guest journal offline");
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("sevcert");
        let path = format!(
            "{}:{}",
            self.bin.display(),
            std::env::var("PATH").unwrap_or_default()
        );
        cmd.env("PATH", path)
            .env("HOME", &self.home)
            .env("SEVCERT_OS_RELEASE", &self.os_release)
            .arg("--guest-logs")
            .arg(&self.guest_logs);
        cmd
    }

    pub fn run_json(&self, args: &[&str]) -> Value {
        let mut cmd = self.cmd();
        let out = cmd
            .arg("--json")
            .args(args)
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        serde_json::from_slice(&out).expect("valid json output")
    }

    pub fn saved_certificate(&self) -> PathBuf {
        self.home.join("sev_certificate.txt")
    }
}

fn write_stub(bin: &Path, name: &str, body: &str) {
    let path = bin.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}")).expect("write stub");
    let mut perms = fs::metadata(&path).expect("stub metadata").permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).expect("make stub executable");
}

/// A journalctl that answers exactly the queries one certificate run
/// issues: discovery, per-unit logs, descriptions, the attestation trace,
/// the guest environment and the raw version log. Anything else fails.
fn journalctl_stub(guest_logs: &Path) -> String {
    let script = r#"GUEST_D="@GUEST@"
case "$*" in
  "SNPHOST_TEST=2.0.0-0 -o json")
    printf '%s\n' \
      '{"_SYSTEMD_UNIT":"sev-firmware-check.service"}' \
      '{"_SYSTEMD_UNIT":"sev-firmware-check.service"}' \
      '{"MESSAGE":"entry without a unit field"}' \
      '{"_SYSTEMD_UNIT":"kernel"}' \
      '{"_SYSTEMD_UNIT":"snp-launch.service"}'
    ;;
  "-D $GUEST_D SNPGUEST_TEST=2.0.0-0 -o json")
    printf '%s\n' \
      '{"_SYSTEMD_UNIT":"fetch-snpguest-attestation-status.service"}' \
      '{"_SYSTEMD_UNIT":"snpguest-smoke.service"}'
    ;;
  "-u sev-firmware-check.service -o cat")
    printf '%s\n' 'sev-firmware-check.service: Deactivated successfully'
    ;;
  "-u snp-launch.service -o cat")
    printf '%s\n' 'Failed to start snp-launch.service - SNP guest launch check'
    ;;
  "-u snp-launch.service")
    printf '%s\n' \
      'Jun 01 10:00:00 sevhost systemd[1]: Starting snp-launch.service - SNP guest launch check...' \
      'Jun 01 10:00:01 sevhost snp-launch[211]: SNP launch measurement mismatch' \
      'Jun 01 10:00:01 sevhost snp-launch[211]: expected ABC got DEF' \
      'Jun 01 10:00:02 sevhost systemd[1]: Failed to start snp-launch.service - SNP guest launch check'
    ;;
  "-D $GUEST_D -u fetch-snpguest-attestation-status.service -o cat")
    printf '%s\n' \
      '{"report_request": 0}' \
      '{"report_signature": 0, "cert_chain": 1}' \
      'fetch-snpguest-attestation-status.service: Deactivated successfully'
    ;;
  "-D $GUEST_D -u snpguest-smoke.service -o cat")
    printf '%s\n' 'snpguest-smoke.service was skipped because of a failed condition check'
    ;;
  "-o cat")
    printf '%s\n' \
      'Starting sev-firmware-check.service - SEV firmware sanity check...' \
      'Starting snp-launch.service - SNP guest launch check...'
    ;;
  "-D $GUEST_D -o cat")
    printf '%s\n' \
      'Starting fetch-snpguest-attestation-status.service - Fetch SNP guest attestation status...' \
      'Starting snpguest-smoke.service - SNP guest smoke test...'
    ;;
  "-D $GUEST_D GUEST_ENVIRONMENT=3.0-0 -o cat")
    if [ -f "$GUEST_D/offline" ]; then
      echo 'No journal files were found.' >&2
      exit 3
    fi
    printf '%s\n' 'Guest Kernel Version: 6.8.5-guest' 'Guest Operating System: Fedora Linux 40'
    ;;
  "SEV_VERSION=2.0.0-0 --no-hostname --utc")
    printf '%s\n' \
      'Jun 01 10:00:00 systemd[1]: Starting sev-firmware-check.service - SEV firmware sanity check...' \
      'Jun 01 10:00:02 systemd[1]: Failed to start snp-launch.service - SNP guest launch check'
    ;;
  *)
    echo "unexpected journalctl invocation: $*" >&2
    exit 64
    ;;
esac
"#;
    script.replace("@GUEST@", &guest_logs.display().to_string())
}
