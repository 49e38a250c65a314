use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use serde::Serialize;

use crate::domain::models::JsonOut;
use crate::error::CertError;

pub fn print_one<T: Serialize>(
    json: bool,
    data: T,
    row: impl Fn(&T) -> String,
) -> anyhow::Result<()> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&JsonOut { ok: true, data })?
        );
    } else {
        println!("{}", row(&data));
    }
    Ok(())
}

/// Write the certificate verbatim to `output`, expanding a leading `~` and
/// creating missing parent directories. Returns the resolved path.
pub fn write_certificate(
    content: &str,
    output: &Path,
    version: &str,
) -> Result<PathBuf, CertError> {
    let path = expand_home(output)?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, content)?;
    println!("SEV version {} Certificate saved to: {}", version, path.display());
    Ok(path)
}

fn expand_home(path: &Path) -> Result<PathBuf, CertError> {
    let Ok(rest) = path.strip_prefix("~") else {
        return Ok(path.to_path_buf());
    };
    let home = std::env::var("HOME")
        .map_err(|_| CertError::Io(std::io::Error::other("HOME is not set")))?;
    Ok(PathBuf::from(home).join(rest))
}

/// Share the certificate through the pastebin service and return the
/// reference it prints. The text goes over stdin verbatim.
pub fn publish_certificate(content: &str) -> Result<String, CertError> {
    let mut child = Command::new("fpaste")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;
    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(content.as_bytes())?;
    }
    let output = child.wait_with_output()?;
    if !output.status.success() {
        return Err(CertError::Io(std::io::Error::other(format!(
            "fpaste failed with exit code {:?}: {}",
            output.status.code(),
            String::from_utf8_lossy(&output.stderr).trim()
        ))));
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}
