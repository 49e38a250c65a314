use std::path::PathBuf;
use std::process::Command;

use crate::domain::models::Platform;
use crate::error::CertError;

/// Raw outcome of one journal query. The exit code is surfaced so the one
/// fault-tolerant caller (the guest environment probe) can degrade instead
/// of aborting.
#[derive(Debug, Clone)]
pub struct QueryOutput {
    pub stdout: String,
    pub stderr: String,
    pub code: Option<i32>,
}

impl QueryOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Executes queries against the system journal. Filters are opaque argument
/// strings passed through verbatim; the core never validates filter syntax.
pub trait LogSource {
    /// Run a journal query and report its outcome without judging the exit
    /// status. Only a failure to run the command at all is an error.
    fn run(&self, platform: Platform, args: &[&str]) -> Result<QueryOutput, CertError>;

    /// Run a journal query that must succeed. A nonzero exit is a
    /// `LogQuery` error, never a silently empty result.
    fn query(&self, platform: Platform, args: &[&str]) -> Result<String, CertError> {
        let output = self.run(platform, args)?;
        if !output.success() {
            let reason = match output.code {
                Some(code) => format!("exit code {}: {}", code, output.stderr.trim()),
                None => format!("terminated by signal: {}", output.stderr.trim()),
            };
            return Err(CertError::LogQuery {
                command: format!("journalctl {}", args.join(" ")),
                reason,
            });
        }
        Ok(output.stdout)
    }
}

/// Journal access via the `journalctl` binary. Host queries read the system
/// journal directly; guest queries are scoped to the directory holding the
/// forwarded guest journal.
pub struct JournalctlSource {
    guest_logs_dir: PathBuf,
}

impl JournalctlSource {
    pub fn new(guest_logs_dir: impl Into<PathBuf>) -> Self {
        Self {
            guest_logs_dir: guest_logs_dir.into(),
        }
    }
}

impl LogSource for JournalctlSource {
    fn run(&self, platform: Platform, args: &[&str]) -> Result<QueryOutput, CertError> {
        let mut command = Command::new("journalctl");
        if platform == Platform::Guest {
            command.arg("-D").arg(&self.guest_logs_dir);
        }
        command.args(args);
        let output = command.output().map_err(|source| CertError::LogQuery {
            command: format!("journalctl {}", args.join(" ")),
            reason: source.to_string(),
        })?;
        Ok(QueryOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            code: output.status.code(),
        })
    }
}

#[cfg(test)]
pub(crate) mod fake {
    use std::collections::HashMap;

    use super::{LogSource, QueryOutput};
    use crate::domain::models::Platform;
    use crate::error::CertError;

    /// In-memory journal keyed by `(platform, args)` for unit tests.
    /// Unregistered queries fail like a broken journalctl invocation.
    #[derive(Default)]
    pub struct FakeJournal {
        responses: HashMap<(Platform, String), QueryOutput>,
    }

    impl FakeJournal {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn on(mut self, platform: Platform, args: &[&str], stdout: &str) -> Self {
            self.responses.insert(
                (platform, args.join(" ")),
                QueryOutput {
                    stdout: stdout.to_string(),
                    stderr: String::new(),
                    code: Some(0),
                },
            );
            self
        }

        pub fn on_failure(
            mut self,
            platform: Platform,
            args: &[&str],
            code: i32,
            stderr: &str,
        ) -> Self {
            self.responses.insert(
                (platform, args.join(" ")),
                QueryOutput {
                    stdout: String::new(),
                    stderr: stderr.to_string(),
                    code: Some(code),
                },
            );
            self
        }
    }

    impl LogSource for FakeJournal {
        fn run(&self, platform: Platform, args: &[&str]) -> Result<QueryOutput, CertError> {
            self.responses
                .get(&(platform, args.join(" ")))
                .cloned()
                .ok_or_else(|| CertError::LogQuery {
                    command: format!("journalctl {}", args.join(" ")),
                    reason: "no fixture registered for this query".to_string(),
                })
        }
    }
}
