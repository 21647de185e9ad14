//! Command execution abstractions and types
//!
//! This module provides the port through which the acquisition pipeline drives
//! the external toolchain (`restore`, `build`). Implementations only report what
//! happened; deciding whether a failure is a restore or a build error is left to
//! the caller.

use std::{borrow::Cow, sync::Arc, time::Duration};

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, warn};

/// Port for toolchain command execution (Hexagonal Architecture)
///
/// Abstracts spawning the external toolchain so resolvers can be exercised
/// without a real SDK installed. An implementation runs
/// `<toolchain> <subcommand> <args...>` and waits for it to finish.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Execute a toolchain subcommand and wait for completion
    ///
    /// # Arguments
    ///
    /// * `subcommand` - The toolchain verb to run (e.g. `restore`, `build`)
    /// * `args` - Arguments passed after the subcommand
    ///
    /// # Errors
    ///
    /// Returns [`CommandError`] if:
    /// - The process cannot be started (missing executable, permissions)
    /// - The process does not finish before the runner's deadline
    ///
    /// A process that starts and exits with a non-zero code is *not* an error;
    /// inspect [`CommandOutput::is_success`].
    async fn execute(&self, subcommand: &str, args: &[String])
    -> Result<CommandOutput, CommandError>;
}

/// Result of executing a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    exit_code: Option<i32>,
    stdout: Vec<u8>,
    stderr: Vec<u8>,
    duration: Duration,
}

impl CommandOutput {
    /// Build an output record. `exit_code` is `None` when the process was
    /// terminated by a signal.
    #[must_use]
    pub fn new(
        exit_code: Option<i32>,
        stdout: impl Into<Vec<u8>>,
        stderr: impl Into<Vec<u8>>,
        duration: Duration,
    ) -> Self {
        Self {
            exit_code,
            stdout: stdout.into(),
            stderr: stderr.into(),
            duration,
        }
    }

    /// Shorthand for a zero exit with no output.
    #[must_use]
    pub fn success() -> Self {
        Self::new(Some(0), Vec::new(), Vec::new(), Duration::ZERO)
    }

    /// Shorthand for a failed exit carrying a stderr message.
    #[must_use]
    pub fn failure(exit_code: i32, stderr: &str) -> Self {
        Self::new(Some(exit_code), Vec::new(), stderr, Duration::ZERO)
    }

    /// Get the command's exit code, or -1 if it was killed by a signal
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        self.exit_code.unwrap_or(-1)
    }

    /// Get stdout as a UTF-8 string, replacing invalid sequences
    #[must_use]
    pub fn stdout_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.stdout)
    }

    /// Get stderr as a UTF-8 string, replacing invalid sequences
    #[must_use]
    pub fn stderr_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.stderr)
    }

    /// How long the command ran
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// `true` only for a normal exit with status 0
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Errors that can occur while starting or waiting for a command
#[derive(Error, Debug, Clone)]
pub enum CommandError {
    /// Command execution exceeded the runner's deadline
    #[error("Command timed out after {timeout:?}: {command}")]
    Timeout { command: String, timeout: Duration },

    /// IO error occurred while starting or running the command
    #[error("IO error executing command '{command}': {source}")]
    Io {
        command: String,
        #[source]
        source: Arc<std::io::Error>,
    },
}

/// Run a toolchain subcommand and report only whether it succeeded.
///
/// Output is forwarded to `tracing` (stdout at `debug`, stderr at `warn`).
/// Spawn failures, timeouts and non-zero exits all yield `false`; this never
/// fails, so callers must turn `false` into their own domain error.
pub async fn run<CR>(runner: &CR, subcommand: &str, args: &[String]) -> bool
where
    CR: CommandRunner + ?Sized,
{
    debug!(subcommand, ?args, "running toolchain command");

    match runner.execute(subcommand, args).await {
        Ok(output) => {
            forward_output(subcommand, &output);

            if output.is_success() {
                debug!(
                    subcommand,
                    elapsed_ms = output.duration().as_millis() as u64,
                    "toolchain command succeeded"
                );
                true
            } else {
                warn!(
                    subcommand,
                    exit_code = output.exit_code(),
                    "toolchain command failed"
                );
                false
            }
        }
        Err(error) => {
            warn!(subcommand, %error, "toolchain command could not be run");
            false
        }
    }
}

fn forward_output(subcommand: &str, output: &CommandOutput) {
    for line in output.stdout_str().lines().filter(|l| !l.trim().is_empty()) {
        debug!(subcommand, "{line}");
    }
    for line in output.stderr_str().lines().filter(|l| !l.trim().is_empty()) {
        warn!(subcommand, "{line}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::eq;

    #[tokio::test]
    async fn test_run_reports_success() {
        let mut runner = MockCommandRunner::new();
        runner
            .expect_execute()
            .with(eq("restore"), mockall::predicate::always())
            .times(1)
            .returning(|_, _| Ok(CommandOutput::success()));

        assert!(run(&runner, "restore", &["app.csproj".to_string()]).await);
    }

    #[tokio::test]
    async fn test_run_reports_non_zero_exit_as_false() {
        let mut runner = MockCommandRunner::new();
        runner
            .expect_execute()
            .returning(|_, _| Ok(CommandOutput::failure(1, "error NU1101: Unable to find package")));

        assert!(!run(&runner, "restore", &[]).await);
    }

    #[tokio::test]
    async fn test_run_swallows_spawn_errors() {
        let mut runner = MockCommandRunner::new();
        runner.expect_execute().returning(|sub, _| {
            Err(CommandError::Io {
                command: sub.to_string(),
                source: Arc::new(std::io::Error::from(std::io::ErrorKind::NotFound)),
            })
        });

        assert!(!run(&runner, "build", &[]).await);
    }

    #[tokio::test]
    async fn test_run_swallows_timeouts() {
        let mut runner = MockCommandRunner::new();
        runner.expect_execute().returning(|sub, _| {
            Err(CommandError::Timeout {
                command: sub.to_string(),
                timeout: Duration::from_secs(1),
            })
        });

        assert!(!run(&runner, "build", &[]).await);
    }

    #[test]
    fn test_output_accessors() {
        let output = CommandOutput::new(Some(3), "out", "err", Duration::from_millis(5));
        assert_eq!(output.exit_code(), 3);
        assert_eq!(output.stdout_str(), "out");
        assert_eq!(output.stderr_str(), "err");
        assert_eq!(output.duration(), Duration::from_millis(5));
        assert!(!output.is_success());

        let killed = CommandOutput::new(None, "", "", Duration::ZERO);
        assert_eq!(killed.exit_code(), -1);
        assert!(!killed.is_success());
    }

    #[test]
    fn test_error_display_formatting() {
        let timeout = CommandError::Timeout {
            command: "dotnet build".to_string(),
            timeout: Duration::from_millis(100),
        };
        assert!(timeout.to_string().contains("Command timed out after 100ms"));
        assert!(timeout.to_string().contains("dotnet build"));
    }
}
