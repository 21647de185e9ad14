// Toolchain process runner adapter implementation

use std::{
    process::Stdio,
    sync::Arc,
    time::{Duration, Instant},
};

use async_trait::async_trait;
use tokio::process::Command;

use super::runner::{CommandError, CommandOutput, CommandRunner};

/// Runs `<program> <subcommand> <args...>` as a child process
///
#[derive(Clone, Debug)]
pub struct ProcessCommandRunner {
    /// Toolchain executable (e.g. `dotnet`)
    ///
    program: String,

    /// Deadline applied to every invocation
    ///
    timeout: Duration,
}

impl ProcessCommandRunner {
    /// Create a new runner for `program`
    ///
    #[must_use]
    pub fn new(program: &str, timeout: Duration) -> Self {
        Self {
            program: program.to_string(),
            timeout,
        }
    }

    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    fn describe(&self, subcommand: &str, args: &[String]) -> String {
        let mut parts = vec![self.program.as_str(), subcommand];
        parts.extend(args.iter().map(String::as_str));
        parts.join(" ")
    }
}

#[async_trait]
impl CommandRunner for ProcessCommandRunner {
    async fn execute(
        &self,
        subcommand: &str,
        args: &[String],
    ) -> Result<CommandOutput, CommandError> {
        let start_time = Instant::now();

        let mut cmd = Command::new(&self.program);
        cmd.arg(subcommand)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        // Dropping the output future on timeout kills the child
        let output = tokio::time::timeout(self.timeout, cmd.output())
            .await
            .map_err(|_| CommandError::Timeout {
                command: self.describe(subcommand, args),
                timeout: self.timeout,
            })?
            .map_err(|e| CommandError::Io {
                command: self.describe(subcommand, args),
                source: Arc::new(e),
            })?;

        Ok(CommandOutput::new(
            output.status.code(),
            output.stdout,
            output.stderr,
            start_time.elapsed(),
        ))
    }
}
