//! Command runner: executes a [`Command`]'s (tests, extra commands) shell
//! invocation with a timeout, grounded in the bash-tool subprocess pattern
//! used throughout the executor pipeline.

use std::collections::HashMap;
use std::path::Path;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use crate::domain::CommandResult;
use crate::manifest::Command;

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("command timed out after {0:?}")]
    Timeout(Duration),
    #[error("failed to spawn command: {0}")]
    Spawn(String),
}

/// The capability the Executor uses to run tests and extra commands inside a
/// dependent's clone. A trait boundary rather than a free function so tests
/// can substitute a fake that never touches a shell.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(
        &self,
        command: &Command,
        working_dir: &Path,
        env: &HashMap<String, String>,
        timeout: Duration,
    ) -> Result<CommandResult, RunnerError>;
}

/// Shells each command out via `sh -c`, merging the work item's `env` on top
/// of the Executor's own process environment.
#[derive(Debug, Clone, Default)]
pub struct ShellCommandRunner;

impl ShellCommandRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandRunner for ShellCommandRunner {
    async fn run(
        &self,
        command: &Command,
        working_dir: &Path,
        env: &HashMap<String, String>,
        timeout: Duration,
    ) -> Result<CommandResult, RunnerError> {
        let joined = command.cmd.join(" ");
        let dir = match &command.dir {
            Some(sub) => working_dir.join(sub),
            None => working_dir.to_path_buf(),
        };
        debug!(command = %joined, dir = %dir.display(), ?timeout, "ShellCommandRunner::run: called");

        let mut proc = tokio::process::Command::new("sh");
        proc.arg("-c").arg(&joined).current_dir(&dir).envs(env);

        let started = Instant::now();
        let output = tokio::time::timeout(timeout, proc.output())
            .await
            .map_err(|_| RunnerError::Timeout(timeout))?
            .map_err(|e| RunnerError::Spawn(e.to_string()))?;
        let duration = started.elapsed();

        Ok(CommandResult {
            command: joined,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code().unwrap_or(-1),
            duration,
        })
    }
}
