//! VCS adapter: the subprocess boundary to `git` (spec §6).

mod git;

pub use git::GitVcs;

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VcsError {
    #[error("git command failed: {0}")]
    CommandFailed(String),
    #[error("failed to spawn git: {0}")]
    Spawn(String),
    #[error("timed out waiting for git")]
    Timeout,
}

/// Output of one VCS subcommand invocation.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
}

/// The capability the Executor and Orchestrator use to drive source control.
///
/// Concrete implementations shell out to `git`; timeouts are enforced by the
/// caller via the item's context, never hidden inside the adapter (spec §9).
#[async_trait]
pub trait VcsAdapter: Send + Sync {
    /// Ensures `repo` is cloned under `workspace_root`, cloning from
    /// `clone_url` if absent or fetching if already present. Returns the
    /// local path.
    async fn ensure_clone(
        &self,
        repo: &str,
        clone_url: &str,
        workspace_root: &Path,
    ) -> Result<PathBuf, VcsError>;

    /// Runs an arbitrary git subcommand (`checkout`, `pull`, `branch`,
    /// `commit`, `push`, `branch -D`, ...) in `repo_path`.
    async fn run(&self, repo_path: &Path, args: &[&str]) -> Result<CommandOutput, VcsError>;

    /// `true` if `branch` exists locally or on `origin`.
    async fn branch_exists(&self, repo_path: &Path, branch: &str) -> Result<bool, VcsError>;
}
