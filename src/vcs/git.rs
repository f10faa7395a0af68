//! Subprocess-backed `git` implementation of [`VcsAdapter`].

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

use super::{CommandOutput, VcsAdapter, VcsError};
use crate::workspace::Workspace;

/// Shells out to the system `git` binary.
#[derive(Debug, Clone, Default)]
pub struct GitVcs;

impl GitVcs {
    pub fn new() -> Self {
        Self
    }

    async fn git(&self, dir: &Path, args: &[&str]) -> Result<CommandOutput, VcsError> {
        debug!(dir = %dir.display(), ?args, "GitVcs::git: called");
        let output = Command::new("git")
            .args(args)
            .current_dir(dir)
            .output()
            .await
            .map_err(|e| VcsError::Spawn(e.to_string()))?;

        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            success: output.status.success(),
        })
    }
}

#[async_trait]
impl VcsAdapter for GitVcs {
    async fn ensure_clone(&self, repo: &str, clone_url: &str, workspace_root: &Path) -> Result<PathBuf, VcsError> {
        let path = workspace_root.join(Workspace::repo_basename(repo));
        debug!(%repo, path = %path.display(), "ensure_clone: called");

        if path.join(".git").exists() {
            debug!(%repo, "ensure_clone: already cloned, fetching");
            let output = self.git(&path, &["fetch", "origin"]).await?;
            if !output.success {
                return Err(VcsError::CommandFailed(format!("git fetch: {}", output.stderr)));
            }
            return Ok(path);
        }

        debug!(%repo, %clone_url, "ensure_clone: cloning");
        let parent = path
            .parent()
            .ok_or_else(|| VcsError::CommandFailed("workspace path has no parent".to_string()))?;
        let output = Command::new("git")
            .args(["clone", clone_url, path.file_name().and_then(|n| n.to_str()).unwrap_or(repo)])
            .current_dir(parent)
            .output()
            .await
            .map_err(|e| VcsError::Spawn(e.to_string()))?;

        if !output.status.success() {
            return Err(VcsError::CommandFailed(String::from_utf8_lossy(&output.stderr).into_owned()));
        }
        info!(%repo, path = %path.display(), "cloned repository");
        Ok(path)
    }

    async fn run(&self, repo_path: &Path, args: &[&str]) -> Result<CommandOutput, VcsError> {
        self.git(repo_path, args).await
    }

    async fn branch_exists(&self, repo_path: &Path, branch: &str) -> Result<bool, VcsError> {
        debug!(path = %repo_path.display(), %branch, "branch_exists: called");
        let local = self
            .git(repo_path, &["rev-parse", "--verify", "--quiet", branch])
            .await?;
        if local.success {
            return Ok(true);
        }
        let remote_ref = format!("origin/{branch}");
        let remote = self
            .git(repo_path, &["rev-parse", "--verify", "--quiet", &remote_ref])
            .await?;
        Ok(remote.success)
    }
}
