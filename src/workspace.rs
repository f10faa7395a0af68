//! Workspace manager: owns the on-disk directory tree where dependent
//! repositories are cloned (spec §2, §5 "shared resources").

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("failed to create workspace directory {path}: {message}")]
    CreateFailed { path: String, message: String },
}

/// Owns the workspace root and resolves repository paths relative to it.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    /// Ensures `root` exists and returns a handle to it.
    pub fn ensure(root: impl Into<PathBuf>) -> Result<Self, WorkspaceError> {
        let root = root.into();
        debug!(root = %root.display(), "Workspace::ensure: called");
        std::fs::create_dir_all(&root).map_err(|e| WorkspaceError::CreateFailed {
            path: root.display().to_string(),
            message: e.to_string(),
        })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The basename Cascade uses for a repo's clone directory, e.g.
    /// `owner/name` -> `name`.
    pub fn repo_basename(repo: &str) -> &str {
        repo.rsplit('/').next().unwrap_or(repo)
    }

    /// Absolute path where `repo` is (or will be) cloned.
    pub fn repo_path(&self, repo: &str) -> PathBuf {
        self.root.join(Self::repo_basename(repo))
    }

    /// Absolute path to a dependent's module directory within its clone.
    pub fn module_path(&self, repo: &str, local_module_path: &str) -> PathBuf {
        self.repo_path(repo).join(local_module_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repo_basename_strips_owner() {
        assert_eq!(Workspace::repo_basename("owner/name"), "name");
    }

    #[test]
    fn repo_path_joins_root_and_basename() {
        let dir = tempfile::tempdir().unwrap();
        let ws = Workspace::ensure(dir.path()).unwrap();
        assert_eq!(ws.repo_path("owner/name"), dir.path().join("name"));
    }

    #[test]
    fn ensure_creates_nested_directories() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let ws = Workspace::ensure(&nested).unwrap();
        assert!(ws.root().exists());
    }
}
