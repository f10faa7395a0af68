//! Module tool adapter: edits and inspects Go module files (spec §4.3 step 4,
//! §4.2 local-strategy checker).

mod gomod;

pub use gomod::GoModTool;

use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModToolError {
    #[error("go.mod not found in {0}")]
    NotFound(String),
    #[error("go.mod in {0} has no require entry for {1}")]
    RequireNotFound(String, String),
    #[error("failed to read {path}: {message}")]
    Read { path: String, message: String },
    #[error("failed to write {path}: {message}")]
    Write { path: String, message: String },
    #[error("tidy command failed: {0}")]
    TidyFailed(String),
}

/// Finds the version currently required for `module` in a `go.mod`'s text,
/// searching both single-line `require module version` statements and
/// grouped `require ( ... )` blocks. Shared by [`GoModTool`] (which reads the
/// file off disk) and the remote-strategy dependency checker (which fetches
/// the same text over the code host API).
pub fn parse_required_version(content: &str, module: &str) -> Option<String> {
    let mut in_block = false;
    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with("require (") {
            in_block = true;
            continue;
        }
        if in_block && trimmed == ")" {
            in_block = false;
            continue;
        }

        let body = if in_block {
            trimmed
        } else if let Some(rest) = trimmed.strip_prefix("require ") {
            rest.trim()
        } else {
            continue;
        };

        let mut parts = body.split_whitespace();
        let Some(path) = parts.next() else { continue };
        let Some(version) = parts.next() else { continue };
        if path == module {
            return Some(version.to_string());
        }
    }
    None
}

/// Adapter the Executor and local-strategy Dependency checker use to
/// inspect and rewrite `go.mod`.
#[async_trait]
pub trait ModuleTool: Send + Sync {
    /// Sets `module`'s required version to `version` in the `go.mod` under
    /// `module_dir`. Returns `true` if the file changed.
    async fn set_dependency(&self, module_dir: &Path, module: &str, version: &str) -> Result<bool, ModToolError>;

    /// Runs `go mod tidy` (or equivalent) in `module_dir`.
    async fn tidy(&self, module_dir: &Path) -> Result<(), ModToolError>;

    /// Reads the currently required version of `module` from the `go.mod`
    /// under `module_dir`, without mutating anything.
    fn read_required_version(&self, module_dir: &Path, module: &str) -> Result<String, ModToolError>;
}
