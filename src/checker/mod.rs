//! Dependency checker: decides whether a dependent's required version of the
//! target module is behind (spec §4.2).

mod auto;
mod cache;
mod local;
mod remote;

pub use auto::AutoChecker;
pub use cache::CheckCache;
pub use local::LocalChecker;
pub use remote::RemoteChecker;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::codehost::{CodeHost, CodeHostError};
use crate::domain::CheckResult;
use crate::modtool::{ModToolError, ModuleTool};
use crate::semver_lite::VersionError;

#[derive(Debug, Error)]
pub enum CheckError {
    #[error(transparent)]
    ModTool(#[from] ModToolError),
    #[error(transparent)]
    Version(#[from] VersionError),
    #[error(transparent)]
    CodeHost(#[from] CodeHostError),
    #[error("unknown check strategy: {0} (expected local, remote, or auto)")]
    UnknownStrategy(String),
}

/// The inputs needed to check one dependent's required version of a target module.
#[derive(Debug, Clone)]
pub struct CheckContext<'a> {
    pub repo: &'a str,
    pub module_path: &'a str,
    pub local_module_path: &'a str,
    pub target_version: &'a str,
    /// Local clone path, required by [`LocalChecker`]; unused by [`RemoteChecker`].
    pub repo_root: Option<&'a std::path::Path>,
    /// The dependent's default branch, used by [`RemoteChecker`] to read
    /// `go.mod` at a real ref instead of the literal (and invalid) `"HEAD"`.
    pub default_branch: &'a str,
}

/// The capability the Planner calls once per dependent. Implementations never
/// return an error to the caller in a way that blocks planning: per spec §4.2
/// and §7, a failed check is reported fail-open via [`CheckResult::error`]
/// with `needs_update: true`, never as an `Err` that would drop the item.
#[async_trait]
pub trait DependencyChecker: Send + Sync {
    async fn check(&self, ctx: CheckContext<'_>) -> CheckResult;
}

/// Builds the configured checker strategy (`local`, `remote`, or `auto`) from
/// the `check.strategy` config value (spec §4.2, §6).
pub fn build_checker(
    strategy: &str,
    module_tool: Arc<dyn ModuleTool>,
    code_host: Arc<dyn CodeHost>,
    cache: Option<Arc<CheckCache>>,
) -> Result<Arc<dyn DependencyChecker>, CheckError> {
    match strategy {
        "local" => Ok(Arc::new(LocalChecker::new(module_tool))),
        "remote" => Ok(Arc::new(RemoteChecker::new(code_host, cache))),
        "auto" => Ok(Arc::new(AutoChecker::new(
            LocalChecker::new(module_tool),
            RemoteChecker::new(code_host, cache),
        ))),
        other => Err(CheckError::UnknownStrategy(other.to_string())),
    }
}
