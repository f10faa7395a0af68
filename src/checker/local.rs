//! Local-strategy checker: reads `go.mod` straight out of the workspace clone.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, warn};

use super::{CheckContext, CheckError, DependencyChecker};
use crate::domain::{CheckResult, CheckSource};
use crate::modtool::ModuleTool;
use crate::semver_lite;

pub struct LocalChecker {
    module_tool: Arc<dyn ModuleTool>,
}

impl LocalChecker {
    pub fn new(module_tool: Arc<dyn ModuleTool>) -> Self {
        Self { module_tool }
    }

    fn run(&self, ctx: &CheckContext<'_>) -> Result<(bool, String), CheckError> {
        let repo_root = ctx.repo_root.ok_or_else(|| {
            CheckError::ModTool(crate::modtool::ModToolError::NotFound(ctx.repo.to_string()))
        })?;
        let module_dir = repo_root.join(ctx.local_module_path);
        let current = self.module_tool.read_required_version(&module_dir, ctx.module_path)?;
        let needs_update = semver_lite::needs_update(&current, ctx.target_version)?;
        Ok((needs_update, current))
    }
}

#[async_trait]
impl DependencyChecker for LocalChecker {
    async fn check(&self, ctx: CheckContext<'_>) -> CheckResult {
        debug!(repo = %ctx.repo, module = %ctx.module_path, "LocalChecker::check: called");
        match self.run(&ctx) {
            Ok((needs_update, current_version)) => CheckResult {
                needs_update,
                current_version: Some(current_version),
                checked_at: Utc::now(),
                source: CheckSource::Local,
                error: None,
            },
            Err(e) => {
                warn!(repo = %ctx.repo, error = %e, "LocalChecker::check: failing open");
                CheckResult {
                    needs_update: true,
                    current_version: None,
                    checked_at: Utc::now(),
                    source: CheckSource::Local,
                    error: Some(e.to_string()),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait as at;
    use std::path::Path;

    struct FakeModuleTool {
        version: &'static str,
    }

    #[at]
    impl ModuleTool for FakeModuleTool {
        async fn set_dependency(&self, _: &Path, _: &str, _: &str) -> Result<bool, crate::modtool::ModToolError> {
            unimplemented!()
        }
        async fn tidy(&self, _: &Path) -> Result<(), crate::modtool::ModToolError> {
            unimplemented!()
        }
        fn read_required_version(&self, _: &Path, _: &str) -> Result<String, crate::modtool::ModToolError> {
            Ok(self.version.to_string())
        }
    }

    #[tokio::test]
    async fn reports_needs_update_when_behind() {
        let checker = LocalChecker::new(Arc::new(FakeModuleTool { version: "v1.0.0" }));
        let repo_root = tempfile::tempdir().unwrap();
        let result = checker
            .check(CheckContext {
                repo: "owner/repo",
                module_path: "github.com/example/lib",
                local_module_path: ".",
                target_version: "v1.2.0",
                repo_root: Some(repo_root.path()),
                default_branch: "main",
            })
            .await;
        assert!(result.needs_update);
        assert_eq!(result.current_version.as_deref(), Some("v1.0.0"));
        assert!(result.error.is_none());
    }

    #[tokio::test]
    async fn fails_open_when_repo_root_missing() {
        let checker = LocalChecker::new(Arc::new(FakeModuleTool { version: "v1.0.0" }));
        let result = checker
            .check(CheckContext {
                repo: "owner/repo",
                module_path: "github.com/example/lib",
                local_module_path: ".",
                target_version: "v1.2.0",
                repo_root: None,
                default_branch: "main",
            })
            .await;
        assert!(result.needs_update);
        assert!(result.error.is_some());
    }
}
