//! Auto-strategy checker: prefers a local clone when one is available, and
//! otherwise falls back to the remote code-host read (spec §4.2's `auto` mode).

use async_trait::async_trait;
use tracing::debug;

use super::{CheckContext, DependencyChecker, LocalChecker, RemoteChecker};
use crate::domain::CheckResult;

pub struct AutoChecker {
    local: LocalChecker,
    remote: RemoteChecker,
}

impl AutoChecker {
    pub fn new(local: LocalChecker, remote: RemoteChecker) -> Self {
        Self { local, remote }
    }
}

#[async_trait]
impl DependencyChecker for AutoChecker {
    async fn check(&self, ctx: CheckContext<'_>) -> CheckResult {
        if ctx.repo_root.is_some() {
            debug!(repo = %ctx.repo, "AutoChecker::check: local clone available, using local strategy");
            self.local.check(ctx).await
        } else {
            debug!(repo = %ctx.repo, "AutoChecker::check: no local clone, using remote strategy");
            self.remote.check(ctx).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::CheckCache;
    use crate::codehost::{CodeHost, CodeHostError, CodeSearchResult, CreatePullRequest, PullRequest};
    use crate::modtool::ModuleTool;
    use std::path::Path;
    use std::sync::Arc;

    struct FakeModuleTool;

    #[async_trait]
    impl ModuleTool for FakeModuleTool {
        async fn set_dependency(&self, _: &Path, _: &str, _: &str) -> Result<bool, crate::modtool::ModToolError> {
            unimplemented!()
        }
        async fn tidy(&self, _: &Path) -> Result<(), crate::modtool::ModToolError> {
            unimplemented!()
        }
        fn read_required_version(&self, _: &Path, _: &str) -> Result<String, crate::modtool::ModToolError> {
            Ok("v1.0.0".to_string())
        }
    }

    struct FakeCodeHost;

    #[async_trait]
    impl CodeHost for FakeCodeHost {
        async fn get_file_contents(&self, _repo: &str, _path: &str, _ref_: Option<&str>) -> Result<String, CodeHostError> {
            Ok("module foo\n\nrequire github.com/example/lib v2.0.0\n".to_string())
        }
        async fn search_code(&self, _query: &str) -> Result<Vec<CodeSearchResult>, CodeHostError> {
            Ok(vec![])
        }
        async fn find_pull_request(&self, _repo: &str, _branch: &str) -> Result<Option<PullRequest>, CodeHostError> {
            Ok(None)
        }
        async fn create_pull_request(&self, _repo: &str, _req: &CreatePullRequest<'_>) -> Result<PullRequest, CodeHostError> {
            unimplemented!()
        }
        async fn add_labels(&self, _repo: &str, _pr_number: u64, _labels: &[String]) -> Result<(), CodeHostError> {
            unimplemented!()
        }
        async fn add_comment(&self, _repo: &str, _pr_number: u64, _body: &str) -> Result<(), CodeHostError> {
            unimplemented!()
        }
    }

    fn make_auto() -> AutoChecker {
        let local = LocalChecker::new(Arc::new(FakeModuleTool));
        let remote = RemoteChecker::new(Arc::new(FakeCodeHost), None::<Arc<CheckCache>>);
        AutoChecker::new(local, remote)
    }

    #[tokio::test]
    async fn uses_local_when_repo_root_present() {
        let auto = make_auto();
        let dir = tempfile::tempdir().unwrap();
        let result = auto
            .check(CheckContext {
                repo: "owner/repo",
                module_path: "github.com/example/lib",
                local_module_path: ".",
                target_version: "v1.5.0",
                repo_root: Some(dir.path()),
                default_branch: "main",
            })
            .await;
        assert_eq!(result.current_version.as_deref(), Some("v1.0.0"));
    }

    #[tokio::test]
    async fn uses_remote_when_no_repo_root() {
        let auto = make_auto();
        let result = auto
            .check(CheckContext {
                repo: "owner/repo",
                module_path: "github.com/example/lib",
                local_module_path: ".",
                target_version: "v2.5.0",
                repo_root: None,
                default_branch: "main",
            })
            .await;
        assert_eq!(result.current_version.as_deref(), Some("v2.0.0"));
    }
}
