//! Executor: drives one [`WorkItem`] through the clone/branch/edit/test/commit/push
//! pipeline (spec §4.3).
//!
//! Step failures are classified rather than uniformly propagated: a VCS or
//! module-tool failure is `Failed` (infrastructure problem, safe to retry on
//! resume); a failing test run is `ManualReview` (the change applied cleanly
//! but needs a human to look at the break); no diff after the module edit is
//! `Skipped` (the dependent was already current).

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::domain::{CommandResult, ExecResult, ItemStatus, WorkItem};
use crate::modtool::ModuleTool;
use crate::runner::CommandRunner;
use crate::vcs::VcsAdapter;
use crate::workspace::Workspace;

#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("item timed out after {0:?}")]
    Timeout(Duration),
}

pub struct Executor {
    vcs: Arc<dyn VcsAdapter>,
    module_tool: Arc<dyn ModuleTool>,
    runner: Arc<dyn CommandRunner>,
    workspace: Workspace,
}

impl Executor {
    pub fn new(
        vcs: Arc<dyn VcsAdapter>,
        module_tool: Arc<dyn ModuleTool>,
        runner: Arc<dyn CommandRunner>,
        workspace: Workspace,
    ) -> Self {
        Self { vcs, module_tool, runner, workspace }
    }

    /// Runs the full pipeline for `item`, bounding the whole attempt by
    /// `item.timeout`. A timeout is reported as `Failed` rather than
    /// propagated as an `Err`, since the caller (the Orchestrator) records
    /// per-item outcomes and keeps processing the remaining items.
    pub async fn execute(&self, item: &WorkItem) -> ExecResult {
        info!(repo = %item.repo, branch = %item.branch_name, "Executor::execute: called");
        match tokio::time::timeout(item.timeout, self.run_pipeline(item)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(repo = %item.repo, timeout = ?item.timeout, "Executor::execute: item timed out");
                ExecResult::failed(format!("timed out after {:?}", item.timeout))
            }
        }
    }

    async fn run_pipeline(&self, item: &WorkItem) -> ExecResult {
        let repo_path = match self.vcs.ensure_clone(&item.repo, &item.clone_url, self.workspace.root()).await {
            Ok(path) => path,
            Err(e) => return ExecResult::failed(format!("clone/fetch failed: {e}")),
        };

        if let Err(e) = self.reset_to_base(&repo_path, &item.base_branch).await {
            return ExecResult::failed(format!("failed to reset to {}: {e}", item.base_branch));
        }

        if let Err(e) = self.checkout_branch(&repo_path, item).await {
            return ExecResult::failed(format!("failed to create branch {}: {e}", item.branch_name));
        }

        let module_dir = self.workspace.module_path(&item.repo, &item.local_module_path);
        let changed = match self.edit_dependency(&module_dir, item).await {
            Ok(changed) => changed,
            Err(e) => return ExecResult::failed(format!("module edit failed: {e}")),
        };
        if !changed {
            debug!(repo = %item.repo, "run_pipeline: go.mod already at target version, skipping");
            return ExecResult::skipped("dependency already at target version");
        }

        let mut test_results = Vec::with_capacity(item.tests.len());
        for test in &item.tests {
            match self.runner.run(test, &module_dir, &item.env, item.timeout).await {
                Ok(result) => {
                    let failed = !result.success();
                    test_results.push(result);
                    if failed {
                        warn!(repo = %item.repo, "run_pipeline: test command failed, routing to manual review");
                        return ExecResult {
                            status: ItemStatus::ManualReview,
                            reason: "a test command failed after the dependency edit".to_string(),
                            commit_hash: None,
                            test_results,
                            extra_results: Vec::new(),
                        };
                    }
                }
                Err(e) => {
                    return ExecResult::failed(format!("failed to run test command: {e}"));
                }
            }
        }

        let mut extra_results = Vec::with_capacity(item.extra_commands.len());
        for extra in &item.extra_commands {
            match self.runner.run(extra, &module_dir, &item.env, item.timeout).await {
                Ok(result) => {
                    let failed = !result.success();
                    extra_results.push(result);
                    if failed {
                        return ExecResult {
                            status: ItemStatus::Failed,
                            reason: "an extra command failed after the dependency edit".to_string(),
                            commit_hash: None,
                            test_results,
                            extra_results,
                        };
                    }
                }
                Err(e) => {
                    return ExecResult::failed(format!("failed to run extra command: {e}"));
                }
            }
        }

        let commit_hash = match self.commit_and_push(&repo_path, item).await {
            Ok(hash) => hash,
            Err(e) => {
                return ExecResult {
                    status: ItemStatus::Failed,
                    reason: format!("commit/push failed: {e}"),
                    commit_hash: None,
                    test_results,
                    extra_results,
                };
            }
        };

        ExecResult {
            status: ItemStatus::Completed,
            reason: "dependency updated, tests passed, branch pushed".to_string(),
            commit_hash: Some(commit_hash),
            test_results,
            extra_results,
        }
    }

    async fn reset_to_base(&self, repo_path: &Path, base_branch: &str) -> Result<(), crate::vcs::VcsError> {
        self.vcs.run(repo_path, &["checkout", base_branch]).await?;
        self.vcs.run(repo_path, &["reset", "--hard", &format!("origin/{base_branch}")]).await?;
        Ok(())
    }

    async fn checkout_branch(&self, repo_path: &Path, item: &WorkItem) -> Result<(), crate::vcs::VcsError> {
        if self.vcs.branch_exists(repo_path, &item.branch_name).await? {
            debug!(branch = %item.branch_name, "checkout_branch: branch already exists, reusing it");
            self.vcs.run(repo_path, &["checkout", &item.branch_name]).await?;
        } else {
            self.vcs.run(repo_path, &["checkout", "-b", &item.branch_name]).await?;
        }
        Ok(())
    }

    async fn edit_dependency(
        &self,
        module_dir: &Path,
        item: &WorkItem,
    ) -> Result<bool, crate::modtool::ModToolError> {
        let changed = self
            .module_tool
            .set_dependency(module_dir, &item.target_module, &item.target_version)
            .await?;
        if !changed {
            return Ok(false);
        }
        self.module_tool.tidy(module_dir).await?;
        Ok(true)
    }

    async fn commit_and_push(&self, repo_path: &Path, item: &WorkItem) -> Result<String, crate::vcs::VcsError> {
        self.vcs.run(repo_path, &["add", "-A"]).await?;
        self.vcs.run(repo_path, &["commit", "-m", &item.commit_message]).await?;
        let push = self.vcs.run(repo_path, &["push", "-u", "origin", &item.branch_name]).await?;
        if !push.success {
            return Err(crate::vcs::VcsError::CommandFailed(format!("git push: {}", push.stderr)));
        }
        let rev = self.vcs.run(repo_path, &["rev-parse", "HEAD"]).await?;
        Ok(rev.stdout.trim().to_string())
    }
}

#[allow(dead_code)]
fn all_succeeded(results: &[CommandResult]) -> bool {
    results.iter().all(|r| r.success())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PrTemplate;
    use crate::manifest::Command;
    use crate::vcs::{CommandOutput, VcsError};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::sync::Mutex;

    struct FakeVcs {
        branch_exists: bool,
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl VcsAdapter for FakeVcs {
        async fn ensure_clone(&self, _repo: &str, _clone_url: &str, workspace_root: &Path) -> Result<PathBuf, VcsError> {
            let path = workspace_root.join("repo");
            std::fs::create_dir_all(&path).unwrap();
            Ok(path)
        }

        async fn run(&self, _repo_path: &Path, args: &[&str]) -> Result<CommandOutput, VcsError> {
            self.calls.lock().unwrap().push(args.join(" "));
            let stdout = if args.first() == Some(&"rev-parse") { "abc123\n".to_string() } else { String::new() };
            Ok(CommandOutput { stdout, stderr: String::new(), success: true })
        }

        async fn branch_exists(&self, _repo_path: &Path, _branch: &str) -> Result<bool, VcsError> {
            Ok(self.branch_exists)
        }
    }

    struct FakeModuleTool {
        changed: bool,
    }

    #[async_trait]
    impl ModuleTool for FakeModuleTool {
        async fn set_dependency(&self, _: &Path, _: &str, _: &str) -> Result<bool, crate::modtool::ModToolError> {
            Ok(self.changed)
        }
        async fn tidy(&self, _: &Path) -> Result<(), crate::modtool::ModToolError> {
            Ok(())
        }
        fn read_required_version(&self, _: &Path, _: &str) -> Result<String, crate::modtool::ModToolError> {
            unimplemented!()
        }
    }

    struct FakeRunner {
        exit_code: i32,
    }

    #[async_trait]
    impl CommandRunner for FakeRunner {
        async fn run(
            &self,
            command: &Command,
            _working_dir: &Path,
            _env: &HashMap<String, String>,
            _timeout: Duration,
        ) -> Result<CommandResult, crate::runner::RunnerError> {
            Ok(CommandResult {
                command: command.cmd.join(" "),
                stdout: String::new(),
                stderr: String::new(),
                exit_code: self.exit_code,
                duration: Duration::from_millis(1),
            })
        }
    }

    fn sample_item() -> WorkItem {
        WorkItem {
            repo: "owner/dependent".to_string(),
            module: None,
            clone_url: "https://example.com/owner/dependent.git".to_string(),
            local_module_path: ".".to_string(),
            branch_name: "cascade/update-lib-v1.2.3".to_string(),
            base_branch: "main".to_string(),
            commit_message: "chore: bump lib to v1.2.3".to_string(),
            labels: vec![],
            tests: vec![Command { cmd: vec!["go test ./...".to_string()], dir: None }],
            extra_commands: vec![],
            env: HashMap::new(),
            pr: PrTemplate { title: "Bump lib to v1.2.3".to_string(), body: String::new() },
            timeout: Duration::from_secs(5),
            target_module: "github.com/example/lib".to_string(),
            target_version: "v1.2.3".to_string(),
            notify_on_success: false,
            notify_on_failure: true,
        }
    }

    fn executor(vcs: FakeVcs, module_tool: FakeModuleTool, runner: FakeRunner) -> Executor {
        let dir = tempfile::tempdir().unwrap();
        let workspace = Workspace::ensure(dir.path()).unwrap();
        Executor::new(Arc::new(vcs), Arc::new(module_tool), Arc::new(runner), workspace)
    }

    #[tokio::test]
    async fn happy_path_completes() {
        let exec = executor(
            FakeVcs { branch_exists: false, calls: Mutex::new(vec![]) },
            FakeModuleTool { changed: true },
            FakeRunner { exit_code: 0 },
        );
        let result = exec.execute(&sample_item()).await;
        assert_eq!(result.status, ItemStatus::Completed);
        assert_eq!(result.commit_hash.as_deref(), Some("abc123"));
    }

    #[tokio::test]
    async fn no_diff_is_skipped() {
        let exec = executor(
            FakeVcs { branch_exists: false, calls: Mutex::new(vec![]) },
            FakeModuleTool { changed: false },
            FakeRunner { exit_code: 0 },
        );
        let result = exec.execute(&sample_item()).await;
        assert_eq!(result.status, ItemStatus::Skipped);
    }

    #[tokio::test]
    async fn failing_test_routes_to_manual_review() {
        let exec = executor(
            FakeVcs { branch_exists: false, calls: Mutex::new(vec![]) },
            FakeModuleTool { changed: true },
            FakeRunner { exit_code: 1 },
        );
        let result = exec.execute(&sample_item()).await;
        assert_eq!(result.status, ItemStatus::ManualReview);
        assert_eq!(result.test_results.len(), 1);
    }

    #[tokio::test]
    async fn existing_branch_is_reused_not_recreated() {
        let exec = executor(
            FakeVcs { branch_exists: true, calls: Mutex::new(vec![]) },
            FakeModuleTool { changed: true },
            FakeRunner { exit_code: 0 },
        );
        let result = exec.execute(&sample_item()).await;
        assert_eq!(result.status, ItemStatus::Completed);
    }
}
