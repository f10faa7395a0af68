//! Planner: turns a manifest plus a `(module, version)` target into a
//! deterministic [`Plan`] of [`WorkItem`]s (spec §4.1).
//!
//! Per-dependent settings are merged with precedence `defaults < module <
//! dependent`, dependency checks run with bounded parallelism, and a check
//! failure is fail-open (treated as needing an update) rather than dropping
//! the dependent from the plan.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::stream::{self, StreamExt};
use thiserror::Error;
use tracing::{debug, info};

use crate::checker::{CheckContext, DependencyChecker};
use crate::domain::{CheckSource, DependentOptions, Plan, PlanStats, PrTemplate, Target, WorkItem};
use crate::manifest::{Command, Defaults, Dependent, Manifest, Module};
use crate::templates::{TemplateError, TemplateRenderer, DEFAULT_COMMIT_MESSAGE, DEFAULT_PR_BODY, DEFAULT_PR_TITLE};
use crate::workspace::Workspace;

#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("target module {0} not found in manifest")]
    TargetModuleNotFound(String),
    #[error(transparent)]
    Template(#[from] TemplateError),
}

const DEFAULT_BASE_BRANCH: &str = "main";
const DEFAULT_ITEM_TIMEOUT: Duration = Duration::from_secs(600);

pub struct Planner {
    checker: Arc<dyn DependencyChecker>,
    renderer: TemplateRenderer,
    workspace: Workspace,
}

impl Planner {
    pub fn new(checker: Arc<dyn DependencyChecker>, renderer: TemplateRenderer, workspace: Workspace) -> Self {
        Self { checker, renderer, workspace }
    }

    pub async fn plan(
        &self,
        manifest: &Manifest,
        target: &Target,
        parallelism: usize,
        force_all: bool,
    ) -> Result<Plan, PlannerError> {
        info!(module = %target.module, version = %target.version, force_all, "Planner::plan: called");
        let module = manifest
            .modules
            .iter()
            .find(|m| m.module == target.module)
            .ok_or_else(|| PlannerError::TargetModuleNotFound(target.module.clone()))?;

        let started = Instant::now();
        let concurrency = parallelism.max(1);

        // `buffered` (not `buffer_unordered`) preserves manifest declaration
        // order in the results, per spec §5's ordering guarantee.
        let checks: Vec<_> = stream::iter(module.dependents.iter())
            .map(|dependent| self.check_dependent(&manifest.defaults, module, dependent, target))
            .buffered(concurrency)
            .collect()
            .await;

        let mut stats = PlanStats {
            total_dependents: module.dependents.len(),
            check_strategy: None,
            parallel_checks: concurrency,
            ..Default::default()
        };
        let mut items = Vec::new();

        for outcome in checks {
            let CheckedDependent { dependent, needs_update, current_version, error, source } = outcome;
            if error.is_some() {
                stats.check_errors += 1;
            }
            match source {
                CheckSource::Cache => stats.cache_hits += 1,
                CheckSource::Local | CheckSource::Remote => stats.cache_misses += 1,
            }

            if !needs_update && !force_all {
                debug!(repo = %dependent.repo, current_version, "Planner::plan: dependent already current, skipping");
                stats.skipped_up_to_date += 1;
                stats.skipped_up_to_date_repos.push(dependent.repo.clone());
                continue;
            }

            let item = self.build_work_item(&manifest.defaults, module, dependent, target)?;
            items.push(item);
        }

        stats.work_items_created = items.len();
        stats.check_duration = Some(started.elapsed());

        Ok(Plan { items, stats })
    }

    async fn check_dependent(
        &self,
        defaults: &Defaults,
        module: &Module,
        dependent: &Dependent,
        target: &Target,
    ) -> CheckedDependent {
        let repo_root = self.workspace.repo_path(&dependent.repo);
        let repo_root = repo_root.exists().then_some(repo_root);
        let default_branch = resolve_base_branch(defaults, dependent);
        let result = self
            .checker
            .check(CheckContext {
                repo: &dependent.repo,
                module_path: &module.module,
                local_module_path: &dependent.module_path,
                target_version: &target.version,
                repo_root: repo_root.as_deref(),
                default_branch: &default_branch,
            })
            .await;

        CheckedDependent {
            dependent: dependent.clone(),
            needs_update: result.needs_update,
            current_version: result.current_version.unwrap_or_default(),
            error: result.error,
            source: result.source,
        }
    }

    fn build_work_item(
        &self,
        defaults: &Defaults,
        module: &Module,
        dependent: &Dependent,
        target: &Target,
    ) -> Result<WorkItem, PlannerError> {
        let base_branch = resolve_base_branch(defaults, dependent);

        let tests = merge_commands(&defaults.tests, &module.tests, &dependent.tests);
        let extra_commands = merge_commands(&defaults.extra_commands, &module.extra_commands, &dependent.extra_commands);
        let labels = dependent.labels.clone().unwrap_or_else(|| defaults.labels.clone());
        let notifications = dependent.notifications.clone().unwrap_or_else(|| defaults.notifications.clone());

        let commit_template = defaults.commit_message.as_deref().unwrap_or(DEFAULT_COMMIT_MESSAGE);
        let pr_title_template = defaults.pr_title.as_deref().unwrap_or(DEFAULT_PR_TITLE);
        let pr_body_template = defaults.pr_body.as_deref().unwrap_or(DEFAULT_PR_BODY);

        let commit_message = self.renderer.render(commit_template, &target.module, &target.version, &dependent.repo)?;
        let pr_title = self.renderer.render(pr_title_template, &target.module, &target.version, &dependent.repo)?;
        let pr_body = self.renderer.render(pr_body_template, &target.module, &target.version, &dependent.repo)?;

        Ok(WorkItem {
            repo: dependent.repo.clone(),
            module: dependent.module.clone(),
            clone_url: format!("https://github.com/{}.git", dependent.repo),
            local_module_path: dependent.module_path.clone(),
            branch_name: WorkItem::derive_branch_name(target.module_basename(), &target.version),
            base_branch,
            commit_message,
            labels,
            tests,
            extra_commands,
            env: dependent.env.clone(),
            pr: PrTemplate { title: pr_title, body: pr_body },
            timeout: DEFAULT_ITEM_TIMEOUT,
            target_module: target.module.clone(),
            target_version: target.version.clone(),
            notify_on_success: notifications.on_success,
            notify_on_failure: notifications.on_failure,
        })
    }
}

fn resolve_base_branch(defaults: &Defaults, dependent: &Dependent) -> String {
    dependent
        .branch
        .clone()
        .or_else(|| defaults.branch.clone())
        .unwrap_or_else(|| DEFAULT_BASE_BRANCH.to_string())
}

struct CheckedDependent {
    dependent: Dependent,
    needs_update: bool,
    current_version: String,
    error: Option<String>,
    source: CheckSource,
}

fn merge_commands(defaults: &[Command], module: &Option<Vec<Command>>, dependent: &Option<Vec<Command>>) -> Vec<Command> {
    dependent
        .clone()
        .or_else(|| module.clone())
        .unwrap_or_else(|| defaults.to_vec())
}

#[allow(dead_code)]
fn discovered_to_dependent(discovered: &DependentOptions) -> Dependent {
    Dependent {
        repo: discovered.repository.clone(),
        module: None,
        branch: None,
        module_path: discovered.local_module_path.clone(),
        tests: None,
        extra_commands: None,
        env: Default::default(),
        labels: None,
        notifications: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::CheckContext as Ctx;
    use crate::domain::CheckResult;
    use async_trait::async_trait;
    use chrono::Utc;

    struct FakeChecker {
        needs_update: bool,
    }

    #[async_trait]
    impl DependencyChecker for FakeChecker {
        async fn check(&self, _ctx: Ctx<'_>) -> CheckResult {
            CheckResult {
                needs_update: self.needs_update,
                current_version: Some("v1.0.0".to_string()),
                checked_at: Utc::now(),
                source: CheckSource::Local,
                error: None,
            }
        }
    }

    fn manifest_with_one_dependent() -> Manifest {
        Manifest {
            modules: vec![Module {
                module: "github.com/example/lib".to_string(),
                repo: "example/lib".to_string(),
                dependents: vec![Dependent {
                    repo: "owner/a".to_string(),
                    module_path: ".".to_string(),
                    ..Default::default()
                }],
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    fn planner(needs_update: bool) -> Planner {
        let dir = tempfile::tempdir().unwrap();
        let workspace = Workspace::ensure(dir.path()).unwrap();
        Planner::new(Arc::new(FakeChecker { needs_update }), TemplateRenderer::new(), workspace)
    }

    #[tokio::test]
    async fn produces_one_work_item_per_outdated_dependent() {
        let planner = planner(true);
        let manifest = manifest_with_one_dependent();
        let target = Target::new("github.com/example/lib", "v1.2.3").unwrap();
        let plan = planner.plan(&manifest, &target, 4, false).await.unwrap();
        assert_eq!(plan.items.len(), 1);
        assert_eq!(plan.stats.work_items_created, 1);
        assert_eq!(plan.items[0].branch_name, "cascade/update-lib-v1.2.3");
    }

    #[tokio::test]
    async fn up_to_date_dependent_is_skipped_not_planned() {
        let planner = planner(false);
        let manifest = manifest_with_one_dependent();
        let target = Target::new("github.com/example/lib", "v1.2.3").unwrap();
        let plan = planner.plan(&manifest, &target, 4, false).await.unwrap();
        assert!(plan.items.is_empty());
        assert_eq!(plan.stats.skipped_up_to_date, 1);
        assert_eq!(plan.stats.skipped_up_to_date_repos, vec!["owner/a".to_string()]);
    }

    #[tokio::test]
    async fn force_all_includes_up_to_date_dependent() {
        let planner = planner(false);
        let manifest = manifest_with_one_dependent();
        let target = Target::new("github.com/example/lib", "v1.2.3").unwrap();
        let plan = planner.plan(&manifest, &target, 4, true).await.unwrap();
        assert_eq!(plan.items.len(), 1);
        assert_eq!(plan.stats.skipped_up_to_date, 0);
    }

    #[tokio::test]
    async fn unknown_target_module_errors() {
        let planner = planner(true);
        let manifest = manifest_with_one_dependent();
        let target = Target::new("github.com/example/other", "v1.2.3").unwrap();
        let err = planner.plan(&manifest, &target, 4, false).await.unwrap_err();
        assert!(matches!(err, PlannerError::TargetModuleNotFound(_)));
    }

    #[tokio::test]
    async fn plan_is_deterministic_for_same_inputs() {
        let planner = planner(true);
        let manifest = manifest_with_one_dependent();
        let target = Target::new("github.com/example/lib", "v1.2.3").unwrap();
        let a = planner.plan(&manifest, &target, 4, false).await.unwrap();
        let b = planner.plan(&manifest, &target, 4, false).await.unwrap();
        assert_eq!(a.items[0].branch_name, b.items[0].branch_name);
        assert_eq!(a.items[0].commit_message, b.items[0].commit_message);
    }
}
