//! Orchestrator: wires the Planner, Executor, Broker, state tracker and
//! notification dispatcher into the `plan`/`release`/`resume`/`revert`
//! command flows (spec §4.5).

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tracing::{info, warn};

use crate::broker::{Broker, BrokerError};
use crate::domain::{ItemStatus, Plan, Target};
use crate::executor::Executor;
use crate::manifest::Manifest;
use crate::notifier::{NotificationDispatcher, NotificationEvent};
use crate::planner::{Planner, PlannerError};
use crate::state_store::{StateError, StateManager};
use crate::tracker::StateTracker;
use crate::vcs::VcsAdapter;
use crate::workspace::Workspace;

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error(transparent)]
    Planner(#[from] PlannerError),
    #[error(transparent)]
    State(#[from] StateError),
    #[error(transparent)]
    Broker(#[from] BrokerError),
}

/// Summary returned to the CLI after a `release` or `resume` run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub total: usize,
    pub completed: usize,
    pub manual_review: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl RunReport {
    fn from_statuses(statuses: &[ItemStatus]) -> Self {
        let mut report = RunReport { total: statuses.len(), completed: 0, manual_review: 0, skipped: 0, failed: 0 };
        for status in statuses {
            match status {
                ItemStatus::Completed => report.completed += 1,
                ItemStatus::ManualReview => report.manual_review += 1,
                ItemStatus::Skipped => report.skipped += 1,
                ItemStatus::Failed => report.failed += 1,
                ItemStatus::Pending => {}
            }
        }
        report
    }
}

pub struct Orchestrator {
    planner: Planner,
    executor: Executor,
    broker: Broker,
    notifications: NotificationDispatcher,
    state: StateManager,
    vcs: Arc<dyn VcsAdapter>,
    workspace: Workspace,
}

impl Orchestrator {
    pub fn new(
        planner: Planner,
        executor: Executor,
        broker: Broker,
        notifications: NotificationDispatcher,
        state: StateManager,
        vcs: Arc<dyn VcsAdapter>,
        workspace: Workspace,
    ) -> Self {
        Self { planner, executor, broker, notifications, state, vcs, workspace }
    }

    /// Builds a [`Plan`] without executing it — the `plan` command.
    pub async fn plan(&self, manifest: &Manifest, target: &Target, parallelism: usize, force_all: bool) -> Result<Plan, OrchestratorError> {
        Ok(self.planner.plan(manifest, target, parallelism, force_all).await?)
    }

    /// Plans and fully executes every work item — the `release` command.
    pub async fn release(
        &self,
        manifest: &Manifest,
        target: &Target,
        parallelism: usize,
        force_all: bool,
    ) -> Result<RunReport, OrchestratorError> {
        let plan = self.plan(manifest, target, parallelism, force_all).await?;
        self.run_plan(target, plan, false).await
    }

    /// Re-runs a prior `release`, skipping items already in a terminal
    /// status (spec §8's resume invariant).
    pub async fn resume(
        &self,
        manifest: &Manifest,
        target: &Target,
        parallelism: usize,
        force_all: bool,
    ) -> Result<RunReport, OrchestratorError> {
        let plan = self.plan(manifest, target, parallelism, force_all).await?;
        self.run_plan(target, plan, true).await
    }

    async fn run_plan(&self, target: &Target, plan: Plan, skip_terminal: bool) -> Result<RunReport, OrchestratorError> {
        let start_time = Utc::now();
        let tracker = StateTracker::load_or_new(self.state.clone(), &target.module, &target.version).await?;

        let mut statuses = Vec::with_capacity(plan.items.len());
        for item in &plan.items {
            if skip_terminal {
                if let Some(existing) = tracker.item(&item.repo) {
                    if existing.status.is_terminal() {
                        info!(repo = %item.repo, status = ?existing.status, "run_plan: already terminal, skipping on resume");
                        statuses.push(existing.status);
                        continue;
                    }
                }
            }

            let result = self.executor.execute(item).await;
            let mut pr_url = None;

            if result.status == ItemStatus::Completed {
                match self.broker.ensure_pr(item).await {
                    Ok(pr) => pr_url = Some(pr.html_url),
                    Err(e) => {
                        warn!(repo = %item.repo, error = %e, "run_plan: failed to ensure PR after successful execution");
                    }
                }
            }

            tracker
                .record(
                    &item.repo,
                    &item.branch_name,
                    result.status,
                    result.reason.clone(),
                    result.commit_hash.clone(),
                    pr_url.clone(),
                    None,
                )
                .await?;

            let event = NotificationEvent {
                repo: item.repo.clone(),
                module: target.module.clone(),
                version: target.version.clone(),
                status: result.status,
                reason: result.reason.clone(),
                pr_url,
            };
            self.notifications.dispatch(&event, item.notify_on_success, item.notify_on_failure).await;

            statuses.push(result.status);
        }

        tracker.flush_summary(start_time, Some(Utc::now())).await?;
        Ok(RunReport::from_statuses(&statuses))
    }

    /// Deletes the remote (and local) branch for every completed or
    /// manual-review item of a prior run, comments on the PR, and records
    /// the reverted state — the `revert` command. Items that never got past
    /// planning (no commit) have nothing to revert and are left untouched.
    pub async fn revert(&self, target: &Target) -> Result<usize, OrchestratorError> {
        let tracker = StateTracker::load_or_new(self.state.clone(), &target.module, &target.version).await?;
        let start_time = Utc::now();
        let mut reverted = 0;
        let summary = tracker.summary(start_time, None);
        for item in &summary.items {
            if !matches!(item.status, ItemStatus::Completed | ItemStatus::ManualReview) {
                continue;
            }
            let repo_path = self.workspace.repo_path(&item.repo);
            if !repo_path.exists() {
                warn!(repo = %item.repo, "revert: no local clone, cannot delete remote branch");
                continue;
            }
            match self.vcs.run(&repo_path, &["push", "origin", "--delete", &item.branch]).await {
                Ok(output) if output.success => {
                    reverted += 1;

                    if let Err(e) = self.vcs.run(&repo_path, &["branch", "-D", &item.branch]).await {
                        warn!(repo = %item.repo, error = %e, "revert: local branch delete errored");
                    }

                    if let Some(pr_url) = &item.pr_url {
                        if let Some(pr_number) = pr_number_from_url(pr_url) {
                            let body = format!("Reverted: deleted branch `{}` for {}@{}.", item.branch, target.module, target.version);
                            if let Err(e) = self.broker.comment(&item.repo, pr_number, &body).await {
                                warn!(repo = %item.repo, error = %e, "revert: failed to comment on PR");
                            }
                        }
                    }

                    if let Err(e) = tracker
                        .record(
                            &item.repo,
                            &item.branch,
                            ItemStatus::Failed,
                            "reverted".to_string(),
                            item.commit_hash.clone(),
                            item.pr_url.clone(),
                            None,
                        )
                        .await
                    {
                        warn!(repo = %item.repo, error = %e, "revert: failed to record reverted state");
                    }
                }
                Ok(output) => warn!(repo = %item.repo, stderr = %output.stderr, "revert: delete branch failed"),
                Err(e) => warn!(repo = %item.repo, error = %e, "revert: delete branch errored"),
            }
        }
        tracker.flush_summary(start_time, Some(Utc::now())).await?;
        Ok(reverted)
    }
}

/// Parses the numeric PR id from the trailing path segment of a PR URL.
fn pr_number_from_url(url: &str) -> Option<u64> {
    url.rsplit('/').next()?.parse().ok()
}
