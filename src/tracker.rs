//! State tracker: the in-memory `Summary` + per-repo `ItemState` index that
//! sits in front of the [`StateManager`], flushing to disk after every
//! change (spec §4.6, §8 — `record` is idempotent and `attempts` is
//! monotonically non-decreasing).

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::Utc;
use tracing::debug;

use crate::domain::{ItemState, ItemStatus, Summary};
use crate::state_store::{StateError, StateManager};

/// Tracks per-repo progress for one `(module, version)` run and keeps the
/// on-disk summary/items in sync after every recorded change.
pub struct StateTracker {
    state: StateManager,
    module: String,
    version: String,
    items: Mutex<HashMap<String, ItemState>>,
}

impl StateTracker {
    /// Loads any existing persisted state for `(module, version)` — used by
    /// `resume` to pick up where a prior run left off — or starts fresh.
    pub async fn load_or_new(state: StateManager, module: &str, version: &str) -> Result<Self, StateError> {
        let items = match state.load_item_states(module, version).await {
            Ok(items) => items,
            Err(StateError::NotFound(_)) => Vec::new(),
            Err(e) => return Err(e),
        };
        let index = items.into_iter().map(|item| (item.repo.clone(), item)).collect();
        Ok(Self { state, module: module.to_string(), version: version.to_string(), items: Mutex::new(index) })
    }

    /// Returns the previously recorded state for `repo`, if any — used by
    /// `resume` to skip items already in a terminal status.
    pub fn item(&self, repo: &str) -> Option<ItemState> {
        self.items.lock().unwrap().get(repo).cloned()
    }

    /// Records a new status for `repo`, merging into any prior attempt:
    /// `attempts` only ever increases, and calling this twice with the same
    /// status/reason/commit is a no-op write (idempotent).
    pub async fn record(
        &self,
        repo: &str,
        branch: &str,
        status: ItemStatus,
        reason: impl Into<String>,
        commit_hash: Option<String>,
        pr_url: Option<String>,
        command_log: Option<String>,
    ) -> Result<(), StateError> {
        let reason = reason.into();
        let updated = {
            let mut items = self.items.lock().unwrap();
            let entry = items.entry(repo.to_string()).or_insert_with(|| ItemState {
                repo: repo.to_string(),
                branch: branch.to_string(),
                status: ItemStatus::Pending,
                reason: String::new(),
                commit_hash: None,
                pr_url: None,
                attempts: 0,
                last_updated: Utc::now(),
                command_logs: Vec::new(),
            });

            let unchanged = entry.status == status
                && entry.reason == reason
                && entry.commit_hash == commit_hash
                && entry.pr_url == pr_url;

            if !unchanged {
                entry.attempts += 1;
            }
            entry.status = status;
            entry.reason = reason;
            entry.commit_hash = commit_hash.or_else(|| entry.commit_hash.clone());
            entry.pr_url = pr_url.or_else(|| entry.pr_url.clone());
            entry.last_updated = Utc::now();
            if let Some(log) = command_log {
                entry.command_logs.push(log);
            }
            entry.clone()
        };

        debug!(repo, attempts = updated.attempts, ?status, "StateTracker::record: flushing");
        self.state.save_item_state(&self.module, &self.version, updated).await
    }

    /// `true` once every tracked item has reached a terminal status.
    pub fn all_terminal(&self) -> bool {
        self.items.lock().unwrap().values().all(|item| item.status.is_terminal())
    }

    /// Builds the flushable [`Summary`] snapshot for this run.
    pub fn summary(&self, start_time: chrono::DateTime<Utc>, end_time: Option<chrono::DateTime<Utc>>) -> Summary {
        let items = self.items.lock().unwrap();
        let mut summary = Summary::new(self.module.clone(), self.version.clone(), start_time);
        summary.end_time = end_time;
        summary.items = items.values().cloned().collect();
        summary.retry_count = summary.items.iter().map(|i| i.attempts.saturating_sub(1)).sum();
        summary
    }

    pub async fn flush_summary(&self, start_time: chrono::DateTime<Utc>, end_time: Option<chrono::DateTime<Utc>>) -> Result<(), StateError> {
        self.state.save_summary(self.summary(start_time, end_time)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn tracker() -> StateTracker {
        let dir = tempfile::tempdir().unwrap();
        let state = StateManager::spawn(dir.path());
        StateTracker::load_or_new(state, "github.com/example/lib", "v1.0.0").await.unwrap()
    }

    #[tokio::test]
    async fn record_is_idempotent_for_identical_calls() {
        let t = tracker().await;
        t.record("owner/a", "cascade/update-lib-v1.0.0", ItemStatus::Completed, "done", Some("abc".into()), None, None)
            .await
            .unwrap();
        t.record("owner/a", "cascade/update-lib-v1.0.0", ItemStatus::Completed, "done", Some("abc".into()), None, None)
            .await
            .unwrap();
        let item = t.item("owner/a").unwrap();
        assert_eq!(item.attempts, 1);
    }

    #[tokio::test]
    async fn attempts_is_monotonically_non_decreasing() {
        let t = tracker().await;
        t.record("owner/a", "branch", ItemStatus::Failed, "retry 1", None, None, None).await.unwrap();
        t.record("owner/a", "branch", ItemStatus::Failed, "retry 2", None, None, None).await.unwrap();
        t.record("owner/a", "branch", ItemStatus::Completed, "ok", Some("abc".into()), None, None).await.unwrap();
        let item = t.item("owner/a").unwrap();
        assert_eq!(item.attempts, 3);
    }

    #[tokio::test]
    async fn all_terminal_false_until_every_item_settles() {
        let t = tracker().await;
        t.record("owner/a", "branch", ItemStatus::Completed, "ok", Some("abc".into()), None, None).await.unwrap();
        t.record("owner/b", "branch", ItemStatus::Pending, "queued", None, None, None).await.unwrap();
        assert!(!t.all_terminal());
        t.record("owner/b", "branch", ItemStatus::Skipped, "already current", None, None, None).await.unwrap();
        assert!(t.all_terminal());
    }

    #[tokio::test]
    async fn resume_loads_prior_persisted_state() {
        let dir = tempfile::tempdir().unwrap();
        let state = StateManager::spawn(dir.path());
        {
            let t = StateTracker::load_or_new(state.clone(), "github.com/example/lib", "v1.0.0").await.unwrap();
            t.record("owner/a", "branch", ItemStatus::Completed, "ok", Some("abc".into()), None, None).await.unwrap();
        }
        let resumed = StateTracker::load_or_new(state, "github.com/example/lib", "v1.0.0").await.unwrap();
        assert_eq!(resumed.item("owner/a").unwrap().status, ItemStatus::Completed);
    }
}
