//! Persisted run state: [`ItemState`] and [`Summary`] (spec §3, §4.6).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ItemStatus;

/// Per-repo persisted state, mutated exclusively by the State tracker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemState {
    pub repo: String,
    pub branch: String,
    pub status: ItemStatus,
    pub reason: String,
    pub commit_hash: Option<String>,
    pub pr_url: Option<String>,
    pub attempts: u32,
    pub last_updated: DateTime<Utc>,
    pub command_logs: Vec<String>,
}

/// Per-`(module, version)` run summary, overwritten on every tracker flush.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Summary {
    pub module: String,
    pub version: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub retry_count: u32,
    pub items: Vec<ItemState>,
}

impl Summary {
    pub fn new(module: impl Into<String>, version: impl Into<String>, start_time: DateTime<Utc>) -> Self {
        Self {
            module: module.into(),
            version: version.into(),
            start_time,
            end_time: None,
            retry_count: 0,
            items: Vec::new(),
        }
    }

    /// `true` only when every item in the summary has a terminal status.
    pub fn all_terminal(&self) -> bool {
        self.items.iter().all(|item| item.status.is_terminal())
    }

    pub fn item(&self, repo: &str) -> Option<&ItemState> {
        self.items.iter().find(|item| item.repo == repo)
    }
}
