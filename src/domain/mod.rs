//! Core data model shared by every component: [`Target`], [`WorkItem`],
//! [`Plan`], [`ItemStatus`], [`ExecResult`], [`ItemState`], [`Summary`],
//! [`DependentOptions`] and [`CheckResult`].

mod plan;
mod result;
mod state;
mod status;
mod target;
mod work_item;

pub use plan::{Plan, PlanStats};
pub use result::{CommandResult, ExecResult};
pub use state::{ItemState, Summary};
pub use status::ItemStatus;
pub use target::{Target, TargetError};
pub use work_item::{PrTemplate, WorkItem};

use serde::{Deserialize, Serialize};

/// Where a [`DependentOptions`] entry was discovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscoverySource {
    Workspace,
    Github,
    WorkspaceGithub,
    Unknown,
}

impl std::fmt::Display for DiscoverySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DiscoverySource::Workspace => "workspace",
            DiscoverySource::Github => "github",
            DiscoverySource::WorkspaceGithub => "workspace+github",
            DiscoverySource::Unknown => "unknown",
        };
        write!(f, "{s}")
    }
}

/// One candidate dependent repository surfaced by the discovery engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependentOptions {
    pub repository: String,
    pub clone_url: Option<String>,
    pub module_path: String,
    pub local_module_path: String,
    pub discovery_source: DiscoverySource,
}

/// Where a [`CheckResult`] was obtained from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckSource {
    Local,
    Remote,
    Cache,
}

/// Result of asking the Dependency checker whether a repo needs updating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    pub needs_update: bool,
    pub current_version: Option<String>,
    pub checked_at: chrono::DateTime<chrono::Utc>,
    pub source: CheckSource,
    pub error: Option<String>,
}
