//! Discovery engine: finds candidate dependents of a target module by
//! scanning the local workspace and searching the code host, merging by
//! `(repository, module_path)` (spec §4.7).

mod codehost_search;
mod workspace_scan;

pub use codehost_search::CodehostSearchSource;
pub use workspace_scan::WorkspaceScanSource;

use async_trait::async_trait;
use futures::future::try_join_all;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use crate::domain::{DependentOptions, DiscoverySource};
use crate::modtool::ModuleTool;
use crate::workspace::Workspace;

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("workspace scan failed: {0}")]
    Workspace(String),
    #[error(transparent)]
    CodeHost(#[from] crate::codehost::CodeHostError),
    #[error("invalid glob pattern: {0}")]
    InvalidPattern(#[from] glob::PatternError),
}

/// One discovery method: scanning local clones or querying a code host.
#[async_trait]
pub trait DiscoverySourceAdapter: Send + Sync {
    async fn discover(&self, module_path: &str) -> Result<Vec<DependentOptions>, DiscoveryError>;
}

/// Runs every configured source and merges the results by `(repository,
/// module_path)`; a repo found by more than one source is reported once,
/// tagged [`DiscoverySource::WorkspaceGithub`].
pub struct DiscoveryEngine {
    sources: Vec<(DiscoverySource, Box<dyn DiscoverySourceAdapter>)>,
    workspace: Option<Workspace>,
    module_tool: Option<Arc<dyn ModuleTool>>,
}

impl DiscoveryEngine {
    pub fn new(
        sources: Vec<(DiscoverySource, Box<dyn DiscoverySourceAdapter>)>,
        workspace: Option<Workspace>,
        module_tool: Option<Arc<dyn ModuleTool>>,
    ) -> Self {
        Self { sources, workspace, module_tool }
    }

    /// Finds dependents of `module_path`. `target_repo` is the repo that owns
    /// `module_path` itself and is dropped from the results as a self-match;
    /// when `target_version` is given, workspace candidates already at that
    /// version are dropped too (spec §4.7's post-filter).
    pub async fn discover(
        &self,
        module_path: &str,
        target_repo: &str,
        target_version: Option<&str>,
    ) -> Result<Vec<DependentOptions>, DiscoveryError> {
        debug!(%module_path, %target_repo, "DiscoveryEngine::discover: called");

        // Sources run concurrently (spec §4.7), not one after another.
        let per_source = try_join_all(self.sources.iter().map(|(source_kind, source)| async move {
            let found = source.discover(module_path).await?;
            Ok::<_, DiscoveryError>((*source_kind, found))
        }))
        .await?;

        let mut merged: HashMap<(String, String), DependentOptions> = HashMap::new();
        for (source_kind, found) in per_source {
            for mut candidate in found {
                let key = (candidate.repository.clone(), candidate.module_path.clone());
                match merged.get_mut(&key) {
                    Some(existing) => {
                        existing.discovery_source = combine(existing.discovery_source, source_kind);
                        if existing.clone_url.is_none() {
                            existing.clone_url = candidate.clone_url.take();
                        }
                    }
                    None => {
                        candidate.discovery_source = source_kind;
                        merged.insert(key, candidate);
                    }
                }
            }
        }

        let mut results: Vec<_> = merged.into_values().collect();
        results.sort_by(|a, b| (a.repository.as_str(), a.module_path.as_str()).cmp(&(b.repository.as_str(), b.module_path.as_str())));

        results.retain(|d| d.repository != target_repo);

        if let (Some(version), Some(workspace), Some(module_tool)) = (target_version, &self.workspace, &self.module_tool) {
            results.retain(|candidate| {
                if !matches!(candidate.discovery_source, DiscoverySource::Workspace | DiscoverySource::WorkspaceGithub) {
                    return true;
                }
                let module_dir = workspace.module_path(&candidate.repository, &candidate.local_module_path);
                let Ok(current) = module_tool.read_required_version(&module_dir, module_path) else {
                    return true; // fail open: keep the candidate if we can't read its go.mod
                };
                !matches!(crate::semver_lite::needs_update(&current, version), Ok(false))
            });
        }

        Ok(results)
    }
}

fn combine(existing: DiscoverySource, new: DiscoverySource) -> DiscoverySource {
    use DiscoverySource::*;
    match (existing, new) {
        (Workspace, Github) | (Github, Workspace) => WorkspaceGithub,
        (a, _) if a == new => a,
        (WorkspaceGithub, _) | (_, WorkspaceGithub) => WorkspaceGithub,
        _ => new,
    }
}
