//! Workspace-scan discovery source: walks the local clone tree looking for
//! `go.mod` files that require the target module.

use async_trait::async_trait;
use glob::Pattern;
use tracing::debug;
use walkdir::WalkDir;

use super::{DiscoveryError, DiscoverySourceAdapter};
use crate::domain::{DependentOptions, DiscoverySource};
use crate::modtool::parse_required_version;
use crate::workspace::Workspace;

pub struct WorkspaceScanSource {
    workspace: Workspace,
    max_depth: usize,
    include: Vec<Pattern>,
    exclude: Vec<Pattern>,
}

impl WorkspaceScanSource {
    pub fn new(
        workspace: Workspace,
        max_depth: usize,
        include: Vec<String>,
        exclude: Vec<String>,
    ) -> Result<Self, DiscoveryError> {
        let include = include.iter().map(|p| Pattern::new(p)).collect::<Result<Vec<_>, _>>()?;
        let exclude = exclude.iter().map(|p| Pattern::new(p)).collect::<Result<Vec<_>, _>>()?;
        Ok(Self { workspace, max_depth, include, exclude })
    }

    fn path_allowed(&self, relative: &std::path::Path) -> bool {
        if self.exclude.iter().any(|p| p.matches_path(relative)) {
            return false;
        }
        self.include.is_empty() || self.include.iter().any(|p| p.matches_path(relative))
    }
}

#[async_trait]
impl DiscoverySourceAdapter for WorkspaceScanSource {
    async fn discover(&self, module_path: &str) -> Result<Vec<DependentOptions>, DiscoveryError> {
        debug!(%module_path, root = %self.workspace.root().display(), "WorkspaceScanSource::discover: called");
        let mut found = Vec::new();

        for entry in WalkDir::new(self.workspace.root())
            .max_depth(self.max_depth)
            .into_iter()
            .filter_entry(|e| e.file_name() != "vendor" && e.file_name() != ".git")
            .filter_map(Result::ok)
        {
            if entry.file_name() != "go.mod" {
                continue;
            }
            let Ok(relative_to_root) = entry.path().strip_prefix(self.workspace.root()) else { continue };
            if !self.path_allowed(relative_to_root) {
                continue;
            }
            let content = match std::fs::read_to_string(entry.path()) {
                Ok(content) => content,
                Err(e) => {
                    debug!(path = %entry.path().display(), error = %e, "WorkspaceScanSource::discover: skipping unreadable go.mod");
                    continue;
                }
            };
            if parse_required_version(&content, module_path).is_none() {
                continue;
            }

            let module_dir = entry.path().parent().unwrap_or(entry.path());
            let Ok(relative) = module_dir.strip_prefix(self.workspace.root()) else { continue };
            let mut components = relative.components();
            let Some(repo_basename) = components.next() else { continue };
            let local_module_path = components.as_path();
            let local_module_path = if local_module_path.as_os_str().is_empty() {
                ".".to_string()
            } else {
                local_module_path.display().to_string()
            };

            found.push(DependentOptions {
                repository: repo_basename.as_os_str().to_string_lossy().into_owned(),
                clone_url: None,
                module_path: module_path.to_string(),
                local_module_path,
                discovery_source: DiscoverySource::Workspace,
            });
        }

        Ok(found)
    }
}
