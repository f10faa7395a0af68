//! Code-host search discovery source: runs a code-search query for `go.mod`
//! files requiring the target module and fetches each hit to confirm it.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::{DiscoveryError, DiscoverySourceAdapter};
use crate::codehost::CodeHost;
use crate::domain::{DependentOptions, DiscoverySource};
use crate::modtool::parse_required_version;

pub struct CodehostSearchSource {
    code_host: Arc<dyn CodeHost>,
    org: String,
}

impl CodehostSearchSource {
    pub fn new(code_host: Arc<dyn CodeHost>, org: impl Into<String>) -> Self {
        Self { code_host, org: org.into() }
    }
}

#[async_trait]
impl DiscoverySourceAdapter for CodehostSearchSource {
    async fn discover(&self, module_path: &str) -> Result<Vec<DependentOptions>, DiscoveryError> {
        debug!(%module_path, "CodehostSearchSource::discover: called");
        let query = format!("org:{} \"{module_path}\" path:go.mod", self.org);
        let hits = self.code_host.search_code(&query).await?;

        let mut found = Vec::new();
        for hit in hits {
            let content = match self.code_host.get_file_contents(&hit.repository, &hit.path, None).await {
                Ok(content) => content,
                Err(e) => {
                    debug!(repo = %hit.repository, error = %e, "CodehostSearchSource::discover: skipping unreadable hit");
                    continue;
                }
            };
            if parse_required_version(&content, module_path).is_none() {
                continue;
            }

            let local_module_path = hit
                .path
                .strip_suffix("/go.mod")
                .map(|s| s.to_string())
                .unwrap_or_else(|| ".".to_string());

            found.push(DependentOptions {
                repository: hit.repository,
                clone_url: None,
                module_path: module_path.to_string(),
                local_module_path,
                discovery_source: DiscoverySource::Github,
            });
        }

        Ok(found)
    }
}
