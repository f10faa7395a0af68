//! Remote-strategy checker: reads `go.mod` through the code host API without
//! requiring a local clone.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, warn};

use super::{CheckCache, CheckContext, CheckError, DependencyChecker};
use crate::codehost::CodeHost;
use crate::domain::{CheckResult, CheckSource};
use crate::modtool::{parse_required_version, ModToolError};
use crate::semver_lite;

pub struct RemoteChecker {
    code_host: Arc<dyn CodeHost>,
    cache: Option<Arc<CheckCache>>,
}

impl RemoteChecker {
    pub fn new(code_host: Arc<dyn CodeHost>, cache: Option<Arc<CheckCache>>) -> Self {
        Self { code_host, cache }
    }

    async fn current_version(&self, ctx: &CheckContext<'_>) -> Result<(String, CheckSource), CheckError> {
        if let Some(cache) = &self.cache {
            if let Some(version) = cache.get(ctx.repo, ctx.module_path, ctx.local_module_path).await {
                return Ok((version, CheckSource::Cache));
            }
        }

        let go_mod_path = if ctx.local_module_path == "." {
            "go.mod".to_string()
        } else {
            format!("{}/go.mod", ctx.local_module_path.trim_end_matches('/'))
        };
        let content = self.code_host.get_file_contents(ctx.repo, &go_mod_path, Some(ctx.default_branch)).await?;
        let version = parse_required_version(&content, ctx.module_path).ok_or_else(|| {
            CheckError::ModTool(ModToolError::RequireNotFound(ctx.repo.to_string(), ctx.module_path.to_string()))
        })?;

        if let Some(cache) = &self.cache {
            cache.put(ctx.repo, ctx.module_path, ctx.local_module_path, version.clone()).await;
        }
        Ok((version, CheckSource::Remote))
    }
}

#[async_trait]
impl DependencyChecker for RemoteChecker {
    async fn check(&self, ctx: CheckContext<'_>) -> CheckResult {
        debug!(repo = %ctx.repo, module = %ctx.module_path, "RemoteChecker::check: called");
        match self.current_version(&ctx).await {
            Ok((current, source)) => match semver_lite::needs_update(&current, ctx.target_version) {
                Ok(needs_update) => CheckResult {
                    needs_update,
                    current_version: Some(current),
                    checked_at: Utc::now(),
                    source,
                    error: None,
                },
                Err(e) => {
                    warn!(repo = %ctx.repo, error = %e, "RemoteChecker::check: failing open on version parse error");
                    CheckResult {
                        needs_update: true,
                        current_version: Some(current),
                        checked_at: Utc::now(),
                        source,
                        error: Some(e.to_string()),
                    }
                }
            },
            Err(e) => {
                warn!(repo = %ctx.repo, error = %e, "RemoteChecker::check: failing open");
                CheckResult {
                    needs_update: true,
                    current_version: None,
                    checked_at: Utc::now(),
                    source: CheckSource::Remote,
                    error: Some(e.to_string()),
                }
            }
        }
    }
}
