//! Cascade configuration types and loading.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::CascadeError;

/// Top-level Cascade configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory where dependent repositories are cloned.
    pub workspace_dir: PathBuf,
    /// Directory where run/item state is persisted.
    pub state_dir: PathBuf,
    /// Code host (GitHub / GitHub Enterprise) API access.
    pub code_host: CodeHostConfig,
    /// Dependency-check defaults.
    pub check: CheckConfig,
    /// Dependent-discovery defaults for `manifest generate`.
    pub discovery: DiscoveryConfig,
    /// Log level override (falls back to `RUST_LOG` if unset).
    pub log_level: Option<String>,
}

impl Config {
    /// Loads configuration with the fallback chain: explicit path, then
    /// `.cascade.yml` in the current directory, then the user config
    /// directory, then defaults.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self, CascadeError> {
        debug!(?explicit_path, "Config::load: called");
        if let Some(path) = explicit_path {
            return Self::load_from_file(path);
        }

        let local_config = PathBuf::from(".cascade.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => warn!(path = %local_config.display(), error = %e, "failed to load local config"),
            }
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("cascade").join("cascade.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => warn!(path = %user_config.display(), error = %e, "failed to load user config"),
                }
            }
        }

        info!("no config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file(path: &Path) -> Result<Self, CascadeError> {
        let content = fs::read_to_string(path)
            .map_err(|e| CascadeError::Config(format!("failed to read {}: {e}", path.display())))?;
        let config: Self = serde_yaml::from_str(&content)
            .map_err(|e| CascadeError::Config(format!("failed to parse {}: {e}", path.display())))?;
        info!(path = %path.display(), "loaded config");
        Ok(config)
    }
}

/// Code host connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CodeHostConfig {
    /// Base API URL. Enterprise deployments use a `/api/v3/`-suffixed URL.
    pub base_url: String,
    /// Name of the environment variable holding the bearer token.
    pub token_env: String,
}

impl Default for CodeHostConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.github.com".to_string(),
            token_env: "CASCADE_GITHUB_TOKEN".to_string(),
        }
    }
}

/// Dependency-check defaults (overridable per manifest / per planner call).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckConfig {
    /// `local`, `remote`, or `auto`.
    pub strategy: String,
    /// Cache TTL in seconds.
    pub cache_ttl_secs: u64,
    /// Worker-pool size for parallel checks (0 = sequential).
    pub parallelism: usize,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            strategy: "auto".to_string(),
            cache_ttl_secs: 300,
            parallelism: 4,
        }
    }
}

/// Discovery-engine defaults: workspace-scan depth and glob filters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Maximum directory depth to descend into during a workspace scan.
    pub max_depth: usize,
    /// Glob patterns a candidate path must match, relative to the workspace
    /// root. Empty means "match everything".
    pub include: Vec<String>,
    /// Glob patterns that exclude a candidate path even if `include` matches.
    pub exclude: Vec<String>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            max_depth: 12,
            include: Vec::new(),
            exclude: vec!["**/vendor/**".to_string(), "**/.git/**".to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_code_host_uses_github_dot_com() {
        let cfg = CodeHostConfig::default();
        assert_eq!(cfg.base_url, "https://api.github.com");
    }

    #[test]
    fn load_missing_explicit_path_errors() {
        let err = Config::load(Some(Path::new("/nonexistent/cascade.yml"))).unwrap_err();
        assert!(matches!(err, CascadeError::Config(_)));
    }
}
