//! Line-based `go.mod` reader/writer that understands both single-line
//! `require module version` statements and grouped `require ( ... )` blocks.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use super::{parse_required_version, ModToolError, ModuleTool};

#[derive(Debug, Clone, Default)]
pub struct GoModTool;

impl GoModTool {
    pub fn new() -> Self {
        Self
    }

    fn go_mod_path(module_dir: &Path) -> PathBuf {
        module_dir.join("go.mod")
    }

    fn read(module_dir: &Path) -> Result<String, ModToolError> {
        let path = Self::go_mod_path(module_dir);
        std::fs::read_to_string(&path).map_err(|e| ModToolError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Finds the version currently required for `module`, searching both
    /// single-line requires and grouped `require ( ... )` blocks.
    fn find_required_version(content: &str, module: &str) -> Option<(usize, String)> {
        let mut in_block = false;
        for (lineno, line) in content.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.starts_with("require (") {
                in_block = true;
                continue;
            }
            if in_block && trimmed == ")" {
                in_block = false;
                continue;
            }

            let body = if in_block {
                trimmed
            } else if let Some(rest) = trimmed.strip_prefix("require ") {
                rest.trim()
            } else {
                continue;
            };

            let mut parts = body.split_whitespace();
            let Some(path) = parts.next() else { continue };
            let Some(version) = parts.next() else { continue };
            if path == module {
                return Some((lineno, version.to_string()));
            }
        }
        None
    }
}

#[async_trait]
impl ModuleTool for GoModTool {
    async fn set_dependency(&self, module_dir: &Path, module: &str, version: &str) -> Result<bool, ModToolError> {
        debug!(dir = %module_dir.display(), %module, %version, "set_dependency: called");
        let content = Self::read(module_dir)?;

        match Self::find_required_version(&content, module) {
            Some((lineno, current)) => {
                if current == version {
                    debug!(%module, %version, "set_dependency: already at version, no change");
                    return Ok(false);
                }
                let mut lines: Vec<&str> = content.lines().collect();
                let replaced = lines[lineno].replacen(&current, version, 1);
                let owned = replaced;
                lines[lineno] = owned.as_str();
                let new_content = lines.join("\n") + "\n";
                let path = Self::go_mod_path(module_dir);
                std::fs::write(&path, new_content).map_err(|e| ModToolError::Write {
                    path: path.display().to_string(),
                    message: e.to_string(),
                })?;
                Ok(true)
            }
            None => {
                debug!(%module, "set_dependency: module not required yet, appending require line");
                let mut new_content = content;
                if !new_content.ends_with('\n') {
                    new_content.push('\n');
                }
                new_content.push_str(&format!("\nrequire {module} {version}\n"));
                let path = Self::go_mod_path(module_dir);
                std::fs::write(&path, new_content).map_err(|e| ModToolError::Write {
                    path: path.display().to_string(),
                    message: e.to_string(),
                })?;
                Ok(true)
            }
        }
    }

    async fn tidy(&self, module_dir: &Path) -> Result<(), ModToolError> {
        debug!(dir = %module_dir.display(), "tidy: called");
        let output = Command::new("go")
            .args(["mod", "tidy"])
            .current_dir(module_dir)
            .output()
            .await
            .map_err(|e| ModToolError::TidyFailed(e.to_string()))?;
        if !output.status.success() {
            return Err(ModToolError::TidyFailed(String::from_utf8_lossy(&output.stderr).into_owned()));
        }
        Ok(())
    }

    fn read_required_version(&self, module_dir: &Path, module: &str) -> Result<String, ModToolError> {
        let path = Self::go_mod_path(module_dir);
        if !path.exists() {
            return Err(ModToolError::NotFound(module_dir.display().to_string()));
        }
        let content = Self::read(module_dir)?;
        parse_required_version(&content, module)
            .ok_or_else(|| ModToolError::RequireNotFound(module_dir.display().to_string(), module.to_string()))
    }
}
