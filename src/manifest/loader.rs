//! Manifest loader: parses YAML, tolerates unknown fields with a warning,
//! and validates the invariants required before planning.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use thiserror::Error;
use tracing::{debug, warn};

use super::types::Manifest;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ManifestError {
    #[error("failed to read manifest {path}: {message}")]
    Read { path: String, message: String },
    #[error("failed to parse manifest {path}: {message}")]
    Parse { path: String, message: String },
    #[error("module at index {index} is missing a module path")]
    MissingModulePath { index: usize },
    #[error("module at index {index} is missing a repo")]
    MissingModuleRepo { index: usize },
    #[error("module '{module}' dependent at index {index} is missing a repo")]
    MissingDependentRepo { module: String, index: usize },
    #[error("duplicate dependent (repo={repo}, module_path={module_path}) in module '{module}'")]
    DuplicateDependent {
        module: String,
        repo: String,
        module_path: String,
    },
    #[error("target module not found")]
    TargetModuleNotFound,
}

/// Loads and validates a manifest from `path`.
pub fn load_manifest(path: &Path) -> Result<Manifest, ManifestError> {
    debug!(path = %path.display(), "load_manifest: called");
    let content = fs::read_to_string(path).map_err(|e| ManifestError::Read {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    warn_on_unknown_top_level_keys(path, &content);

    let manifest: Manifest = serde_yaml::from_str(&content).map_err(|e| ManifestError::Parse {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    validate_manifest(&manifest)?;
    Ok(manifest)
}

fn warn_on_unknown_top_level_keys(path: &Path, content: &str) {
    const KNOWN: &[&str] = &["defaults", "modules"];
    let Ok(serde_yaml::Value::Mapping(map)) = serde_yaml::from_str::<serde_yaml::Value>(content) else {
        return;
    };
    for key in map.keys() {
        if let Some(key) = key.as_str()
            && !KNOWN.contains(&key)
        {
            warn!(path = %path.display(), %key, "manifest has unknown top-level field; ignoring");
        }
    }
}

/// Validates the manifest invariants: every dependent is uniquely
/// identified by `(repo, module_path)`, and required fields are present.
pub fn validate_manifest(manifest: &Manifest) -> Result<(), ManifestError> {
    debug!(module_count = manifest.modules.len(), "validate_manifest: called");
    for (index, module) in manifest.modules.iter().enumerate() {
        if module.module.is_empty() {
            return Err(ManifestError::MissingModulePath { index });
        }
        if module.repo.is_empty() {
            return Err(ManifestError::MissingModuleRepo { index });
        }

        let mut seen: HashSet<(String, String)> = HashSet::new();
        for (dep_index, dependent) in module.dependents.iter().enumerate() {
            if dependent.repo.is_empty() {
                return Err(ManifestError::MissingDependentRepo {
                    module: module.module.clone(),
                    index: dep_index,
                });
            }
            let key = (dependent.repo.clone(), dependent.module_path.clone());
            if !seen.insert(key.clone()) {
                return Err(ManifestError::DuplicateDependent {
                    module: module.module.clone(),
                    repo: key.0,
                    module_path: key.1,
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::{Dependent, Module};

    fn module(module: &str, dependents: Vec<Dependent>) -> Module {
        Module {
            module: module.to_string(),
            repo: "owner/repo".to_string(),
            dependents,
            ..Default::default()
        }
    }

    fn dependent(repo: &str, module_path: &str) -> Dependent {
        Dependent {
            repo: repo.to_string(),
            module_path: module_path.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn validates_empty_manifest() {
        let manifest = Manifest::default();
        assert!(validate_manifest(&manifest).is_ok());
    }

    #[test]
    fn rejects_duplicate_dependent() {
        let manifest = Manifest {
            modules: vec![module(
                "github.com/example/lib",
                vec![dependent("owner/a", "."), dependent("owner/a", ".")],
            )],
            ..Default::default()
        };
        assert!(matches!(
            validate_manifest(&manifest),
            Err(ManifestError::DuplicateDependent { .. })
        ));
    }

    #[test]
    fn allows_same_repo_different_module_path() {
        let manifest = Manifest {
            modules: vec![module(
                "github.com/example/lib",
                vec![dependent("owner/a", "sub1"), dependent("owner/a", "sub2")],
            )],
            ..Default::default()
        };
        assert!(validate_manifest(&manifest).is_ok());
    }

    #[test]
    fn rejects_missing_module_repo() {
        let manifest = Manifest {
            modules: vec![Module {
                module: "github.com/example/lib".to_string(),
                repo: String::new(),
                ..Default::default()
            }],
            ..Default::default()
        };
        assert!(matches!(
            validate_manifest(&manifest),
            Err(ManifestError::MissingModuleRepo { index: 0 })
        ));
    }

    #[test]
    fn load_missing_file_errors() {
        let err = load_manifest(Path::new("/nonexistent/manifest.yml")).unwrap_err();
        assert!(matches!(err, ManifestError::Read { .. }));
    }

    #[test]
    fn load_parses_yaml_fixture() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifest.yml");
        fs::write(
            &path,
            r#"
defaults:
  branch: main
modules:
  - module: github.com/example/lib
    repo: example/lib
    dependents:
      - repo: example/a
        module_path: "."
"#,
        )
        .unwrap();

        let manifest = load_manifest(&path).unwrap();
        assert_eq!(manifest.modules.len(), 1);
        assert_eq!(manifest.modules[0].dependents.len(), 1);
    }
}
