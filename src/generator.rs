//! Manifest generator: turns discovery output into manifest entries and
//! merges them into an existing manifest file without duplicating dependents.

use std::path::Path;

use thiserror::Error;
use tracing::{debug, info};

use crate::domain::DependentOptions;
use crate::manifest::{load_manifest, validate_manifest, Dependent, Manifest, ManifestError, Module};

#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error(transparent)]
    Manifest(#[from] ManifestError),
    #[error("failed to write manifest {path}: {message}")]
    Write { path: String, message: String },
    #[error("failed to serialize manifest: {0}")]
    Serialize(#[from] serde_yaml::Error),
}

/// Builds or updates the manifest entry for `module_repo`/`module_path` from
/// discovered dependents, then writes it back to `path`.
pub fn generate(
    path: &Path,
    module_path: &str,
    module_repo: &str,
    discovered: &[DependentOptions],
) -> Result<Manifest, GeneratorError> {
    info!(%module_path, discovered = discovered.len(), "generate: called");
    let mut manifest = if path.exists() { load_manifest(path)? } else { Manifest::default() };

    let module = match manifest.modules.iter_mut().find(|m| m.module == module_path) {
        Some(module) => module,
        None => {
            manifest.modules.push(Module {
                module: module_path.to_string(),
                repo: module_repo.to_string(),
                ..Default::default()
            });
            manifest.modules.last_mut().expect("just pushed")
        }
    };

    let mut existing: std::collections::HashSet<(String, String)> =
        module.dependents.iter().map(|d| (d.repo.clone(), d.module_path.clone())).collect();

    for candidate in discovered {
        let key = (candidate.repository.clone(), candidate.local_module_path.clone());
        if existing.contains(&key) {
            debug!(repo = %candidate.repository, "generate: dependent already present, skipping");
            continue;
        }
        module.dependents.push(Dependent {
            repo: candidate.repository.clone(),
            module: None,
            branch: None,
            module_path: candidate.local_module_path.clone(),
            tests: None,
            extra_commands: None,
            env: Default::default(),
            labels: None,
            notifications: None,
        });
        existing.insert(key);
    }

    validate_manifest(&manifest)?;

    let yaml = serde_yaml::to_string(&manifest)?;
    std::fs::write(path, yaml).map_err(|e| GeneratorError::Write {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    Ok(manifest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DiscoverySource;

    fn candidate(repo: &str) -> DependentOptions {
        DependentOptions {
            repository: repo.to_string(),
            clone_url: None,
            module_path: "github.com/example/lib".to_string(),
            local_module_path: ".".to_string(),
            discovery_source: DiscoverySource::Workspace,
        }
    }

    #[test]
    fn creates_new_manifest_with_module_and_dependents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cascade-manifest.yml");
        let manifest = generate(&path, "github.com/example/lib", "example/lib", &[candidate("owner/a")]).unwrap();
        assert_eq!(manifest.modules.len(), 1);
        assert_eq!(manifest.modules[0].dependents.len(), 1);
        assert!(path.exists());
    }

    #[test]
    fn merging_into_existing_manifest_does_not_duplicate_dependents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cascade-manifest.yml");
        generate(&path, "github.com/example/lib", "example/lib", &[candidate("owner/a")]).unwrap();
        let manifest = generate(&path, "github.com/example/lib", "example/lib", &[candidate("owner/a"), candidate("owner/b")]).unwrap();
        assert_eq!(manifest.modules.len(), 1);
        assert_eq!(manifest.modules[0].dependents.len(), 2);
    }
}
