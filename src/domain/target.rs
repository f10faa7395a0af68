//! The `(module, version)` pair being fanned out.

use thiserror::Error;

use crate::semver_lite::{self, VersionError};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TargetError {
    #[error("target module must not be empty")]
    EmptyModule,
    #[error("target version must not be empty")]
    EmptyVersion,
    #[error("invalid target version: {0}")]
    InvalidVersion(#[from] VersionError),
}

/// The module and version being fanned out to dependents.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Target {
    pub module: String,
    pub version: String,
}

impl Target {
    /// Validates non-emptiness and version shape, as required for `plan`/`release`.
    pub fn new(module: impl Into<String>, version: impl Into<String>) -> Result<Self, TargetError> {
        let module = module.into();
        let version = version.into();
        if module.is_empty() {
            return Err(TargetError::EmptyModule);
        }
        if version.is_empty() {
            return Err(TargetError::EmptyVersion);
        }
        semver_lite::Version::parse(&version)?;
        Ok(Self { module, version })
    }

    /// The final path segment of the module import path, used to derive branch names.
    pub fn module_basename(&self) -> &str {
        self.module.rsplit('/').next().unwrap_or(&self.module)
    }

    /// `<module>@<version>`, the state identifier used by resume/revert.
    pub fn state_id(&self) -> String {
        format!("{}@{}", self.module, self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_module() {
        assert_eq!(Target::new("", "v1.0.0").unwrap_err(), TargetError::EmptyModule);
    }

    #[test]
    fn rejects_empty_version() {
        assert_eq!(
            Target::new("github.com/example/lib", "").unwrap_err(),
            TargetError::EmptyVersion
        );
    }

    #[test]
    fn rejects_unprefixed_version() {
        assert!(Target::new("github.com/example/lib", "1.2.3").is_err());
    }

    #[test]
    fn module_basename_strips_path() {
        let t = Target::new("github.com/example/lib", "v1.2.3").unwrap();
        assert_eq!(t.module_basename(), "lib");
    }

    #[test]
    fn state_id_is_module_at_version() {
        let t = Target::new("github.com/example/lib", "v1.2.3").unwrap();
        assert_eq!(t.state_id(), "github.com/example/lib@v1.2.3");
    }
}
