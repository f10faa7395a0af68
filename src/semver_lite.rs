//! Minimal semver-like parsing and comparison for `vMAJOR.MINOR.PATCH[-pre]` strings.
//!
//! Go module versions are always `v`-prefixed; this intentionally only
//! supports that shape rather than pulling in a general-purpose semver
//! crate, since the comparison rule needed is a single total order over
//! `(major, minor, patch, pre)`.

use std::cmp::Ordering;
use std::fmt;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum VersionError {
    #[error("version must start with 'v': {0}")]
    MissingVPrefix(String),
    #[error("invalid version format: {0}")]
    InvalidFormat(String),
}

/// A parsed `vMAJOR.MINOR.PATCH[-pre]` version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub pre: Option<String>,
}

impl Version {
    pub fn parse(s: &str) -> Result<Self, VersionError> {
        let stripped = s
            .strip_prefix('v')
            .ok_or_else(|| VersionError::MissingVPrefix(s.to_string()))?;

        let (core, pre) = match stripped.split_once('-') {
            Some((core, pre)) => (core, Some(pre.to_string())),
            None => (stripped, None),
        };

        let mut parts = core.split('.');
        let major = parts
            .next()
            .and_then(|p| p.parse().ok())
            .ok_or_else(|| VersionError::InvalidFormat(s.to_string()))?;
        let minor = parts
            .next()
            .and_then(|p| p.parse().ok())
            .ok_or_else(|| VersionError::InvalidFormat(s.to_string()))?;
        let patch = parts
            .next()
            .and_then(|p| p.parse().ok())
            .ok_or_else(|| VersionError::InvalidFormat(s.to_string()))?;
        if parts.next().is_some() {
            return Err(VersionError::InvalidFormat(s.to_string()));
        }

        Ok(Self { major, minor, patch, pre })
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.major, self.minor, self.patch)
            .cmp(&(other.major, other.minor, other.patch))
            .then_with(|| match (&self.pre, &other.pre) {
                // A pre-release is ordered before its corresponding release.
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(a), Some(b)) => a.cmp(b),
            })
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.pre {
            Some(pre) => write!(f, "v{}.{}.{}-{}", self.major, self.minor, self.patch, pre),
            None => write!(f, "v{}.{}.{}", self.major, self.minor, self.patch),
        }
    }
}

/// Returns `true` if `current < target`, i.e. an update is needed.
pub fn needs_update(current: &str, target: &str) -> Result<bool, VersionError> {
    let current = Version::parse(current)?;
    let target = Version::parse(target)?;
    Ok(current < target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_basic_version() {
        let v = Version::parse("v1.2.3").unwrap();
        assert_eq!(v, Version { major: 1, minor: 2, patch: 3, pre: None });
    }

    #[test]
    fn parses_prerelease() {
        let v = Version::parse("v1.2.3-rc.1").unwrap();
        assert_eq!(v.pre.as_deref(), Some("rc.1"));
    }

    #[test]
    fn rejects_missing_v_prefix() {
        assert_eq!(Version::parse("1.2.3"), Err(VersionError::MissingVPrefix("1.2.3".into())));
    }

    #[test]
    fn rejects_garbage() {
        assert!(Version::parse("vgarbage").is_err());
    }

    #[test]
    fn needs_update_true_when_behind() {
        assert!(needs_update("v1.0.0", "v1.2.3").unwrap());
    }

    #[test]
    fn needs_update_false_when_equal() {
        assert!(!needs_update("v1.2.3", "v1.2.3").unwrap());
    }

    #[test]
    fn needs_update_false_when_ahead() {
        assert!(!needs_update("v2.0.0", "v1.2.3").unwrap());
    }

    #[test]
    fn prerelease_sorts_before_release() {
        let pre = Version::parse("v1.2.3-rc.1").unwrap();
        let rel = Version::parse("v1.2.3").unwrap();
        assert!(pre < rel);
    }

    proptest::proptest! {
        #[test]
        fn ordering_is_consistent_with_tuple_compare(
            a_major in 0u64..5, a_minor in 0u64..5, a_patch in 0u64..5,
            b_major in 0u64..5, b_minor in 0u64..5, b_patch in 0u64..5,
        ) {
            let a = Version { major: a_major, minor: a_minor, patch: a_patch, pre: None };
            let b = Version { major: b_major, minor: b_minor, patch: b_patch, pre: None };
            let expected = (a_major, a_minor, a_patch).cmp(&(b_major, b_minor, b_patch));
            proptest::prop_assert_eq!(a.cmp(&b), expected);
        }
    }
}
