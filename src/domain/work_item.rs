//! [`WorkItem`]: one dependent-specific, fully self-describing unit of a plan.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::manifest::Command;

/// Rendered PR title/body for one work item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrTemplate {
    pub title: String,
    pub body: String,
}

/// One dependent of the target module, produced by the Planner and
/// consumed unchanged by the Executor and Broker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkItem {
    pub repo: String,
    pub module: Option<String>,
    pub clone_url: String,
    pub local_module_path: String,
    pub branch_name: String,
    pub base_branch: String,
    pub commit_message: String,
    pub labels: Vec<String>,
    pub tests: Vec<Command>,
    pub extra_commands: Vec<Command>,
    pub env: HashMap<String, String>,
    pub pr: PrTemplate,
    #[serde(with = "duration_secs")]
    pub timeout: Duration,
    pub target_module: String,
    pub target_version: String,
    pub notify_on_success: bool,
    pub notify_on_failure: bool,
}

impl WorkItem {
    /// Derives the deterministic branch name `cascade/update-<basename>-<version>`.
    pub fn derive_branch_name(module_basename: &str, version: &str) -> String {
        format!("cascade/update-{module_basename}-{version}")
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let secs = u64::deserialize(d)?;
        Ok(Duration::from_secs(secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn branch_name_is_deterministic() {
        let a = WorkItem::derive_branch_name("lib", "v1.2.3");
        let b = WorkItem::derive_branch_name("lib", "v1.2.3");
        assert_eq!(a, b);
        assert_eq!(a, "cascade/update-lib-v1.2.3");
    }

    proptest::proptest! {
        #[test]
        fn branch_name_is_pure_function_of_inputs(
            basename in "[a-z]{1,10}", version in "v[0-9]\\.[0-9]\\.[0-9]"
        ) {
            let a = WorkItem::derive_branch_name(&basename, &version);
            let b = WorkItem::derive_branch_name(&basename, &version);
            proptest::prop_assert_eq!(a, b);
        }
    }
}
