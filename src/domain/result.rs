//! Executor output: [`ExecResult`] and the per-command [`CommandResult`].
//!
//! Named `ExecResult` rather than `Result` to avoid shadowing the prelude type.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::ItemStatus;

/// Record of one command invocation (a test or an extra command).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandResult {
    pub command: String,
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
    #[serde(with = "duration_millis")]
    pub duration: Duration,
}

impl CommandResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// The outcome of driving one [`crate::domain::WorkItem`] through the Executor pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecResult {
    pub status: ItemStatus,
    pub reason: String,
    pub commit_hash: Option<String>,
    pub test_results: Vec<CommandResult>,
    pub extra_results: Vec<CommandResult>,
}

impl ExecResult {
    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            status: ItemStatus::Failed,
            reason: reason.into(),
            commit_hash: None,
            test_results: Vec::new(),
            extra_results: Vec::new(),
        }
    }

    pub fn skipped(reason: impl Into<String>) -> Self {
        Self {
            status: ItemStatus::Skipped,
            reason: reason.into(),
            commit_hash: None,
            test_results: Vec::new(),
            extra_results: Vec::new(),
        }
    }
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u128(d.as_millis())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let millis = u64::deserialize(d)?;
        Ok(Duration::from_millis(millis))
    }
}
