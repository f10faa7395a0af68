//! Top-level error type and exit-code mapping.

use thiserror::Error;

use crate::checker::CheckError;
use crate::codehost::CodeHostError;
use crate::manifest::ManifestError;
use crate::modtool::ModToolError;
use crate::state_store::StateError;
use crate::vcs::VcsError;
use crate::workspace::WorkspaceError;

/// Aggregated error type for every command-level operation.
///
/// Each variant corresponds to one of the error kinds in the design's
/// propagation policy: validation and loading errors short-circuit the
/// command before any per-item side effects; execution/broker errors are
/// recorded per-item and do not abort the run.
#[derive(Debug, Error)]
pub enum CascadeError {
    #[error("manifest error: {0}")]
    Manifest(#[from] ManifestError),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("filesystem error: {0}")]
    File(#[from] WorkspaceError),

    #[error("state error: {0}")]
    State(#[from] StateError),

    #[error("planning error: {0}")]
    Planning(String),

    #[error("execution error: {0}")]
    Execution(String),

    #[error("broker error: {0}")]
    Broker(String),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("vcs error: {0}")]
    Vcs(#[from] VcsError),

    #[error("module tool error: {0}")]
    ModTool(#[from] ModToolError),

    #[error("code host error: {0}")]
    CodeHost(#[from] CodeHostError),

    #[error("dependency check error: {0}")]
    Check(#[from] CheckError),

    #[error("config error: {0}")]
    Config(String),
}

impl CascadeError {
    /// Maps this error to the fixed exit-code taxonomy from the CLI surface.
    pub fn exit_code(&self) -> i32 {
        match self {
            CascadeError::Config(_) => 2,
            CascadeError::Validation(_) => 3,
            CascadeError::Network(_) | CascadeError::CodeHost(_) => 4,
            CascadeError::File(_) => 5,
            CascadeError::State(_) => 6,
            CascadeError::Planning(_) | CascadeError::Check(_) => 7,
            CascadeError::Execution(_) | CascadeError::Vcs(_) | CascadeError::ModTool(_) => 8,
            CascadeError::Manifest(_) => 3,
            CascadeError::Broker(_) => 8,
        }
    }
}
