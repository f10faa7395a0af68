//! Manifest parsing and validation (spec §3 Manifest, §6 Manifest file).

mod loader;
mod types;

pub use loader::{load_manifest, validate_manifest, ManifestError};
pub use types::{Command, Defaults, Dependent, Manifest, Module, NotificationSettings};
