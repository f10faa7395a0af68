//! Manifest document types (spec §6: YAML with `defaults` and `modules`).
//!
//! Unknown fields are tolerated (no `deny_unknown_fields`); the loader logs
//! a warning when it encounters them by comparing against `serde_yaml::Value`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A single shell command plus the directory to run it in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    pub cmd: Vec<String>,
    #[serde(default)]
    pub dir: Option<String>,
}

/// Per-destination notification toggles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationSettings {
    pub on_success: bool,
    pub on_failure: bool,
}

/// Defaults applied to every module/dependent unless overridden.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Defaults {
    pub branch: Option<String>,
    pub labels: Vec<String>,
    pub commit_message: Option<String>,
    pub tests: Vec<Command>,
    pub extra_commands: Vec<Command>,
    pub notifications: NotificationSettings,
    pub pr_title: Option<String>,
    pub pr_body: Option<String>,
}

/// One dependent repository of a [`Module`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Dependent {
    pub repo: String,
    pub module: Option<String>,
    pub branch: Option<String>,
    pub module_path: String,
    pub tests: Option<Vec<Command>>,
    pub extra_commands: Option<Vec<Command>>,
    pub env: HashMap<String, String>,
    pub labels: Option<Vec<String>>,
    pub notifications: Option<NotificationSettings>,
}

/// A module whose dependents Cascade can update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Module {
    pub module: String,
    pub repo: String,
    pub tests: Option<Vec<Command>>,
    pub extra_commands: Option<Vec<Command>>,
    pub dependents: Vec<Dependent>,
}

/// The top-level manifest document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Manifest {
    pub defaults: Defaults,
    pub modules: Vec<Module>,
}
