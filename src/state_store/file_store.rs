//! File-backed store underlying the state actor: one directory per
//! `(module, version)`, holding `summary.json` and `items.json`.

use std::path::PathBuf;

use tracing::debug;

use super::StateError;
use crate::domain::{ItemState, Summary};

pub struct FileStore {
    base_dir: PathBuf,
}

impl FileStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self { base_dir: base_dir.into() }
    }

    fn run_dir(&self, module: &str, version: &str) -> PathBuf {
        let sanitized_module = module.replace(['/', ':'], "_");
        self.base_dir.join(sanitized_module).join(version)
    }

    fn summary_path(&self, module: &str, version: &str) -> PathBuf {
        self.run_dir(module, version).join("summary.json")
    }

    fn items_path(&self, module: &str, version: &str) -> PathBuf {
        self.run_dir(module, version).join("items.json")
    }

    pub fn save_summary(&self, summary: &Summary) -> Result<(), StateError> {
        let dir = self.run_dir(&summary.module, &summary.version);
        std::fs::create_dir_all(&dir).map_err(|e| StateError::Store(e.to_string()))?;
        let path = self.summary_path(&summary.module, &summary.version);
        debug!(path = %path.display(), "FileStore::save_summary: writing");
        let json = serde_json::to_string_pretty(summary)?;
        std::fs::write(&path, json).map_err(|e| StateError::Store(e.to_string()))?;
        Ok(())
    }

    pub fn load_summary(&self, module: &str, version: &str) -> Result<Summary, StateError> {
        let path = self.summary_path(module, version);
        if !path.exists() {
            return Err(StateError::NotFound(format!("{module}@{version}")));
        }
        let content = std::fs::read_to_string(&path).map_err(|e| StateError::Store(e.to_string()))?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save_item_state(&self, module: &str, version: &str, item: &ItemState) -> Result<(), StateError> {
        let mut items = self.load_item_states(module, version).unwrap_or_default();
        match items.iter_mut().find(|existing| existing.repo == item.repo) {
            Some(existing) => *existing = item.clone(),
            None => items.push(item.clone()),
        }
        let dir = self.run_dir(module, version);
        std::fs::create_dir_all(&dir).map_err(|e| StateError::Store(e.to_string()))?;
        let path = self.items_path(module, version);
        let json = serde_json::to_string_pretty(&items)?;
        std::fs::write(&path, json).map_err(|e| StateError::Store(e.to_string()))?;
        Ok(())
    }

    pub fn load_item_states(&self, module: &str, version: &str) -> Result<Vec<ItemState>, StateError> {
        let path = self.items_path(module, version);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = std::fs::read_to_string(&path).map_err(|e| StateError::Store(e.to_string()))?;
        Ok(serde_json::from_str(&content)?)
    }
}
