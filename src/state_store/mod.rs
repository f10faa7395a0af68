//! Persisted state actor: owns the on-disk `summary.json` / `items.json`
//! pair for a `(module, version)` run and serializes access behind a single
//! background task (spec §4.6, §6 — file layout is an implementation detail,
//! never a contract).

mod file_store;
mod manager;
mod messages;

pub use file_store::FileStore;
pub use manager::StateManager;
pub use messages::StateCommand;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StateError {
    #[error("no persisted state for {0}")]
    NotFound(String),
    #[error("store error: {0}")]
    Store(String),
    #[error("failed to (de)serialize state: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("state actor channel closed")]
    ChannelClosed,
}
