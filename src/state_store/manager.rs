//! [`StateManager`]: spawns the state actor and exposes an async handle to it.
//!
//! Grounded in the actor-per-store pattern: a single background task owns
//! the [`FileStore`] and processes [`StateCommand`]s off an `mpsc` channel,
//! so concurrent callers never race on the same files.

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use super::file_store::FileStore;
use super::messages::StateCommand;
use super::StateError;
use crate::domain::{ItemState, Summary};

const COMMAND_CHANNEL_CAPACITY: usize = 64;

#[derive(Clone)]
pub struct StateManager {
    tx: mpsc::Sender<StateCommand>,
}

impl StateManager {
    /// Spawns the actor task backed by a [`FileStore`] rooted at `base_dir`.
    pub fn spawn(base_dir: impl Into<std::path::PathBuf>) -> Self {
        let (tx, rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
        let store = FileStore::new(base_dir);
        tokio::spawn(actor_loop(store, rx));
        Self { tx }
    }

    pub async fn save_summary(&self, summary: Summary) -> Result<(), StateError> {
        let (reply, rx) = oneshot::channel();
        self.send(StateCommand::SaveSummary { summary, reply }).await?;
        rx.await.map_err(|_| StateError::ChannelClosed)?
    }

    pub async fn load_summary(&self, module: &str, version: &str) -> Result<Summary, StateError> {
        let (reply, rx) = oneshot::channel();
        self.send(StateCommand::LoadSummary { module: module.to_string(), version: version.to_string(), reply })
            .await?;
        rx.await.map_err(|_| StateError::ChannelClosed)?
    }

    pub async fn save_item_state(&self, module: &str, version: &str, item: ItemState) -> Result<(), StateError> {
        let (reply, rx) = oneshot::channel();
        self.send(StateCommand::SaveItemState {
            module: module.to_string(),
            version: version.to_string(),
            item,
            reply,
        })
        .await?;
        rx.await.map_err(|_| StateError::ChannelClosed)?
    }

    pub async fn load_item_states(&self, module: &str, version: &str) -> Result<Vec<ItemState>, StateError> {
        let (reply, rx) = oneshot::channel();
        self.send(StateCommand::LoadItemStates { module: module.to_string(), version: version.to_string(), reply })
            .await?;
        rx.await.map_err(|_| StateError::ChannelClosed)?
    }

    pub async fn shutdown(&self) -> Result<(), StateError> {
        let (reply, rx) = oneshot::channel();
        self.send(StateCommand::Shutdown { reply }).await?;
        rx.await.map_err(|_| StateError::ChannelClosed)?
    }

    async fn send(&self, command: StateCommand) -> Result<(), StateError> {
        self.tx.send(command).await.map_err(|_| StateError::ChannelClosed)
    }
}

async fn actor_loop(store: FileStore, mut rx: mpsc::Receiver<StateCommand>) {
    debug!("state actor_loop: started");
    while let Some(command) = rx.recv().await {
        match command {
            StateCommand::SaveSummary { summary, reply } => {
                let result = store.save_summary(&summary);
                let _ = reply.send(result);
            }
            StateCommand::LoadSummary { module, version, reply } => {
                let result = store.load_summary(&module, &version);
                let _ = reply.send(result);
            }
            StateCommand::SaveItemState { module, version, item, reply } => {
                let result = store.save_item_state(&module, &version, &item);
                let _ = reply.send(result);
            }
            StateCommand::LoadItemStates { module, version, reply } => {
                let result = store.load_item_states(&module, &version);
                let _ = reply.send(result);
            }
            StateCommand::Shutdown { reply } => {
                debug!("state actor_loop: shutdown requested");
                let _ = reply.send(Ok(()));
                break;
            }
        }
    }
    warn!("state actor_loop: exited");
}
