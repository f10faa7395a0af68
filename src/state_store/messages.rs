//! Actor command protocol for the state store, grounded in the reply-channel
//! pattern of a request/response state actor: every command carries its own
//! `oneshot` reply channel so callers can `.await` a typed response.

use tokio::sync::oneshot;

use super::StateError;
use crate::domain::{ItemState, Summary};

pub type StateResponse<T> = Result<T, StateError>;

#[derive(Debug)]
pub enum StateCommand {
    SaveSummary {
        summary: Summary,
        reply: oneshot::Sender<StateResponse<()>>,
    },
    LoadSummary {
        module: String,
        version: String,
        reply: oneshot::Sender<StateResponse<Summary>>,
    },
    SaveItemState {
        module: String,
        version: String,
        item: ItemState,
        reply: oneshot::Sender<StateResponse<()>>,
    },
    LoadItemStates {
        module: String,
        version: String,
        reply: oneshot::Sender<StateResponse<Vec<ItemState>>>,
    },
    Shutdown {
        reply: oneshot::Sender<StateResponse<()>>,
    },
}
