use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::mpsc;

use crate::{
    error::{AppError, Result},
    store::{DocumentStore, Snapshot, Subscription},
};

/// Placeholder used when the configured store could not be initialized.
///
/// Reads and subscriptions see an empty tree; writes fail.
pub struct DisconnectedStore {
    reason: String,
}

impl DisconnectedStore {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    fn unavailable(&self) -> AppError {
        AppError::StoreUnavailable(self.reason.clone())
    }
}

#[async_trait]
impl DocumentStore for DisconnectedStore {
    async fn get(&self, _path: &str) -> Result<Snapshot> {
        Ok(None)
    }

    async fn set(&self, _path: &str, _value: Value) -> Result<()> {
        Err(self.unavailable())
    }

    async fn update(&self, _path: &str, _updates: Map<String, Value>) -> Result<()> {
        Err(self.unavailable())
    }

    async fn remove(&self, _path: &str) -> Result<()> {
        Err(self.unavailable())
    }

    async fn push(&self, _path: &str, _value: Value) -> Result<String> {
        Err(self.unavailable())
    }

    async fn subscribe(&self, _path: &str) -> Result<Subscription> {
        let (tx, rx) = mpsc::unbounded_channel();
        // A single empty snapshot; the stream then stays open and silent
        let _ = tx.send(None);
        let task = tokio::spawn(async move {
            let _tx = tx;
            std::future::pending::<()>().await;
        });
        Ok(Subscription::with_task(rx, task))
    }
}
