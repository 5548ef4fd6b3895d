use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::{sync::mpsc, task::JoinHandle};

use crate::{
    config::{StoreBackend, StoreConfig},
    error::{AppError, Result},
    notify::Notifier,
};

pub mod disconnected;
pub mod memory;
pub mod push_id;
pub mod rest;
pub mod tree;

pub use disconnected::DisconnectedStore;
pub use memory::MemoryStore;
pub use rest::RestStore;

/// Value observed at a location; `None` when nothing is stored there.
pub type Snapshot = Option<Value>;

/// A remote tree-structured document store.
///
/// Every location is addressed by a `/`-separated path. Writing `null`
/// (or an empty object) to a location removes it.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// One-shot read of the value at `path`.
    async fn get(&self, path: &str) -> Result<Snapshot>;

    /// Replace the whole value at `path`.
    async fn set(&self, path: &str, value: Value) -> Result<()>;

    /// Apply several writes relative to `path` as a single atomic step.
    /// Keys may themselves be multi-segment paths.
    async fn update(&self, path: &str, updates: Map<String, Value>) -> Result<()>;

    async fn remove(&self, path: &str) -> Result<()>;

    /// Append `value` under `path` with a generated key and return the key.
    async fn push(&self, path: &str, value: Value) -> Result<String>;

    /// Live snapshots of `path`: the current value first, then one per change.
    async fn subscribe(&self, path: &str) -> Result<Subscription>;
}

/// Receiving end of a live subscription. Dropping it unsubscribes.
pub struct Subscription {
    rx: mpsc::UnboundedReceiver<Snapshot>,
    task: Option<JoinHandle<()>>,
}

impl Subscription {
    pub fn new(rx: mpsc::UnboundedReceiver<Snapshot>) -> Self {
        Self { rx, task: None }
    }

    /// A subscription fed by a background task that is aborted on drop.
    pub fn with_task(rx: mpsc::UnboundedReceiver<Snapshot>, task: JoinHandle<()>) -> Self {
        Self {
            rx,
            task: Some(task),
        }
    }

    /// Wait for the next snapshot. `None` means the subscription ended.
    pub async fn next(&mut self) -> Option<Snapshot> {
        self.rx.recv().await
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Build the configured store.
pub fn connect(config: &StoreConfig) -> Result<Arc<dyn DocumentStore>> {
    match config.backend {
        StoreBackend::Memory => Ok(Arc::new(MemoryStore::new())),
        StoreBackend::Rest => {
            let url = config.url.clone().ok_or_else(|| {
                AppError::StoreUnavailable("store.url is required for the rest backend".to_string())
            })?;
            let store = RestStore::new(
                url,
                config.auth_token.clone(),
                Duration::from_secs(config.request_timeout_secs),
            )?;
            Ok(Arc::new(store))
        }
    }
}

/// Build the configured store, falling back to a [`DisconnectedStore`].
///
/// An initialization failure is reported once through `notifier`; every
/// later write then fails with [`AppError::StoreUnavailable`].
pub fn open(config: &StoreConfig, notifier: &Notifier) -> Arc<dyn DocumentStore> {
    match connect(config) {
        Ok(store) => store,
        Err(e) => {
            tracing::error!("Failed to initialize document store: {}", e);
            notifier.error("Document store is not initialized");
            Arc::new(DisconnectedStore::new(e.to_string()))
        }
    }
}
