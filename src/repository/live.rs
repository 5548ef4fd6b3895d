use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::de::DeserializeOwned;
use tokio::{
    sync::{watch, RwLock},
    task::JoinHandle,
};

use crate::{
    domain::Record,
    error::{AppError, Result},
    repository::decode_collection,
    store::{DocumentStore, Subscription},
};

struct LiveState<T> {
    items: Vec<T>,
    loaded: bool,
}

/// A collection kept in sync with the store through a subscription.
///
/// Nothing is fetched until [`start`](Self::start); [`stop`](Self::stop)
/// unsubscribes, stops any retrying and keeps the last items.
pub struct LiveCollection<T> {
    path: String,
    state: Arc<RwLock<LiveState<T>>>,
    version: Arc<watch::Sender<u64>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl<T> LiveCollection<T>
where
    T: Record + DeserializeOwned + Clone + Send + Sync + 'static,
{
    pub fn new(path: impl Into<String>) -> Self {
        let (version, _) = watch::channel(0);
        Self {
            path: path.into(),
            state: Arc::new(RwLock::new(LiveState {
                items: Vec::new(),
                loaded: false,
            })),
            version: Arc::new(version),
            task: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Subscribe to the collection. Restarting replaces the old subscription.
    ///
    /// If the first subscribe fails the collection counts as loaded and
    /// empty, the error is returned, and resubscribing continues in the
    /// background. A subscription that ends is likewise retried with backoff.
    pub async fn start(&self, store: Arc<dyn DocumentStore>) -> Result<()> {
        let feed = Feed {
            path: self.path.clone(),
            state: self.state.clone(),
            version: self.version.clone(),
        };

        let (subscription, outcome) = match store.subscribe(&self.path).await {
            Ok(subscription) => (Some(subscription), Ok(())),
            Err(e) => {
                feed.mark_loaded().await;
                (None, Err(e))
            }
        };
        let task = tokio::spawn(feed.run(store, subscription));

        let mut slot = self
            .task
            .lock()
            .map_err(|_| AppError::Internal("live collection lock poisoned".to_string()))?;
        if let Some(previous) = slot.replace(task) {
            previous.abort();
        }
        outcome
    }

    pub fn stop(&self) {
        if let Ok(mut slot) = self.task.lock() {
            if let Some(task) = slot.take() {
                task.abort();
                tracing::debug!("Stopped live collection '{}'", self.path);
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.task
            .lock()
            .map(|slot| slot.as_ref().map_or(false, |t| !t.is_finished()))
            .unwrap_or(false)
    }

    pub async fn items(&self) -> Vec<T> {
        self.state.read().await.items.clone()
    }

    /// Whether the first snapshot (or a failure) has arrived.
    pub async fn loaded(&self) -> bool {
        self.state.read().await.loaded
    }

    pub async fn find(&self, id: &str) -> Option<T> {
        self.state
            .read()
            .await
            .items
            .iter()
            .find(|item| item.id() == id)
            .cloned()
    }

    /// Receiver whose value changes every time a snapshot is applied.
    pub fn changes(&self) -> watch::Receiver<u64> {
        self.version.subscribe()
    }

    /// Wait until the first snapshot has been applied.
    pub async fn wait_loaded(&self) {
        let mut changes = self.changes();
        while !self.loaded().await {
            if changes.changed().await.is_err() {
                return;
            }
        }
    }
}

const RETRY_INITIAL: Duration = Duration::from_secs(1);
const RETRY_MAX: Duration = Duration::from_secs(30);

/// The background half of a live collection.
struct Feed<T> {
    path: String,
    state: Arc<RwLock<LiveState<T>>>,
    version: Arc<watch::Sender<u64>>,
}

impl<T> Feed<T>
where
    T: Record + DeserializeOwned + Clone + Send + Sync + 'static,
{
    async fn run(self, store: Arc<dyn DocumentStore>, mut subscription: Option<Subscription>) {
        let mut delay = RETRY_INITIAL;
        loop {
            if let Some(mut current) = subscription.take() {
                if self.follow(&mut current).await {
                    delay = RETRY_INITIAL;
                }
                tracing::warn!("Subscription to '{}' ended, resubscribing in {:?}", self.path, delay);
            }

            tokio::time::sleep(delay).await;
            delay = (delay * 2).min(RETRY_MAX);

            match store.subscribe(&self.path).await {
                Ok(resumed) => {
                    tracing::info!("Resubscribed to '{}'", self.path);
                    subscription = Some(resumed);
                }
                Err(e) => tracing::warn!("Resubscribing to '{}' failed: {}", self.path, e),
            }
        }
    }

    /// Apply snapshots until the subscription ends. Returns whether any arrived.
    async fn follow(&self, subscription: &mut Subscription) -> bool {
        let mut received = false;
        while let Some(snapshot) = subscription.next().await {
            received = true;
            let items: Vec<T> = decode_collection(&self.path, snapshot);
            tracing::debug!("Live collection '{}' now has {} records", self.path, items.len());
            {
                let mut state = self.state.write().await;
                state.items = items;
                state.loaded = true;
            }
            self.version.send_modify(|v| *v += 1);
        }
        self.mark_loaded().await;
        received
    }

    async fn mark_loaded(&self) {
        let mut state = self.state.write().await;
        if !state.loaded {
            state.loaded = true;
            drop(state);
            self.version.send_modify(|v| *v += 1);
        }
    }
}

impl<T> Drop for LiveCollection<T> {
    fn drop(&mut self) {
        if let Ok(mut slot) = self.task.lock() {
            if let Some(task) = slot.take() {
                task.abort();
            }
        }
    }
}
