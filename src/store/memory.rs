use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::{mpsc, RwLock};

use crate::{
    error::{AppError, Result},
    store::{
        push_id::PushIdGenerator,
        tree::{self, segments},
        DocumentStore, Snapshot, Subscription,
    },
};

struct Watcher {
    path: Vec<String>,
    tx: mpsc::UnboundedSender<Snapshot>,
}

#[derive(Default)]
struct State {
    root: Value,
    watchers: Vec<Watcher>,
}

impl State {
    /// Send the current value to every watcher touched by one of `written`.
    fn notify(&mut self, written: &[Vec<String>]) {
        let root = &self.root;
        self.watchers.retain(|watcher| {
            if !written.iter().any(|w| tree::overlaps(&watcher.path, w)) {
                return !watcher.tx.is_closed();
            }
            let snapshot = tree::get_at(root, &watcher.path).cloned();
            watcher.tx.send(snapshot).is_ok()
        });
    }
}

/// In-process document store holding the whole tree in memory.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<State>,
    push_ids: Mutex<PushIdGenerator>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with an initial tree.
    pub fn with_data(root: Value) -> Self {
        Self {
            state: RwLock::new(State {
                root: tree::prune(root),
                watchers: Vec::new(),
            }),
            push_ids: Mutex::new(PushIdGenerator::new()),
        }
    }

    fn next_key(&self) -> Result<String> {
        let mut ids = self
            .push_ids
            .lock()
            .map_err(|_| AppError::Internal("push id generator poisoned".to_string()))?;
        Ok(ids.next_id())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, path: &str) -> Result<Snapshot> {
        let segs = segments(path)?;
        let state = self.state.read().await;
        Ok(tree::get_at(&state.root, &segs).cloned())
    }

    async fn set(&self, path: &str, value: Value) -> Result<()> {
        let segs = segments(path)?;
        let mut state = self.state.write().await;
        tree::set_at(&mut state.root, &segs, value);
        state.notify(&[segs]);
        Ok(())
    }

    async fn update(&self, path: &str, updates: Map<String, Value>) -> Result<()> {
        let base = segments(path)?;
        // Validate every location before touching the tree
        let mut writes = Vec::with_capacity(updates.len());
        for (key, value) in updates {
            let mut segs = base.clone();
            segs.extend(segments(&key)?);
            if segs.len() == base.len() {
                return Err(AppError::BadRequest(
                    "Update keys must name a child location".to_string(),
                ));
            }
            writes.push((segs, value));
        }

        let mut state = self.state.write().await;
        let mut written = Vec::with_capacity(writes.len());
        for (segs, value) in writes {
            tree::set_at(&mut state.root, &segs, value);
            written.push(segs);
        }
        state.notify(&written);
        Ok(())
    }

    async fn remove(&self, path: &str) -> Result<()> {
        let segs = segments(path)?;
        let mut state = self.state.write().await;
        tree::remove_at(&mut state.root, &segs);
        state.notify(&[segs]);
        Ok(())
    }

    async fn push(&self, path: &str, value: Value) -> Result<String> {
        let key = self.next_key()?;
        self.set(&tree::child(path, &key), value).await?;
        Ok(key)
    }

    async fn subscribe(&self, path: &str) -> Result<Subscription> {
        let segs = segments(path)?;
        let (tx, rx) = mpsc::unbounded_channel();
        let mut state = self.state.write().await;
        let initial = tree::get_at(&state.root, &segs).cloned();
        // The receiver is still held here, so this send cannot fail
        let _ = tx.send(initial);
        state.watchers.push(Watcher { path: segs, tx });
        Ok(Subscription::new(rx))
    }
}
