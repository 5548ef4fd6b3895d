#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc, Mutex,
};

use async_trait::async_trait;
use tokio::sync::{mpsc, Notify};
use serde_json::{json, Map, Value};
use trainhub::{
    error::{AppError, Result},
    store::{DocumentStore, MemoryStore, Snapshot, Subscription},
};

/// Memory store that records point reads and can simulate failures.
#[derive(Default)]
pub struct CountingStore {
    inner: MemoryStore,
    reads: Mutex<Vec<String>>,
    failing_reads: Mutex<HashSet<String>>,
    held_reads: Mutex<Vec<(String, Arc<Notify>)>>,
    fail_writes: AtomicBool,
    subscribe_count: AtomicUsize,
    short_subscriptions: AtomicUsize,
}

impl CountingStore {
    pub fn with_data(root: Value) -> Self {
        Self {
            inner: MemoryStore::with_data(root),
            ..Default::default()
        }
    }

    pub fn reads(&self) -> Vec<String> {
        self.reads.lock().unwrap().clone()
    }

    pub fn read_count(&self) -> usize {
        self.reads.lock().unwrap().len()
    }

    pub fn reads_under(&self, prefix: &str) -> usize {
        self.reads
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.starts_with(prefix))
            .count()
    }

    pub fn fail_reads_at(&self, path: &str) {
        self.failing_reads.lock().unwrap().insert(path.to_string());
    }

    /// Reads of `path` wait until the returned handle is notified.
    pub fn hold_reads_at(&self, path: &str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.held_reads
            .lock()
            .unwrap()
            .push((path.to_string(), gate.clone()));
        gate
    }

    /// The next `count` subscriptions close right after their first snapshot.
    pub fn end_subscriptions_early(&self, count: usize) {
        self.short_subscriptions.store(count, Ordering::SeqCst);
    }

    pub fn subscribe_count(&self) -> usize {
        self.subscribe_count.load(Ordering::SeqCst)
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_write(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            Err(AppError::Store("write rejected".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl DocumentStore for CountingStore {
    async fn get(&self, path: &str) -> Result<Snapshot> {
        self.reads.lock().unwrap().push(path.to_string());
        if self.failing_reads.lock().unwrap().contains(path) {
            return Err(AppError::Store("unreachable".to_string()));
        }
        let gate = self
            .held_reads
            .lock()
            .unwrap()
            .iter()
            .find(|(held, _)| held == path)
            .map(|(_, gate)| gate.clone());
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.inner.get(path).await
    }

    async fn set(&self, path: &str, value: Value) -> Result<()> {
        self.check_write()?;
        self.inner.set(path, value).await
    }

    async fn update(&self, path: &str, updates: Map<String, Value>) -> Result<()> {
        self.check_write()?;
        self.inner.update(path, updates).await
    }

    async fn remove(&self, path: &str) -> Result<()> {
        self.check_write()?;
        self.inner.remove(path).await
    }

    async fn push(&self, path: &str, value: Value) -> Result<String> {
        self.check_write()?;
        self.inner.push(path, value).await
    }

    async fn subscribe(&self, path: &str) -> Result<Subscription> {
        self.subscribe_count.fetch_add(1, Ordering::SeqCst);
        let mut subscription = self.inner.subscribe(path).await?;

        let short = self
            .short_subscriptions
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if !short {
            return Ok(subscription);
        }

        let (tx, rx) = mpsc::unbounded_channel();
        if let Some(first) = subscription.next().await {
            let _ = tx.send(first);
        }
        Ok(Subscription::new(rx))
    }
}

/// Alice in the Yoga class, paying with p1.
pub fn yoga_fixture() -> Value {
    json!({
        "payment_files": {
            "p1": {
                "participantId": "u1",
                "filePath": "https://storage.example.com/receipts/alice.jpg",
                "verified": false,
                "verificationStatus": "pending"
            }
        },
        "participants": {
            "u1": {
                "name": "Alice",
                "email": "alice@example.com",
                "phoneNumber": "0812",
                "status": "pending",
                "type": "class",
                "classId": "c1",
                "createdAt": 1_700_000_000_000i64,
                "updatedAt": 1_700_000_000_000i64
            }
        },
        "classes": {
            "c1": {
                "name": "Yoga",
                "category": "Health",
                "type": "no private",
                "status": "active",
                "price": 150000
            }
        }
    })
}

/// `count` payments `p00..`, each with its own participant in class c1.
pub fn many_payments_fixture(count: usize) -> Value {
    let mut payments = Map::new();
    let mut participants = Map::new();
    for i in 0..count {
        payments.insert(
            format!("p{:02}", i),
            json!({
                "participantId": format!("u{:02}", i),
                "filePath": format!("receipts/{:02}.jpg", i),
                "verified": i % 2 == 0,
                "verificationStatus": if i % 2 == 0 { "verified" } else { "pending" }
            }),
        );
        participants.insert(
            format!("u{:02}", i),
            json!({"name": format!("Participant {}", i), "classId": "c1"}),
        );
    }
    json!({
        "payment_files": payments,
        "participants": participants,
        "classes": {"c1": {"name": "Yoga", "category": "Health"}}
    })
}

pub fn arc(store: CountingStore) -> (Arc<CountingStore>, Arc<dyn DocumentStore>) {
    let store = Arc::new(store);
    let dyn_store: Arc<dyn DocumentStore> = store.clone();
    (store, dyn_store)
}
