//! User-visible notices for the admin surface.

use serde::Serialize;
use tokio::sync::broadcast;

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

/// Broadcasts transient notices to whoever is listening. Notices sent while
/// nobody listens are dropped, but every notice is also logged.
#[derive(Clone)]
pub struct Notifier {
    tx: broadcast::Sender<Notice>,
}

impl Notifier {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(64);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.tx.subscribe()
    }

    pub fn success(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::info!("{}", message);
        self.send(NoticeLevel::Success, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::error!("{}", message);
        self.send(NoticeLevel::Error, message);
    }

    /// Announce the outcome of a write and hand the result back unchanged,
    /// so the caller can keep its form open on failure.
    pub fn report<T>(&self, result: Result<T>, success: &str, failure: &str) -> Result<T> {
        match &result {
            Ok(_) => self.success(success),
            Err(e) => {
                tracing::error!("{}: {}", failure, e);
                self.send(NoticeLevel::Error, failure.to_string());
            }
        }
        result
    }

    fn send(&self, level: NoticeLevel, message: String) {
        // No receivers is not an error
        let _ = self.tx.send(Notice { level, message });
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}
