//! Realtime-database REST backend.
//!
//! Every location maps to `{base_url}/{path}.json`. Live subscriptions use
//! the server-sent event stream served for `Accept: text/event-stream`.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::{header, Client, RequestBuilder};
use serde::Deserialize;
use serde_json::{Map, Value};
use tokio::sync::mpsc;

use crate::{
    error::{AppError, Result},
    store::{
        tree::{self, segments},
        DocumentStore, Snapshot, Subscription,
    },
};

#[derive(Debug, Deserialize)]
struct PushResponse {
    name: String,
}

#[derive(Debug, Deserialize)]
struct EventPayload {
    path: String,
    data: Value,
}

pub struct RestStore {
    client: Client,
    // Event streams stay open indefinitely, so this one has no timeout
    stream_client: Client,
    base_url: String,
    auth_token: Option<String>,
}

impl RestStore {
    pub fn new(base_url: String, auth_token: Option<String>, timeout: Duration) -> Result<Self> {
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(AppError::StoreUnavailable(format!(
                "Invalid store url: {}",
                base_url
            )));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::StoreUnavailable(e.to_string()))?;
        let stream_client = Client::builder()
            .build()
            .map_err(|e| AppError::StoreUnavailable(e.to_string()))?;

        Ok(Self {
            client,
            stream_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_token,
        })
    }

    fn url(&self, path: &str) -> Result<String> {
        let encoded: Vec<String> = segments(path)?
            .iter()
            .map(|s| urlencoding::encode(s).into_owned())
            .collect();
        Ok(format!("{}/{}.json", self.base_url, encoded.join("/")))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.auth_token {
            Some(token) => request.query(&[("auth", token)]),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<reqwest::Response> {
        let response = self.authorize(request).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Store(format!("{}: {}", status, body)));
        }
        Ok(response)
    }
}

#[async_trait]
impl DocumentStore for RestStore {
    async fn get(&self, path: &str) -> Result<Snapshot> {
        let url = self.url(path)?;
        let value: Value = self.send(self.client.get(url)).await?.json().await?;
        Ok(Some(value).filter(|v| !v.is_null()))
    }

    async fn set(&self, path: &str, value: Value) -> Result<()> {
        let url = self.url(path)?;
        if tree::prune(value.clone()).is_null() {
            self.send(self.client.delete(url)).await?;
        } else {
            self.send(self.client.put(url).json(&value)).await?;
        }
        Ok(())
    }

    async fn update(&self, path: &str, updates: Map<String, Value>) -> Result<()> {
        for key in updates.keys() {
            segments(key)?;
        }
        let url = self.url(path)?;
        self.send(self.client.patch(url).json(&updates)).await?;
        Ok(())
    }

    async fn remove(&self, path: &str) -> Result<()> {
        let url = self.url(path)?;
        self.send(self.client.delete(url)).await?;
        Ok(())
    }

    async fn push(&self, path: &str, value: Value) -> Result<String> {
        let url = self.url(path)?;
        let response: PushResponse = self.send(self.client.post(url).json(&value)).await?.json().await?;
        Ok(response.name)
    }

    async fn subscribe(&self, path: &str) -> Result<Subscription> {
        let url = self.url(path)?;
        let request = self
            .stream_client
            .get(url)
            .header(header::ACCEPT, "text/event-stream");
        let response = self.send(request).await?;

        let (tx, rx) = mpsc::unbounded_channel();
        let location = path.to_string();
        let task = tokio::spawn(async move {
            let mut stream = response.bytes_stream();
            let mut parser = EventStreamParser::default();

            while let Some(chunk) = stream.next().await {
                let chunk = match chunk {
                    Ok(chunk) => chunk,
                    Err(e) => {
                        tracing::error!("Subscription to '{}' failed: {}", location, e);
                        return;
                    }
                };

                for event in parser.feed(&chunk) {
                    match parser.apply(&event) {
                        Ok(Some(snapshot)) => {
                            if tx.send(snapshot).is_err() {
                                return;
                            }
                        }
                        Ok(None) => {}
                        Err(e) => {
                            tracing::warn!("Subscription to '{}' closed: {}", location, e);
                            return;
                        }
                    }
                }
            }
            tracing::debug!("Subscription stream for '{}' ended", location);
        });

        Ok(Subscription::with_task(rx, task))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StreamEvent {
    pub name: String,
    pub data: String,
}

/// Incremental parser for the event stream, keeping the subscribed value.
#[derive(Debug, Default)]
pub struct EventStreamParser {
    buffer: Vec<u8>,
    event: Option<String>,
    data: Vec<String>,
    snapshot: Value,
}

impl EventStreamParser {
    /// Consume a chunk of the stream and return every event it completes.
    /// Lines are decoded only once complete, so a character split across
    /// chunks survives.
    pub fn feed(&mut self, chunk: impl AsRef<[u8]>) -> Vec<StreamEvent> {
        self.buffer.extend_from_slice(chunk.as_ref());
        let mut events = Vec::new();

        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let raw: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&raw);
            let line = line.trim_end_matches(['\n', '\r']);

            if line.is_empty() {
                if let Some(name) = self.event.take() {
                    events.push(StreamEvent {
                        name,
                        data: self.data.join("\n"),
                    });
                }
                self.data.clear();
            } else if let Some(name) = line.strip_prefix("event:") {
                self.event = Some(name.trim().to_string());
            } else if let Some(data) = line.strip_prefix("data:") {
                self.data.push(data.trim_start().to_string());
            }
        }

        events
    }

    /// Fold an event into the kept value. Returns the new snapshot when the
    /// value changed and an error when the server closed the stream.
    pub fn apply(&mut self, event: &StreamEvent) -> Result<Option<Snapshot>> {
        match event.name.as_str() {
            "put" => {
                let payload: EventPayload = serde_json::from_str(&event.data)?;
                tree::set_at(&mut self.snapshot, &segments(&payload.path)?, payload.data);
            }
            "patch" => {
                let payload: EventPayload = serde_json::from_str(&event.data)?;
                let base = segments(&payload.path)?;
                let Value::Object(children) = payload.data else {
                    return Err(AppError::Decode("patch event without object data".to_string()));
                };
                for (key, value) in children {
                    let mut segs = base.clone();
                    segs.extend(segments(&key)?);
                    tree::set_at(&mut self.snapshot, &segs, value);
                }
            }
            "keep-alive" => return Ok(None),
            "cancel" => return Err(AppError::Store(format!("cancelled: {}", event.data))),
            "auth_revoked" => return Err(AppError::Store("auth revoked".to_string())),
            other => {
                tracing::debug!("Ignoring stream event '{}'", other);
                return Ok(None);
            }
        }

        Ok(Some(tree::get_at(&self.snapshot, &[]).cloned()))
    }
}
