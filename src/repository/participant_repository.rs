use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};

use crate::{
    domain::{from_record, Participant, ParticipantStatus},
    error::Result,
    repository::{decode_collection, record_path, ParticipantRepository, PARTICIPANTS},
    store::DocumentStore,
};

/// Participants are created by the public registration flow; the admin side
/// only reads them and moves their status.
pub struct StoreParticipantRepository {
    store: Arc<dyn DocumentStore>,
}

impl StoreParticipantRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ParticipantRepository for StoreParticipantRepository {
    async fn list(&self) -> Result<Vec<Participant>> {
        let snapshot = self.store.get(PARTICIPANTS).await?;
        Ok(decode_collection(PARTICIPANTS, snapshot))
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Participant>> {
        let path = record_path(PARTICIPANTS, id)?;
        match self.store.get(&path).await? {
            Some(value) => Ok(Some(from_record(id, value)?)),
            None => Ok(None),
        }
    }

    async fn list_by_event(&self, event_id: &str) -> Result<Vec<Participant>> {
        let all = self.list().await?;
        Ok(all
            .into_iter()
            .filter(|p| p.event_id.as_deref() == Some(event_id))
            .collect())
    }

    async fn list_by_class(&self, class_id: &str) -> Result<Vec<Participant>> {
        let all = self.list().await?;
        Ok(all
            .into_iter()
            .filter(|p| p.class_id.as_deref() == Some(class_id))
            .collect())
    }

    async fn set_status(&self, id: &str, status: ParticipantStatus) -> Result<()> {
        let path = record_path(PARTICIPANTS, id)?;
        let mut fields = Map::new();
        fields.insert("status".to_string(), Value::String(status.as_str().to_string()));
        fields.insert("updatedAt".to_string(), Value::from(Utc::now().timestamp_millis()));
        self.store.update(&path, fields).await
    }
}
