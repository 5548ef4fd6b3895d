use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;

use crate::{
    domain::{from_record, to_record, Class, ClassForm},
    error::{AppError, Result},
    repository::{decode_collection, record_path, ClassRepository, CLASSES},
    store::DocumentStore,
};

pub struct StoreClassRepository {
    store: Arc<dyn DocumentStore>,
}

impl StoreClassRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ClassRepository for StoreClassRepository {
    async fn list(&self) -> Result<Vec<Class>> {
        let snapshot = self.store.get(CLASSES).await?;
        Ok(decode_collection(CLASSES, snapshot))
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Class>> {
        let path = record_path(CLASSES, id)?;
        match self.store.get(&path).await? {
            Some(value) => Ok(Some(from_record(id, value)?)),
            None => Ok(None),
        }
    }

    async fn create(&self, form: ClassForm) -> Result<Class> {
        let record = to_record(&form)?;
        let id = self.store.push(CLASSES, record.clone()).await?;
        from_record(&id, record)
    }

    async fn update(&self, id: &str, form: ClassForm) -> Result<Class> {
        let path = record_path(CLASSES, id)?;
        let Value::Object(mut fields) = to_record(&form)? else {
            return Err(AppError::Internal("class form did not encode to an object".to_string()));
        };
        fields.insert("updatedAt".to_string(), Value::from(Utc::now().timestamp_millis()));

        // Merge so fields the form leaves out keep their stored values
        self.store.update(&path, fields).await?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Class not found".to_string()))
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let path = record_path(CLASSES, id)?;
        self.store.remove(&path).await
    }
}
