use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::{
    domain::{from_record, to_record, ParticipantStatus, PaymentFile, PaymentFileForm, VerificationStatus},
    error::Result,
    repository::{decode_collection, record_path, PaymentRepository, PARTICIPANTS, PAYMENT_FILES},
    store::DocumentStore,
};

pub struct StorePaymentRepository {
    store: Arc<dyn DocumentStore>,
}

impl StorePaymentRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    fn into_payment(id: String, form: PaymentFileForm) -> PaymentFile {
        PaymentFile {
            id,
            participant_id: form.participant_id,
            file_path: form.file_path,
            verified: form.verified,
            verification_date: form.verification_date,
            verification_status: form.verification_status,
        }
    }
}

#[async_trait]
impl PaymentRepository for StorePaymentRepository {
    async fn list(&self) -> Result<Vec<PaymentFile>> {
        let snapshot = self.store.get(PAYMENT_FILES).await?;
        Ok(decode_collection(PAYMENT_FILES, snapshot))
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<PaymentFile>> {
        let path = record_path(PAYMENT_FILES, id)?;
        match self.store.get(&path).await? {
            Some(value) => Ok(Some(from_record(id, value)?)),
            None => Ok(None),
        }
    }

    async fn create(&self, form: PaymentFileForm) -> Result<PaymentFile> {
        let id = self.store.push(PAYMENT_FILES, to_record(&form)?).await?;
        Ok(Self::into_payment(id, form))
    }

    async fn update(&self, id: &str, form: PaymentFileForm) -> Result<PaymentFile> {
        let mut updates = Map::new();
        updates.insert(record_path(PAYMENT_FILES, id)?, to_record(&form)?);

        if form.verification_status == VerificationStatus::Verified {
            let participant = record_path(PARTICIPANTS, &form.participant_id)?;
            updates.insert(
                format!("{}/status", participant),
                Value::String(ParticipantStatus::Accepted.as_str().to_string()),
            );
        }

        self.store.update("", updates).await?;
        Ok(Self::into_payment(id.to_string(), form))
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let path = record_path(PAYMENT_FILES, id)?;
        self.store.remove(&path).await
    }
}
