use async_trait::async_trait;
use crate::domain::*;
use crate::error::{AppError, Result};
use crate::store::tree;

pub mod live;
pub mod payment_repository;
pub mod class_repository;
pub mod participant_repository;

pub use live::LiveCollection;
pub use payment_repository::StorePaymentRepository;
pub use class_repository::StoreClassRepository;
pub use participant_repository::StoreParticipantRepository;

pub const PAYMENT_FILES: &str = "payment_files";
pub const PARTICIPANTS: &str = "participants";
pub const CLASSES: &str = "classes";

/// Path of one record, rejecting ids that would address another location.
pub fn record_path(collection: &str, id: &str) -> Result<String> {
    let segs = tree::segments(id)?;
    if segs.len() != 1 || segs[0] != id {
        return Err(AppError::BadRequest(format!("Invalid record id: '{}'", id)));
    }
    Ok(tree::child(collection, id))
}

#[async_trait]
pub trait PaymentRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<PaymentFile>>;
    async fn find_by_id(&self, id: &str) -> Result<Option<PaymentFile>>;
    async fn create(&self, form: PaymentFileForm) -> Result<PaymentFile>;
    /// Replace the payment; a `verified` status also accepts the participant
    /// in the same atomic write.
    async fn update(&self, id: &str, form: PaymentFileForm) -> Result<PaymentFile>;
    async fn delete(&self, id: &str) -> Result<()>;
}

#[async_trait]
pub trait ClassRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Class>>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Class>>;
    async fn create(&self, form: ClassForm) -> Result<Class>;
    async fn update(&self, id: &str, form: ClassForm) -> Result<Class>;
    async fn delete(&self, id: &str) -> Result<()>;
}

#[async_trait]
pub trait ParticipantRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Participant>>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Participant>>;
    async fn list_by_event(&self, event_id: &str) -> Result<Vec<Participant>>;
    async fn list_by_class(&self, class_id: &str) -> Result<Vec<Participant>>;
    async fn set_status(&self, id: &str, status: ParticipantStatus) -> Result<()>;
}

/// Decode every child of a collection snapshot, skipping malformed records.
pub fn decode_collection<T>(collection: &str, snapshot: Option<serde_json::Value>) -> Vec<T>
where
    T: serde::de::DeserializeOwned,
{
    let Some(serde_json::Value::Object(children)) = snapshot else {
        return Vec::new();
    };

    children
        .into_iter()
        .filter_map(|(id, value)| match from_record(&id, value) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!("Skipping malformed record in '{}': {}", collection, e);
                None
            }
        })
        .collect()
}
