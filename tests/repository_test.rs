mod common;

use std::sync::Arc;

use common::yoga_fixture;
use serde_json::json;
use trainhub::{
    domain::{
        ClassForm, ClassStatus, ClassType, ParticipantStatus, PaymentFileForm,
        VerificationStatus,
    },
    repository::{
        ClassRepository, ParticipantRepository, PaymentRepository, StoreClassRepository,
        StoreParticipantRepository, StorePaymentRepository,
    },
    store::{DocumentStore, MemoryStore},
};

fn store() -> Arc<dyn DocumentStore> {
    Arc::new(MemoryStore::with_data(yoga_fixture()))
}

fn payment_form(status: VerificationStatus) -> PaymentFileForm {
    PaymentFileForm {
        participant_id: "u1".to_string(),
        file_path: "https://storage.example.com/receipts/alice.jpg".to_string(),
        verified: status == VerificationStatus::Verified,
        verification_date: Some(1_700_000_100_000),
        verification_status: status,
    }
}

#[tokio::test]
async fn test_payment_crud() -> anyhow::Result<()> {
    let store = store();
    let repo = StorePaymentRepository::new(store.clone());

    let created = repo.create(payment_form(VerificationStatus::Pending)).await?;
    assert_eq!(created.participant_id, "u1");

    let found = repo.find_by_id(&created.id).await?.expect("created payment");
    assert_eq!(found, created);
    // The key is not duplicated inside the record
    let raw = store.get(&format!("payment_files/{}", created.id)).await?.unwrap();
    assert!(raw.get("id").is_none());

    assert_eq!(repo.list().await?.len(), 2);

    repo.delete(&created.id).await?;
    assert!(repo.find_by_id(&created.id).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn test_verifying_payment_accepts_participant_atomically() -> anyhow::Result<()> {
    let store = store();
    let repo = StorePaymentRepository::new(store.clone());
    let mut root = store.subscribe("").await?;
    root.next().await;

    repo.update("p1", payment_form(VerificationStatus::Verified)).await?;

    // One notification carrying both writes
    let after = root.next().await.flatten().expect("tree after update");
    assert_eq!(after["payment_files"]["p1"]["verificationStatus"], json!("verified"));
    assert_eq!(after["participants"]["u1"]["status"], json!("accepted"));
    Ok(())
}

#[tokio::test]
async fn test_unverified_update_leaves_participant_alone() -> anyhow::Result<()> {
    let store = store();
    let repo = StorePaymentRepository::new(store.clone());

    let updated = repo.update("p1", payment_form(VerificationStatus::Invalid)).await?;
    assert_eq!(updated.verification_status, VerificationStatus::Invalid);
    assert_eq!(store.get("participants/u1/status").await?, Some(json!("pending")));
    Ok(())
}

#[tokio::test]
async fn test_update_replaces_whole_payment() -> anyhow::Result<()> {
    let store = store();
    store.set("payment_files/p1/note", json!("stale")).await?;
    let repo = StorePaymentRepository::new(store.clone());

    repo.update("p1", payment_form(VerificationStatus::Pending)).await?;
    assert!(store.get("payment_files/p1/note").await?.is_none());
    Ok(())
}

#[tokio::test]
async fn test_rejects_ids_that_escape_the_collection() -> anyhow::Result<()> {
    let repo = StorePaymentRepository::new(store());
    assert!(repo.delete("p1/../other").await.is_err());
    assert!(repo.find_by_id("").await.is_err());
    Ok(())
}

#[tokio::test]
async fn test_class_crud() -> anyhow::Result<()> {
    let store = store();
    let repo = StoreClassRepository::new(store.clone());
    store.set("classes/c1/color", json!("#FF0000")).await?;

    let form = ClassForm {
        name: "Pilates".to_string(),
        description: "Core strength".to_string(),
        category: "Health".to_string(),
        kind: ClassType::Private,
        start_date: 1_700_000_000_000,
        end_date: 1_700_600_000_000,
        price: 200_000.0,
        status: ClassStatus::Upcoming,
        image: String::new(),
        color: None,
        icon: None,
    };
    let created = repo.create(form.clone()).await?;
    assert_eq!(created.name, "Pilates");
    assert_eq!(repo.list().await?.len(), 2);

    let updated = repo.update("c1", ClassForm { name: "Yoga Flow".to_string(), ..form }).await?;
    assert_eq!(updated.name, "Yoga Flow");
    assert!(updated.updated_at.is_some());
    // Merge keeps fields the form does not carry
    assert_eq!(updated.color.as_deref(), Some("#FF0000"));

    repo.delete(&created.id).await?;
    assert!(repo.find_by_id(&created.id).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn test_participant_queries() -> anyhow::Result<()> {
    let store = store();
    store
        .set("participants/u2", json!({"name": "Bob", "type": "event", "eventId": "e1"}))
        .await?;
    let repo = StoreParticipantRepository::new(store.clone());

    assert_eq!(repo.list().await?.len(), 2);
    assert_eq!(repo.list_by_event("e1").await?[0].name, "Bob");
    assert_eq!(repo.list_by_class("c1").await?[0].name, "Alice");
    assert!(repo.list_by_class("c9").await?.is_empty());

    repo.set_status("u2", ParticipantStatus::Rejected).await?;
    let bob = repo.find_by_id("u2").await?.unwrap();
    assert_eq!(bob.status, ParticipantStatus::Rejected);
    assert!(bob.updated_at > 0);
    Ok(())
}
