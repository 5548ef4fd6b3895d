use clap::Parser;
use chrono::{Duration, Utc};
use fake::{
    faker::{
        address::en::{CityName, StreetName},
        internet::en::SafeEmail,
        name::en::Name,
        phone_number::en::PhoneNumber,
    },
    Fake,
};
use rand::{seq::SliceRandom, Rng};
use serde_json::json;

use trainhub::{
    config::{Settings, StoreBackend},
    domain::{ClassForm, ClassStatus, ClassType, PaymentFileForm, VerificationStatus},
    repository::{ClassRepository, PaymentRepository, StoreClassRepository, StorePaymentRepository, PARTICIPANTS},
    store,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Fill the document store with sample data")]
struct Args {
    /// Number of classes to create
    #[arg(long, default_value_t = 4)]
    classes: usize,

    /// Number of participants (each with one payment file)
    #[arg(long, default_value_t = 20)]
    participants: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let settings = Settings::new().unwrap_or_default();

    if settings.store.backend == StoreBackend::Memory {
        println!("⚠️  The memory backend is discarded on exit; set TRAINHUB__STORE__BACKEND=rest to keep the data");
    }
    println!("🌱 Seeding {:?} store...", settings.store.backend);
    let store = store::connect(&settings.store)?;
    let class_repo = StoreClassRepository::new(store.clone());
    let payment_repo = StorePaymentRepository::new(store.clone());
    let mut rng = rand::thread_rng();

    println!("📚 Creating classes...");
    let subjects = [
        ("Yoga", "Health"),
        ("Public Speaking", "Soft Skills"),
        ("Web Development", "Programming"),
        ("Digital Marketing", "Business"),
        ("Photography", "Creative"),
    ];
    let statuses = [ClassStatus::Active, ClassStatus::Upcoming, ClassStatus::OnGoing];
    let mut class_ids = Vec::new();
    for i in 0..args.classes {
        let (name, category) = subjects[i % subjects.len()];
        let start = Utc::now() + Duration::days(rng.gen_range(-30..60));
        let class = class_repo.create(ClassForm {
            name: name.to_string(),
            description: format!("{} class for beginners", name),
            category: category.to_string(),
            kind: if rng.gen_bool(0.3) { ClassType::Private } else { ClassType::NoPrivate },
            start_date: start.timestamp_millis(),
            end_date: (start + Duration::weeks(8)).timestamp_millis(),
            price: (rng.gen_range(10..100) * 10_000) as f64,
            status: *statuses.choose(&mut rng).unwrap_or(&ClassStatus::Upcoming),
            image: String::new(),
            color: None,
            icon: None,
        }).await?;
        println!("  ✅ {}", class.name);
        class_ids.push(class.id);
    }

    println!("👥 Creating participants and payment files...");
    for _ in 0..args.participants {
        let name: String = Name().fake();
        let created = Utc::now() - Duration::days(rng.gen_range(0..90));
        let class_id = class_ids.choose(&mut rng).cloned();

        let participant_id = store.push(PARTICIPANTS, json!({
            "name": name,
            "email": SafeEmail().fake::<String>(),
            "phoneNumber": PhoneNumber().fake::<String>(),
            "birthPlace": CityName().fake::<String>(),
            "address": StreetName().fake::<String>(),
            "currentResidence": CityName().fake::<String>(),
            "reason": "Career development",
            "lastEducation": "Bachelor",
            "status": "pending",
            "type": "class",
            "classId": class_id,
            "createdAt": created.timestamp_millis(),
            "updatedAt": created.timestamp_millis(),
        })).await?;

        let status = *[VerificationStatus::Pending, VerificationStatus::Verified, VerificationStatus::Invalid]
            .choose(&mut rng)
            .unwrap_or(&VerificationStatus::Pending);
        let form = PaymentFileForm {
            participant_id: participant_id.clone(),
            file_path: format!("payments/{}/transfer.jpg", participant_id),
            verified: status == VerificationStatus::Verified,
            verification_date: (status != VerificationStatus::Pending).then(|| Utc::now().timestamp_millis()),
            verification_status: if status == VerificationStatus::Verified {
                VerificationStatus::Pending
            } else {
                status
            },
        };
        let payment = payment_repo.create(form.clone()).await?;
        if status == VerificationStatus::Verified {
            // Goes through the combined write so the participant is accepted too
            payment_repo.update(&payment.id, PaymentFileForm { verification_status: status, ..form }).await?;
        }
        println!("  ✅ {} ({:?})", name, status);
    }

    println!("🎉 Seeding complete!");
    Ok(())
}
