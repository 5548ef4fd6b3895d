use std::sync::Arc;

use validator::Validate;

use crate::{
    domain::{PaymentFile, PaymentFileForm, VerificationStatus},
    error::Result,
    notify::Notifier,
    repository::PaymentRepository,
    service::detail_cache::PaymentDetailCache,
};

pub struct PaymentService {
    repo: Arc<dyn PaymentRepository>,
    cache: Arc<PaymentDetailCache>,
    notifier: Notifier,
}

impl PaymentService {
    pub fn new(
        repo: Arc<dyn PaymentRepository>,
        cache: Arc<PaymentDetailCache>,
        notifier: Notifier,
    ) -> Self {
        Self { repo, cache, notifier }
    }

    pub async fn get(&self, id: &str) -> Result<Option<PaymentFile>> {
        self.repo.find_by_id(id).await
    }

    pub async fn create(&self, form: PaymentFileForm) -> Result<PaymentFile> {
        let result = match form.validate() {
            Ok(()) => self.repo.create(form).await,
            Err(e) => Err(e.into()),
        };
        self.notifier.report(result, "Payment added", "Failed to add payment")
    }

    /// Save an edited payment. Verifying it accepts the participant too.
    pub async fn update(&self, id: &str, form: PaymentFileForm) -> Result<PaymentFile> {
        let success = if form.verification_status == VerificationStatus::Verified {
            "Payment updated and participant accepted"
        } else {
            "Payment updated"
        };
        let result = match form.validate() {
            Ok(()) => self.repo.update(id, form).await,
            Err(e) => Err(e.into()),
        };
        self.notifier.report(result, success, "Failed to update payment")
    }

    /// Delete a payment and drop its cached detail.
    pub async fn delete(&self, id: &str) -> Result<()> {
        let result = self.repo.delete(id).await;
        if result.is_ok() {
            self.cache.evict(id);
        }
        self.notifier.report(result, "Payment deleted", "Failed to delete payment")
    }
}
