use std::sync::Arc;

use crate::{
    domain::{Class, PaymentDetail, PaymentFile},
    error::Result,
    repository::{ClassRepository, ParticipantRepository},
};

/// Joins a payment with its participant and that participant's class.
pub struct PaymentDetailResolver {
    participants: Arc<dyn ParticipantRepository>,
    classes: Arc<dyn ClassRepository>,
}

impl PaymentDetailResolver {
    pub fn new(
        participants: Arc<dyn ParticipantRepository>,
        classes: Arc<dyn ClassRepository>,
    ) -> Self {
        Self { participants, classes }
    }

    /// Resolve a payment from the currently loaded list.
    ///
    /// Returns `None` without touching the store when `payment_id` is not in
    /// `payments`.
    pub async fn resolve(&self, payments: &[PaymentFile], payment_id: &str) -> Option<PaymentDetail> {
        let payment = payments.iter().find(|p| p.id == payment_id)?;
        self.resolve_payment(payment).await
    }

    /// Resolve a payment. Store failures are logged and reported as `None`.
    pub async fn resolve_payment(&self, payment: &PaymentFile) -> Option<PaymentDetail> {
        match self.try_resolve(payment).await {
            Ok(detail) => detail,
            Err(e) => {
                tracing::error!(
                    "Failed to load participant details for payment {}: {}",
                    payment.id,
                    e
                );
                None
            }
        }
    }

    async fn try_resolve(&self, payment: &PaymentFile) -> Result<Option<PaymentDetail>> {
        let Some(participant) = self.participants.find_by_id(&payment.participant_id).await? else {
            return Ok(None);
        };

        let class = match participant.class_id.as_deref().filter(|id| !id.is_empty()) {
            Some(class_id) => self.class_of(payment, class_id).await,
            None => None,
        };

        Ok(Some(PaymentDetail { participant, class }))
    }

    /// The class half only; a failed read leaves the participant in place.
    async fn class_of(&self, payment: &PaymentFile, class_id: &str) -> Option<Class> {
        match self.classes.find_by_id(class_id).await {
            Ok(class) => class,
            Err(e) => {
                tracing::error!(
                    "Failed to load class '{}' for payment {}: {}",
                    class_id,
                    payment.id,
                    e
                );
                None
            }
        }
    }
}
