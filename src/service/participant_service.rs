use std::sync::Arc;

use crate::{
    domain::{Participant, ParticipantFilter, ParticipantStatus},
    error::{AppError, Result},
    notify::Notifier,
    repository::{LiveCollection, ParticipantRepository},
};

pub struct ParticipantService {
    repo: Arc<dyn ParticipantRepository>,
    participants: Arc<LiveCollection<Participant>>,
    notifier: Notifier,
}

impl ParticipantService {
    pub fn new(
        repo: Arc<dyn ParticipantRepository>,
        participants: Arc<LiveCollection<Participant>>,
        notifier: Notifier,
    ) -> Self {
        Self { repo, participants, notifier }
    }

    pub async fn list(&self, filter: &ParticipantFilter) -> Vec<Participant> {
        filter.apply(&self.participants.items().await)
    }

    /// Participants registered for one event, read straight from the store.
    pub async fn list_for_event(&self, event_id: &str, filter: &ParticipantFilter) -> Result<Vec<Participant>> {
        let participants = self.repo.list_by_event(event_id).await?;
        Ok(filter.apply(&participants))
    }

    pub async fn list_for_class(&self, class_id: &str, filter: &ParticipantFilter) -> Result<Vec<Participant>> {
        let participants = self.repo.list_by_class(class_id).await?;
        Ok(filter.apply(&participants))
    }

    pub async fn get(&self, id: &str) -> Result<Option<Participant>> {
        self.repo.find_by_id(id).await
    }

    /// Accept or reject a registration by hand.
    pub async fn set_status(&self, id: &str, status: ParticipantStatus) -> Result<()> {
        let result = match self.repo.find_by_id(id).await {
            Ok(Some(_)) => self.repo.set_status(id, status).await,
            Ok(None) => Err(AppError::NotFound("Participant not found".to_string())),
            Err(e) => Err(e),
        };
        self.notifier.report(result, "Participant status updated", "Failed to update participant status")
    }
}
