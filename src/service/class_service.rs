use std::sync::Arc;

use validator::Validate;

use crate::{
    domain::{Class, ClassFilter, ClassForm},
    error::Result,
    notify::Notifier,
    repository::{ClassRepository, LiveCollection},
};

pub struct ClassService {
    repo: Arc<dyn ClassRepository>,
    classes: Arc<LiveCollection<Class>>,
    notifier: Notifier,
}

impl ClassService {
    pub fn new(
        repo: Arc<dyn ClassRepository>,
        classes: Arc<LiveCollection<Class>>,
        notifier: Notifier,
    ) -> Self {
        Self { repo, classes, notifier }
    }

    /// Classes from the live list matching the search box and status filter
    pub async fn list(&self, filter: &ClassFilter) -> Vec<Class> {
        filter.apply(&self.classes.items().await)
    }

    pub async fn get(&self, id: &str) -> Result<Option<Class>> {
        self.repo.find_by_id(id).await
    }

    pub async fn create(&self, form: ClassForm) -> Result<Class> {
        let result = match form.validate() {
            Ok(()) => self.repo.create(form).await,
            Err(e) => Err(e.into()),
        };
        self.notifier.report(result, "Class added", "Failed to add class")
    }

    pub async fn update(&self, id: &str, form: ClassForm) -> Result<Class> {
        let result = match form.validate() {
            Ok(()) => self.repo.update(id, form).await,
            Err(e) => Err(e.into()),
        };
        self.notifier.report(result, "Class updated", "Failed to update class")
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        let result = self.repo.delete(id).await;
        self.notifier.report(result, "Class deleted", "Failed to delete class")
    }
}
