pub mod class_service;
pub mod detail_cache;
pub mod pagination;
pub mod participant_service;
pub mod payment_service;
pub mod payment_view;
pub mod resolver;

use std::sync::Arc;
use crate::config::PaginationConfig;
use crate::domain::{Class, Participant, PaymentFile};
use crate::notify::Notifier;
use crate::repository::*;
use crate::store::DocumentStore;
use class_service::ClassService;
use detail_cache::PaymentDetailCache;
use participant_service::ParticipantService;
use payment_service::PaymentService;
use payment_view::{PaymentListView, PaymentScope};
use resolver::PaymentDetailResolver;

pub struct ServiceContext {
    pub store: Arc<dyn DocumentStore>,
    pub notifier: Notifier,
    pub pagination: PaginationConfig,
    pub payments: Arc<LiveCollection<PaymentFile>>,
    pub classes: Arc<LiveCollection<Class>>,
    pub participants: Arc<LiveCollection<Participant>>,
    pub payment_repo: Arc<dyn PaymentRepository>,
    pub class_repo: Arc<dyn ClassRepository>,
    pub participant_repo: Arc<dyn ParticipantRepository>,
    pub resolver: Arc<PaymentDetailResolver>,
    pub detail_cache: Arc<PaymentDetailCache>,
    pub payment_service: Arc<PaymentService>,
    pub class_service: Arc<ClassService>,
    pub participant_service: Arc<ParticipantService>,
}

impl ServiceContext {
    pub fn new(store: Arc<dyn DocumentStore>, notifier: Notifier, pagination: PaginationConfig) -> Self {
        // Live lists, started explicitly through `start`
        let payments = Arc::new(LiveCollection::new(PAYMENT_FILES));
        let classes = Arc::new(LiveCollection::new(CLASSES));
        let participants = Arc::new(LiveCollection::new(PARTICIPANTS));

        let payment_repo: Arc<dyn PaymentRepository> =
            Arc::new(StorePaymentRepository::new(store.clone()));
        let class_repo: Arc<dyn ClassRepository> =
            Arc::new(StoreClassRepository::new(store.clone()));
        let participant_repo: Arc<dyn ParticipantRepository> =
            Arc::new(StoreParticipantRepository::new(store.clone()));

        let resolver = Arc::new(PaymentDetailResolver::new(
            participant_repo.clone(),
            class_repo.clone(),
        ));
        let detail_cache = Arc::new(PaymentDetailCache::new(resolver.clone()));

        let payment_service = Arc::new(PaymentService::new(
            payment_repo.clone(),
            detail_cache.clone(),
            notifier.clone(),
        ));
        let class_service = Arc::new(ClassService::new(
            class_repo.clone(),
            classes.clone(),
            notifier.clone(),
        ));
        let participant_service = Arc::new(ParticipantService::new(
            participant_repo.clone(),
            participants.clone(),
            notifier.clone(),
        ));

        Self {
            store,
            notifier,
            pagination,
            payments,
            classes,
            participants,
            payment_repo,
            class_repo,
            participant_repo,
            resolver,
            detail_cache,
            payment_service,
            class_service,
            participant_service,
        }
    }

    /// Subscribe every live list.
    ///
    /// A store that cannot be reached is reported once as an error notice;
    /// the affected lists stay empty and keep resubscribing in the background.
    pub async fn start(&self) {
        let failures = [
            self.payments.start(self.store.clone()).await,
            self.classes.start(self.store.clone()).await,
            self.participants.start(self.store.clone()).await,
        ];

        let mut failed = 0;
        for e in failures.into_iter().filter_map(|r| r.err()) {
            tracing::error!("Failed to subscribe to the document store: {}", e);
            failed += 1;
        }

        if failed > 0 {
            self.notifier.error("Document store is not reachable");
        } else {
            tracing::info!("Live subscriptions started");
        }
    }

    pub fn stop(&self) {
        self.payments.stop();
        self.classes.stop();
        self.participants.stop();
        tracing::info!("Live subscriptions stopped");
    }

    /// A fresh payment table sharing this context's detail cache.
    pub fn payment_list_view(&self, scope: PaymentScope) -> PaymentListView {
        PaymentListView::new(
            self.payments.clone(),
            self.detail_cache.clone(),
            self.payment_service.clone(),
            scope,
            self.pagination.page_size,
            self.pagination.window,
        )
    }
}
