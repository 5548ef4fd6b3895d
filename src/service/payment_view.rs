use std::sync::Arc;

use serde::Serialize;

use crate::{
    domain::{PaymentDetail, PaymentFile, VerificationStatus},
    error::Result,
    repository::LiveCollection,
    service::{
        detail_cache::PaymentDetailCache,
        pagination::{PageLink, Paginator},
        payment_service::PaymentService,
    },
};

/// Which payments a list shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaymentScope {
    #[default]
    All,
    /// Only payments whose proof was verified by an admin
    Verified,
}

impl PaymentScope {
    pub fn includes(&self, payment: &PaymentFile) -> bool {
        match self {
            PaymentScope::All => true,
            PaymentScope::Verified => payment.verification_status == VerificationStatus::Verified,
        }
    }
}

pub fn filter_payments(payments: &[PaymentFile], scope: PaymentScope, query: &str) -> Vec<PaymentFile> {
    payments
        .iter()
        .filter(|p| scope.includes(p) && p.matches(query))
        .cloned()
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct PaymentRow {
    pub payment: PaymentFile,
    /// `None` while loading or when the participant is gone
    pub detail: Option<PaymentDetail>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaymentPage {
    pub rows: Vec<PaymentRow>,
    pub page: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub links: Vec<PageLink>,
}

/// Rows for `payments` with whatever details the cache holds.
pub fn rows_with_details(cache: &PaymentDetailCache, payments: Vec<PaymentFile>) -> Vec<PaymentRow> {
    payments
        .into_iter()
        .map(|payment| PaymentRow {
            detail: cache.get(&payment.id),
            payment,
        })
        .collect()
}

/// State of one admin's payment table: search box, scope and current page.
pub struct PaymentListView {
    payments: Arc<LiveCollection<PaymentFile>>,
    cache: Arc<PaymentDetailCache>,
    service: Arc<PaymentService>,
    scope: PaymentScope,
    query: String,
    paginator: Paginator,
    window: usize,
}

impl PaymentListView {
    pub fn new(
        payments: Arc<LiveCollection<PaymentFile>>,
        cache: Arc<PaymentDetailCache>,
        service: Arc<PaymentService>,
        scope: PaymentScope,
        page_size: usize,
        window: usize,
    ) -> Self {
        Self {
            payments,
            cache,
            service,
            scope,
            query: String::new(),
            paginator: Paginator::new(page_size),
            window,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn current_page(&self) -> usize {
        self.paginator.current_page()
    }

    /// Change the search text. Always returns to the first page.
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.paginator.reset();
    }

    async fn filtered(&mut self) -> Vec<PaymentFile> {
        let filtered = filter_payments(&self.payments.items().await, self.scope, &self.query);
        self.paginator.set_total(filtered.len());
        filtered
    }

    /// Move to `page`; pages outside the current range are ignored.
    pub async fn go_to(&mut self, page: usize) -> bool {
        self.filtered().await;
        self.paginator.go_to(page)
    }

    /// The current page, with details resolved for any rows not cached yet.
    pub async fn page(&mut self) -> PaymentPage {
        let filtered = self.filtered().await;
        let visible = self.paginator.slice(&filtered).to_vec();
        self.cache.ensure(&visible).await;

        PaymentPage {
            rows: rows_with_details(&self.cache, visible),
            page: self.paginator.current_page(),
            total_pages: self.paginator.total_pages(),
            total_items: self.paginator.total_items(),
            links: self.paginator.window(self.window),
        }
    }

    /// Every filtered row on one page, for the unpaginated table.
    pub async fn all_rows(&mut self) -> Vec<PaymentRow> {
        let filtered = self.filtered().await;
        self.cache.ensure(&filtered).await;
        rows_with_details(&self.cache, filtered)
    }

    pub async fn delete(&mut self, id: &str) -> Result<()> {
        self.service.delete(id).await
    }
}
