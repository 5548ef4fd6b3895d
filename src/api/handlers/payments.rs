use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    api::state::AppState,
    domain::{PaymentDetail, PaymentFile, PaymentFileForm},
    error::{AppError, Result},
    service::{
        pagination::PageLink,
        payment_view::{PaymentRow, PaymentScope},
    },
};

#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    q: String,
    #[serde(default = "default_page")]
    page: usize,
    /// Restrict to verified payments
    #[serde(default)]
    verified: bool,
}

fn default_page() -> usize {
    1
}

#[derive(Debug, Serialize)]
pub struct PaymentRowDto {
    payment: PaymentFile,
    detail: Option<PaymentDetail>,
    /// Participant registration time in RFC 3339
    registered_at: Option<String>,
}

impl From<PaymentRow> for PaymentRowDto {
    fn from(row: PaymentRow) -> Self {
        let registered_at = row
            .detail
            .as_ref()
            .and_then(|d| d.participant.registered_at())
            .map(|dt| dt.to_rfc3339());
        Self {
            payment: row.payment,
            detail: row.detail,
            registered_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    rows: Vec<PaymentRowDto>,
    page: usize,
    total_pages: usize,
    total: usize,
    links: Vec<PageLink>,
}

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<ListResponse>> {
    let scope = if params.verified {
        PaymentScope::Verified
    } else {
        PaymentScope::All
    };

    let mut view = state.service_context.payment_list_view(scope);
    view.set_query(params.q);
    // Out-of-range pages fall back to the first page
    view.go_to(params.page).await;
    let page = view.page().await;

    Ok(Json(ListResponse {
        rows: page.rows.into_iter().map(Into::into).collect(),
        page: page.page,
        total_pages: page.total_pages,
        total: page.total_items,
        links: page.links,
    }))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PaymentFile>> {
    let payment = state.service_context.payment_service
        .get(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Payment not found".to_string()))?;

    Ok(Json(payment))
}

pub async fn detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PaymentDetail>> {
    let ctx = &state.service_context;
    let payments = ctx.payments.items().await;
    let detail = ctx.detail_cache
        .get_or_resolve(&payments, &id)
        .await
        .ok_or_else(|| AppError::NotFound("Payment detail unavailable".to_string()))?;

    Ok(Json(detail))
}

pub async fn create(
    State(state): State<AppState>,
    Json(form): Json<PaymentFileForm>,
) -> Result<(StatusCode, Json<PaymentFile>)> {
    let payment = state.service_context.payment_service.create(form).await?;
    Ok((StatusCode::CREATED, Json(payment)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(form): Json<PaymentFileForm>,
) -> Result<Json<PaymentFile>> {
    let payment = state.service_context.payment_service.update(&id, form).await?;
    Ok(Json(payment))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    state.service_context.payment_service.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
