use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    api::state::AppState,
    domain::{Class, ClassFilter, ClassForm, ClassStatus},
    error::{AppError, Result},
};

#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    q: String,
    /// A class status, or `all`
    status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    classes: Vec<Class>,
    total: usize,
}

/// Parse the status dropdown value, where `all` means no filter.
pub(crate) fn parse_status_filter<T>(
    raw: Option<&str>,
    parse: impl Fn(&str) -> Option<T>,
) -> Result<Option<T>> {
    match raw {
        None | Some("") | Some("all") => Ok(None),
        Some(s) => parse(s)
            .map(Some)
            .ok_or_else(|| AppError::BadRequest(format!("Unknown status: {}", s))),
    }
}

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<ListResponse>> {
    let filter = ClassFilter {
        query: params.q,
        status: parse_status_filter(params.status.as_deref(), ClassStatus::from_str)?,
    };

    let classes = state.service_context.class_service.list(&filter).await;
    let total = classes.len();

    Ok(Json(ListResponse { classes, total }))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Class>> {
    let class = state.service_context.class_service
        .get(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Class not found".to_string()))?;

    Ok(Json(class))
}

pub async fn create(
    State(state): State<AppState>,
    Json(form): Json<ClassForm>,
) -> Result<(StatusCode, Json<Class>)> {
    let class = state.service_context.class_service.create(form).await?;
    Ok((StatusCode::CREATED, Json(class)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(form): Json<ClassForm>,
) -> Result<Json<Class>> {
    let class = state.service_context.class_service.update(&id, form).await?;
    Ok(Json(class))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    state.service_context.class_service.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
