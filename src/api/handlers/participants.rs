use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    api::{handlers::classes::parse_status_filter, state::AppState},
    domain::{Participant, ParticipantFilter, ParticipantStatus},
    error::{AppError, Result},
};

#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    q: String,
    status: Option<String>,
    event_id: Option<String>,
    class_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    participants: Vec<Participant>,
    total: usize,
}

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<ListResponse>> {
    let filter = ParticipantFilter {
        query: params.q,
        status: parse_status_filter(params.status.as_deref(), ParticipantStatus::from_str)?,
    };
    let service = &state.service_context.participant_service;

    let participants = match (params.event_id, params.class_id) {
        (Some(event_id), _) => service.list_for_event(&event_id, &filter).await?,
        (None, Some(class_id)) => service.list_for_class(&class_id, &filter).await?,
        (None, None) => service.list(&filter).await,
    };
    let total = participants.len();

    Ok(Json(ListResponse { participants, total }))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Participant>> {
    let participant = state.service_context.participant_service
        .get(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Participant not found".to_string()))?;

    Ok(Json(participant))
}

#[derive(Debug, Deserialize)]
pub struct StatusDto {
    status: ParticipantStatus,
}

pub async fn set_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(dto): Json<StatusDto>,
) -> Result<StatusCode> {
    state.service_context.participant_service
        .set_status(&id, dto.status)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
