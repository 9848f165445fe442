// src/handlers/follow_ups.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use axum_extra::extract::WithRejection;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    models::follow_up::{FollowUp, NewFollowUp},
};

// GET /api/follow-ups/lead/{lead_id}
#[utoipa::path(
    get,
    path = "/api/follow-ups/lead/{lead_id}",
    tag = "Follow-ups",
    params(("lead_id" = Uuid, Path, description = "ID do lead")),
    responses(
        (status = 200, description = "Histórico de contatos (mais recentes primeiro)", body = Vec<FollowUp>),
        (status = 404, description = "Lead não encontrado")
    )
)]
pub async fn list_for_lead(
    State(app_state): State<AppState>,
    Path(lead_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let follow_ups = app_state.follow_up_service.list_for_lead(lead_id).await?;

    Ok((StatusCode::OK, Json(follow_ups)))
}

// POST /api/follow-ups
#[utoipa::path(
    post,
    path = "/api/follow-ups",
    tag = "Follow-ups",
    request_body = NewFollowUp,
    responses(
        (status = 201, description = "Follow-up registrado e propagado para o lead", body = FollowUp),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Lead não encontrado")
    )
)]
pub async fn create_follow_up(
    State(app_state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<NewFollowUp>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    let follow_up = app_state.follow_up_service.record_follow_up(payload).await?;

    Ok((StatusCode::CREATED, Json(follow_up)))
}
