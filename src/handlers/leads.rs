// src/handlers/leads.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use axum_extra::extract::WithRejection;
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    models::lead::{Lead, LeadChanges, NewLead},
};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListLeadsQuery {
    #[serde(default)]
    pub include_archived: bool,
}

// GET /api/leads
#[utoipa::path(
    get,
    path = "/api/leads",
    tag = "Leads",
    params(
        ("includeArchived" = Option<bool>, Query, description = "Inclui os leads arquivados")
    ),
    responses(
        (status = 200, description = "Lista de leads (mais novos primeiro)", body = Vec<Lead>)
    )
)]
pub async fn list_leads(
    State(app_state): State<AppState>,
    Query(query): Query<ListLeadsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let leads = app_state
        .lead_service
        .list_leads(query.include_archived)
        .await?;

    Ok((StatusCode::OK, Json(leads)))
}

// POST /api/leads
#[utoipa::path(
    post,
    path = "/api/leads",
    tag = "Leads",
    request_body = NewLead,
    responses(
        (status = 201, description = "Lead criado", body = Lead),
        (status = 400, description = "Dados inválidos")
    )
)]
pub async fn create_lead(
    State(app_state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<NewLead>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    let lead = app_state.lead_service.create_lead(payload).await?;

    Ok((StatusCode::CREATED, Json(lead)))
}

// GET /api/leads/today
#[utoipa::path(
    get,
    path = "/api/leads/today",
    tag = "Leads",
    responses(
        (status = 200, description = "Ligações do dia (vencidas ou atrasadas), mais quentes primeiro", body = Vec<Lead>)
    )
)]
pub async fn todays_calls(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let calls = app_state.dashboard_service.todays_calls().await?;

    Ok((StatusCode::OK, Json(calls)))
}

// GET /api/leads/{id}
#[utoipa::path(
    get,
    path = "/api/leads/{id}",
    tag = "Leads",
    params(("id" = Uuid, Path, description = "ID do lead")),
    responses(
        (status = 200, description = "Lead encontrado", body = Lead),
        (status = 404, description = "Lead não encontrado")
    )
)]
pub async fn get_lead(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let lead = app_state.lead_service.get_lead(id).await?;

    Ok((StatusCode::OK, Json(lead)))
}

// PUT /api/leads/{id}
#[utoipa::path(
    put,
    path = "/api/leads/{id}",
    tag = "Leads",
    params(("id" = Uuid, Path, description = "ID do lead")),
    request_body = LeadChanges,
    responses(
        (status = 200, description = "Lead atualizado", body = Lead),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Lead não encontrado")
    )
)]
pub async fn update_lead(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    WithRejection(Json(payload), _): WithRejection<Json<LeadChanges>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    let lead = app_state.lead_service.update_lead(id, payload).await?;

    Ok((StatusCode::OK, Json(lead)))
}

// POST /api/leads/{id}/archive
#[utoipa::path(
    post,
    path = "/api/leads/{id}/archive",
    tag = "Leads",
    params(("id" = Uuid, Path, description = "ID do lead")),
    responses(
        (status = 200, description = "Lead arquivado", body = Lead),
        (status = 404, description = "Lead não encontrado")
    )
)]
pub async fn archive_lead(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let lead = app_state.lead_service.archive_lead(id).await?;

    Ok((StatusCode::OK, Json(lead)))
}

// DELETE /api/leads/{id}
#[utoipa::path(
    delete,
    path = "/api/leads/{id}",
    tag = "Leads",
    params(("id" = Uuid, Path, description = "ID do lead")),
    responses(
        (status = 204, description = "Lead removido definitivamente"),
        (status = 404, description = "Lead não encontrado")
    )
)]
pub async fn delete_lead(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.lead_service.delete_lead(id).await?;

    Ok(StatusCode::NO_CONTENT)
}
