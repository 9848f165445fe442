// src/handlers/dashboard.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::{common::error::AppError, config::AppState, models::dashboard::DashboardStats};

// GET /api/dashboard/stats
#[utoipa::path(
    get,
    path = "/api/dashboard/stats",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Totais dos leads ativos (não arquivados) por estágio/status e vencidos hoje", body = DashboardStats)
    )
)]
pub async fn get_stats(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let stats = app_state.dashboard_service.get_stats().await?;

    Ok((StatusCode::OK, Json(stats)))
}
