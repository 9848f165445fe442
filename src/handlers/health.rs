// src/handlers/health.rs

use axum::{extract::State, response::IntoResponse, Json};
use chrono::Utc;
use serde_json::json;

use crate::config::AppState;

// GET /api/health
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "Health",
    responses((status = 200, description = "Servidor no ar"))
)]
pub async fn health(State(app_state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "OK",
        "store": app_state.store.kind(),
        "timestamp": Utc::now(),
    }))
}
