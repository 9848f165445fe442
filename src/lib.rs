// src/lib.rs

use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;

pub mod common;
pub mod config;
pub mod db;
pub mod docs;
pub mod handlers;
pub mod models;
pub mod services;

use crate::config::AppState;

/// Monta o router completo da API.
/// CORS só libera as origens da lista (ALLOWED_ORIGINS).
pub fn app(app_state: AppState, allowed_origins: Vec<HeaderValue>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]);

    let lead_routes = Router::new()
        .route(
            "/",
            post(handlers::leads::create_lead).get(handlers::leads::list_leads),
        )
        // Rota estática tem prioridade sobre o {id}
        .route("/today", get(handlers::leads::todays_calls))
        .route(
            "/{id}",
            get(handlers::leads::get_lead)
                .put(handlers::leads::update_lead)
                .delete(handlers::leads::delete_lead),
        )
        .route("/{id}/archive", post(handlers::leads::archive_lead));

    let follow_up_routes = Router::new()
        .route("/", post(handlers::follow_ups::create_follow_up))
        .route("/lead/{lead_id}", get(handlers::follow_ups::list_for_lead));

    Router::new()
        .route("/api/health", get(handlers::health::health))
        .route("/api/dashboard/stats", get(handlers::dashboard::get_stats))
        .route(
            "/api/docs/openapi.json",
            get(|| async { Json(docs::ApiDoc::openapi()) }),
        )
        .nest("/api/leads", lead_routes)
        .nest("/api/follow-ups", follow_up_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}
