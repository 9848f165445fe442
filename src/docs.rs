// src/docs.rs

use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Health ---
        handlers::health::health,

        // --- Leads ---
        handlers::leads::list_leads,
        handlers::leads::create_lead,
        handlers::leads::todays_calls,
        handlers::leads::get_lead,
        handlers::leads::update_lead,
        handlers::leads::archive_lead,
        handlers::leads::delete_lead,

        // --- Follow-ups ---
        handlers::follow_ups::list_for_lead,
        handlers::follow_ups::create_follow_up,

        // --- Dashboard ---
        handlers::dashboard::get_stats,
    ),
    components(
        schemas(
            // --- Leads ---
            models::lead::LeadStatus,
            models::lead::LeadStage,
            models::lead::Lead,
            models::lead::NewLead,
            models::lead::LeadChanges,

            // --- Follow-ups ---
            models::follow_up::FollowUp,
            models::follow_up::NewFollowUp,

            // --- Dashboard ---
            models::dashboard::StageCounts,
            models::dashboard::DashboardStats,
        )
    ),
    tags(
        (name = "Health", description = "Estado do servidor"),
        (name = "Leads", description = "Cadastro e ciclo de vida dos leads"),
        (name = "Follow-ups", description = "Histórico de contatos com os leads"),
        (name = "Dashboard", description = "Indicadores do funil")
    )
)]
pub struct ApiDoc;
