// src/models/dashboard.rs

use serde::Serialize;
use utoipa::ToSchema;

// Contagem de leads por estágio
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StageCounts {
    pub cold: u64,
    pub warm: u64,
    pub hot: u64,
    pub closed: u64,
}

// Os cards do topo do dashboard
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    /// Leads ativos (não arquivados). Todos os outros números também
    /// consideram só os ativos.
    #[schema(example = 42)]
    pub total_leads: u64,
    /// Ativos com contato vencido (hoje ou atrasado), fora Converted e Not Interested.
    pub due_today: u64,
    pub stage_counts: StageCounts,
    pub converted: u64,
}
