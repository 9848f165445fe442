// src/services/dashboard_service.rs

use std::sync::Arc;

use chrono::{NaiveDate, Utc};

use crate::{
    common::error::AppError,
    db::LeadStore,
    models::{
        dashboard::DashboardStats,
        lead::{Lead, LeadStage, LeadStatus},
    },
};

/// Status que tiram um lead da lista de ligações do dia.
pub const CALL_LIST_TERMINAL_STATUSES: [LeadStatus; 4] = [
    LeadStatus::Converted,
    LeadStatus::NotInterested,
    LeadStatus::FakeLead,
    LeadStatus::Reject,
];

/// Status que tiram um lead do card "vencidos hoje" do dashboard.
/// É mais estreito que a lista de ligações: Fake lead e Reject ainda contam aqui.
pub const STATS_TERMINAL_STATUSES: [LeadStatus; 2] =
    [LeadStatus::Converted, LeadStatus::NotInterested];

/// Filtra e ordena os leads para a lista de ligações: mais quente primeiro,
/// e entre o mesmo estágio, o mais atrasado primeiro.
pub fn todays_calls(leads: Vec<Lead>, today: NaiveDate) -> Vec<Lead> {
    let mut calls: Vec<Lead> = leads
        .into_iter()
        .filter(|l| l.is_due_on(today))
        .filter(|l| !CALL_LIST_TERMINAL_STATUSES.contains(&l.current_status))
        .collect();
    calls.sort_by(|a, b| {
        b.lead_stage
            .priority()
            .cmp(&a.lead_stage.priority())
            .then(a.next_follow_up_date.cmp(&b.next_follow_up_date))
    });
    calls
}

/// Números do dashboard, sempre sobre os leads ativos (arquivados ficam de fora,
/// inclusive do `totalLeads`).
pub fn compute_stats(leads: &[Lead], today: NaiveDate) -> DashboardStats {
    let mut stats = DashboardStats::default();
    for lead in leads.iter().filter(|l| !l.archived) {
        stats.total_leads += 1;

        if lead.is_due_on(today) && !STATS_TERMINAL_STATUSES.contains(&lead.current_status) {
            stats.due_today += 1;
        }

        match lead.lead_stage {
            LeadStage::Cold => stats.stage_counts.cold += 1,
            LeadStage::Warm => stats.stage_counts.warm += 1,
            LeadStage::Hot => stats.stage_counts.hot += 1,
            LeadStage::Closed => stats.stage_counts.closed += 1,
        }

        if lead.current_status == LeadStatus::Converted {
            stats.converted += 1;
        }
    }
    stats
}

#[derive(Clone)]
pub struct DashboardService {
    store: Arc<dyn LeadStore>,
}

impl DashboardService {
    pub fn new(store: Arc<dyn LeadStore>) -> Self {
        Self { store }
    }

    pub async fn todays_calls(&self) -> Result<Vec<Lead>, AppError> {
        self.todays_calls_on(Utc::now().date_naive()).await
    }

    pub async fn todays_calls_on(&self, today: NaiveDate) -> Result<Vec<Lead>, AppError> {
        // O store já devolve só os vencidos (índice por data)
        let due = self.store.leads_due_by(today).await?;
        Ok(todays_calls(due, today))
    }

    pub async fn get_stats(&self) -> Result<DashboardStats, AppError> {
        self.get_stats_on(Utc::now().date_naive()).await
    }

    pub async fn get_stats_on(&self, today: NaiveDate) -> Result<DashboardStats, AppError> {
        let leads = self.store.list_leads(false).await?;
        Ok(compute_stats(&leads, today))
    }
}
