// src/db/store.rs

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        follow_up::FollowUp,
        lead::{Lead, LeadChanges},
    },
};

/// Persistência de leads e follow-ups.
///
/// Existem duas implementações: [`LocalLeadStore`](super::LocalLeadStore)
/// (em memória, opcionalmente gravada em um snapshot JSON) e
/// [`PgLeadStore`](super::PgLeadStore) (PostgreSQL). As regras de negócio
/// (validação, padrões, cascata) ficam nos services; o store só guarda.
#[async_trait]
pub trait LeadStore: Send + Sync {
    /// Nome curto da implementação, usado no health check e nos logs.
    fn kind(&self) -> &'static str;

    /// Leads mais novos primeiro. Arquivados só entram se pedido.
    async fn list_leads(&self, include_archived: bool) -> Result<Vec<Lead>, AppError>;

    async fn find_lead(&self, id: Uuid) -> Result<Option<Lead>, AppError>;

    async fn insert_lead(&self, lead: &Lead) -> Result<Lead, AppError>;

    /// Aplica a edição sobre a versão atual do lead, com o registro travado.
    /// Nunca mexe em `lastFollowUpDate` (só o follow-up escreve esse campo).
    /// `None` se o lead não existe mais.
    async fn update_lead(
        &self,
        id: Uuid,
        changes: LeadChanges,
        now: DateTime<Utc>,
    ) -> Result<Option<Lead>, AppError>;

    /// Remoção física (leva junto os follow-ups). `false` se não existia.
    async fn delete_lead(&self, id: Uuid) -> Result<bool, AppError>;

    /// Leads não arquivados cuja próxima data de contato é `<= date`.
    async fn leads_due_by(&self, date: NaiveDate) -> Result<Vec<Lead>, AppError>;

    /// Follow-ups de um lead, mais recentes primeiro.
    async fn list_follow_ups(&self, lead_id: Uuid) -> Result<Vec<FollowUp>, AppError>;

    /// Grava o follow-up e propaga para o lead numa única unidade de trabalho.
    /// Se o lead não existe nada é gravado e o retorno é `LeadNotFound`.
    async fn record_follow_up(
        &self,
        follow_up: &FollowUp,
        now: DateTime<Utc>,
    ) -> Result<(FollowUp, Lead), AppError>;

    /// Libera os recursos (conexões, flush final do snapshot).
    async fn close(&self) -> Result<(), AppError>;
}
