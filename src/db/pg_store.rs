// src/db/pg_store.rs

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{postgres::PgPoolOptions, Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::store::LeadStore,
    models::{
        follow_up::FollowUp,
        lead::{Lead, LeadChanges},
    },
};

// Colunas explícitas em vez de SELECT * (a ordem não importa para o FromRow,
// mas assim uma coluna nova no banco não quebra nada)
const LEAD_COLUMNS: &str = r#"
    id, restaurant_name, phone, city, contact_person, notes,
    current_status, lead_stage, next_follow_up_date, last_follow_up_date,
    archived, created_at, updated_at
"#;

const FOLLOW_UP_COLUMNS: &str = r#"
    id, lead_id, follow_up_date, status, notes, next_follow_up_date, lead_stage, created_at
"#;

/// Store no PostgreSQL. As queries são verificadas em tempo de execução
/// (`query_as::<_, T>`), então o build não depende de um banco no ar.
#[derive(Clone)]
pub struct PgLeadStore {
    pool: PgPool,
}

impl PgLeadStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Conecta, roda as migrações embutidas e devolve o store pronto.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        sqlx::migrate!().run(&pool).await?;

        tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

        Ok(Self::new(pool))
    }

    async fn fetch_lead<'e, E>(executor: E, id: Uuid, for_update: bool) -> Result<Option<Lead>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let lock = if for_update { "FOR UPDATE" } else { "" };
        let sql = format!("SELECT {LEAD_COLUMNS} FROM leads WHERE id = $1 {lock}");
        let lead = sqlx::query_as::<_, Lead>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(lead)
    }

    // Grava uma edição. `last_follow_up_date` fica de fora: só o follow-up escreve nele.
    async fn write_edit<'e, E>(executor: E, lead: &Lead) -> Result<Option<Lead>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE leads SET
                restaurant_name = $2, phone = $3, city = $4, contact_person = $5, notes = $6,
                current_status = $7, lead_stage = $8, next_follow_up_date = $9,
                archived = $10, updated_at = $11
            WHERE id = $1
            RETURNING {LEAD_COLUMNS}
            "#
        );
        let updated = sqlx::query_as::<_, Lead>(&sql)
            .bind(lead.id)
            .bind(&lead.restaurant_name)
            .bind(&lead.phone)
            .bind(&lead.city)
            .bind(&lead.contact_person)
            .bind(&lead.notes)
            .bind(lead.current_status)
            .bind(lead.lead_stage)
            .bind(lead.next_follow_up_date)
            .bind(lead.archived)
            .bind(lead.updated_at)
            .fetch_optional(executor)
            .await?;
        Ok(updated)
    }

    // Grava só os campos que a cascata do follow-up toca
    async fn write_cascade<'e, E>(executor: E, lead: &Lead) -> Result<Option<Lead>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE leads SET
                current_status = $2, lead_stage = $3,
                next_follow_up_date = $4, last_follow_up_date = $5, updated_at = $6
            WHERE id = $1
            RETURNING {LEAD_COLUMNS}
            "#
        );
        let updated = sqlx::query_as::<_, Lead>(&sql)
            .bind(lead.id)
            .bind(lead.current_status)
            .bind(lead.lead_stage)
            .bind(lead.next_follow_up_date)
            .bind(lead.last_follow_up_date)
            .bind(lead.updated_at)
            .fetch_optional(executor)
            .await?;
        Ok(updated)
    }
}

#[async_trait]
impl LeadStore for PgLeadStore {
    fn kind(&self) -> &'static str {
        "postgres"
    }

    async fn list_leads(&self, include_archived: bool) -> Result<Vec<Lead>, AppError> {
        let sql = format!(
            "SELECT {LEAD_COLUMNS} FROM leads WHERE ($1 OR archived = false) ORDER BY created_at DESC"
        );
        let leads = sqlx::query_as::<_, Lead>(&sql)
            .bind(include_archived)
            .fetch_all(&self.pool)
            .await?;
        Ok(leads)
    }

    async fn find_lead(&self, id: Uuid) -> Result<Option<Lead>, AppError> {
        Self::fetch_lead(&self.pool, id, false).await
    }

    async fn insert_lead(&self, lead: &Lead) -> Result<Lead, AppError> {
        let sql = format!(
            r#"
            INSERT INTO leads (
                id, restaurant_name, phone, city, contact_person, notes,
                current_status, lead_stage, next_follow_up_date, last_follow_up_date,
                archived, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING {LEAD_COLUMNS}
            "#
        );
        let created = sqlx::query_as::<_, Lead>(&sql)
            .bind(lead.id)
            .bind(&lead.restaurant_name)
            .bind(&lead.phone)
            .bind(&lead.city)
            .bind(&lead.contact_person)
            .bind(&lead.notes)
            .bind(lead.current_status)
            .bind(lead.lead_stage)
            .bind(lead.next_follow_up_date)
            .bind(lead.last_follow_up_date)
            .bind(lead.archived)
            .bind(lead.created_at)
            .bind(lead.updated_at)
            .fetch_one(&self.pool)
            .await?;
        Ok(created)
    }

    async fn update_lead(
        &self,
        id: Uuid,
        changes: LeadChanges,
        now: DateTime<Utc>,
    ) -> Result<Option<Lead>, AppError> {
        let mut tx = self.pool.begin().await?;

        // Lê a versão atual com o registro travado: um follow-up concorrente
        // espera (ou já entrou e é preservado)
        let Some(mut lead) = Self::fetch_lead(&mut *tx, id, true).await? else {
            return Ok(None);
        };
        lead.apply_changes(changes, now);

        let updated = Self::write_edit(&mut *tx, &lead).await?;
        tx.commit().await?;

        Ok(updated)
    }

    async fn delete_lead(&self, id: Uuid) -> Result<bool, AppError> {
        // follow_ups.lead_id tem ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM leads WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn leads_due_by(&self, date: NaiveDate) -> Result<Vec<Lead>, AppError> {
        // Usa o índice parcial idx_leads_due
        let sql = format!(
            r#"
            SELECT {LEAD_COLUMNS} FROM leads
            WHERE archived = false
              AND next_follow_up_date IS NOT NULL
              AND next_follow_up_date <= $1
            ORDER BY next_follow_up_date ASC
            "#
        );
        let leads = sqlx::query_as::<_, Lead>(&sql)
            .bind(date)
            .fetch_all(&self.pool)
            .await?;
        Ok(leads)
    }

    async fn list_follow_ups(&self, lead_id: Uuid) -> Result<Vec<FollowUp>, AppError> {
        let sql = format!(
            "SELECT {FOLLOW_UP_COLUMNS} FROM follow_ups WHERE lead_id = $1 ORDER BY follow_up_date DESC"
        );
        let follow_ups = sqlx::query_as::<_, FollowUp>(&sql)
            .bind(lead_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(follow_ups)
    }

    async fn record_follow_up(
        &self,
        follow_up: &FollowUp,
        now: DateTime<Utc>,
    ) -> Result<(FollowUp, Lead), AppError> {
        // Uma transação só: se qualquer passo falhar, o drop do `tx` faz rollback
        let mut tx = self.pool.begin().await?;

        // 1. Trava o lead (última escrita vence, mas não no meio da cascata)
        let mut lead = Self::fetch_lead(&mut *tx, follow_up.lead_id, true)
            .await?
            .ok_or(AppError::LeadNotFound(follow_up.lead_id))?;

        // 2. Insere o follow-up
        let sql = format!(
            r#"
            INSERT INTO follow_ups (
                id, lead_id, follow_up_date, status, notes, next_follow_up_date, lead_stage, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {FOLLOW_UP_COLUMNS}
            "#
        );
        let inserted = sqlx::query_as::<_, FollowUp>(&sql)
            .bind(follow_up.id)
            .bind(follow_up.lead_id)
            .bind(follow_up.follow_up_date)
            .bind(follow_up.status)
            .bind(&follow_up.notes)
            .bind(follow_up.next_follow_up_date)
            .bind(follow_up.lead_stage)
            .bind(follow_up.created_at)
            .fetch_one(&mut *tx)
            .await?;

        // 3. Cascata para o lead
        follow_up.cascade_into(&mut lead, now);
        let lead = Self::write_cascade(&mut *tx, &lead)
            .await?
            .ok_or(AppError::LeadNotFound(follow_up.lead_id))?;

        tx.commit().await?;

        Ok((inserted, lead))
    }

    async fn close(&self) -> Result<(), AppError> {
        self.pool.close().await;
        tracing::info!("Pool de conexões fechado");
        Ok(())
    }
}
