// src/services/lead_service.rs

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    db::LeadStore,
    models::lead::{Lead, LeadChanges, NewLead},
};

#[derive(Clone)]
pub struct LeadService {
    store: Arc<dyn LeadStore>,
}

impl LeadService {
    pub fn new(store: Arc<dyn LeadStore>) -> Self {
        Self { store }
    }

    pub async fn list_leads(&self, include_archived: bool) -> Result<Vec<Lead>, AppError> {
        self.store.list_leads(include_archived).await
    }

    pub async fn get_lead(&self, id: Uuid) -> Result<Lead, AppError> {
        self.store
            .find_lead(id)
            .await?
            .ok_or(AppError::LeadNotFound(id))
    }

    pub async fn create_lead(&self, new_lead: NewLead) -> Result<Lead, AppError> {
        // 1. Valida antes de qualquer escrita
        new_lead.validate()?;

        // 2. Padrões, id e timestamps
        let lead = Lead::from_new(new_lead, Utc::now());

        // 3. Salva
        let created = self.store.insert_lead(&lead).await?;
        tracing::info!(lead_id = %created.id, "Lead criado: {}", created.restaurant_name);

        Ok(created)
    }

    pub async fn update_lead(&self, id: Uuid, changes: LeadChanges) -> Result<Lead, AppError> {
        changes.check()?;

        // O store aplica a edição sobre a versão atual, sem leitura prévia aqui:
        // assim um follow-up gravado no meio do caminho não é desfeito
        let updated = self
            .store
            .update_lead(id, changes, Utc::now())
            .await?
            .ok_or(AppError::LeadNotFound(id))?;
        tracing::debug!(lead_id = %id, "Lead atualizado");

        Ok(updated)
    }

    /// Arquivamento lógico: o lead some da listagem padrão mas continua
    /// acessível pelo id.
    pub async fn archive_lead(&self, id: Uuid) -> Result<Lead, AppError> {
        let lead = self.get_lead(id).await?;
        if lead.archived {
            return Ok(lead);
        }

        let changes = LeadChanges {
            archived: Some(true),
            ..Default::default()
        };
        let archived = self
            .store
            .update_lead(id, changes, Utc::now())
            .await?
            .ok_or(AppError::LeadNotFound(id))?;
        tracing::info!(lead_id = %id, "Lead arquivado");

        Ok(archived)
    }

    /// Remoção física, junto com os follow-ups.
    pub async fn delete_lead(&self, id: Uuid) -> Result<(), AppError> {
        if !self.store.delete_lead(id).await? {
            return Err(AppError::LeadNotFound(id));
        }
        tracing::info!(lead_id = %id, "Lead removido");
        Ok(())
    }
}
