// src/db/local_store.rs

use std::{
    collections::{BTreeMap, BTreeSet, HashMap},
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::store::LeadStore,
    models::{
        follow_up::FollowUp,
        lead::{Lead, LeadChanges},
    },
};

/// Versão atual do formato do snapshot.
/// v1: só `leads`, sem o campo `archived`. v2: `archived` + `followUps`.
pub const SCHEMA_VERSION: u64 = 2;

// O que vai para o disco (nomes externos, camelCase)
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snapshot {
    schema_version: u64,
    leads: Vec<Lead>,
    #[serde(default)]
    follow_ups: Vec<FollowUp>,
}

#[derive(Debug, Clone, Default)]
struct StoreState {
    leads: HashMap<Uuid, Lead>,
    follow_ups: Vec<FollowUp>,
    // Índice derivado: próxima data de contato -> leads não arquivados
    due_index: BTreeMap<NaiveDate, BTreeSet<Uuid>>,
}

impl StoreState {
    fn from_snapshot(snapshot: Snapshot) -> Self {
        let mut state = Self {
            leads: snapshot.leads.into_iter().map(|l| (l.id, l)).collect(),
            follow_ups: snapshot.follow_ups,
            due_index: BTreeMap::new(),
        };
        state.reindex();
        state
    }

    fn to_snapshot(&self) -> Snapshot {
        let mut leads: Vec<Lead> = self.leads.values().cloned().collect();
        leads.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Snapshot {
            schema_version: SCHEMA_VERSION,
            leads,
            follow_ups: self.follow_ups.clone(),
        }
    }

    fn reindex(&mut self) {
        self.due_index.clear();
        for lead in self.leads.values().filter(|l| !l.archived) {
            if let Some(date) = lead.next_follow_up_date {
                self.due_index.entry(date).or_default().insert(lead.id);
            }
        }
    }
}

/// Converte um snapshot de qualquer versão conhecida para a atual.
fn upgrade_snapshot(mut raw: Value) -> Result<Snapshot, AppError> {
    let version = raw
        .get("schemaVersion")
        .and_then(Value::as_u64)
        .unwrap_or(1);

    if version > SCHEMA_VERSION {
        return Err(AppError::UnsupportedSchemaVersion {
            found: version,
            supported: SCHEMA_VERSION,
        });
    }

    let root = raw.as_object_mut().ok_or_else(|| {
        <serde_json::Error as serde::de::Error>::custom("o snapshot deve ser um objeto JSON")
    })?;

    if version < 2 {
        if let Some(leads) = root.get_mut("leads").and_then(Value::as_array_mut) {
            for lead in leads.iter_mut().filter_map(Value::as_object_mut) {
                lead.entry("archived").or_insert(Value::Bool(false));
            }
        }
        root.entry("followUps").or_insert(json!([]));
        root.insert("schemaVersion".to_string(), json!(2));
        tracing::info!("📦 Snapshot local migrado do schema v{} para v2", version);
    }

    Ok(serde_json::from_value(raw)?)
}

/// Store local: tudo em memória atrás de um `RwLock`, com gravação opcional
/// em um arquivo JSON versionado.
///
/// Cada escrita monta o próximo estado, grava o snapshot e só então troca o
/// estado em memória. Se a gravação falhar, nada muda (tudo ou nada).
pub struct LocalLeadStore {
    state: RwLock<StoreState>,
    path: Option<PathBuf>,
}

impl LocalLeadStore {
    /// Store volátil, sem arquivo (testes e modo demo).
    pub fn in_memory() -> Self {
        Self {
            state: RwLock::new(StoreState::default()),
            path: None,
        }
    }

    /// Abre (ou cria) o store gravado em `path`.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, AppError> {
        let path = path.into();

        let state = match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let raw: Value = serde_json::from_slice(&bytes)?;
                StoreState::from_snapshot(upgrade_snapshot(raw)?)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("Nenhum snapshot em {}, começando vazio", path.display());
                StoreState::default()
            }
            Err(e) => return Err(e.into()),
        };

        tracing::info!(
            leads = state.leads.len(),
            follow_ups = state.follow_ups.len(),
            "✅ Store local aberto em {}",
            path.display()
        );

        Ok(Self {
            state: RwLock::new(state),
            path: Some(path),
        })
    }

    async fn persist(&self, state: &StoreState) -> Result<(), AppError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        write_snapshot(path, &state.to_snapshot()).await
    }

    // Grava e troca. Chamado sempre com o write lock na mão.
    async fn commit(&self, current: &mut StoreState, mut next: StoreState) -> Result<(), AppError> {
        next.reindex();
        self.persist(&next).await?;
        *current = next;
        Ok(())
    }
}

async fn write_snapshot(path: &Path, snapshot: &Snapshot) -> Result<(), AppError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    let bytes = serde_json::to_vec_pretty(snapshot)?;

    // Escreve num temporário e renomeia por cima
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, bytes).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

#[async_trait]
impl LeadStore for LocalLeadStore {
    fn kind(&self) -> &'static str {
        "local"
    }

    async fn list_leads(&self, include_archived: bool) -> Result<Vec<Lead>, AppError> {
        let state = self.state.read().await;
        let mut leads: Vec<Lead> = state
            .leads
            .values()
            .filter(|l| include_archived || !l.archived)
            .cloned()
            .collect();
        leads.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(leads)
    }

    async fn find_lead(&self, id: Uuid) -> Result<Option<Lead>, AppError> {
        Ok(self.state.read().await.leads.get(&id).cloned())
    }

    async fn insert_lead(&self, lead: &Lead) -> Result<Lead, AppError> {
        let mut state = self.state.write().await;
        let mut next = state.clone();
        next.leads.insert(lead.id, lead.clone());
        self.commit(&mut *state, next).await?;
        Ok(lead.clone())
    }

    async fn update_lead(
        &self,
        id: Uuid,
        changes: LeadChanges,
        now: DateTime<Utc>,
    ) -> Result<Option<Lead>, AppError> {
        let mut state = self.state.write().await;
        let mut next = state.clone();

        // A edição vale sobre o estado atual, não sobre uma leitura antiga
        let Some(lead) = next.leads.get_mut(&id) else {
            return Ok(None);
        };
        lead.apply_changes(changes, now);
        let lead = lead.clone();

        self.commit(&mut *state, next).await?;
        Ok(Some(lead))
    }

    async fn delete_lead(&self, id: Uuid) -> Result<bool, AppError> {
        let mut state = self.state.write().await;
        if !state.leads.contains_key(&id) {
            return Ok(false);
        }
        let mut next = state.clone();
        next.leads.remove(&id);
        next.follow_ups.retain(|f| f.lead_id != id);
        self.commit(&mut *state, next).await?;
        Ok(true)
    }

    async fn leads_due_by(&self, date: NaiveDate) -> Result<Vec<Lead>, AppError> {
        let state = self.state.read().await;
        let leads = state
            .due_index
            .range(..=date)
            .flat_map(|(_, ids)| ids.iter())
            .filter_map(|id| state.leads.get(id))
            .cloned()
            .collect();
        Ok(leads)
    }

    async fn list_follow_ups(&self, lead_id: Uuid) -> Result<Vec<FollowUp>, AppError> {
        let state = self.state.read().await;
        let mut follow_ups: Vec<FollowUp> = state
            .follow_ups
            .iter()
            .filter(|f| f.lead_id == lead_id)
            .cloned()
            .collect();
        follow_ups.sort_by(|a, b| b.follow_up_date.cmp(&a.follow_up_date));
        Ok(follow_ups)
    }

    async fn record_follow_up(
        &self,
        follow_up: &FollowUp,
        now: DateTime<Utc>,
    ) -> Result<(FollowUp, Lead), AppError> {
        let mut state = self.state.write().await;
        let mut next = state.clone();

        let lead = next
            .leads
            .get_mut(&follow_up.lead_id)
            .ok_or(AppError::LeadNotFound(follow_up.lead_id))?;
        follow_up.cascade_into(lead, now);
        let lead = lead.clone();
        next.follow_ups.push(follow_up.clone());

        // As duas escritas entram juntas ou nenhuma entra
        self.commit(&mut *state, next).await?;
        Ok((follow_up.clone(), lead))
    }

    async fn close(&self) -> Result<(), AppError> {
        let state = self.state.read().await;
        self.persist(&state).await?;
        tracing::info!("Store local fechado");
        Ok(())
    }
}
