// src/config.rs

use std::{env, path::PathBuf, sync::Arc};

use anyhow::Context;
use axum::http::HeaderValue;

use crate::{
    db::{LeadStore, LocalLeadStore, PgLeadStore},
    services::{DashboardService, FollowUpService, LeadService},
};

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_ORIGIN: &str = "http://localhost:3000";
const DEFAULT_LOCAL_STORE_PATH: &str = "data/leads.json";

// Configuração lida do ambiente (e do .env, se existir)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<HeaderValue>,
    // Com DATABASE_URL usamos o Postgres; sem, o store local em arquivo
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub local_store_path: PathBuf,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Monta a configuração a partir de uma função de busca (facilita os testes).
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port: u16 = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("PORT inválida: '{raw}'"))?,
            None => DEFAULT_PORT,
        };

        let origins_raw = lookup("ALLOWED_ORIGINS").unwrap_or_else(|| DEFAULT_ORIGIN.to_string());
        let allowed_origins = origins_raw
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(|o| {
                HeaderValue::from_str(o).with_context(|| format!("Origem inválida em ALLOWED_ORIGINS: '{o}'"))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        let database_max_connections: u32 = match lookup("DATABASE_MAX_CONNECTIONS") {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("DATABASE_MAX_CONNECTIONS inválido: '{raw}'"))?,
            None => 5,
        };

        Ok(Self {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            allowed_origins,
            database_url: lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()),
            database_max_connections,
            local_store_path: lookup("LOCAL_STORE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LOCAL_STORE_PATH)),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn LeadStore>,
    pub lead_service: LeadService,
    pub follow_up_service: FollowUpService,
    pub dashboard_service: DashboardService,
}

impl AppState {
    /// Abre o store indicado pela configuração e monta os services.
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        let store: Arc<dyn LeadStore> = match &config.database_url {
            Some(url) => Arc::new(
                PgLeadStore::connect(url, config.database_max_connections)
                    .await
                    .context("Falha ao conectar ao banco de dados")?,
            ),
            None => {
                tracing::warn!("DATABASE_URL não definida, usando o store local");
                Arc::new(
                    LocalLeadStore::open(&config.local_store_path)
                        .await
                        .context("Falha ao abrir o store local")?,
                )
            }
        };

        Ok(Self::with_store(store))
    }

    // --- Monta o gráfico de dependências ---
    pub fn with_store(store: Arc<dyn LeadStore>) -> Self {
        Self {
            lead_service: LeadService::new(store.clone()),
            follow_up_service: FollowUpService::new(store.clone()),
            dashboard_service: DashboardService::new(store.clone()),
            store,
        }
    }
}
