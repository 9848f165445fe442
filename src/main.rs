//src/main.rs

use anyhow::Context;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use restaurant_leads::config::{AppState, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Inicializa o logger (RUST_LOG controla o filtro, padrão "info")
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    // Se a configuração falhar, a aplicação não deve iniciar.
    let config = Config::from_env()?;

    let app_state = AppState::new(&config)
        .await
        .context("Falha ao inicializar o estado da aplicação.")?;
    tracing::info!("📦 Store em uso: {}", app_state.store.kind());

    let store = app_state.store.clone();
    let app = restaurant_leads::app(app_state, config.allowed_origins.clone());

    // Inicia o servidor
    let listener = TcpListener::bind(config.bind_addr())
        .await
        .with_context(|| format!("Falha ao iniciar o listener TCP em {}", config.bind_addr()))?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Erro no servidor Axum")?;

    // Fecha o store explicitamente (pool do Postgres / flush do snapshot local)
    store.close().await?;
    tracing::info!("👋 Servidor encerrado");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("🔥 Falha ao escutar o Ctrl-C: {}", e);
    }
    tracing::info!("Sinal de desligamento recebido");
}
