use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};

use coauthor_server::ai::mistral::MistralClient;
use coauthor_server::ai::{AiClient, EditEngine};
use coauthor_server::api::{self, ApiState};
use coauthor_server::config::ServerConfig;
use coauthor_server::search::SearchClient;
use coauthor_server::store::MemoryStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::from_env().context("failed to load server configuration")?;

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&config.log_filter))
        .init();

    let ai_client: Option<Arc<dyn AiClient>> = match &config.mistral_api_key {
        Some(key) => {
            let client = MistralClient::new(
                config.mistral_base_url.clone(),
                key.clone(),
                config.mistral_model.clone(),
            )
            .context("invalid Mistral base URL")?;
            Some(Arc::new(client))
        }
        None => {
            warn!("MISTRAL_API_KEY not set; AI routes will fail until configured");
            None
        }
    };

    let state = ApiState::new(
        MemoryStore::new(),
        EditEngine::new(ai_client),
        SearchClient::new(config.search_base_url.clone()),
    );
    let app = api::router(state);

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind listener on {}", config.bind_addr))?;

    info!(listen_addr = %config.bind_addr, ai_enabled = config.ai_enabled(), "starting server");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server exited unexpectedly")
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    info!("shutdown signal received");
}
