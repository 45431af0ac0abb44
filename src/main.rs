use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use airdrop_registry::app_state::AppState;
use airdrop_registry::config::RegistryConfig;
use airdrop_registry::{routes, AirdropRegistry};

fn load_config() -> Result<RegistryConfig> {
    // AIRDROP_CONFIG (or the first argument) points at a TOML file; env vars still override it
    let path = std::env::var("AIRDROP_CONFIG")
        .ok()
        .or_else(|| std::env::args().nth(1));
    match path {
        Some(p) if !p.trim().is_empty() => RegistryConfig::load(p.trim()),
        _ => {
            let cfg = RegistryConfig::from_env();
            cfg.validate()?;
            Ok(cfg)
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for ctrl-c: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<()> {
    // init tracing from env AIRDROP_LOG or RUST_LOG
    let filter = std::env::var("AIRDROP_LOG")
        .unwrap_or_else(|_| std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()));
    let env_filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let config = load_config()?;
    let admin_token_mask = match &config.admin_token {
        Some(t) => format!("set (len={})", t.len()),
        None => "unset".to_string(),
    };
    info!(
        admin_token = %admin_token_mask,
        admins = config.admin_addresses.len(),
        "Airdrop registry starting up"
    );
    if config.admin_token.is_none() {
        warn!("AIRDROP_ADMIN_TOKEN not set; admin routes will reject every call");
    }

    std::fs::create_dir_all(&config.data_dir)
        .with_context(|| format!("Failed to create data dir {}", config.data_dir.display()))?;
    let db_path = config.db_path();
    let registry = AirdropRegistry::open(&db_path)
        .with_context(|| format!("Failed to open registry at {}", db_path.display()))?;
    info!(
        path = %db_path.display(),
        campaigns = registry.campaigns()?.len(),
        "Registry opened"
    );

    let state = AppState::new(Arc::new(registry), config.admin_auth());
    let app = routes::router(state, config.max_body_bytes);

    let addr = config.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("Airdrop registry stopped");
    Ok(())
}
