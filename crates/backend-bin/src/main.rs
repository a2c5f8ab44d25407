use anyhow::Context;
use blogauth_backend_lib::{
    config::{Settings, DEFAULT_CONFIG_FILE},
    router,
    storage::FlatFileStore,
    AppState,
};
use clap::Parser;
use std::{net::SocketAddr, path::PathBuf, sync::Arc};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

/// Blog auth service: signup, login and identity tokens over HTTP
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// TOML config file
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Override the configured bind address
    #[arg(long)]
    bind: Option<SocketAddr>,

    /// Emit logs as JSON
    #[arg(long)]
    json: bool,
}

fn init_tracing(level: &str, json: bool) {
    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
    tracing::info!("shutting down");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut settings = Settings::load_from(&args.config)
        .with_context(|| format!("loading configuration from {}", args.config.display()))?;
    if let Some(bind) = args.bind {
        settings.bind_addr = bind;
    }

    init_tracing(&settings.log_level, args.json);
    tracing::info!(?settings, "configuration loaded");

    let store = FlatFileStore::open(&settings.database_url, &settings.database_name)
        .context("opening account store")?;
    tracing::info!(accounts = store.len(), "account store ready");

    let addr = settings.bind_addr;
    let state = Arc::new(AppState::new(Arc::new(store), settings)?);
    let app = router::create_router(state);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
