mod error;
mod routes;
mod session;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use diet_core::config::DietConfig;
use diet_core::storage::{self, SqliteStore};

pub struct AppState {
    pub store: SqliteStore,
    pub config: DietConfig,
}

#[derive(Parser)]
#[command(name = "diet-web", about = "Daily Diet HTTP API")]
struct Cli {
    /// Config file layered over `~/.config/daily-diet/config.toml`
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Address to bind (overrides `web.host`)
    #[arg(long)]
    host: Option<String>,

    /// Port to bind (overrides `web.port`)
    #[arg(long)]
    port: Option<u16>,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    print_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "diet_web=info,diet_core=info,tower_http=info".into()),
        )
        .init();

    let mut config = match cli.config.as_deref() {
        Some(path) => DietConfig::load(Some(path))?,
        None => DietConfig::load(None).unwrap_or_else(|e| {
            tracing::warn!("falling back to default config: {e}");
            DietConfig::default_config()
        }),
    };
    if let Some(host) = cli.host {
        config.web.host = host;
    }
    if let Some(port) = cli.port {
        config.web.port = port;
    }

    if cli.print_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    let store = storage::open_store(&config.storage)?;
    tracing::info!(path = %store.path().display(), "opened meal store");
    if config.session.enforce_ownership {
        tracing::info!("id-scoped meal operations restricted to the owning session");
    }

    let addr = format!("{}:{}", config.web.host, config.web.port);
    let state = Arc::new(AppState { store, config });
    let app = routes::router(state);

    tracing::info!("diet-web listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
