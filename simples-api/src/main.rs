use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

use simples_api::logging::init_logging;
use simples_api::{AppConfig, AppState, TableSource, app};

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Simples Nacional calculation service.
///
/// Loads and validates the annex table, then serves the annex details and
/// monthly calculation endpoints. Flags override the config file.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// TOML config file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to listen on (e.g. `127.0.0.1:8080`).
    #[arg(long)]
    bind: Option<SocketAddr>,

    /// Annex table CSV; the bundled table is used when neither this nor the
    /// config file names one.
    #[arg(long)]
    table: Option<PathBuf>,

    /// Log level or `EnvFilter` directive. `RUST_LOG` still takes precedence.
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    fn apply(
        self,
        mut config: AppConfig,
    ) -> AppConfig {
        if let Some(bind) = self.bind {
            config.server.bind = bind;
        }
        if let Some(table) = self.table {
            config.table.path = Some(table);
        }
        if let Some(level) = self.log_level {
            config.logging.level = level;
        }
        config
    }
}

// ─── signals ─────────────────────────────────────────────────────────────────

/// Reloads the annex table on every SIGHUP. A rejected table leaves the
/// current one in place.
#[cfg(unix)]
fn spawn_reload_on_hangup(state: AppState) -> Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut hangup = signal(SignalKind::hangup()).context("Failed to install SIGHUP handler")?;
    tokio::spawn(async move {
        while hangup.recv().await.is_some() {
            info!(source = %state.source, "SIGHUP received, reloading annex table");
            // Reload logs its own failures.
            if let Err(err) = state.spawn_reload().await {
                error!(error = %err, "annex table reload task failed");
            }
        }
    });
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
            }
            Err(err) => {
                error!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received");
}

// ─── entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref())
        .with_context(|| match &cli.config {
            Some(path) => format!("Failed to load config: {}", path.display()),
            None => "Failed to load default config".to_string(),
        })?;
    let config = cli.apply(config);

    init_logging(&config.logging.level, config.logging.file.as_deref())?;

    let source = TableSource::from_path(config.table.path.clone());
    let table = source
        .load()
        .with_context(|| format!("Failed to load annex table from {source}"))?;
    info!(%source, ceiling = ?config.policy.ceiling, "annex table ready");

    let state = AppState::new(table, config.policy.ceiling, source)
        .with_allowed_origins(config.server.allowed_origins.clone());

    #[cfg(unix)]
    spawn_reload_on_hangup(state.clone())?;

    let listener = tokio::net::TcpListener::bind(config.server.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind))?;
    info!(addr = %config.server.bind, "simples-api listening");

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("server shutdown complete");
    Ok(())
}
