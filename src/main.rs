use batchgate::application::engine::BatchEngine;
use batchgate::config::Settings;
use batchgate::domain::ports::OrderBackendRef;
use batchgate::infrastructure::http_backend::HttpOrderBackend;
use batchgate::infrastructure::in_memory::InMemoryBackend;
use batchgate::interfaces::http::auth::Credentials;
use batchgate::interfaces::http::{GatewayState, router};
use batchgate::logging::setup_logging;
use clap::Parser;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (TOML, YAML or JSON)
    #[arg(long, env = "CONFIG_FILE")]
    config: Option<PathBuf>,

    /// Listen port, overrides the configured one
    #[arg(long)]
    port: Option<u16>,

    /// Log level or filter directives, overrides the configured one
    #[arg(long)]
    log_level: Option<String>,

    /// Decide orders in-process instead of calling the backend: orders priced
    /// at or below this limit are approved, the rest rejected
    #[arg(long)]
    offline_approve_limit: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load(cli.config.as_deref()).into_diagnostic()?;
    if let Some(port) = cli.port {
        settings.port = port;
    }
    if let Some(level) = cli.log_level {
        settings.log.level = level;
    }
    setup_logging(&settings.log.level, settings.log.json);

    let backend: OrderBackendRef = match cli.offline_approve_limit {
        Some(limit) => {
            warn!(limit, "running against the in-memory backend");
            Arc::new(InMemoryBackend::new(limit))
        }
        None => Arc::new(
            HttpOrderBackend::new(&settings.exec.server_url, settings.backend_timeout())
                .into_diagnostic()?,
        ),
    };

    let mut engine = BatchEngine::new(settings.engine_config(), backend).into_diagnostic()?;
    engine.start().into_diagnostic()?;

    let state = GatewayState::new(
        Arc::new(engine.submitter()),
        Credentials::new(&settings.auth.user, &settings.auth.password),
        settings.request_timeout(),
    );

    let addr = format!("0.0.0.0:{}", settings.port);
    let listener = TcpListener::bind(&addr).await.into_diagnostic()?;
    info!(address = %addr, backend = %settings.exec.server_url, "order gateway listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .into_diagnostic()?;

    info!("stopping...");
    engine.stop().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "can't listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
