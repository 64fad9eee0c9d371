use anyhow::Context;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use phishguard_engine::{
    config::Config,
    engine::PhishingEngine,
    lexicon::SuspicionLexicon,
    model::StudentModel,
    routes::{self, AppState},
    tld::KnownTlds,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "phishguard_engine=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("loading configuration")?;
    info!("Loaded configuration: {:?}", config);

    // The service never starts without its model.
    let model = StudentModel::load(&config.model_path)
        .with_context(|| format!("loading classifier from {}", config.model_path.display()))?;

    let known_tlds = match &config.known_tlds_path {
        Some(path) => KnownTlds::load(path).context("loading known TLD list")?,
        None => KnownTlds::builtin(),
    };

    let engine = PhishingEngine::new(
        Arc::new(model),
        known_tlds,
        SuspicionLexicon::default(),
        config.max_url_length,
    );

    let metrics = if config.metrics_enabled {
        Some(
            PrometheusBuilder::new()
                .install_recorder()
                .context("installing Prometheus recorder")?,
        )
    } else {
        None
    };

    let app = routes::router(AppState {
        engine: Arc::new(engine),
        metrics,
    });

    let addr = config.socket_addr()?;
    info!("Starting PhishGuard scoring engine on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
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

    warn!("Shutdown signal received, starting graceful shutdown");
}
