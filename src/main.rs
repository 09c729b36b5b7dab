use anyhow::Context;
use tbctxt_api::config::AppConfig;
use tbctxt_api::metrics::Metrics;
use tbctxt_api::reference::ReferenceData;
use tbctxt_api::upstream::WarcraftLogs;
use tbctxt_api::{router, AppState};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cfg = AppConfig::from_env()?;
    let metrics = Metrics::new().context("failed to initialise metrics")?;

    let reference = ReferenceData::load(&cfg.data_dir)
        .await
        .context("failed to load reference data")?;

    if cfg.warcraft_logs.credentials().is_none() {
        tracing::warn!("WCL_CLIENT_ID / WCL_CLIENT_SECRET not set; /api/wcl/character will return 503");
    }

    let warcraft_logs = WarcraftLogs::try_from_config(cfg.warcraft_logs.clone(), metrics.clone())
        .context("failed to build Warcraft Logs client")?;

    let app = router(AppState {
        reference,
        warcraft_logs,
        metrics,
    });

    let listen_addr = cfg.listen_addr();
    let listener = tokio::net::TcpListener::bind(listen_addr).await?;

    tracing::info!(%listen_addr, "starting TBC.TXT API server");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server exited cleanly");

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            tracing::warn!(%error, "failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut term_signal) => term_signal.recv().await,
            Err(error) => {
                tracing::warn!(%error, "failed to install SIGTERM handler");
                None
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
