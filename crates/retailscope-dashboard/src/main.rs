mod api;
mod boundary;
mod middleware;
mod session;
mod views;

use std::sync::Arc;

use anyhow::Context;
use retailscope_client::ScrapeClient;
use tracing_subscriber::EnvFilter;

use crate::api::{build_app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(retailscope_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    if config.demo_credentials_defaulted {
        tracing::warn!("demo credentials not configured; using the built-in fallback pair");
    }

    let registry = retailscope_core::load_retailers(&config.retailers_path).with_context(|| {
        format!(
            "loading retailer registry from {}",
            config.retailers_path.display()
        )
    })?;
    tracing::info!(
        retailers = registry.len(),
        enabled = registry.enabled().count(),
        "retailer registry loaded"
    );

    let client = ScrapeClient::from_config(&config)?;
    boundary::install_panic_hook();

    let state = AppState::new(Arc::clone(&config), Arc::new(registry), client);
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(
        addr = %config.bind_addr,
        env = %config.env,
        api = %config.api_base_url,
        "dashboard listening"
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
