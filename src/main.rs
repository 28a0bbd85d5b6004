use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{AppState, router};
use bridge_core::constants::{DEFAULT_REST_ADDR, ENV_REST_ADDR};
use bridge_core::{CoreConfig, HttpRepository, OAuthClient, SyncOrchestrator};

/// Main entry point for the HL7 v2 to FHIR bridge.
///
/// Configuration is read from the environment (and `.env`, if present) once, before the server
/// starts:
/// - `BRIDGE_REST_ADDR`: listen address (default: "0.0.0.0:3010")
/// - `OAUTH2_SERVER_URL`: base URL of the FHIR server and its identity provider (required)
/// - `FHIR_BASE_PATH`: FHIR API path below the base URL (default: "fhir/R4")
/// - `OAUTH2_CLIENT_ID`, `OAUTH2_CLIENT_SECRET`, `OAUTH2_REDIRECT_URI`: enable `/auth/*`
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the configuration is missing or invalid,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("bridge_run=info".parse()?)
                .add_directive("bridge_core=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = Arc::new(
        CoreConfig::from_lookup(|name| std::env::var(name).ok())
            .context("invalid bridge configuration")?,
    );
    let addr = std::env::var(ENV_REST_ADDR).unwrap_or_else(|_| DEFAULT_REST_ADDR.into());

    let oauth = match OAuthClient::new(cfg.clone()) {
        Ok(client) => Some(Arc::new(client)),
        Err(e) => {
            tracing::warn!("-- OAuth endpoints disabled: {}", e);
            None
        }
    };
    let repository = Arc::new(HttpRepository::new(cfg.clone())?);
    let state = AppState {
        sync: SyncOrchestrator::new(repository),
        oauth,
    };

    tracing::info!(
        "-- Starting HL7 to FHIR bridge on {} (FHIR server {})",
        addr,
        cfg.server_url()
    );

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("-- Bridge stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = until_signal("ctrl-c", tokio::signal::ctrl_c());

    #[cfg(unix)]
    let terminate = until_signal("SIGTERM", async {
        let mut signal =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;
        signal.recv().await;
        Ok::<(), std::io::Error>(())
    });

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Resolves when `signal` is delivered. A handler that could not be installed never resolves,
/// so the server keeps running on the remaining signals.
async fn until_signal(name: &str, signal: impl Future<Output = std::io::Result<()>>) {
    if let Err(e) = signal.await {
        tracing::error!("failed to listen for {}: {}", name, e);
        std::future::pending::<()>().await;
    }
}
