//! polyrun-server - external-facing request handler
//!
//! Thin HTTP layer over the sandbox core: validates the inbound request
//! shape, invokes the dispatcher, and maps results onto the external
//! `{success, output | error}` contract.

mod config;
mod routes;

pub use config::ServerConfig;
pub use routes::{create_router, AppState};

use anyhow::Context;
use polyrun_sandbox::{AdapterRegistry, Dispatcher, ProcessSandbox};
use std::sync::Arc;
use tracing::info;

/// Build application state from configuration. Fails fast when a
/// configured language's interpreter is not installed.
pub async fn build_state(config: &ServerConfig) -> anyhow::Result<AppState> {
    let languages = config.language_ids()?;
    let registry = AdapterRegistry::with_languages(&languages)
        .await
        .context("adapter registry validation failed")?;
    info!(
        languages = ?registry.languages(),
        max_concurrency = config.max_concurrency,
        "adapter registry validated"
    );

    let sandbox = ProcessSandbox::new()
        .with_inherit_env(config.inherit_env.clone())
        .with_network_isolation(config.isolate_network);

    let dispatcher = Dispatcher::new(
        Arc::new(registry),
        sandbox,
        config.limits.clone(),
        config.max_concurrency,
    );

    Ok(AppState {
        dispatcher: Arc::new(dispatcher),
    })
}

/// Start the execution service and serve until the listener fails.
pub async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    let state = build_state(&config).await?;
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    let addr = listener
        .local_addr()
        .context("failed to obtain server bind address")?;
    info!("execution service listening on {addr}");

    axum::serve(listener, app)
        .await
        .context("execution service error")
}
