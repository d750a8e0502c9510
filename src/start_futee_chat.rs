//! Startup helpers for the chat server.
//!
//! The API key is resolved before anything else: without it the server never
//! starts accepting input.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;

use crate::config::{API_KEY_HELP_URL, ChatConfig, ConfigError};
use crate::server::{self, AppState};

/// Run the server until Ctrl+C.
///
/// # Returns
/// `ExitCode::SUCCESS` on graceful shutdown, `1` on failure.
#[must_use]
pub fn run() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    tracing::info!("Starting FuteeAI chat v{}", env!("CARGO_PKG_VERSION"));

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to create runtime: {e}");
            return ExitCode::from(1);
        }
    };

    let initialized = {
        let _guard = rt.enter();
        initialize()
    };
    let (config, state) = match initialized {
        Ok(ready) => ready,
        Err(e) => {
            tracing::error!("{e:#}");
            if matches!(e.downcast_ref::<ConfigError>(), Some(ConfigError::MissingApiKey { .. })) {
                tracing::error!("Get a free key from: {API_KEY_HELP_URL}");
            }
            return ExitCode::from(1);
        }
    };

    if let Err(e) = rt.block_on(server::run_server_with_shutdown(state, config.port, shutdown_signal())) {
        tracing::error!("Server error: {e}");
        return ExitCode::from(1);
    }

    tracing::info!("Chat server stopped");
    ExitCode::SUCCESS
}

/// Resolve configuration and build application state without starting the server.
///
/// # Errors
/// Returns an error if configuration is missing or invalid, or the HTTP client
/// cannot be created.
pub fn initialize() -> anyhow::Result<(ChatConfig, Arc<AppState>)> {
    let config = ChatConfig::from_env().context("Failed to load configuration")?;
    tracing::info!("Completion endpoint: {}", config.api_url);
    tracing::info!(
        "Models: {}",
        config
            .models
            .models()
            .iter()
            .map(|m| m.label.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );

    let state = AppState::from_config(&config).context("Failed to create state")?;
    Ok((config, state))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Ctrl+C handler failed: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down...");
}
