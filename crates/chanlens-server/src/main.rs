mod api;
mod auth;
mod middleware;
mod web;

use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, default_rate_limit_state, AppState, RunLauncher, RunLimits},
    auth::AuthState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = chanlens_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pipeline = chanlens_pipeline::live_pipeline(&config)?;
    let auth = AuthState::from_config(&config)?;
    let state = AppState {
        launcher: RunLauncher::new(pipeline),
        limits: RunLimits::from_config(&config),
        auth,
    };
    let app = build_app(state, default_rate_limit_state());

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, env = %config.env, "chanlens server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

/// Resolves on Ctrl-C, or on SIGTERM where the platform has it.
///
/// In-flight runs are detached tasks and are dropped with the runtime.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        let mut terminate =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("failed to install SIGTERM handler");
        tokio::select! {
            result = tokio::signal::ctrl_c() => result.expect("failed to listen for ctrl-c"),
            _ = terminate.recv() => {}
        }
    }

    #[cfg(not(unix))]
    tokio::signal::ctrl_c()
        .await
        .expect("failed to listen for ctrl-c");

    tracing::info!("shutdown signal received; draining open connections");
}
