//! The relay HTTP server.
//!
//! Routes:
//! - `POST /secrets`     store a sealed payload, answer `201 {"id"}`
//! - `GET  /secrets/:id` serve one view, burning the secret on its last
//! - `GET  /health`      liveness plus store counters
//!
//! The server never sees a key.  Keys travel in the link fragment, which
//! browsers and the `burnlink` client never send.

pub mod handlers;

use std::future::Future;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::http::Method;
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::Settings;
use crate::errors::{BurnLinkError, Result};
use crate::relay::SecretStore;

/// Everything `run` needs to start a relay.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub sweep_interval: Duration,
    pub max_body_bytes: usize,
    pub burn_marker_ttl: Duration,
}

impl ServerConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            host: settings.host.clone(),
            port: settings.port,
            sweep_interval: settings.sweep_interval(),
            max_body_bytes: settings.max_body_bytes,
            burn_marker_ttl: settings.burn_marker_ttl(),
        }
    }

    /// Host part of the listen address, without IPv6 brackets.
    pub fn bind_host(&self) -> &str {
        self.host.trim_start_matches('[').trim_end_matches(']')
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub store: SecretStore,
}

impl AppState {
    pub fn new(store: SecretStore) -> Self {
        Self { store }
    }
}

/// Build the relay router around an existing store.
pub fn router(state: AppState, max_body_bytes: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
        .allow_origin(Any);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/secrets", post(handlers::create_secret))
        .route("/secrets/:id", get(handlers::get_secret))
        .fallback(handlers::not_found)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Bind the configured address and serve until Ctrl-C.
pub async fn run(cfg: ServerConfig) -> Result<()> {
    let listener = TcpListener::bind((cfg.bind_host(), cfg.port))
        .await
        .map_err(|e| {
            BurnLinkError::CommandFailed(format!(
                "cannot listen on {}:{}: {e}",
                cfg.host, cfg.port
            ))
        })?;
    serve(listener, cfg, shutdown_signal()).await
}

/// Serve on an already-bound listener until `shutdown` resolves.
///
/// Owns the store and its sweep task for the lifetime of the server.
pub async fn serve<F>(listener: TcpListener, cfg: ServerConfig, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let store = SecretStore::with_burn_marker_ttl(cfg.burn_marker_ttl);
    let sweeper = store.clone().spawn_sweep(cfg.sweep_interval);
    let app = router(AppState::new(store), cfg.max_body_bytes);

    info!(
        addr = %listener.local_addr()?,
        sweep_secs = cfg.sweep_interval.as_secs(),
        max_body_bytes = cfg.max_body_bytes,
        "burnlink relay listening"
    );

    let result = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await;

    sweeper.abort();
    info!("burnlink relay stopped");
    result.map_err(BurnLinkError::from)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_host_strips_ipv6_brackets() {
        let mut cfg = ServerConfig::default();
        assert_eq!(cfg.bind_host(), "0.0.0.0");

        cfg.host = "[::1]".into();
        assert_eq!(cfg.bind_host(), "::1");
    }

    #[tokio::test]
    async fn serve_stops_on_shutdown() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let result = serve(listener, ServerConfig::default(), async {}).await;
        assert!(result.is_ok());
    }
}
