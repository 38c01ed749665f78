//! HTTP surface of the relay.
//!
//! Routes are assembled in [`router`]; [`serve`] binds and runs them until
//! Ctrl+C. Handlers are stateless apart from the shared [`AppState`].

pub mod error;
pub mod handlers;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use axum::routing::{get, post};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::apify::Platform;
use crate::apify::client::ApifyClient;
use crate::config::{Config, RunConfig};

pub const HEALTH_PATH: &str = "/health";
pub const ACTORS_PATH: &str = "/api/actors";
pub const ACTOR_SCHEMA_PATH: &str = "/api/actors/{actor_id}/schema";
pub const ACTOR_RUN_PATH: &str = "/api/actors/{actor_id}/run";

/// Shared per-process state. Holds no credentials.
#[derive(Clone)]
pub struct AppState {
    pub platform: Arc<dyn Platform>,
    pub run: Arc<RunConfig>,
}

impl AppState {
    pub fn new(platform: Arc<dyn Platform>, run: RunConfig) -> Self {
        Self {
            platform,
            run: Arc::new(run),
        }
    }
}

/// Build the full router with CORS and request tracing.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(HEALTH_PATH, get(handlers::health))
        .route(ACTORS_PATH, get(handlers::list_actors))
        .route(ACTOR_SCHEMA_PATH, get(handlers::actor_schema))
        .route(ACTOR_RUN_PATH, post(handlers::run_actor))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `config.listen_addr()` and serve against the Apify API until Ctrl+C.
pub async fn serve(config: &Config) -> Result<()> {
    let client = ApifyClient::new(&config.api_base).context("invalid upstream api base")?;
    let state = AppState::new(Arc::new(client), config.run.clone());

    let addr = config.listen_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(addr = %addr, upstream = %config.api_base, "relay listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("relay stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        // No signal handler available; run until killed
        std::future::pending::<()>().await;
    }
}
