//! HTTP surface: a thin axum layer translating query strings into
//! [`Ranker`](crate::ranking::Ranker) and store calls.
//!
//! | Route                      | Handler                     |
//! |----------------------------|-----------------------------|
//! | `GET /health`              | [`handlers::health`]        |
//! | `GET /api/locations`       | [`handlers::list_locations`]|
//! | `GET /api/locations/:id`   | [`handlers::location_detail`]|
//! | `GET /api/score`           | [`handlers::score`]         |
//! | `GET /api/profile-scores`  | [`handlers::profile_scores`]|
//! | `GET /api/admin/dataset`   | [`handlers::admin_dataset`] |
//!
//! Every error body is `{"error": "<message>"}`.

use std::{sync::Arc, time::Duration};

use axum::{
    http::{header::CONTENT_TYPE, HeaderName, Method},
    routing::get,
    Router,
};
use thiserror::Error;
use tokio::{net::TcpListener, signal};
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info, warn};

pub mod config;
pub mod error;
pub mod handlers;
pub mod state;

pub use config::{Config, ConfigError};
pub use error::ApiError;
pub use state::AppState;

use crate::dataset::{record_fingerprint, StoreError};
use handlers::{
    admin_dataset, health, list_locations, location_detail, not_found, profile_scores, score, ADMIN_TOKEN_HEADER,
};

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Dataset error: {0}")]
    Store(#[from] StoreError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, HeaderName::from_static(ADMIN_TOKEN_HEADER)])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/health", get(health))
        .route("/api/locations", get(list_locations))
        .route("/api/locations/:id", get(location_detail))
        .route("/api/score", get(score))
        .route("/api/profile-scores", get(profile_scores))
        .route("/api/admin/dataset", get(admin_dataset))
        .fallback(not_found)
        .layer(cors)
        .with_state(state)
}

pub async fn start_server(config: Config) -> Result<(), ServerError> {
    if !config.missing_live_keys.is_empty() {
        warn!(
            "Live data keys missing: {}. Serving bundled data; set the keys to enable live fetchers.",
            config.missing_live_keys.join(", ")
        );
    }

    info!("Initializing state...");
    let state = AppState::from_config(config)?;

    if let Some(path) = &state.config.fingerprint_file {
        let fingerprint = state.store.summary()?.fingerprint()?;
        match record_fingerprint(path, &fingerprint) {
            Ok(previous) => info!(
                "[dataset] previous={} next={fingerprint}",
                previous.as_deref().unwrap_or("none")
            ),
            Err(e) => warn!("Failed to record fingerprint at {}: {e}", path.display()),
        }
    }

    info!("Starting server...");
    let app = build_router(Arc::clone(&state));

    let address = format!("0.0.0.0:{}", state.config.port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutting down...");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!("Failed to install Ctrl+C handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install signal handler: {e}");
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
}
