//! Collector HTTP server with axum router and graceful shutdown.

use std::net::SocketAddr;

use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::error::CollectorError;
use super::handlers::{get_events, get_index, get_org_stats, get_stats, post_event, AppState};
use super::store::EventStore;
use crate::config::CollectorConfig;

/// HTTP server receiving detection events and serving them back.
pub struct CollectorServer {
    /// Server configuration.
    config: CollectorConfig,
    /// Application state shared across handlers.
    state: AppState,
    /// Triggers graceful shutdown.
    cancel: CancellationToken,
}

impl CollectorServer {
    /// Create a collector with an empty store sized from `config`.
    #[must_use]
    pub fn new(config: CollectorConfig) -> Self {
        let store = EventStore::new(config.max_events);
        let state = AppState::new(store, config.default_limit);
        Self {
            config,
            state,
            cancel: CancellationToken::new(),
        }
    }

    /// Get the configured address as a string.
    #[must_use]
    pub fn address(&self) -> String {
        self.config.address()
    }

    /// Shared handle to the event store.
    #[must_use]
    pub fn store(&self) -> EventStore {
        self.state.store.clone()
    }

    /// Token that stops the server when cancelled.
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Build the axum router with all routes and middleware.
    pub fn build_router(&self) -> Router {
        let router = Router::new()
            .route("/", get(get_index))
            .route("/api/event", post(post_event))
            .route("/api/events", get(get_events))
            .route("/api/stats", get(get_stats))
            .route("/api/org-stats", get(get_org_stats))
            .with_state(self.state.clone())
            .layer(TraceLayer::new_for_http());

        if self.config.cors_permissive {
            router.layer(CorsLayer::permissive())
        } else {
            router
        }
    }

    /// Bind the configured address and serve until cancelled.
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind or serve.
    pub async fn run(self) -> Result<(), CollectorError> {
        let address = self.address();
        let listener = TcpListener::bind(&address)
            .await
            .map_err(|source| CollectorError::BindError { address, source })?;
        self.serve(listener).await
    }

    /// Serve on an already bound listener until cancelled.
    ///
    /// # Errors
    ///
    /// Returns an error if serving fails.
    pub async fn serve(self, listener: TcpListener) -> Result<(), CollectorError> {
        let local: Option<SocketAddr> = listener.local_addr().ok();
        let app = self.build_router();
        let cancel = self.cancel.clone();

        tracing::info!(address = ?local, "Starting event collector");

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                cancel.cancelled().await;
                tracing::info!("Event collector shutting down gracefully");
            })
            .await?;
        Ok(())
    }
}
