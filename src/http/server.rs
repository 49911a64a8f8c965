//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, timeout, request ID)
//! - Own the shared route table, session store and tutor client
//! - Serve until the shutdown signal fires, then drop every session

use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::StatusCode,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::LabConfig;
use crate::http::handlers::*;
use crate::http::request::{make_span, propagate_request_id_layer, set_request_id_layer};
use crate::routing::Router as RouteTable;
use crate::session::SessionStore;
use crate::tutor::{TutorClient, TutorError};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<LabConfig>,
    pub router: Arc<RouteTable>,
    pub sessions: SessionStore,
    pub tutor: Arc<TutorClient>,
}

impl AppState {
    /// Build state, reading the tutor API key from the environment.
    pub fn new(config: LabConfig) -> Result<Self, TutorError> {
        let tutor = TutorClient::from_env(&config.tutor)?;
        Ok(Self::with_tutor(config, tutor))
    }

    pub fn with_tutor(config: LabConfig, tutor: TutorClient) -> Self {
        let config = Arc::new(config);
        let router = RouteTable::from_config(config.routes.clone())
            .with_latency(Duration::from_millis(config.simulation.route_latency_ms));

        Self {
            router: Arc::new(router),
            sessions: SessionStore::new(Arc::clone(&config)),
            tutor: Arc::new(tutor),
            config,
        }
    }
}

/// HTTP server for the lab API.
pub struct HttpServer {
    router: Router,
    state: AppState,
}

impl HttpServer {
    pub fn new(state: AppState) -> Self {
        let router = Self::build_router(state.clone());
        Self { router, state }
    }

    /// Build the Axum router with all middleware layers.
    pub fn build_router(state: AppState) -> Router {
        let timeout = Duration::from_secs(state.config.listener.request_timeout_secs);

        Router::new()
            .route("/status", get(get_status))
            .route("/routes", get(list_routes))
            .route("/quiz/questions", get(quiz_questions))
            .route("/tutor/ask", post(tutor_ask))
            .route("/sessions", post(create_session))
            .route("/sessions/{id}", axum::routing::delete(end_session))
            .route("/sessions/{id}/route", post(match_route))
            .route("/sessions/{id}/rate-limit", get(rate_limit_snapshot))
            .route("/sessions/{id}/rate-limit/submit", post(rate_limit_submit))
            .route("/sessions/{id}/rate-limit/reset", post(rate_limit_reset))
            .route("/sessions/{id}/breaker", get(breaker_snapshot))
            .route("/sessions/{id}/breaker/evaluate", post(breaker_evaluate))
            .route("/sessions/{id}/breaker/reset", post(breaker_reset))
            .route("/sessions/{id}/auth", post(validate_token))
            .route("/sessions/{id}/cache/fetch", post(cache_fetch))
            .route("/sessions/{id}/cache/purge", post(cache_purge))
            .route("/sessions/{id}/journey", get(journey_view))
            .route("/sessions/{id}/journey/next", post(journey_next))
            .route("/sessions/{id}/journey/prev", post(journey_prev))
            .route("/sessions/{id}/order", post(place_order))
            .route("/sessions/{id}/quiz", get(quiz_view))
            .route("/sessions/{id}/quiz/answer", post(quiz_answer))
            .route("/sessions/{id}/quiz/restart", post(quiz_restart))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(set_request_id_layer())
                    .layer(propagate_request_id_layer())
                    .layer(TraceLayer::new_for_http().make_span_with(make_span))
                    .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout)),
            )
    }

    /// Serve on `listener` until `shutdown` fires. Idle sessions are swept meanwhile.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            routes = self.state.router.routes().len(),
            "HTTP server starting"
        );

        let sweeper = tokio::spawn(self.state.sessions.clone().run_sweeper(shutdown.resubscribe()));

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        sweeper.abort();
        let remaining = self.state.sessions.len();
        self.state.sessions.clear();
        tracing::info!(sessions_dropped = remaining, "HTTP server stopped");
        Ok(())
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }
}
