//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with one endpoint per race policy
//! - Wire up middleware (request ID, tracing, request timeout)
//! - Validate the client timeout and hand the batch to the orchestrator
//! - Map batch outcomes to status codes and bodies
//! - Serve until the shutdown signal, then drop the upstream client

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{FanoutConfig, GatewayConfig};
use crate::fanout::{Orchestrator, Outcome, Policy};
use crate::http::request::{request_id, resolve_timeout, TimeoutParams};
use crate::http::response::ApiError;
use crate::lifecycle::ShutdownSignal;
use crate::observability::metrics;
use crate::upstream::{HttpUpstream, UpstreamCaller, UpstreamError};

/// Grace on top of the largest client timeout before tower-http gives up on a request.
const REQUEST_TIMEOUT_GRACE: Duration = Duration::from_secs(5);

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
    pub fanout: FanoutConfig,
}

/// HTTP server for the gateway.
pub struct GatewayServer {
    router: Router,
    config: GatewayConfig,
}

impl GatewayServer {
    /// Create the server with the shared reqwest upstream client.
    pub fn new(config: GatewayConfig) -> Result<Self, UpstreamError> {
        let upstream = HttpUpstream::new(&config.upstream)?;
        Ok(Self::with_upstream(config, Arc::new(upstream)))
    }

    /// Create the server around any upstream caller.
    pub fn with_upstream(config: GatewayConfig, upstream: Arc<dyn UpstreamCaller>) -> Self {
        let orchestrator =
            Orchestrator::new(upstream).with_probe_window(config.fanout.probe_window());
        let state = AppState {
            orchestrator: Arc::new(orchestrator),
            fanout: config.fanout.clone(),
        };

        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        let request_timeout = Duration::from_secs(config.fanout.max_timeout_secs)
            .saturating_add(REQUEST_TIMEOUT_GRACE);

        Router::new()
            .route("/api/all", get(api_all))
            .route("/api/all/", get(api_all))
            .route("/api/first", get(api_first))
            .route("/api/first/", get(api_first))
            .route("/api/within-timeout", get(api_within_timeout))
            .route("/api/within-timeout/", get(api_within_timeout))
            .route("/api/smart", get(api_smart))
            .route("/api/smart/", get(api_smart))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(TimeoutLayer::new(request_timeout)),
            )
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: ShutdownSignal,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            batch_size = self.config.fanout.batch_size,
            max_timeout_ms = self.config.fanout.max_timeout_ms(),
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown.wait().await;
                tracing::info!("Shutdown: draining in-flight requests");
            })
            .await?;

        tracing::info!("Shutdown: closing upstream client");
        Ok(())
    }

    /// The fully layered router, for driving the server without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

/// Collects all successful responses; any shortfall is an error.
async fn api_all(
    State(state): State<AppState>,
    headers: HeaderMap,
    params: Result<Query<TimeoutParams>, QueryRejection>,
) -> Response {
    race(&state, Policy::All, &headers, params).await
}

/// Returns the first successful response.
async fn api_first(
    State(state): State<AppState>,
    headers: HeaderMap,
    params: Result<Query<TimeoutParams>, QueryRejection>,
) -> Response {
    race(&state, Policy::First, &headers, params).await
}

/// Returns whatever succeeded within the timeout; never an error.
async fn api_within_timeout(
    State(state): State<AppState>,
    headers: HeaderMap,
    params: Result<Query<TimeoutParams>, QueryRejection>,
) -> Response {
    race(&state, Policy::WithinTimeout, &headers, params).await
}

/// Probes with one call before widening to the full batch.
async fn api_smart(
    State(state): State<AppState>,
    headers: HeaderMap,
    params: Result<Query<TimeoutParams>, QueryRejection>,
) -> Response {
    race(&state, Policy::Smart, &headers, params).await
}

async fn race(
    state: &AppState,
    policy: Policy,
    headers: &HeaderMap,
    params: Result<Query<TimeoutParams>, QueryRejection>,
) -> Response {
    let request_id = request_id(headers);

    let response = match execute(state, policy, params).await {
        Ok(outcome) => {
            tracing::debug!(request_id = %request_id, policy = %policy, values = outcome.len(), "Race finished");
            Json(outcome).into_response()
        }
        Err(e) => {
            tracing::warn!(request_id = %request_id, policy = %policy, error = %e, "Race rejected");
            e.into_response()
        }
    };

    metrics::record_gateway_request(policy.slug(), response.status().as_u16());
    response
}

async fn execute(
    state: &AppState,
    policy: Policy,
    params: Result<Query<TimeoutParams>, QueryRejection>,
) -> Result<Outcome, ApiError> {
    let deadline = resolve_timeout(params, &state.fanout)?;
    let outcome = state
        .orchestrator
        .run(policy, state.fanout.batch_size, deadline)
        .await?;
    Ok(outcome)
}
