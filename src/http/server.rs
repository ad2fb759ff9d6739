//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with a single dispatching fallback
//! - Wire up middleware (tracing, timeout, body limit, request ID)
//! - Bind server to listener and shut down gracefully
//! - Build the request view (forwarded headers) and render outcomes
//! - Observability (metrics, correlation IDs)

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::http::forwarded::ForwardedRequestView;
use crate::http::link::LinkBuilder;
use crate::http::request::{HttpRequest, RequestInfo, X_REQUEST_ID};
use crate::http::response::render;
use crate::observability::metrics;
use crate::params::ParameterBinder;
use crate::routing::RouteTable;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub table: Arc<RouteTable>,
    pub binder: Arc<ParameterBinder>,
    pub context_path: String,
    pub forwarded: bool,
    pub max_body_bytes: usize,
}

/// HTTP server dispatching every request through a [`RouteTable`].
pub struct HttpServer {
    router: Router,
    config: AppConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration and routes.
    pub fn new(config: AppConfig, table: RouteTable) -> Self {
        let state = AppState {
            table: Arc::new(table),
            binder: Arc::new(ParameterBinder::new()),
            context_path: config.context.path.clone(),
            forwarded: config.forwarded.enabled,
            max_body_bytes: config.limits.max_body_bytes,
        };

        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &AppConfig, state: AppState) -> Router {
        Router::new()
            .fallback(dispatch_handler)
            .with_state(state)
            .layer(RequestBodyLimitLayer::new(config.limits.max_body_bytes))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                let request_id = request
                    .headers()
                    .get(X_REQUEST_ID)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("unknown");
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request_id,
                )
            }))
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The fully layered router, e.g. for in-process tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until Ctrl+C.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        self.run_until(listener, shutdown_signal()).await
    }

    /// Run the server until `shutdown` completes.
    pub async fn run_until<F>(self, listener: TcpListener, shutdown: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            context_path = %self.config.context.path,
            "HTTP server starting"
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

/// Dispatch every request through the route table.
async fn dispatch_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr)
        .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 0)));

    let (parts, body) = request.into_parts();
    let method = parts.method.to_string();
    let body = match axum::body::to_bytes(body, state.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(error = %e, "Unable to read request body");
            metrics::record_request(&method, 413, "none", start_time);
            return StatusCode::PAYLOAD_TOO_LARGE.into_response();
        }
    };

    let request = HttpRequest::from_parts(&parts, peer, &state.context_path, &body);
    let route = state
        .table
        .matched_route(&request)
        .unwrap_or_else(|| "none".to_string());

    let response = if state.forwarded {
        respond(&state, &ForwardedRequestView::new(request))
    } else {
        respond(&state, &request)
    };
    metrics::record_request(&method, response.status().as_u16(), &route, start_time);
    response
}

fn respond(state: &AppState, request: &dyn RequestInfo) -> Response {
    tracing::debug!(
        method = %request.method(),
        path = %request.path(),
        host = %request.host(),
        remote_addr = %request.remote_addr(),
        "Dispatching request"
    );

    let outcome = state.table.dispatch(request, &state.binder);
    render(outcome, &LinkBuilder::for_request(request))
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(e) => {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    }
}
