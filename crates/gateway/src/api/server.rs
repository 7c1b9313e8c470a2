//! HTTP API server implementation

use crate::api::routes;
use crate::app::AppState;
use anyhow::{Context, Result};
use axum::{extract::DefaultBodyLimit, http::Method, Router};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tokio::sync::Notify;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::{info, Level};

/// HTTP API server
pub struct ApiServer {
    app: Router,
    addr: SocketAddr,
    shutdown: Arc<Notify>,
}

impl ApiServer {
    /// Create a new API server
    pub fn new(state: Arc<AppState>) -> Result<Self> {
        let addr: SocketAddr = format!("{}:{}", state.config.server.host, state.config.server.port)
            .parse()
            .context("Invalid server host/port configuration")?;

        let app = build_router(state);

        info!("API server configured for {}", addr);

        Ok(Self {
            app,
            addr,
            shutdown: Arc::new(Notify::new()),
        })
    }

    /// Run the API server until [`ApiServer::shutdown`] is called and in-flight requests drain
    pub async fn run(&self) -> Result<()> {
        let listener = TcpListener::bind(self.addr)
            .await
            .context("Failed to bind to server address")?;

        info!("API server listening on {}", self.addr);

        let shutdown = self.shutdown.clone();
        axum::serve(listener, self.app.clone())
            .with_graceful_shutdown(async move { shutdown.notified().await })
            .await
            .context("API server error")?;

        Ok(())
    }

    /// Stop accepting connections; a call made before `run` still applies
    pub fn shutdown(&self) {
        info!("API server shutdown initiated");
        self.shutdown.notify_one();
    }
}

/// Router with every route and the configured layers
pub fn build_router(state: Arc<AppState>) -> Router {
    let server = &state.config.server;

    // Without the permissive layer browsers fall back to same-origin only
    let cors = if server.cors_enabled {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any)
    } else {
        CorsLayer::new()
    };

    let request_timeout = Duration::from_secs(server.request_timeout_seconds);
    let max_body_size = server.max_body_size;

    routes::create_routes()
        .layer(DefaultBodyLimit::max(max_body_size))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(TimeoutLayer::new(request_timeout))
        .layer(cors)
        .with_state(state)
}
