//! Main application structure and lifecycle management

use crate::api::ApiServer;
use anyhow::{Context, Result};
use config::Config;
use simulator::{ChainRegistry, Simulator};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Shared state handed to every request handler
#[derive(Debug)]
pub struct AppState {
    pub config: Config,
    pub simulator: Simulator,
}

impl AppState {
    /// State backed by HTTP node connections for every configured chain
    pub fn new(config: Config) -> Self {
        let registry = ChainRegistry::new(config.chain_profiles());
        Self {
            simulator: Simulator::with_http(registry),
            config,
        }
    }

    /// Deadline applied around each node-facing operation
    pub fn simulation_timeout(&self) -> Duration {
        Duration::from_secs(self.config.simulation.timeout_seconds)
    }

    /// Chain used when a request does not name one
    pub fn default_chain_id(&self) -> &str {
        &self.config.simulation.default_chain_id
    }
}

/// Main application that coordinates all components
pub struct Application {
    state: Arc<AppState>,
    api_server: ApiServer,
}

impl Application {
    /// Create a new application instance
    pub fn new(config: Config) -> Result<Self> {
        info!("Initializing application components...");

        let state = Arc::new(AppState::new(config));
        info!(
            chains = ?state.simulator.registry().supported_chain_ids(),
            "Chain registry loaded"
        );

        let api_server = ApiServer::new(state.clone()).context("Failed to create API server")?;

        info!("Application components initialized successfully");

        Ok(Self { state, api_server })
    }

    /// Run the application until the API server stops
    pub async fn run(&self) -> Result<()> {
        info!(
            "Starting API server on {}:{}",
            self.state.config.server.host, self.state.config.server.port
        );

        self.api_server.run().await.context("API server error")
    }

    /// Ask the API server to stop; `run` returns once in-flight requests finish
    pub async fn shutdown(&self) {
        info!(
            open_connections = self.state.simulator.connections().open_connections().await,
            "Shutting down application..."
        );
        self.api_server.shutdown();
    }
}
