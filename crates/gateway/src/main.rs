//! Call Simulator - Main Application Entry Point

use anyhow::{Context, Result};
use clap::Parser;
use config::{Config, ConfigLoader, LoggingConfig};
use std::env;
use std::path::Path;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod app;

use app::Application;

#[derive(Parser, Debug)]
#[command(author, version, about = "Transaction dry-run simulation and revert diagnosis")]
struct Cli {
    /// Path to the YAML configuration file; skipped when it does not exist
    #[arg(long, env = "CONFIG_PATH", default_value = "config.yaml")]
    config: String,

    /// Print the default configuration as YAML and exit
    #[arg(long, default_value_t = false)]
    print_default_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists, before clap reads CONFIG_PATH
    let dotenv_result = dotenv::dotenv();

    let cli = Cli::parse();

    if cli.print_default_config {
        print!("{}", ConfigLoader::example_yaml()?);
        return Ok(());
    }

    let config = load_config(&cli.config)?;

    init_logging(&config.logging)?;

    match dotenv_result {
        Ok(path) => info!("Loaded environment variables from {}", path.display()),
        // Only warn if the error is not "file not found"
        Err(e) if !e.to_string().contains("No such file or directory") => {
            warn!("Could not load .env file: {}", e)
        }
        Err(_) => {}
    }

    info!("Starting Call Simulator v{}", env!("CARGO_PKG_VERSION"));
    log_chain_summary(&config);

    // Create and start the application
    let app = Application::new(config).context("Failed to create application")?;

    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Shutdown signal received");
    };

    let run = app.run();
    tokio::pin!(run);

    tokio::select! {
        result = &mut run => {
            if let Err(e) = result {
                error!("Application error: {}", e);
                return Err(e);
            }
        }
        _ = shutdown_signal => {
            info!("Initiating graceful shutdown...");
            app.shutdown().await;
            run.await.context("API server failed while draining")?;
        }
    }

    info!("Call Simulator shutdown complete");
    Ok(())
}

/// Load configuration from the file when present, otherwise from defaults and environment
fn load_config(path: &str) -> Result<Config> {
    if Path::new(path).exists() {
        ConfigLoader::load(path).with_context(|| format!("Failed to load configuration from {}", path))
    } else {
        ConfigLoader::from_env().context("Failed to load configuration")
    }
}

fn log_chain_summary(config: &Config) {
    for chain in &config.chains {
        info!(
            chain_id = %chain.chain_id,
            name = %chain.name,
            endpoint = %types::utils::redact_url(&chain.resolved_rpc_url()),
            overridden = chain.is_overridden(),
            "Chain configured"
        );
    }

    if env::var("ETHEREUM_RPC_URL").is_err() {
        warn!("ETHEREUM_RPC_URL not set, using default public RPC endpoints");
    }
}

/// Initialize logging from configuration; `RUST_LOG` and `LOG_FORMAT` take precedence
fn init_logging(logging: &LoggingConfig) -> Result<()> {
    let log_level = env::var("RUST_LOG").unwrap_or_else(|_| logging.level.clone());
    let log_format = env::var("LOG_FORMAT").unwrap_or_else(|_| logging.format.clone());

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));

    let registry = tracing_subscriber::registry().with(env_filter);

    match log_format.as_str() {
        "pretty" => {
            registry
                .with(tracing_subscriber::fmt::layer().pretty())
                .try_init()
                .context("Failed to initialize pretty logging")?;
        }
        _ => {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .try_init()
                .context("Failed to initialize JSON logging")?;
        }
    }

    info!("Logging initialized");
    info!("Log level: {}", log_level);
    info!("Log format: {}", log_format);

    if log_level == "trace" || log_level == "debug" {
        warn!("Debug/trace logging enabled - may impact performance in production");
    }

    Ok(())
}
