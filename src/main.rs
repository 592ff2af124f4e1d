//! Location-aware HTTP redirector.
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌──────────────────────────────────────────────────┐
//!                        │                  GEO REDIRECTOR                  │
//!                        │                                                  │
//!   Client Request       │  ┌─────────┐    ┌──────────┐    ┌────────────┐   │
//!   ─────────────────────┼─▶│  http   │───▶│   geo    │───▶│  routing   │   │
//!                        │  │ server  │    │ resolver │    │  matcher   │   │
//!                        │  └─────────┘    └────┬─────┘    └─────┬──────┘   │
//!                        │                      │                │          │
//!                        │                      ▼                ▼          │
//!   302 / 404 / 500      │               ┌────────────┐   ┌────────────┐    │
//!   ◀────────────────────┼───────────────│ dispatcher │◀──│ rule table │    │
//!                        │               └────────────┘   └────────────┘    │
//!                        └──────────────────────┼───────────────────────────┘
//!                                               ▼
//!                                    Geolocation provider
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;

use geo_redirector::config::validation::validate_config;
use geo_redirector::config::{load_config, ConfigError, RedirectorConfig};
use geo_redirector::lifecycle::{self, signals, Shutdown};
use geo_redirector::observability::logging;

const DEFAULT_CONFIG_PATH: &str = "redirector.toml";

#[derive(Parser)]
#[command(name = "geo-redirector")]
#[command(version, about = "Redirects requests to region-specific backends", long_about = None)]
struct Cli {
    /// Service configuration (TOML). Defaults apply when omitted and
    /// `redirector.toml` does not exist.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Rule table (JSON), overrides `rules.path`.
    #[arg(short, long)]
    rules: Option<String>,

    /// Bind address, overrides `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,

    /// Load and validate configuration and rules, then exit.
    #[arg(long)]
    check: bool,
}

fn resolve_config(cli: &Cli) -> Result<RedirectorConfig, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => load_config(Path::new(DEFAULT_CONFIG_PATH))?,
        None => RedirectorConfig::default(),
    };

    if let Some(rules) = &cli.rules {
        config.rules.path = rules.clone();
    }
    if let Some(bind) = &cli.bind {
        config.listener.bind_address = bind.clone();
    }

    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match resolve_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    logging::init_logging(&config.observability.log_level);

    tracing::info!("geo-redirector v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        rules = %config.rules.path,
        provider = %config.geolocation.provider_url,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if cli.check {
        return match lifecycle::load_router(&config) {
            Ok(router) => {
                tracing::info!(
                    rules = router.rule_set().len(),
                    paths = router.path_count(),
                    "Configuration OK"
                );
                ExitCode::SUCCESS
            }
            Err(e) => {
                tracing::error!(error = %e, "Configuration check failed");
                ExitCode::FAILURE
            }
        };
    }

    let shutdown = Arc::new(Shutdown::new());
    signals::spawn_signal_handler(shutdown.clone());

    match lifecycle::serve(config, shutdown).await {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Fatal error");
            ExitCode::FAILURE
        }
    }
}
