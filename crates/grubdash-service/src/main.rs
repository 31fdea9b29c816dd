//! Main entry point for the GrubDash ordering service.
//!
//! This binary serves the dish and order HTTP API backed by in-memory
//! stores, optionally seeded from JSON files named in the configuration.

use clap::Parser;
use grubdash_config::Config;
use grubdash_core::GrubDashBuilder;
use std::path::PathBuf;

mod apis;
mod server;

/// Command-line arguments for the GrubDash service.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, env = "GRUBDASH_CONFIG", default_value = "config/grubdash.toml")]
	config: PathBuf,

	/// Port to listen on, overriding the configuration file
	#[arg(short, long, env = "GRUBDASH_PORT")]
	port: Option<u16>,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,
}

/// Loads the configuration file and applies command-line overrides.
async fn load_config(args: &Args) -> Result<Config, Box<dyn std::error::Error>> {
	let mut config = Config::from_file(&args.config).await?;
	if let Some(port) = args.port {
		config.api.port = port;
	}
	Ok(config)
}

/// Main entry point for the GrubDash service.
///
/// This function:
/// 1. Parses command-line arguments
/// 2. Initializes logging infrastructure
/// 3. Loads configuration
/// 4. Builds the dish and order services, loading seed data
/// 5. Serves the HTTP API until interrupted
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	use tracing_subscriber::{fmt, EnvFilter};

	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

	fmt()
		.with_env_filter(env_filter)
		.with_thread_ids(true)
		.with_target(true)
		.init();

	let config = load_config(&args).await?;
	tracing::info!("Loaded configuration [{}]", config.bind_address());

	let grubdash = GrubDashBuilder::new(config.clone()).build().await?;

	tokio::select! {
		result = server::start_server(config.api.clone(), grubdash) => {
			tracing::info!("API server finished");
			result?;
		}
		_ = tokio::signal::ctrl_c() => {
			tracing::info!("Received shutdown signal");
		}
	}

	tracing::info!("Stopped GrubDash");
	Ok(())
}
