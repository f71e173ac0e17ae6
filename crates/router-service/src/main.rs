use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use router_config::{load_config, ConfigLoader, RouterServiceConfig};
use router_monitoring::{init_tracing, TracingConfig};
use router_types::Coin;
use std::path::PathBuf;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info};

mod service;
mod snapshot;

use service::{RouteQuery, RouterService};
use snapshot::{BlockSnapshot, SnapshotFeed};

#[derive(Parser)]
#[command(name = "denom-router")]
#[command(about = "Candidate route discovery engine", long_about = None)]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
	#[command(subcommand)]
	command: Commands,

	/// Path to configuration file; standard locations are searched if unset
	#[arg(short, long, value_name = "FILE", env = "CONFIG_FILE")]
	config: Option<PathBuf>,

	/// Log level override (trace, debug, info, warn, error)
	#[arg(long, env = "ROUTER_LOG_LEVEL")]
	log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
	/// Watch a snapshot file and keep the liquidity index current
	Start {
		/// JSON block snapshot, re-read on every poll
		#[arg(long, value_name = "FILE")]
		snapshot: PathBuf,

		#[arg(long, default_value_t = 1000)]
		poll_interval_ms: u64,
	},
	/// Print candidate routes for one swap as JSON
	Route {
		#[arg(long, value_name = "FILE")]
		snapshot: PathBuf,

		#[arg(long)]
		token_in: String,

		#[arg(long)]
		amount: u128,

		#[arg(long)]
		token_out: String,

		#[arg(long)]
		max_routes: Option<usize>,

		#[arg(long)]
		max_pools_per_route: Option<usize>,

		/// Pool ID to leave out of the search; repeatable
		#[arg(long = "exclude-pool", value_name = "ID")]
		excluded_pool_ids: Vec<u64>,

		#[arg(long)]
		skip_orderbooks: bool,

		/// Bypass the candidate route cache
		#[arg(long)]
		no_cache: bool,
	},
	/// Validate the configuration file
	Validate,
}

#[tokio::main]
async fn main() -> Result<()> {
	let cli = Cli::parse();

	let mut config = match &cli.config {
		Some(path) => ConfigLoader::from_env_and_file(Some(path.as_path())),
		None => load_config(),
	}
	.context("Failed to load configuration")?;

	if let Some(level) = &cli.log_level {
		config.monitoring.log_level = level.clone();
	}

	setup_tracing(&config)?;

	match cli.command {
		Commands::Start {
			snapshot,
			poll_interval_ms,
		} => start_service(config, snapshot, poll_interval_ms).await,
		Commands::Route {
			snapshot,
			token_in,
			amount,
			token_out,
			max_routes,
			max_pools_per_route,
			excluded_pool_ids,
			skip_orderbooks,
			no_cache,
		} => {
			let query = RouteQuery {
				token_in: Coin::new(token_in, amount),
				token_out_denom: token_out,
				max_routes,
				max_pools_per_route,
				excluded_pool_ids,
				skip_orderbooks,
				disable_cache: no_cache,
			};
			print_routes(config, snapshot, query).await
		}
		Commands::Validate => validate_config(&config),
	}
}

async fn start_service(config: RouterServiceConfig, snapshot: PathBuf, poll_interval_ms: u64) -> Result<()> {
	info!("Starting denom router");

	let service = RouterService::new(&config).await;
	let poll_interval = Duration::from_millis(poll_interval_ms.max(1));

	service
		.run(SnapshotFeed::new(snapshot), poll_interval, setup_shutdown_signal())
		.await?;

	info!("Denom router stopped");
	Ok(())
}

async fn print_routes(config: RouterServiceConfig, snapshot: PathBuf, query: RouteQuery) -> Result<()> {
	let snapshot = BlockSnapshot::from_file(&snapshot)?;
	let service = RouterService::new(&config).await;

	service
		.engine()
		.on_new_block(snapshot.height, snapshot.pools)
		.await
		.context("Failed to build liquidity index")?;

	let routes = service
		.find_routes(&query)
		.with_context(|| format!("No routes for {} -> {}", query.token_in, query.token_out_denom))?;

	info!(
		"Found {} routes over {} pools at height {}",
		routes.len(),
		routes.unique_pool_ids.len(),
		snapshot.height
	);
	println!("{}", serde_json::to_string_pretty(&routes)?);
	Ok(())
}

fn validate_config(config: &RouterServiceConfig) -> Result<()> {
	ConfigLoader::validate_config(config)?;

	info!("Configuration is valid");
	info!("Max routes: {}", config.router.max_routes);
	info!("Max pools per route: {}", config.router.max_pools_per_route);
	info!("Min pool liquidity cap: {}", config.router.min_pool_liquidity_cap);
	info!("Search timeout: {}ms", config.router.search_timeout_ms);
	info!("Route cache enabled: {}", config.router.route_cache_enabled);
	info!(
		"Allowed CosmWasm code IDs: {:?}",
		config.pools.allowed_cosmwasm_code_ids()
	);

	Ok(())
}

fn setup_tracing(config: &RouterServiceConfig) -> Result<()> {
	let tracing_config = TracingConfig::new()
		.with_level(config.monitoring.log_level.clone())
		.with_json_format(config.monitoring.json_logs);

	init_tracing(tracing_config).map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))
}

async fn setup_shutdown_signal() {
	let ctrl_c = async {
		if let Err(e) = signal::ctrl_c().await {
			error!("Failed to listen for Ctrl+C: {}", e);
			std::future::pending::<()>().await;
		}
	};

	#[cfg(unix)]
	let terminate = async {
		match signal::unix::signal(signal::unix::SignalKind::terminate()) {
			Ok(mut stream) => {
				stream.recv().await;
			}
			Err(e) => {
				error!("Failed to install SIGTERM handler: {}", e);
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

	info!("Shutdown signal received");
}
