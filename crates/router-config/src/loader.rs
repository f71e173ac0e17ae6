//! Configuration loading from files and environment.

use crate::types::*;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::{debug, info};

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
	/// Load configuration from file
	pub fn from_file<P: AsRef<Path>>(path: P) -> Result<RouterServiceConfig> {
		let path = path.as_ref();
		info!("Loading configuration from {:?}", path);

		let contents = std::fs::read_to_string(path)
			.with_context(|| format!("Failed to read config file: {:?}", path))?;

		let config = match path.extension().and_then(|s| s.to_str()) {
			Some("toml") => Self::from_toml(&contents)?,
			Some("json") => Self::from_json(&contents)?,
			Some("yaml") | Some("yml") => Self::from_yaml(&contents)?,
			_ => anyhow::bail!("Unsupported config format: {:?}", path),
		};

		Self::validate_config(&config)?;
		Ok(config)
	}

	/// Load from TOML string
	pub fn from_toml(contents: &str) -> Result<RouterServiceConfig> {
		toml::from_str(contents).map_err(|e| anyhow::anyhow!("Failed to parse TOML: {}", e))
	}

	/// Load from JSON string
	pub fn from_json(contents: &str) -> Result<RouterServiceConfig> {
		serde_json::from_str(contents).context("Failed to parse JSON")
	}

	/// Load from YAML string
	pub fn from_yaml(contents: &str) -> Result<RouterServiceConfig> {
		serde_yaml::from_str(contents).context("Failed to parse YAML")
	}

	/// Load from environment variables with optional file override
	pub fn from_env_and_file(file_path: Option<&Path>) -> Result<RouterServiceConfig> {
		let mut config = if let Some(path) = file_path {
			Self::from_file(path)?
		} else {
			RouterServiceConfig::default()
		};

		Self::apply_env_overrides(&mut config, std::env::vars())?;

		Self::validate_config(&config)?;
		Ok(config)
	}

	/// Apply `ROUTER_*` overrides from the given variables
	pub fn apply_env_overrides<I>(config: &mut RouterServiceConfig, vars: I) -> Result<()>
	where
		I: IntoIterator<Item = (String, String)>,
	{
		for (key, value) in vars {
			match key.as_str() {
				"ROUTER_MAX_ROUTES" => {
					debug!("Overriding max routes from environment");
					config.router.max_routes = parse_var(&key, &value)?;
				}
				"ROUTER_MAX_POOLS_PER_ROUTE" => {
					debug!("Overriding max pools per route from environment");
					config.router.max_pools_per_route = parse_var(&key, &value)?;
				}
				"ROUTER_MIN_POOL_LIQUIDITY_CAP" => {
					debug!("Overriding min pool liquidity cap from environment");
					config.router.min_pool_liquidity_cap = parse_var(&key, &value)?;
				}
				"ROUTER_SEARCH_TIMEOUT_MS" => {
					debug!("Overriding search timeout from environment");
					config.router.search_timeout_ms = parse_var(&key, &value)?;
				}
				"ROUTER_ROUTE_CACHE_ENABLED" => {
					debug!("Overriding route cache switch from environment");
					config.router.route_cache_enabled = parse_var(&key, &value)?;
				}
				"ROUTER_LOG_LEVEL" => {
					debug!("Overriding log level from environment");
					config.monitoring.log_level = value;
				}
				_ => {}
			}
		}

		Ok(())
	}

	/// Validate configuration
	pub fn validate_config(config: &RouterServiceConfig) -> Result<()> {
		if config.router.max_routes == 0 {
			anyhow::bail!("router.max_routes must be greater than 0");
		}

		if config.router.max_pools_per_route == 0 {
			anyhow::bail!("router.max_pools_per_route must be greater than 0");
		}

		if config.router.search_timeout_ms == 0 {
			anyhow::bail!("router.search_timeout_ms must be greater than 0");
		}

		let filters = &config.router.dynamic_min_liquidity_cap_filters_desc;
		for pair in filters.windows(2) {
			if pair[0].min_tokens_capitalization <= pair[1].min_tokens_capitalization {
				anyhow::bail!(
					"Dynamic min liquidity cap filters must be strictly descending: {} is followed by {}",
					pair[0].min_tokens_capitalization,
					pair[1].min_tokens_capitalization
				);
			}
		}

		if config.executor.max_concurrent_tasks == 0 {
			anyhow::bail!("executor.max_concurrent_tasks must be greater than 0");
		}

		Ok(())
	}
}

fn parse_var<T>(key: &str, value: &str) -> Result<T>
where
	T: std::str::FromStr,
	T::Err: std::error::Error + Send + Sync + 'static,
{
	value
		.parse()
		.with_context(|| format!("Invalid value for {}: {:?}", key, value))
}

/// Load configuration from standard locations
pub fn load_config() -> Result<RouterServiceConfig> {
	// Check for config file in order:
	// 1. Environment variable CONFIG_FILE
	// 2. ./config.toml
	// 3. ./config/router.toml
	// 4. /etc/denom-router/config.toml
	// 5. Default config with env overrides

	if let Ok(path) = std::env::var("CONFIG_FILE") {
		return ConfigLoader::from_env_and_file(Some(Path::new(&path)));
	}

	let paths = [
		"./config.toml",
		"./config/router.toml",
		"/etc/denom-router/config.toml",
	];

	for path in &paths {
		if Path::new(path).exists() {
			return ConfigLoader::from_env_and_file(Some(Path::new(path)));
		}
	}

	ConfigLoader::from_env_and_file(None)
}
