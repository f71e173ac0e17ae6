//! Configuration types for the route engine service.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Complete service configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RouterServiceConfig {
	/// Candidate route search settings
	pub router: RouterConfig,
	/// Pool admission settings used while building the index
	pub pools: PoolsConfig,
	/// Background task executor
	pub executor: ExecutorConfig,
	/// Logging and health checks
	pub monitoring: MonitoringConfig,
}

/// Candidate route search configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RouterConfig {
	/// Maximum number of pools in one route
	pub max_pools_per_route: usize,
	/// Maximum number of routes to return
	pub max_routes: usize,
	/// Minimum liquidity cap for a pool to be used as a hop, in the
	/// pricing quote denom
	pub min_pool_liquidity_cap: u64,
	/// Per-search deadline in milliseconds
	pub search_timeout_ms: u64,
	/// Liquidity-dependent overrides of `min_pool_liquidity_cap`, strictly
	/// descending by `min_tokens_capitalization`
	pub dynamic_min_liquidity_cap_filters_desc: Vec<DynamicMinLiquidityCapFilterEntry>,
	/// Reuse candidate routes per pair until the next index publish
	pub route_cache_enabled: bool,
}

impl Default for RouterConfig {
	fn default() -> Self {
		Self {
			max_pools_per_route: 4,
			max_routes: 20,
			min_pool_liquidity_cap: 0,
			search_timeout_ms: 250,
			dynamic_min_liquidity_cap_filters_desc: Vec::new(),
			route_cache_enabled: true,
		}
	}
}

impl RouterConfig {
	/// Maps the smaller of the two denoms' total liquidity to a min pool
	/// liquidity cap filter.
	pub fn min_liquidity_cap_filter(&self, min_tokens_capitalization: u64) -> u64 {
		self.dynamic_min_liquidity_cap_filters_desc
			.iter()
			.find(|entry| min_tokens_capitalization >= entry.min_tokens_capitalization)
			.map(|entry| entry.filter_value)
			.unwrap_or(self.min_pool_liquidity_cap)
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DynamicMinLiquidityCapFilterEntry {
	pub min_tokens_capitalization: u64,
	pub filter_value: u64,
}

/// CosmWasm code IDs admitted into the index
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct PoolsConfig {
	pub transmuter_code_ids: Vec<u64>,
	pub alloyed_transmuter_code_ids: Vec<u64>,
	pub orderbook_code_ids: Vec<u64>,
	/// These make network requests for quotes downstream.
	pub general_cosmwasm_code_ids: Vec<u64>,
}

impl PoolsConfig {
	pub fn allowed_cosmwasm_code_ids(&self) -> HashSet<u64> {
		self.transmuter_code_ids
			.iter()
			.chain(&self.alloyed_transmuter_code_ids)
			.chain(&self.orderbook_code_ids)
			.chain(&self.general_cosmwasm_code_ids)
			.copied()
			.collect()
	}
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ExecutorConfig {
	/// Upper bound on concurrently running background tasks
	pub max_concurrent_tasks: usize,
}

impl Default for ExecutorConfig {
	fn default() -> Self {
		Self {
			max_concurrent_tasks: 4,
		}
	}
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MonitoringConfig {
	pub log_level: String,
	pub json_logs: bool,
	pub health_check_interval_secs: u64,
	/// The index is reported stale if nothing was applied for this long
	pub max_index_age_secs: u64,
}

impl Default for MonitoringConfig {
	fn default() -> Self {
		Self {
			log_level: "info".to_string(),
			json_logs: false,
			health_check_interval_secs: 10,
			max_index_age_secs: 60,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn filters() -> RouterConfig {
		RouterConfig {
			min_pool_liquidity_cap: 10,
			dynamic_min_liquidity_cap_filters_desc: vec![
				DynamicMinLiquidityCapFilterEntry {
					min_tokens_capitalization: 1_000_000,
					filter_value: 75_000,
				},
				DynamicMinLiquidityCapFilterEntry {
					min_tokens_capitalization: 250_000,
					filter_value: 15_000,
				},
			],
			..Default::default()
		}
	}

	#[test]
	fn test_default_config() {
		let config = RouterServiceConfig::default();
		assert_eq!(config.router.max_routes, 20);
		assert_eq!(config.router.max_pools_per_route, 4);
		assert!(config.router.route_cache_enabled);
		assert_eq!(config.executor.max_concurrent_tasks, 4);
		assert_eq!(config.monitoring.log_level, "info");
	}

	#[test]
	fn test_min_liquidity_cap_filter() {
		let config = filters();

		// At and above the top threshold.
		assert_eq!(config.min_liquidity_cap_filter(1_000_000), 75_000);
		assert_eq!(config.min_liquidity_cap_filter(1_000_001), 75_000);

		// Between thresholds.
		assert_eq!(config.min_liquidity_cap_filter(999_999), 15_000);
		assert_eq!(config.min_liquidity_cap_filter(250_000), 15_000);

		// Below all thresholds falls back to the static cap.
		assert_eq!(config.min_liquidity_cap_filter(249_999), 10);
	}

	#[test]
	fn test_min_liquidity_cap_filter_without_entries() {
		let config = RouterConfig {
			min_pool_liquidity_cap: 3,
			..Default::default()
		};
		assert_eq!(config.min_liquidity_cap_filter(u64::MAX), 3);
	}

	#[test]
	fn test_allowed_code_ids() {
		let pools = PoolsConfig {
			transmuter_code_ids: vec![1],
			alloyed_transmuter_code_ids: vec![2],
			orderbook_code_ids: vec![3],
			general_cosmwasm_code_ids: vec![4, 1],
		};
		let allowed = pools.allowed_cosmwasm_code_ids();
		assert_eq!(allowed.len(), 4);
		assert!(allowed.contains(&3));
		assert!(!allowed.contains(&5));
	}
}
