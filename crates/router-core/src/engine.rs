//! Route engine facade.

use crate::coordinator::IndexRefreshCoordinator;
use crate::executor::TaskExecutor;
use crate::health::IndexFreshnessCheck;
use router_config::{RouterConfig, RouterServiceConfig};
use router_discovery::{CandidateRouteCache, CandidateRouteFinder, IndexRouteFinder};
use router_liquidity::PublishedIndex;
use router_types::{CandidateRouteSearchOptions, CandidateRoutes, Coin, Pool, Result, RouterError};
use rust_decimal::prelude::ToPrimitive;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Entry point for the two exposed operations: route search and block
/// notification.
pub struct RouterEngine {
	config: RouterConfig,
	finder: IndexRouteFinder,
	coordinator: Arc<IndexRefreshCoordinator>,
}

impl RouterEngine {
	pub fn new(config: &RouterServiceConfig) -> Self {
		let published = Arc::new(PublishedIndex::new());
		let executor = TaskExecutor::new(config.executor.max_concurrent_tasks);
		let coordinator = Arc::new(IndexRefreshCoordinator::new(
			published.clone(),
			config.pools.clone(),
			executor,
		));

		let mut finder = IndexRouteFinder::new(published);
		if config.router.route_cache_enabled {
			finder = finder.with_cache(Arc::new(CandidateRouteCache::new()));
		}

		Self {
			config: config.router.clone(),
			finder,
			coordinator,
		}
	}

	pub fn coordinator(&self) -> &Arc<IndexRefreshCoordinator> {
		&self.coordinator
	}

	pub fn published_index(&self) -> &Arc<PublishedIndex> {
		self.coordinator.published()
	}

	/// Options from configuration, with the deadline starting now.
	pub fn default_search_options(&self) -> CandidateRouteSearchOptions {
		CandidateRouteSearchOptions::new(
			self.config.max_routes,
			self.config.max_pools_per_route,
			self.config.min_pool_liquidity_cap,
		)
		.with_deadline(Instant::now() + Duration::from_millis(self.config.search_timeout_ms))
	}

	/// Min pool liquidity cap for a pair, from the smaller of the two denoms'
	/// total liquidity. Falls back to the static cap if either denom is
	/// unknown.
	pub fn min_liquidity_cap_filter(&self, token_in_denom: &str, token_out_denom: &str) -> u64 {
		let snapshot = self.published_index().load();
		let totals = (
			snapshot.index.total_liquidity(token_in_denom),
			snapshot.index.total_liquidity(token_out_denom),
		);

		match totals {
			(Some(token_in), Some(token_out)) => {
				let min_tokens_cap = token_in.min(token_out).trunc().to_u64().unwrap_or(u64::MAX);
				self.config.min_liquidity_cap_filter(min_tokens_cap)
			}
			_ => self.config.min_pool_liquidity_cap,
		}
	}

	/// Default options with the pair's dynamic min liquidity cap applied.
	pub fn search_options_for(&self, token_in_denom: &str, token_out_denom: &str) -> CandidateRouteSearchOptions {
		let mut options = self.default_search_options();
		options.min_pool_liquidity_cap = self.min_liquidity_cap_filter(token_in_denom, token_out_denom);
		options
	}

	pub fn find_candidate_routes(
		&self,
		token_in: &Coin,
		token_out_denom: &str,
		options: &CandidateRouteSearchOptions,
	) -> Result<CandidateRoutes> {
		self.finder.find_candidate_routes(token_in, token_out_denom, options)
	}

	/// Routes cached for this search on the current index version, if any.
	/// Fails if the route cache is disabled by configuration.
	pub fn cached_candidate_routes(
		&self,
		token_in: &Coin,
		token_out_denom: &str,
		options: &CandidateRouteSearchOptions,
	) -> Result<Option<CandidateRoutes>> {
		if self.finder.cache().is_none() {
			return Err(RouterError::Config("route cache is disabled".to_string()));
		}
		Ok(self.finder.cached_candidate_routes(token_in, token_out_denom, options))
	}

	pub async fn on_new_block(&self, height: u64, pools: Vec<Pool>) -> Result<()> {
		self.coordinator.on_new_block(height, pools).await
	}

	pub fn freshness_check(&self, max_age: Duration) -> IndexFreshnessCheck {
		IndexFreshnessCheck::new(self.coordinator.clone(), max_age)
	}
}
