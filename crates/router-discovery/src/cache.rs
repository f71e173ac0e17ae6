//! Candidate routes reused between searches on the same index version.

use dashmap::DashMap;
use router_types::{CandidateRouteSearchOptions, CandidateRoutes, Coin};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// What a cached result depends on. Amounts of the same decimal order of
/// magnitude share an entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteCacheKey {
	pub height: u64,
	pub token_in_denom: String,
	pub token_out_denom: String,
	pub amount_magnitude: u32,
	pub max_routes: usize,
	pub max_pools_per_route: usize,
	pub min_pool_liquidity_cap: u64,
}

impl RouteCacheKey {
	/// Key for a search against the index published at `height`, or `None`
	/// if the search must bypass the cache: it disabled caching or it carries
	/// pool filters.
	pub fn for_search(
		height: u64,
		token_in: &Coin,
		token_out_denom: &str,
		options: &CandidateRouteSearchOptions,
	) -> Option<Self> {
		if options.disable_cache || !options.pool_filters.is_empty() {
			return None;
		}

		Some(Self {
			height,
			token_in_denom: token_in.denom.clone(),
			token_out_denom: token_out_denom.to_string(),
			amount_magnitude: token_in.amount.checked_ilog10().unwrap_or(0),
			max_routes: options.max_routes,
			max_pools_per_route: options.max_pools_per_route,
			min_pool_liquidity_cap: options.min_pool_liquidity_cap,
		})
	}
}

/// Non-empty search results for the newest index height seen. Entries for
/// older heights are dropped the first time a newer height is looked up or
/// stored.
#[derive(Debug, Default)]
pub struct CandidateRouteCache {
	height: AtomicU64,
	entries: DashMap<RouteCacheKey, CandidateRoutes>,
}

impl CandidateRouteCache {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn get(&self, key: &RouteCacheKey) -> Option<CandidateRoutes> {
		self.advance_to(key.height);
		self.entries.get(key).map(|entry| entry.value().clone())
	}

	/// Stores `routes` unless empty or computed against an index older than
	/// the newest height seen.
	pub fn insert(&self, key: RouteCacheKey, routes: CandidateRoutes) {
		if routes.is_empty() {
			return;
		}

		self.advance_to(key.height);
		if key.height < self.height() {
			return;
		}
		self.entries.insert(key, routes);
	}

	/// Newest index height seen.
	pub fn height(&self) -> u64 {
		self.height.load(Ordering::Acquire)
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn clear(&self) {
		self.entries.clear();
	}

	fn advance_to(&self, height: u64) {
		let previous = self.height.fetch_max(height, Ordering::AcqRel);
		if previous < height {
			let before = self.entries.len();
			self.entries.retain(|key, _| key.height >= height);
			debug!(
				"Dropped {} cached candidate routes from before height {}",
				before.saturating_sub(self.entries.len()),
				height
			);
		}
	}
}
