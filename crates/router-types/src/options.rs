//! Options for a single candidate route search.

use crate::pool::{Pool, PoolInfo};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

/// Predicate deciding whether the search ignores a pool.
#[derive(Clone)]
pub enum PoolFilter {
	/// Skip pools with any of these IDs.
	PoolIds(HashSet<u64>),
	/// Skip every orderbook pool.
	Orderbooks,
	Custom(Arc<dyn Fn(&Pool) -> bool + Send + Sync>),
}

impl PoolFilter {
	pub fn pool_ids(ids: impl IntoIterator<Item = u64>) -> Self {
		Self::PoolIds(ids.into_iter().collect())
	}

	pub fn custom<F>(f: F) -> Self
	where
		F: Fn(&Pool) -> bool + Send + Sync + 'static,
	{
		Self::Custom(Arc::new(f))
	}

	pub fn matches(&self, pool: &Pool) -> bool {
		match self {
			Self::PoolIds(ids) => ids.contains(&pool.id()),
			Self::Orderbooks => pool.is_orderbook(),
			Self::Custom(f) => f(pool),
		}
	}
}

impl fmt::Debug for PoolFilter {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::PoolIds(ids) => f.debug_tuple("PoolIds").field(ids).finish(),
			Self::Orderbooks => write!(f, "Orderbooks"),
			Self::Custom(_) => write!(f, "Custom(..)"),
		}
	}
}

#[derive(Debug, Clone)]
pub struct CandidateRouteSearchOptions {
	pub max_routes: usize,
	pub max_pools_per_route: usize,
	/// Pools with a lower liquidity cap are never used as a hop.
	pub min_pool_liquidity_cap: u64,
	/// A pool is skipped if any filter matches.
	pub pool_filters: Vec<PoolFilter>,
	/// Checked at every dequeue of the search.
	pub deadline: Option<Instant>,
	/// Neither read nor write the candidate route cache.
	pub disable_cache: bool,
}

impl CandidateRouteSearchOptions {
	pub fn new(max_routes: usize, max_pools_per_route: usize, min_pool_liquidity_cap: u64) -> Self {
		Self {
			max_routes,
			max_pools_per_route,
			min_pool_liquidity_cap,
			pool_filters: Vec::new(),
			deadline: None,
			disable_cache: false,
		}
	}

	pub fn with_filter(mut self, filter: PoolFilter) -> Self {
		self.pool_filters.push(filter);
		self
	}

	pub fn with_deadline(mut self, deadline: Instant) -> Self {
		self.deadline = Some(deadline);
		self
	}

	pub fn with_cache_disabled(mut self) -> Self {
		self.disable_cache = true;
		self
	}

	pub fn should_skip_pool(&self, pool: &Pool) -> bool {
		self.pool_filters.iter().any(|filter| filter.matches(pool))
	}

	pub fn is_expired(&self, now: Instant) -> bool {
		self.deadline.is_some_and(|deadline| now >= deadline)
	}
}
