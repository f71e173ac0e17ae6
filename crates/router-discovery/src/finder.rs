//! Bounded breadth-first candidate route search.

use crate::cache::{CandidateRouteCache, RouteCacheKey};
use crate::validator::validate_routes;
use router_liquidity::{DenomLiquidityIndex, PublishedIndex};
use router_types::{
	CandidatePoolWrapper, CandidateRoute, CandidateRouteSearchOptions, CandidateRoutes, Coin,
	PoolInfo, Result, RouterError,
};
use rust_decimal::Decimal;
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Finds candidate routes for one swap.
pub trait CandidateRouteFinder: Send + Sync {
	fn find_candidate_routes(
		&self,
		token_in: &Coin,
		token_out_denom: &str,
		options: &CandidateRouteSearchOptions,
	) -> Result<CandidateRoutes>;
}

/// Searches whatever index version is published when the call starts,
/// answering from the route cache when one is attached.
#[derive(Debug, Clone)]
pub struct IndexRouteFinder {
	index: Arc<PublishedIndex>,
	cache: Option<Arc<CandidateRouteCache>>,
}

impl IndexRouteFinder {
	pub fn new(index: Arc<PublishedIndex>) -> Self {
		Self { index, cache: None }
	}

	pub fn with_cache(mut self, cache: Arc<CandidateRouteCache>) -> Self {
		self.cache = Some(cache);
		self
	}

	pub fn cache(&self) -> Option<&Arc<CandidateRouteCache>> {
		self.cache.as_ref()
	}

	/// Cached routes for this search on the current index version, without
	/// searching. `None` on a miss or if the search bypasses the cache.
	pub fn cached_candidate_routes(
		&self,
		token_in: &Coin,
		token_out_denom: &str,
		options: &CandidateRouteSearchOptions,
	) -> Option<CandidateRoutes> {
		let cache = self.cache.as_ref()?;
		let key = RouteCacheKey::for_search(self.index.height(), token_in, token_out_denom, options)?;
		cache.get(&key)
	}
}

impl CandidateRouteFinder for IndexRouteFinder {
	fn find_candidate_routes(
		&self,
		token_in: &Coin,
		token_out_denom: &str,
		options: &CandidateRouteSearchOptions,
	) -> Result<CandidateRoutes> {
		// One load per call: the whole search runs against this version.
		let snapshot = self.index.load();

		let cached = self.cache.as_ref().and_then(|cache| {
			RouteCacheKey::for_search(snapshot.height, token_in, token_out_denom, options)
				.map(|key| (cache, key))
		});

		if let Some((cache, key)) = &cached {
			if let Some(routes) = cache.get(key) {
				debug!(
					"Candidate route cache hit for {} -> {} at height {}",
					token_in.denom, token_out_denom, snapshot.height
				);
				return Ok(routes);
			}
		}

		let routes = find_candidate_routes(&snapshot.index, token_in, token_out_denom, options)?;
		if let Some((cache, key)) = cached {
			cache.insert(key, routes.clone());
		}
		Ok(routes)
	}
}

/// Finds up to `options.max_routes` validated routes from `token_in` to
/// `token_out_denom`.
///
/// The canonical orderbook for the pair, if any, is emitted first. The rest
/// comes from a breadth-first search that expands each path through the pools
/// of its current denom in liquidity order. Pools used by a path are marked
/// visited only once that path has been fully expanded, so sibling paths at
/// the same depth may still go through them.
///
/// Fails with [`RouterError::DataNotFound`] if `token_in` was never observed,
/// and with [`RouterError::Timeout`] carrying the routes found so far if the
/// deadline passes. A denom with no pools yields an empty result.
pub fn find_candidate_routes(
	index: &DenomLiquidityIndex,
	token_in: &Coin,
	token_out_denom: &str,
	options: &CandidateRouteSearchOptions,
) -> Result<CandidateRoutes> {
	search(index, token_in, token_out_denom, options, Instant::now)
}

/// [`find_candidate_routes`] reading time from `now`.
fn search<C>(
	index: &DenomLiquidityIndex,
	token_in: &Coin,
	token_out_denom: &str,
	options: &CandidateRouteSearchOptions,
	mut now: C,
) -> Result<CandidateRoutes>
where
	C: FnMut() -> Instant,
{
	let started = now();
	let token_in_denom = token_in.denom.as_str();

	let Some(token_in_data) = index.get(token_in_denom) else {
		return Err(RouterError::data_not_found(token_in_denom));
	};

	if options.max_routes == 0 {
		return Ok(CandidateRoutes::default());
	}

	let min_liquidity_cap = Decimal::from(options.min_pool_liquidity_cap);
	let mut routes: Vec<CandidateRoute> = Vec::with_capacity(options.max_routes);
	let mut visited: HashSet<u64> = HashSet::new();

	if let Some(pool) = token_in_data.canonical(token_out_denom) {
		if options.should_skip_pool(pool) {
			debug!("Skipping filtered canonical orderbook {}", pool.id);
		} else {
			visited.insert(pool.id);
			routes.push(CandidateRoute::canonical(CandidatePoolWrapper::from_pool(
				pool.as_ref(),
				token_out_denom,
			)));
		}
	}

	let mut queue: VecDeque<Vec<CandidatePoolWrapper>> = VecDeque::new();
	queue.push_back(Vec::new());

	while routes.len() < options.max_routes {
		let checked_at = now();
		if options.is_expired(checked_at) {
			let elapsed = checked_at.saturating_duration_since(started);
			let elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
			let partial = validate_routes(
				routes,
				token_in_denom,
				token_out_denom,
				options.max_pools_per_route,
			);
			return Err(RouterError::Timeout {
				elapsed_ms,
				partial,
			});
		}

		let Some(path) = queue.pop_front() else {
			break;
		};

		let current_denom = path
			.last()
			.map_or(token_in_denom, CandidatePoolWrapper::token_out_denom);
		let last_pool_id = path.last().map(CandidatePoolWrapper::id);

		let Some(data) = index.get(current_denom) else {
			debug!("No pools found for denom {} in candidate route search", current_denom);
			mark_visited(&mut visited, &path);
			continue;
		};

		for pool in &data.sorted_pools {
			if routes.len() >= options.max_routes {
				break;
			}

			if visited.contains(&pool.id) || options.should_skip_pool(pool) {
				continue;
			}

			if pool.liquidity_cap < min_liquidity_cap {
				visited.insert(pool.id);
				continue;
			}

			if !path.is_empty() && pool.has_denom(token_in_denom) {
				continue;
			}

			// Alloyed LP shares are minted by the contract, not held as balance.
			if path.is_empty() && pool.balance_of(token_in_denom) < token_in.amount && !pool.is_alloyed() {
				visited.insert(pool.id);
				continue;
			}

			if last_pool_id == Some(pool.id) {
				continue;
			}

			let pool_denoms = pool.pool_denoms();
			for (i, denom) in pool_denoms.iter().enumerate() {
				// A denom listed twice by the pool is one edge.
				if denom.as_str() == current_denom || pool_denoms[..i].contains(denom) {
					continue;
				}

				let completes = denom.as_str() == token_out_denom;
				if !completes && !index.contains(denom) {
					debug!("No pools found for denom {} in candidate route search", denom);
					continue;
				}

				if path.len() + 1 > options.max_pools_per_route {
					continue;
				}

				let mut next = Vec::with_capacity(path.len() + 1);
				next.extend_from_slice(&path);
				next.push(CandidatePoolWrapper::from_pool(pool.as_ref(), denom.as_str()));

				if completes {
					if routes.len() < options.max_routes {
						routes.push(CandidateRoute::new(next));
					}
				} else {
					queue.push_back(next);
				}
			}
		}

		mark_visited(&mut visited, &path);
	}

	let routes = validate_routes(
		routes,
		token_in_denom,
		token_out_denom,
		options.max_pools_per_route,
	);
	debug!(
		"Found {} candidate routes from {} to {} in {:?}",
		routes.len(),
		token_in_denom,
		token_out_denom,
		now().saturating_duration_since(started)
	);

	Ok(routes)
}

fn mark_visited(visited: &mut HashSet<u64>, path: &[CandidatePoolWrapper]) {
	visited.extend(path.iter().map(CandidatePoolWrapper::id));
}
