//! Denom liquidity index build.

use router_config::PoolsConfig;
use router_types::{Pool, PoolInfo};
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Errors that reject a whole snapshot.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
	#[error("Duplicate pool ID in snapshot: {0}")]
	DuplicatePool(u64),
}

/// Liquidity data for one denom.
#[derive(Debug, Clone, Default)]
pub struct DenomData {
	/// Pools containing the denom, descending by liquidity cap, ties by
	/// ascending pool ID.
	pub sorted_pools: Vec<Arc<Pool>>,
	/// Canonical orderbook per counter-denom.
	pub canonical_shortcuts: HashMap<String, Arc<Pool>>,
	/// Sum of the non-negative liquidity caps of the indexed pools.
	pub total_liquidity_cap: Decimal,
}

impl DenomData {
	pub fn canonical(&self, counter_denom: &str) -> Option<&Arc<Pool>> {
		self.canonical_shortcuts.get(counter_denom)
	}

	pub fn is_empty(&self) -> bool {
		self.sorted_pools.is_empty()
	}
}

/// Why a pool was left out of the index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
	TooFewDenoms(usize),
	CodeIdNotAllowed(u64),
	OrderbookDenomMismatch,
}

impl fmt::Display for SkipReason {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::TooFewDenoms(n) => write!(f, "pool has {} distinct denoms, need at least 2", n),
			Self::CodeIdNotAllowed(code_id) => write!(f, "code ID {} is not allowed", code_id),
			Self::OrderbookDenomMismatch => {
				write!(f, "orderbook base/quote denoms are not pool denoms")
			}
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedPool {
	pub pool_id: u64,
	pub reason: SkipReason,
}

/// Summary of one build, logged by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
	pub indexed_pools: usize,
	pub denoms: usize,
	pub skipped: Vec<SkippedPool>,
}

/// Mapping from denom to [`DenomData`] for every denom observed in a pool
/// snapshot. Never mutated after [`DenomLiquidityIndex::build`] returns.
#[derive(Debug, Clone, Default)]
pub struct DenomLiquidityIndex {
	denoms: HashMap<String, DenomData>,
	pools: HashMap<u64, Arc<Pool>>,
}

impl DenomLiquidityIndex {
	/// Builds the index from a full pool snapshot.
	///
	/// Malformed pools are skipped and reported, but their denoms still get
	/// an (empty) entry. A snapshot repeating a pool ID is rejected.
	pub fn build<I>(pools: I, config: &PoolsConfig) -> Result<(Self, BuildReport), BuildError>
	where
		I: IntoIterator<Item = Pool>,
	{
		let allowed_code_ids = config.allowed_cosmwasm_code_ids();
		let mut seen_ids = HashSet::new();
		let mut denoms: HashMap<String, DenomData> = HashMap::new();
		let mut canonical: HashMap<(String, String), Arc<Pool>> = HashMap::new();
		let mut indexed: HashMap<u64, Arc<Pool>> = HashMap::new();
		let mut report = BuildReport::default();

		for pool in pools {
			if !seen_ids.insert(pool.id) {
				return Err(BuildError::DuplicatePool(pool.id));
			}

			let pool_denoms = distinct_denoms(&pool.denoms);
			for denom in &pool_denoms {
				denoms.entry(denom.clone()).or_default();
			}

			if let Some(reason) = check_pool(&pool, pool_denoms.len(), &allowed_code_ids) {
				debug!("Pool {} left out of the liquidity index: {}", pool.id, reason);
				report.skipped.push(SkippedPool {
					pool_id: pool.id,
					reason,
				});
				continue;
			}

			let pool = Arc::new(pool);
			let liquidity = pool.liquidity_cap.max(Decimal::ZERO);
			for denom in pool_denoms {
				let data = denoms.entry(denom).or_default();
				data.sorted_pools.push(Arc::clone(&pool));
				data.total_liquidity_cap += liquidity;
			}

			if let Some(orderbook) = pool.orderbook_data() {
				let key = pair_key(&orderbook.base_denom, &orderbook.quote_denom);
				let replace = canonical
					.get(&key)
					.map_or(true, |current| outranks(&pool, current));
				if replace {
					canonical.insert(key, Arc::clone(&pool));
				}
			}

			indexed.insert(pool.id, pool);
		}

		for pool in canonical.into_values() {
			let Some(orderbook) = pool.orderbook_data() else {
				continue;
			};
			if let Some(data) = denoms.get_mut(&orderbook.base_denom) {
				data.canonical_shortcuts
					.insert(orderbook.quote_denom.clone(), Arc::clone(&pool));
			}
			if let Some(data) = denoms.get_mut(&orderbook.quote_denom) {
				data.canonical_shortcuts
					.insert(orderbook.base_denom.clone(), Arc::clone(&pool));
			}
		}

		for data in denoms.values_mut() {
			data.sorted_pools
				.sort_by(|a, b| b.liquidity_cap.cmp(&a.liquidity_cap).then(a.id.cmp(&b.id)));
		}

		report.indexed_pools = indexed.len();
		report.denoms = denoms.len();
		debug!(
			"Indexed {} pools over {} denoms, skipped {}",
			report.indexed_pools,
			report.denoms,
			report.skipped.len()
		);
		Ok((
			Self {
				denoms,
				pools: indexed,
			},
			report,
		))
	}

	pub fn get(&self, denom: &str) -> Option<&DenomData> {
		self.denoms.get(denom)
	}

	pub fn contains(&self, denom: &str) -> bool {
		self.denoms.contains_key(denom)
	}

	/// An indexed pool by ID. Pools skipped at build time are not found.
	pub fn pool(&self, pool_id: u64) -> Option<&Arc<Pool>> {
		self.pools.get(&pool_id)
	}

	/// Canonical orderbook pool for `token_in -> token_out`, if any.
	pub fn canonical(&self, token_in_denom: &str, token_out_denom: &str) -> Option<&Arc<Pool>> {
		self.get(token_in_denom)?.canonical(token_out_denom)
	}

	pub fn total_liquidity(&self, denom: &str) -> Option<Decimal> {
		self.get(denom).map(|data| data.total_liquidity_cap)
	}

	pub fn denoms(&self) -> impl Iterator<Item = &str> {
		self.denoms.keys().map(String::as_str)
	}

	pub fn len(&self) -> usize {
		self.denoms.len()
	}

	pub fn is_empty(&self) -> bool {
		self.denoms.is_empty()
	}
}

fn distinct_denoms(denoms: &[String]) -> Vec<String> {
	let mut seen = HashSet::new();
	denoms
		.iter()
		.filter(|denom| seen.insert(denom.as_str()))
		.cloned()
		.collect()
}

fn check_pool(pool: &Pool, distinct_denoms: usize, allowed_code_ids: &HashSet<u64>) -> Option<SkipReason> {
	if distinct_denoms < 2 {
		return Some(SkipReason::TooFewDenoms(distinct_denoms));
	}

	if let Some(model) = pool.cosmwasm_model() {
		if !allowed_code_ids.contains(&model.code_id) {
			return Some(SkipReason::CodeIdNotAllowed(model.code_id));
		}
	}

	if let Some(orderbook) = pool.orderbook_data() {
		if orderbook.base_denom == orderbook.quote_denom
			|| !pool.has_denom(&orderbook.base_denom)
			|| !pool.has_denom(&orderbook.quote_denom)
		{
			return Some(SkipReason::OrderbookDenomMismatch);
		}
	}

	None
}

fn pair_key(a: &str, b: &str) -> (String, String) {
	if a <= b {
		(a.to_string(), b.to_string())
	} else {
		(b.to_string(), a.to_string())
	}
}

fn outranks(candidate: &Pool, current: &Pool) -> bool {
	candidate.liquidity_cap > current.liquidity_cap
		|| (candidate.liquidity_cap == current.liquidity_cap && candidate.id < current.id)
}
