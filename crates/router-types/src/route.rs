//! Candidate route types handed to the quoting stage.

use crate::pool::{PoolInfo, PoolType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One directed edge of a path: enter `id`, exit holding `token_out_denom`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CandidatePool {
	pub id: u64,
	pub token_out_denom: String,
}

/// A [`CandidatePool`] plus what is needed to validate the next hop and to
/// decide which auxiliary data the quoting stage must load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidatePoolWrapper {
	#[serde(flatten)]
	pub pool: CandidatePool,
	pub pool_denoms: Vec<String>,
	pub pool_type: PoolType,
}

impl CandidatePoolWrapper {
	pub fn from_pool<P: PoolInfo + ?Sized>(pool: &P, token_out_denom: impl Into<String>) -> Self {
		Self {
			pool: CandidatePool {
				id: pool.id(),
				token_out_denom: token_out_denom.into(),
			},
			pool_denoms: pool.pool_denoms().to_vec(),
			pool_type: pool.pool_type(),
		}
	}

	pub fn id(&self) -> u64 {
		self.pool.id
	}

	pub fn token_out_denom(&self) -> &str {
		&self.pool.token_out_denom
	}

	pub fn has_denom(&self, denom: &str) -> bool {
		self.pool_denoms.iter().any(|d| d == denom)
	}
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateRoute {
	pub pools: Vec<CandidatePoolWrapper>,
	/// Set when the route is a canonical shortcut that bypassed the search.
	#[serde(default)]
	pub is_canonical_orderbook_route: bool,
}

impl CandidateRoute {
	pub fn new(pools: Vec<CandidatePoolWrapper>) -> Self {
		Self {
			pools,
			is_canonical_orderbook_route: false,
		}
	}

	pub fn canonical(pool: CandidatePoolWrapper) -> Self {
		Self {
			pools: vec![pool],
			is_canonical_orderbook_route: true,
		}
	}

	pub fn len(&self) -> usize {
		self.pools.len()
	}

	pub fn is_empty(&self) -> bool {
		self.pools.is_empty()
	}

	pub fn pool_ids(&self) -> Vec<u64> {
		self.pools.iter().map(CandidatePoolWrapper::id).collect()
	}

	pub fn token_out_denom(&self) -> Option<&str> {
		self.pools.last().map(CandidatePoolWrapper::token_out_denom)
	}
}

/// Bounded set of routes returned for one query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateRoutes {
	pub routes: Vec<CandidateRoute>,
	pub unique_pool_ids: BTreeSet<u64>,
	pub contains_canonical_orderbook: bool,
}

impl CandidateRoutes {
	pub fn from_routes(routes: Vec<CandidateRoute>) -> Self {
		let unique_pool_ids = routes
			.iter()
			.flat_map(|route| route.pools.iter().map(CandidatePoolWrapper::id))
			.collect();
		let contains_canonical_orderbook =
			routes.iter().any(|route| route.is_canonical_orderbook_route);

		Self {
			routes,
			unique_pool_ids,
			contains_canonical_orderbook,
		}
	}

	pub fn len(&self) -> usize {
		self.routes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.routes.is_empty()
	}
}
