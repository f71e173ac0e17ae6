//! Error types for the route engine.

use crate::route::CandidateRoutes;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RouterError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RouterError {
	/// The denom was never observed in the published index.
	#[error("No liquidity data found for denom {denom}")]
	DataNotFound { denom: String },

	#[error("Pool {0} is not in the published index")]
	PoolNotFound(u64),

	#[error("Invalid orderbook direction: {0}")]
	InvalidDirection(i64),

	#[error(
		"Orderbook pool {pool_id} cannot swap {token_in_denom} for {token_out_denom}"
	)]
	OrderbookPoolMismatch {
		pool_id: u64,
		token_in_denom: String,
		token_out_denom: String,
	},

	#[error("Index is stale: last applied height {last_height}, {age_secs}s old (max {max_age_secs}s)")]
	StaleIndex {
		last_height: u64,
		age_secs: u64,
		max_age_secs: u64,
	},

	#[error("Index rebuild failed at height {height}: {reason}")]
	RebuildFailed { height: u64, reason: String },

	/// The search deadline expired. `partial` holds the validated routes found
	/// before expiry, possibly none.
	#[error("Candidate route search timed out after {elapsed_ms}ms with {} routes", partial.routes.len())]
	Timeout {
		elapsed_ms: u64,
		partial: CandidateRoutes,
	},

	#[error("Configuration error: {0}")]
	Config(String),

	#[error("Executor error: {0}")]
	Executor(String),
}

impl RouterError {
	pub fn data_not_found(denom: impl Into<String>) -> Self {
		Self::DataNotFound {
			denom: denom.into(),
		}
	}

	/// Routes accumulated before a timeout, if this is one.
	pub fn partial_routes(&self) -> Option<&CandidateRoutes> {
		match self {
			Self::Timeout { partial, .. } => Some(partial),
			_ => None,
		}
	}
}
