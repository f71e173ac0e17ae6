//! Atomically published index snapshots.

use crate::index::DenomLiquidityIndex;
use arc_swap::ArcSwap;
use router_types::{Pool, Result, RouterError};
use std::sync::Arc;

/// One fully built index tied to the block height it was built for.
#[derive(Debug, Default)]
pub struct IndexSnapshot {
	pub height: u64,
	pub index: DenomLiquidityIndex,
}

impl IndexSnapshot {
	pub fn new(height: u64, index: DenomLiquidityIndex) -> Self {
		Self { height, index }
	}

	pub fn pool(&self, pool_id: u64) -> Option<&Arc<Pool>> {
		self.index.pool(pool_id)
	}

	/// Resolves route pool IDs against this version, in order. Fails on the
	/// first ID that is not indexed.
	pub fn pools(&self, pool_ids: &[u64]) -> Result<Vec<Arc<Pool>>> {
		pool_ids
			.iter()
			.map(|&id| self.pool(id).cloned().ok_or(RouterError::PoolNotFound(id)))
			.collect()
	}
}

/// Handle to the currently published [`IndexSnapshot`].
///
/// Loads are lock-free. A loaded snapshot stays alive until its last reader
/// drops it, regardless of how many times the handle is republished.
#[derive(Debug)]
pub struct PublishedIndex {
	current: ArcSwap<IndexSnapshot>,
}

impl PublishedIndex {
	/// Starts with an empty index at height 0.
	pub fn new() -> Self {
		Self::from_snapshot(IndexSnapshot::default())
	}

	pub fn from_snapshot(snapshot: IndexSnapshot) -> Self {
		Self {
			current: ArcSwap::from_pointee(snapshot),
		}
	}

	pub fn load(&self) -> Arc<IndexSnapshot> {
		self.current.load_full()
	}

	/// Replaces the published snapshot, returning the previous one.
	pub fn publish(&self, snapshot: IndexSnapshot) -> Arc<IndexSnapshot> {
		self.current.swap(Arc::new(snapshot))
	}

	pub fn height(&self) -> u64 {
		self.current.load().height
	}
}

impl Default for PublishedIndex {
	fn default() -> Self {
		Self::new()
	}
}
