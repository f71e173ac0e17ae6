//! Rebuilds and publishes the liquidity index once per block.

use crate::executor::TaskExecutor;
use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use router_config::PoolsConfig;
use router_liquidity::{BuildReport, DenomLiquidityIndex, IndexSnapshot, PublishedIndex};
use router_types::{Pool, Result, RouterError};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Notified after each successful index publication.
#[async_trait::async_trait]
pub trait IndexUpdateListener: Send + Sync {
	async fn on_index_updated(&self, height: u64, report: &BuildReport);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshFailure {
	pub height: u64,
	pub reason: String,
	pub at: DateTime<Utc>,
}

/// What the health reporter needs to know about index refreshes.
#[derive(Debug, Clone, Default)]
pub struct RefreshStatus {
	pub last_applied_height: Option<u64>,
	pub last_applied_at: Option<DateTime<Utc>>,
	last_applied_instant: Option<Instant>,
	/// Set when the latest rebuild attempt failed, cleared by the next success.
	pub last_failure: Option<RefreshFailure>,
}

impl RefreshStatus {
	/// Time since the last successful publication.
	pub fn age(&self) -> Option<Duration> {
		self.last_applied_instant.map(|applied| applied.elapsed())
	}

	/// Fails with [`RouterError::StaleIndex`] if nothing was applied within
	/// `max_age`. Returns the applied height otherwise.
	pub fn ensure_fresh(&self, max_age: Duration) -> Result<u64> {
		let age = self.age().unwrap_or(Duration::MAX);
		match self.last_applied_height {
			Some(height) if age <= max_age => Ok(height),
			height => Err(RouterError::StaleIndex {
				last_height: height.unwrap_or_default(),
				age_secs: age.as_secs(),
				max_age_secs: max_age.as_secs(),
			}),
		}
	}
}

/// Reacts to new blocks by rebuilding the index off the request path and
/// swapping it in. A failed rebuild leaves the previous index published.
pub struct IndexRefreshCoordinator {
	published: Arc<PublishedIndex>,
	pools_config: PoolsConfig,
	executor: TaskExecutor,
	status: ArcSwap<RefreshStatus>,
	listeners: RwLock<Vec<Arc<dyn IndexUpdateListener>>>,
	rebuild_lock: Mutex<()>,
}

impl IndexRefreshCoordinator {
	pub fn new(published: Arc<PublishedIndex>, pools_config: PoolsConfig, executor: TaskExecutor) -> Self {
		Self {
			published,
			pools_config,
			executor,
			status: ArcSwap::from_pointee(RefreshStatus::default()),
			listeners: RwLock::new(Vec::new()),
			rebuild_lock: Mutex::new(()),
		}
	}

	pub fn published(&self) -> &Arc<PublishedIndex> {
		&self.published
	}

	pub fn status(&self) -> Arc<RefreshStatus> {
		self.status.load_full()
	}

	pub fn last_applied_height(&self) -> Option<u64> {
		self.status.load().last_applied_height
	}

	pub async fn register_listener(&self, listener: Arc<dyn IndexUpdateListener>) {
		self.listeners.write().await.push(listener);
	}

	/// Rebuilds the index from `pools` and publishes it at `height`.
	///
	/// Heights at or below the last applied one are ignored. Rebuilds are
	/// serialized, so publications happen in height order.
	pub async fn on_new_block(&self, height: u64, pools: Vec<Pool>) -> Result<()> {
		let _guard = self.rebuild_lock.lock().await;

		if let Some(last_height) = self.last_applied_height() {
			if height <= last_height {
				warn!(
					"Ignoring block {} at or below last applied height {}",
					height, last_height
				);
				return Ok(());
			}
		}

		let started = Instant::now();
		let pools_config = self.pools_config.clone();
		let built = self
			.executor
			.submit_blocking(format!("index-rebuild-{}", height), move || {
				DenomLiquidityIndex::build(pools, &pools_config)
			})
			.join()
			.await;

		let (index, report) = match built {
			Ok(Ok(built)) => built,
			Ok(Err(e)) => return Err(self.record_failure(height, e.to_string())),
			Err(e) => return Err(self.record_failure(height, e.to_string())),
		};

		for skipped in &report.skipped {
			warn!(
				"Skipped pool {} at height {}: {}",
				skipped.pool_id, height, skipped.reason
			);
		}

		self.published.publish(IndexSnapshot::new(height, index));
		self.status.store(Arc::new(RefreshStatus {
			last_applied_height: Some(height),
			last_applied_at: Some(Utc::now()),
			last_applied_instant: Some(Instant::now()),
			last_failure: None,
		}));

		info!(
			"Published liquidity index for height {}: {} pools, {} denoms, {} skipped in {:?}",
			height,
			report.indexed_pools,
			report.denoms,
			report.skipped.len(),
			started.elapsed()
		);

		let listeners = self.listeners.read().await.clone();
		for listener in listeners {
			listener.on_index_updated(height, &report).await;
		}

		Ok(())
	}

	/// Runs [`Self::on_new_block`] in the background; its error is logged.
	pub fn on_new_block_async(self: &Arc<Self>, height: u64, pools: Vec<Pool>) -> JoinHandle<()> {
		let coordinator = Arc::clone(self);
		self.executor.spawn_detached(format!("block-{}", height), async move {
			coordinator.on_new_block(height, pools).await
		})
	}

	fn record_failure(&self, height: u64, reason: String) -> RouterError {
		error!("Index rebuild failed at height {}: {}", height, reason);

		let mut status = RefreshStatus::clone(&self.status.load());
		status.last_failure = Some(RefreshFailure {
			height,
			reason: reason.clone(),
			at: Utc::now(),
		});
		self.status.store(Arc::new(status));

		RouterError::RebuildFailed { height, reason }
	}
}
