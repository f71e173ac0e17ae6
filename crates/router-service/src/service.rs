//! Route engine service with integrated health monitoring.

use crate::snapshot::SnapshotFeed;
use anyhow::Result;
use router_config::RouterServiceConfig;
use router_core::RouterEngine;
use router_monitoring::{HealthChecker, HealthStatus};
use router_types::{CandidateRoutes, Coin, PoolFilter, RouterError};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// One route lookup, with optional per-query overrides of the configured
/// search options.
#[derive(Debug, Clone)]
pub struct RouteQuery {
	pub token_in: Coin,
	pub token_out_denom: String,
	pub max_routes: Option<usize>,
	pub max_pools_per_route: Option<usize>,
	pub excluded_pool_ids: Vec<u64>,
	pub skip_orderbooks: bool,
	pub disable_cache: bool,
}

impl RouteQuery {
	pub fn new(token_in: Coin, token_out_denom: impl Into<String>) -> Self {
		Self {
			token_in,
			token_out_denom: token_out_denom.into(),
			max_routes: None,
			max_pools_per_route: None,
			excluded_pool_ids: Vec::new(),
			skip_orderbooks: false,
			disable_cache: false,
		}
	}
}

/// Route engine service with integrated monitoring
pub struct RouterService {
	engine: Arc<RouterEngine>,
	health_checker: HealthChecker,
}

impl RouterService {
	pub async fn new(config: &RouterServiceConfig) -> Self {
		let engine = Arc::new(RouterEngine::new(config));

		let health_checker = HealthChecker::new(Duration::from_secs(
			config.monitoring.health_check_interval_secs.max(1),
		));
		let freshness = engine.freshness_check(Duration::from_secs(config.monitoring.max_index_age_secs));
		health_checker.register_check(Arc::new(freshness)).await;

		Self {
			engine,
			health_checker,
		}
	}

	pub fn engine(&self) -> &Arc<RouterEngine> {
		&self.engine
	}

	pub fn health_checker(&self) -> &HealthChecker {
		&self.health_checker
	}

	/// Applies the feed's next snapshot, returning its height if there was
	/// one. A height whose rebuild fails is not retried; the feed moves on.
	pub async fn apply_next(&self, feed: &mut SnapshotFeed) -> Result<Option<u64>> {
		let Some(snapshot) = feed.poll()? else {
			return Ok(None);
		};

		let height = snapshot.height;
		self.engine.on_new_block(height, snapshot.pools).await?;
		Ok(Some(height))
	}

	/// Polls the feed every `poll_interval` until `shutdown` resolves.
	pub async fn run<F>(&self, mut feed: SnapshotFeed, poll_interval: Duration, shutdown: F) -> Result<()>
	where
		F: Future<Output = ()>,
	{
		info!("Watching snapshot file {:?}", feed.path());
		let health_handle = self.health_checker.start_periodic_checks();

		let mut ticker = tokio::time::interval(poll_interval);
		ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
		tokio::pin!(shutdown);

		loop {
			tokio::select! {
				_ = &mut shutdown => break,
				_ = ticker.tick() => {
					if let Err(e) = self.apply_next(&mut feed).await {
						warn!("Snapshot not applied, keeping previous index: {:#}", e);
					}
				}
			}
		}

		health_handle.abort();

		let report = self.health_checker.report().await;
		for (name, result) in &report.checks {
			info!("{}: {} ({})", name, result.status, result.message);
		}
		if report.status != HealthStatus::Healthy {
			warn!("Stopping while {}", report.status);
		}
		Ok(())
	}

	/// Searches with the configured options for the pair, applying the
	/// query's overrides. A timed-out search yields its partial routes.
	pub fn find_routes(&self, query: &RouteQuery) -> router_types::Result<CandidateRoutes> {
		let mut options = self
			.engine
			.search_options_for(&query.token_in.denom, &query.token_out_denom);

		if let Some(max_routes) = query.max_routes {
			options.max_routes = max_routes;
		}
		if let Some(max_pools_per_route) = query.max_pools_per_route {
			options.max_pools_per_route = max_pools_per_route;
		}
		if !query.excluded_pool_ids.is_empty() {
			options = options.with_filter(PoolFilter::pool_ids(query.excluded_pool_ids.iter().copied()));
		}
		if query.skip_orderbooks {
			options = options.with_filter(PoolFilter::Orderbooks);
		}
		if query.disable_cache {
			options = options.with_cache_disabled();
		}

		match self
			.engine
			.find_candidate_routes(&query.token_in, &query.token_out_denom, &options)
		{
			Err(RouterError::Timeout {
				elapsed_ms,
				partial,
			}) => {
				warn!(
					"Route search {} -> {} timed out after {}ms, returning {} partial routes",
					query.token_in, query.token_out_denom, elapsed_ms, partial.len()
				);
				Ok(partial)
			}
			result => result,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use router_types::{Pool, PoolModel};
	use rust_decimal::Decimal;
	use tempfile::NamedTempFile;

	fn snapshot_json(height: u64, duplicate: bool) -> String {
		let extra = if duplicate {
			r#", { "id": 2, "model": { "type": "constant_product" }, "denoms": ["uatom", "uusdc"], "liquidity_cap": "1" }"#
		} else {
			""
		};
		format!(
			r#"{{ "height": {}, "pools": [
				{{ "id": 1, "model": {{ "type": "constant_product" }}, "denoms": ["uosmo", "uatom"],
				   "balances": [{{ "denom": "uosmo", "amount": 1000 }}, {{ "denom": "uatom", "amount": 1000 }}],
				   "liquidity_cap": "500" }},
				{{ "id": 2, "model": {{ "type": "constant_product" }}, "denoms": ["uatom", "uusdc"],
				   "balances": [{{ "denom": "uatom", "amount": 1000 }}, {{ "denom": "uusdc", "amount": 1000 }}],
				   "liquidity_cap": "300" }}{}
			] }}"#,
			height, extra
		)
	}

	fn config() -> RouterServiceConfig {
		let mut config = RouterServiceConfig::default();
		config.router.search_timeout_ms = 5_000;
		config
	}

	fn pool(id: u64, a: &str, b: &str, liquidity: i64) -> Pool {
		Pool::new(
			id,
			PoolModel::ConstantProduct,
			vec![a.into(), b.into()],
			Decimal::from(liquidity),
		)
		.with_balances(vec![Coin::new(a, 1_000), Coin::new(b, 1_000)])
	}

	#[tokio::test]
	async fn test_apply_next_from_feed() {
		let service = RouterService::new(&config()).await;
		let file = NamedTempFile::new().unwrap();
		std::fs::write(file.path(), snapshot_json(3, false)).unwrap();

		let mut feed = SnapshotFeed::new(file.path());
		assert_eq!(service.apply_next(&mut feed).await.unwrap(), Some(3));
		assert_eq!(service.apply_next(&mut feed).await.unwrap(), None);
		assert_eq!(service.engine().published_index().height(), 3);
	}

	#[tokio::test]
	async fn test_failed_snapshot_keeps_previous_index() {
		let service = RouterService::new(&config()).await;
		let file = NamedTempFile::new().unwrap();
		let mut feed = SnapshotFeed::new(file.path());

		std::fs::write(file.path(), snapshot_json(3, false)).unwrap();
		service.apply_next(&mut feed).await.unwrap();

		std::fs::write(file.path(), snapshot_json(4, true)).unwrap();
		assert!(service.apply_next(&mut feed).await.is_err());
		assert_eq!(service.engine().published_index().height(), 3);

		let health = service.health_checker().get_overall_health().await;
		assert_eq!(health, HealthStatus::Degraded);
	}

	#[tokio::test]
	async fn test_find_routes_with_overrides() {
		let service = RouterService::new(&config()).await;
		service
			.engine()
			.on_new_block(
				1,
				vec![
					pool(1, "uosmo", "uatom", 500),
					pool(2, "uatom", "uusdc", 300),
					pool(3, "uosmo", "uusdc", 100),
				],
			)
			.await
			.unwrap();

		let query = RouteQuery::new(Coin::new("uosmo", 10), "uusdc");
		let routes = service.find_routes(&query).unwrap();
		assert_eq!(routes.len(), 2);

		let mut query = query;
		query.excluded_pool_ids = vec![3];
		let routes = service.find_routes(&query).unwrap();
		assert_eq!(routes.len(), 1);
		assert_eq!(routes.routes[0].pool_ids(), vec![1, 2]);

		query.excluded_pool_ids.clear();
		query.max_pools_per_route = Some(1);
		let routes = service.find_routes(&query).unwrap();
		assert_eq!(routes.len(), 1);
		assert_eq!(routes.routes[0].pool_ids(), vec![3]);
	}

	#[tokio::test]
	async fn test_find_routes_cache_overrides() {
		let service = RouterService::new(&config()).await;
		service
			.engine()
			.on_new_block(1, vec![pool(1, "uosmo", "uatom", 500)])
			.await
			.unwrap();

		let mut query = RouteQuery::new(Coin::new("uosmo", 10), "uatom");
		query.disable_cache = true;
		service.find_routes(&query).unwrap();

		let engine = service.engine();
		let options = engine.search_options_for("uosmo", "uatom");
		assert_eq!(
			engine.cached_candidate_routes(&query.token_in, "uatom", &options).unwrap(),
			None
		);

		query.disable_cache = false;
		let routes = service.find_routes(&query).unwrap();
		assert_eq!(
			engine.cached_candidate_routes(&query.token_in, "uatom", &options).unwrap(),
			Some(routes)
		);
	}

	#[tokio::test]
	async fn test_find_routes_unknown_denom() {
		let service = RouterService::new(&config()).await;
		let query = RouteQuery::new(Coin::new("uosmo", 10), "uusdc");
		let err = service.find_routes(&query).unwrap_err();
		assert!(matches!(err, RouterError::DataNotFound { .. }));
	}

	#[tokio::test]
	async fn test_run_stops_on_shutdown() {
		let service = RouterService::new(&config()).await;
		let file = NamedTempFile::new().unwrap();
		std::fs::write(file.path(), snapshot_json(9, false)).unwrap();

		let shutdown = tokio::time::sleep(Duration::from_millis(100));
		service
			.run(SnapshotFeed::new(file.path()), Duration::from_millis(10), shutdown)
			.await
			.unwrap();

		assert_eq!(service.engine().coordinator().last_applied_height(), Some(9));
	}
}
