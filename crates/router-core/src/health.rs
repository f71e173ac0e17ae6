//! Index freshness health check.

use crate::coordinator::IndexRefreshCoordinator;
use router_monitoring::{HealthCheck, HealthCheckResult};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Reports the index unhealthy when it stopped advancing and degraded when
/// the latest rebuild failed.
pub struct IndexFreshnessCheck {
	name: String,
	coordinator: Arc<IndexRefreshCoordinator>,
	max_age: Duration,
}

impl IndexFreshnessCheck {
	pub fn new(coordinator: Arc<IndexRefreshCoordinator>, max_age: Duration) -> Self {
		Self {
			name: "liquidity-index".to_string(),
			coordinator,
			max_age,
		}
	}

	pub fn with_name(mut self, name: impl Into<String>) -> Self {
		self.name = name.into();
		self
	}
}

#[async_trait::async_trait]
impl HealthCheck for IndexFreshnessCheck {
	async fn check(&self) -> HealthCheckResult {
		let start = Instant::now();
		let status = self.coordinator.status();

		let height = match status.ensure_fresh(self.max_age) {
			Ok(height) => height,
			Err(e) => {
				let mut result = HealthCheckResult::unhealthy(e.to_string(), start.elapsed());
				if let Some(height) = status.last_applied_height {
					result = result.with_detail("last_applied_height", height.to_string());
				}
				return result;
			}
		};

		let age_secs = status.age().unwrap_or_default().as_secs().to_string();

		match &status.last_failure {
			Some(failure) => HealthCheckResult::degraded(
				format!(
					"Index rebuild failed at height {}: {}",
					failure.height, failure.reason
				),
				start.elapsed(),
			)
			.with_detail("last_applied_height", height.to_string())
			.with_detail("failed_height", failure.height.to_string())
			.with_detail("age_secs", age_secs),
			None => HealthCheckResult::healthy(
				format!("Index at height {}", height),
				start.elapsed(),
			)
			.with_detail("last_applied_height", height.to_string())
			.with_detail("age_secs", age_secs),
		}
	}

	fn name(&self) -> &str {
		&self.name
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::executor::TaskExecutor;
	use router_config::PoolsConfig;
	use router_liquidity::PublishedIndex;
	use router_monitoring::HealthStatus;
	use router_types::{Pool, PoolModel};
	use rust_decimal::Decimal;

	fn pool(id: u64) -> Pool {
		Pool::new(
			id,
			PoolModel::ConstantProduct,
			vec!["a".into(), "b".into()],
			Decimal::ONE,
		)
	}

	fn coordinator() -> Arc<IndexRefreshCoordinator> {
		Arc::new(IndexRefreshCoordinator::new(
			Arc::new(PublishedIndex::new()),
			PoolsConfig::default(),
			TaskExecutor::new(1),
		))
	}

	#[tokio::test]
	async fn test_unhealthy_before_first_index() {
		let check = IndexFreshnessCheck::new(coordinator(), Duration::from_secs(60));
		let result = check.check().await;
		assert_eq!(result.status, HealthStatus::Unhealthy);
		assert!(result.message.contains("stale"));
	}

	#[tokio::test]
	async fn test_healthy_after_block() {
		let coordinator = coordinator();
		coordinator.on_new_block(10, vec![pool(1)]).await.unwrap();

		let check = IndexFreshnessCheck::new(coordinator, Duration::from_secs(60)).with_name("index");
		let result = check.check().await;
		assert_eq!(check.name(), "index");
		assert_eq!(result.status, HealthStatus::Healthy);
		assert_eq!(result.details["last_applied_height"], "10");
	}

	#[tokio::test]
	async fn test_unhealthy_when_stale() {
		let coordinator = coordinator();
		coordinator.on_new_block(10, vec![pool(1)]).await.unwrap();
		tokio::time::sleep(Duration::from_millis(5)).await;

		let check = IndexFreshnessCheck::new(coordinator, Duration::from_millis(1));
		let result = check.check().await;
		assert_eq!(result.status, HealthStatus::Unhealthy);
		assert_eq!(result.details["last_applied_height"], "10");
	}

	#[tokio::test]
	async fn test_degraded_after_failed_rebuild() {
		let coordinator = coordinator();
		coordinator.on_new_block(10, vec![pool(1)]).await.unwrap();
		assert!(coordinator.on_new_block(11, vec![pool(2), pool(2)]).await.is_err());

		let check = IndexFreshnessCheck::new(coordinator, Duration::from_secs(60));
		let result = check.check().await;
		assert_eq!(result.status, HealthStatus::Degraded);
		assert_eq!(result.details["failed_height"], "11");
		assert_eq!(result.details["last_applied_height"], "10");
	}
}
