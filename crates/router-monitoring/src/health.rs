use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

/// Health status of a component
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
	Healthy,
	Degraded,
	Unhealthy,
}

impl HealthStatus {
	/// Worst status of `statuses`, healthy when empty.
	pub fn worst<I>(statuses: I) -> Self
	where
		I: IntoIterator<Item = HealthStatus>,
	{
		statuses.into_iter().max().unwrap_or(HealthStatus::Healthy)
	}
}

impl fmt::Display for HealthStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Healthy => write!(f, "healthy"),
			Self::Degraded => write!(f, "degraded"),
			Self::Unhealthy => write!(f, "unhealthy"),
		}
	}
}

/// Outcome of one check run. Details are ordered by key.
#[derive(Debug, Clone)]
pub struct HealthCheckResult {
	pub status: HealthStatus,
	pub message: String,
	pub duration: Duration,
	pub details: BTreeMap<String, String>,
}

impl HealthCheckResult {
	pub fn new(status: HealthStatus, message: impl Into<String>, duration: Duration) -> Self {
		Self {
			status,
			message: message.into(),
			duration,
			details: BTreeMap::new(),
		}
	}

	pub fn healthy(message: impl Into<String>, duration: Duration) -> Self {
		Self::new(HealthStatus::Healthy, message, duration)
	}

	pub fn degraded(message: impl Into<String>, duration: Duration) -> Self {
		Self::new(HealthStatus::Degraded, message, duration)
	}

	pub fn unhealthy(message: impl Into<String>, duration: Duration) -> Self {
		Self::new(HealthStatus::Unhealthy, message, duration)
	}

	pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.details.insert(key.into(), value.into());
		self
	}
}

#[async_trait::async_trait]
pub trait HealthCheck: Send + Sync {
	async fn check(&self) -> HealthCheckResult;
	fn name(&self) -> &str;
}

/// Latest result of every registered check, with the worst status.
#[derive(Debug, Clone)]
pub struct HealthReport {
	pub status: HealthStatus,
	pub checks: BTreeMap<String, HealthCheckResult>,
}

impl HealthReport {
	fn from_results(checks: BTreeMap<String, HealthCheckResult>) -> Self {
		Self {
			status: HealthStatus::worst(checks.values().map(|result| result.status)),
			checks,
		}
	}
}

type Checks = Arc<RwLock<HashMap<String, Arc<dyn HealthCheck>>>>;
type Results = Arc<RwLock<BTreeMap<String, HealthCheckResult>>>;

/// Runs registered checks on demand or on a fixed interval.
#[derive(Clone)]
pub struct HealthChecker {
	checks: Checks,
	last_results: Results,
	check_interval: Duration,
}

impl HealthChecker {
	pub fn new(check_interval: Duration) -> Self {
		Self {
			checks: Arc::default(),
			last_results: Arc::default(),
			check_interval,
		}
	}

	/// Registers a check, replacing any previous check of the same name.
	pub async fn register_check(&self, check: Arc<dyn HealthCheck>) {
		let name = check.name().to_string();
		self.checks.write().await.insert(name, check);
	}

	/// Runs every check now.
	pub async fn report(&self) -> HealthReport {
		HealthReport::from_results(run_checks(&self.checks, &self.last_results).await)
	}

	pub async fn get_overall_health(&self) -> HealthStatus {
		self.report().await.status
	}

	/// Results of the most recent run, without running anything.
	pub async fn last_report(&self) -> HealthReport {
		HealthReport::from_results(self.last_results.read().await.clone())
	}

	/// Runs all checks every `check_interval` until the returned task is
	/// aborted.
	pub fn start_periodic_checks(&self) -> JoinHandle<()> {
		let checker = self.clone();

		tokio::spawn(async move {
			let mut ticker = tokio::time::interval(checker.check_interval);
			loop {
				ticker.tick().await;
				run_checks(&checker.checks, &checker.last_results).await;
			}
		})
	}
}

async fn run_checks(checks: &Checks, last_results: &Results) -> BTreeMap<String, HealthCheckResult> {
	let checks = checks.read().await;
	let mut results = BTreeMap::new();

	for (name, check) in checks.iter() {
		let started = Instant::now();
		let result = check.check().await;
		let elapsed = started.elapsed();

		match result.status {
			HealthStatus::Healthy => debug!("Health check '{}' passed in {:?}", name, elapsed),
			HealthStatus::Degraded => warn!(
				"Health check '{}' degraded: {} {:?}",
				name, result.message, result.details
			),
			HealthStatus::Unhealthy => error!(
				"Health check '{}' failed: {} {:?}",
				name, result.message, result.details
			),
		}

		results.insert(name.clone(), result);
	}

	*last_results.write().await = results.clone();
	results
}
