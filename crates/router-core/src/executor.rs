//! Bounded executor for work kept off the request path.

use router_types::{Result, RouterError};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{oneshot, Semaphore};
use tokio::task::JoinHandle;
use tracing::{debug, error};

/// Runs blocking work on the blocking pool, at most `max_concurrent_tasks` at
/// a time. Results are delivered through a [`TaskHandle`]; a result nobody
/// receives is logged as an error.
#[derive(Debug, Clone)]
pub struct TaskExecutor {
	permits: Arc<Semaphore>,
	max_concurrent_tasks: usize,
}

/// Completion signal for one submitted task.
#[derive(Debug)]
pub struct TaskHandle<T> {
	name: String,
	receiver: oneshot::Receiver<T>,
}

impl<T> TaskHandle<T> {
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Waits for the task's result.
	pub async fn join(self) -> Result<T> {
		self.receiver.await.map_err(|_| {
			RouterError::Executor(format!("Task '{}' finished without a result", self.name))
		})
	}
}

impl TaskExecutor {
	pub fn new(max_concurrent_tasks: usize) -> Self {
		let max_concurrent_tasks = max_concurrent_tasks.max(1);
		Self {
			permits: Arc::new(Semaphore::new(max_concurrent_tasks)),
			max_concurrent_tasks,
		}
	}

	pub fn max_concurrent_tasks(&self) -> usize {
		self.max_concurrent_tasks
	}

	pub fn available_permits(&self) -> usize {
		self.permits.available_permits()
	}

	/// Submits a blocking unit of work.
	pub fn submit_blocking<F, T>(&self, name: impl Into<String>, work: F) -> TaskHandle<T>
	where
		F: FnOnce() -> T + Send + 'static,
		T: Send + 'static,
	{
		let name = name.into();
		let task_name = name.clone();
		let permits = self.permits.clone();
		let (sender, receiver) = oneshot::channel();

		tokio::spawn(async move {
			let Ok(_permit) = permits.acquire_owned().await else {
				error!("Executor closed before task '{}' could run", task_name);
				return;
			};

			debug!("Running task '{}'", task_name);
			match tokio::task::spawn_blocking(work).await {
				Ok(value) => {
					if sender.send(value).is_err() {
						error!("Result of task '{}' was never consumed", task_name);
					}
				}
				Err(e) => error!("Task '{}' failed: {}", task_name, e),
			}
		});

		TaskHandle { name, receiver }
	}

	/// Spawns a coordination task whose error is logged rather than returned.
	///
	/// Takes no permit, so it may itself submit blocking work.
	pub fn spawn_detached<Fut>(&self, name: impl Into<String>, task: Fut) -> JoinHandle<()>
	where
		Fut: Future<Output = Result<()>> + Send + 'static,
	{
		let name = name.into();
		tokio::spawn(async move {
			if let Err(e) = task.await {
				error!("Task '{}' failed: {}", name, e);
			}
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::sync::atomic::{AtomicUsize, Ordering};
	use std::time::Duration;

	#[tokio::test]
	async fn test_submit_blocking_returns_result() {
		let executor = TaskExecutor::new(2);
		let handle = executor.submit_blocking("sum", || (1..=10).sum::<u64>());
		assert_eq!(handle.name(), "sum");
		assert_eq!(handle.join().await.unwrap(), 55);
	}

	#[tokio::test]
	async fn test_concurrency_is_bounded() {
		let executor = TaskExecutor::new(2);
		let running = Arc::new(AtomicUsize::new(0));
		let peak = Arc::new(AtomicUsize::new(0));

		let handles: Vec<_> = (0..6)
			.map(|i| {
				let running = running.clone();
				let peak = peak.clone();
				executor.submit_blocking(format!("task-{}", i), move || {
					let now = running.fetch_add(1, Ordering::SeqCst) + 1;
					peak.fetch_max(now, Ordering::SeqCst);
					std::thread::sleep(Duration::from_millis(20));
					running.fetch_sub(1, Ordering::SeqCst);
				})
			})
			.collect();

		for handle in handles {
			handle.join().await.unwrap();
		}

		assert!(peak.load(Ordering::SeqCst) <= 2);
		assert_eq!(executor.available_permits(), 2);
	}

	#[tokio::test]
	async fn test_panicking_task_reports_executor_error() {
		let executor = TaskExecutor::new(1);
		let handle = executor.submit_blocking("boom", || -> u32 { panic!("boom") });

		let err = handle.join().await.unwrap_err();
		assert!(matches!(err, RouterError::Executor(_)));
	}

	#[tokio::test]
	async fn test_zero_capacity_rounds_up() {
		let executor = TaskExecutor::new(0);
		assert_eq!(executor.max_concurrent_tasks(), 1);
		assert_eq!(executor.submit_blocking("one", || 1).join().await.unwrap(), 1);
	}

	#[tokio::test]
	async fn test_spawn_detached_runs_to_completion() {
		let executor = TaskExecutor::new(1);
		let ok = executor.spawn_detached("ok", async { Ok(()) });
		let failed = executor.spawn_detached("failed", async {
			Err(RouterError::Executor("nope".into()))
		});

		ok.await.unwrap();
		failed.await.unwrap();
	}
}
