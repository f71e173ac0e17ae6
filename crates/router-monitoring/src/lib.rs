//! Monitoring for the route engine service.
//!
//! # Components
//!
//! - `health`: named health checks, aggregated status and periodic runs
//! - `tracing`: subscriber initialisation from configuration

pub mod health;
pub mod tracing;

pub use health::{HealthCheck, HealthCheckResult, HealthChecker, HealthReport, HealthStatus};
pub use self::tracing::{init_tracing, TracingConfig};
