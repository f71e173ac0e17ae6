// router-core/src/lib.rs

//! Core orchestration for the candidate route engine.
//!
//! Ties the published liquidity index, the refresh coordinator that rebuilds
//! it per block, and the route finder together behind [`RouterEngine`].

pub mod coordinator;
pub mod engine;
pub mod executor;
pub mod health;

pub use coordinator::{IndexRefreshCoordinator, IndexUpdateListener, RefreshFailure, RefreshStatus};
pub use engine::RouterEngine;
pub use executor::{TaskExecutor, TaskHandle};
pub use health::IndexFreshnessCheck;
