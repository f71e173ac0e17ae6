//! Shared types for the candidate route engine.
//!
//! Every other crate in the workspace depends on these definitions: the pool
//! model read from the registry, the orderbook tick model, candidate routes,
//! per-search options and the common error enum.

pub mod errors;
pub mod options;
pub mod orderbook;
pub mod pool;
pub mod route;

pub use errors::{Result, RouterError};
pub use options::{CandidateRouteSearchOptions, PoolFilter};
pub use orderbook::{Direction, OrderbookData, OrderbookTick, TickValues, UnrealizedCancels};
pub use pool::{Coin, CosmWasmContract, CosmWasmPoolModel, Pool, PoolInfo, PoolModel, PoolType};
pub use route::{CandidatePool, CandidatePoolWrapper, CandidateRoute, CandidateRoutes};
