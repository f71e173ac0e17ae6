//! Configuration for the route engine service.
//!
//! Configuration is read from TOML, JSON or YAML, overridden from `ROUTER_*`
//! environment variables and validated before anything is started.

pub mod loader;
pub mod types;

pub use loader::{load_config, ConfigLoader};
pub use types::*;
