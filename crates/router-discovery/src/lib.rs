// router-discovery/src/lib.rs

//! # Candidate Route Discovery
//!
//! Bounded breadth-first search over a published denom liquidity index,
//! followed by structural validation of the paths it produced.
//!
//! ## Key Components
//!
//! - [`find_candidate_routes`] - the search itself, against one index version
//! - [`IndexRouteFinder`] - loads the current published index per call
//! - [`validate_routes`] - drops structurally invalid and duplicate routes
//! - [`CandidateRouteCache`] - per-pair results kept until the next publish

pub mod cache;
pub mod finder;
pub mod validator;

pub use cache::{CandidateRouteCache, RouteCacheKey};
pub use finder::{find_candidate_routes, CandidateRouteFinder, IndexRouteFinder};
pub use validator::validate_routes;
