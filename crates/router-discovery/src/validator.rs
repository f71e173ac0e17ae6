//! Post-search route validation.

use router_types::{CandidateRoute, CandidateRoutes};
use std::collections::HashSet;
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
enum RouteDefect {
	Empty,
	TooLong(usize),
	RepeatedPool(u64),
	TokenOutNotInPool { pool_id: u64, denom: String },
	TokenInNotInPool { pool_id: u64, denom: String },
	RevisitsTokenIn(u64),
	WrongTokenOut(String),
}

impl fmt::Display for RouteDefect {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Empty => write!(f, "route has no pools"),
			Self::TooLong(len) => write!(f, "route has {} pools", len),
			Self::RepeatedPool(id) => write!(f, "pool {} used twice", id),
			Self::TokenOutNotInPool { pool_id, denom } => {
				write!(f, "pool {} does not contain out denom {}", pool_id, denom)
			}
			Self::TokenInNotInPool { pool_id, denom } => {
				write!(f, "pool {} does not contain in denom {}", pool_id, denom)
			}
			Self::RevisitsTokenIn(id) => write!(f, "pool {} revisits the token in denom", id),
			Self::WrongTokenOut(denom) => write!(f, "route ends in {}", denom),
		}
	}
}

/// Filters the raw search output into the final route set.
///
/// Drops routes that are empty, longer than `max_pools_per_route`, reuse a
/// pool, have a hop whose pool does not hold both of its denoms, pass through
/// `token_in_denom` after the first hop, or end in another denom than
/// `token_out_denom`. Of routes with the same pool ID sequence only the first
/// is kept. Accepted routes keep their order and are not modified.
pub fn validate_routes(
	routes: Vec<CandidateRoute>,
	token_in_denom: &str,
	token_out_denom: &str,
	max_pools_per_route: usize,
) -> CandidateRoutes {
	let mut seen = HashSet::new();
	let mut accepted = Vec::with_capacity(routes.len());

	for route in routes {
		if let Err(defect) = check_route(&route, token_in_denom, token_out_denom, max_pools_per_route) {
			debug!("Dropping candidate route {:?}: {}", route.pool_ids(), defect);
			continue;
		}

		if !seen.insert(route.pool_ids()) {
			debug!("Dropping duplicate candidate route {:?}", route.pool_ids());
			continue;
		}

		accepted.push(route);
	}

	CandidateRoutes::from_routes(accepted)
}

fn check_route(
	route: &CandidateRoute,
	token_in_denom: &str,
	token_out_denom: &str,
	max_pools_per_route: usize,
) -> Result<(), RouteDefect> {
	if route.is_empty() {
		return Err(RouteDefect::Empty);
	}

	if route.len() > max_pools_per_route {
		return Err(RouteDefect::TooLong(route.len()));
	}

	let mut pool_ids = HashSet::with_capacity(route.len());
	let mut previous_denom = token_in_denom;

	for (i, hop) in route.pools.iter().enumerate() {
		if !pool_ids.insert(hop.id()) {
			return Err(RouteDefect::RepeatedPool(hop.id()));
		}

		if !hop.has_denom(previous_denom) {
			return Err(RouteDefect::TokenInNotInPool {
				pool_id: hop.id(),
				denom: previous_denom.to_string(),
			});
		}

		if !hop.has_denom(hop.token_out_denom()) {
			return Err(RouteDefect::TokenOutNotInPool {
				pool_id: hop.id(),
				denom: hop.token_out_denom().to_string(),
			});
		}

		if hop.token_out_denom() == token_in_denom || (i > 0 && hop.has_denom(token_in_denom)) {
			return Err(RouteDefect::RevisitsTokenIn(hop.id()));
		}

		previous_denom = hop.token_out_denom();
	}

	if previous_denom != token_out_denom {
		return Err(RouteDefect::WrongTokenOut(previous_denom.to_string()));
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use router_types::{CandidatePool, CandidatePoolWrapper, PoolType};

	fn hop(id: u64, denoms: &[&str], out: &str) -> CandidatePoolWrapper {
		CandidatePoolWrapper {
			pool: CandidatePool {
				id,
				token_out_denom: out.into(),
			},
			pool_denoms: denoms.iter().map(|d| d.to_string()).collect(),
			pool_type: PoolType::ConstantProduct,
		}
	}

	fn validate(routes: Vec<CandidateRoute>) -> CandidateRoutes {
		validate_routes(routes, "in", "out", 3)
	}

	#[test]
	fn test_valid_routes_pass_through() {
		let direct = CandidateRoute::new(vec![hop(1, &["in", "out"], "out")]);
		let two_hop = CandidateRoute::new(vec![
			hop(2, &["in", "mid"], "mid"),
			hop(3, &["mid", "out"], "out"),
		]);

		let routes = validate(vec![direct.clone(), two_hop.clone()]);
		assert_eq!(routes.routes, vec![direct, two_hop]);
		assert_eq!(routes.unique_pool_ids.len(), 3);
	}

	#[test]
	fn test_duplicate_pool_sequence_keeps_first() {
		let first = CandidateRoute::canonical(hop(1, &["in", "out"], "out"));
		let second = CandidateRoute::new(vec![hop(1, &["in", "out"], "out")]);

		let routes = validate(vec![first, second]);
		assert_eq!(routes.len(), 1);
		assert!(routes.routes[0].is_canonical_orderbook_route);
		assert!(routes.contains_canonical_orderbook);
	}

	#[test]
	fn test_drops_routes_through_token_in() {
		// Exits into the origin denom mid-path.
		let back_to_origin = CandidateRoute::new(vec![
			hop(1, &["in", "mid"], "mid"),
			hop(2, &["mid", "in"], "in"),
			hop(3, &["in", "out"], "out"),
		]);
		// Intermediate pool holds the origin denom.
		let touches_origin = CandidateRoute::new(vec![
			hop(4, &["in", "mid"], "mid"),
			hop(5, &["mid", "in", "out"], "out"),
		]);

		assert!(validate(vec![back_to_origin, touches_origin]).is_empty());
	}

	#[test]
	fn test_drops_structurally_invalid_routes() {
		let empty = CandidateRoute::new(vec![]);
		let too_long = CandidateRoute::new(vec![
			hop(1, &["in", "a"], "a"),
			hop(2, &["a", "b"], "b"),
			hop(3, &["b", "c"], "c"),
			hop(4, &["c", "out"], "out"),
		]);
		let repeated = CandidateRoute::new(vec![
			hop(1, &["in", "a"], "a"),
			hop(2, &["a", "b", "out"], "b"),
			hop(2, &["a", "b", "out"], "out"),
		]);
		let broken_link = CandidateRoute::new(vec![
			hop(1, &["in", "a"], "a"),
			hop(2, &["b", "out"], "out"),
		]);
		let out_not_in_pool = CandidateRoute::new(vec![hop(1, &["in", "a"], "out")]);
		let wrong_end = CandidateRoute::new(vec![hop(1, &["in", "a"], "a")]);

		let routes = validate(vec![
			empty,
			too_long,
			repeated,
			broken_link,
			out_not_in_pool,
			wrong_end,
		]);
		assert!(routes.is_empty());
	}

	#[test]
	fn test_defect_messages() {
		let route = CandidateRoute::new(vec![hop(7, &["in", "a"], "a")]);
		let defect = check_route(&route, "in", "out", 3).unwrap_err();
		assert_eq!(defect, RouteDefect::WrongTokenOut("a".into()));
		assert_eq!(defect.to_string(), "route ends in a");
	}
}
