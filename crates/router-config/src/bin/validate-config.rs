//! Configuration validation utility
//!
//! Usage: cargo run --bin validate-config config/router.toml

use std::env;
use std::process;

use router_config::ConfigLoader;

fn main() {
	let args: Vec<String> = env::args().collect();

	if args.len() != 2 {
		eprintln!("Usage: {} <config-file>", args[0]);
		process::exit(1);
	}

	let config_path = &args[1];

	println!("Validating configuration file: {}", config_path);

	match ConfigLoader::from_file(config_path) {
		Ok(config) => {
			println!("Configuration is valid");
			println!("Max routes: {}", config.router.max_routes);
			println!("Max pools per route: {}", config.router.max_pools_per_route);
			println!(
				"Min pool liquidity cap: {}",
				config.router.min_pool_liquidity_cap
			);
			println!(
				"Dynamic liquidity filters: {}",
				config.router.dynamic_min_liquidity_cap_filters_desc.len()
			);
			println!(
				"Allowed CosmWasm code IDs: {}",
				config.pools.allowed_cosmwasm_code_ids().len()
			);
		}
		Err(e) => {
			eprintln!("Configuration validation failed:");
			eprintln!("{:#}", e);
			process::exit(1);
		}
	}
}
