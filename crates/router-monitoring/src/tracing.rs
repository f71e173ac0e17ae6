use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Subscriber settings, usually derived from the `monitoring` config section.
#[derive(Debug, Clone)]
pub struct TracingConfig {
	/// Default filter directive, e.g. `info` or `router_discovery=debug,info`.
	/// `RUST_LOG` takes precedence when set.
	pub level: String,
	pub json_format: bool,
	pub with_target: bool,
	pub with_thread_ids: bool,
	pub with_file_and_line: bool,
}

impl Default for TracingConfig {
	fn default() -> Self {
		Self {
			level: "info".to_string(),
			json_format: false,
			with_target: true,
			with_thread_ids: false,
			with_file_and_line: false,
		}
	}
}

impl TracingConfig {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_level(mut self, level: impl Into<String>) -> Self {
		self.level = level.into();
		self
	}

	pub fn with_json_format(mut self, json: bool) -> Self {
		self.json_format = json;
		self
	}

	pub fn debug() -> Self {
		Self::default()
			.with_level("debug")
			.with_file_and_line(true)
	}

	pub fn production() -> Self {
		Self {
			level: "info".to_string(),
			json_format: true,
			with_target: false,
			with_thread_ids: true,
			with_file_and_line: false,
		}
	}

	fn with_file_and_line(mut self, enabled: bool) -> Self {
		self.with_file_and_line = enabled;
		self
	}

	/// Filter from `RUST_LOG`, falling back to `level`.
	pub fn env_filter(&self) -> Result<EnvFilter, tracing_subscriber::filter::ParseError> {
		match EnvFilter::try_from_default_env() {
			Ok(filter) => Ok(filter),
			Err(_) => EnvFilter::try_new(&self.level),
		}
	}
}

/// Installs the global subscriber: `EnvFilter` plus either a JSON or a
/// human-readable formatter. Fails if a subscriber is already set.
pub fn init_tracing(config: TracingConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
	let filter = config.env_filter()?;

	let json_layer = config.json_format.then(|| {
		fmt::layer()
			.json()
			.with_thread_ids(config.with_thread_ids)
			.with_file(config.with_file_and_line)
			.with_line_number(config.with_file_and_line)
			.with_target(config.with_target)
	});
	let text_layer = (!config.json_format).then(|| {
		fmt::layer()
			.with_thread_ids(config.with_thread_ids)
			.with_file(config.with_file_and_line)
			.with_line_number(config.with_file_and_line)
			.with_target(config.with_target)
	});

	tracing_subscriber::registry()
		.with(filter)
		.with(json_layer)
		.with(text_layer)
		.try_init()?;

	info!(
		"Tracing initialized with filter '{}' ({} output)",
		config.level,
		if config.json_format { "json" } else { "text" }
	);
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_presets() {
		let debug = TracingConfig::debug();
		assert_eq!(debug.level, "debug");
		assert!(debug.with_file_and_line);
		assert!(!debug.json_format);

		let production = TracingConfig::production();
		assert!(production.json_format);
		assert!(!production.with_target);
	}

	#[test]
	fn test_builder() {
		let config = TracingConfig::new()
			.with_level("router_discovery=trace,warn")
			.with_json_format(true);
		assert_eq!(config.level, "router_discovery=trace,warn");
		assert!(config.json_format);
	}

	#[test]
	fn test_level_directive_parses() {
		if std::env::var("RUST_LOG").is_ok() {
			return;
		}
		assert!(TracingConfig::new().with_level("router_core=debug,info").env_filter().is_ok());
		assert!(TracingConfig::new().with_level("router_core=notalevel").env_filter().is_err());
	}
}
