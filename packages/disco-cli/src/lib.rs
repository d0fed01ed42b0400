//! Command-line plumbing shared by the binaries: version string, help styling, the config flag,
//! and the log subscriber.

use std::path::PathBuf;

use clap::builder::{
	Styles,
	styling::{AnsiColor, Effects},
};
use tracing_subscriber::EnvFilter;

pub const VERSION: &str = concat!(
	env!("CARGO_PKG_VERSION"),
	"-",
	env!("VERGEN_GIT_SHA"),
	"-",
	env!("VERGEN_CARGO_TARGET_TRIPLE"),
);

const FALLBACK_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, clap::Args)]
pub struct ConfigArgs {
	/// Path to the service configuration (TOML).
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
}

pub fn styles() -> Styles {
	Styles::styled()
		.header(AnsiColor::Cyan.on_default() | Effects::BOLD)
		.usage(AnsiColor::Cyan.on_default() | Effects::BOLD)
		.literal(AnsiColor::Blue.on_default() | Effects::BOLD)
		.placeholder(AnsiColor::Green.on_default())
		.error(AnsiColor::Red.on_default() | Effects::BOLD)
}

/// Builds the log filter. `RUST_LOG` wins over the configured level; an unparsable level falls
/// back to `info`.
pub fn log_filter(configured: &str) -> EnvFilter {
	EnvFilter::try_from_default_env()
		.or_else(|_| EnvFilter::try_new(configured))
		.unwrap_or_else(|_| EnvFilter::new(FALLBACK_LOG_LEVEL))
}

pub fn init_tracing(configured: &str) {
	tracing_subscriber::fmt().with_env_filter(log_filter(configured)).with_target(false).init();
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn config_flag_accepts_short_and_long_forms() {
		#[derive(clap::Parser)]
		struct Cli {
			#[command(flatten)]
			config: ConfigArgs,
		}

		let long = <Cli as clap::Parser>::try_parse_from(["disco", "--config", "a.toml"])
			.expect("Long flag must parse.");
		let short = <Cli as clap::Parser>::try_parse_from(["disco", "-c", "b.toml"])
			.expect("Short flag must parse.");

		assert_eq!(long.config.config, PathBuf::from("a.toml"));
		assert_eq!(short.config.config, PathBuf::from("b.toml"));
		assert!(<Cli as clap::Parser>::try_parse_from(["disco"]).is_err());
	}
}
