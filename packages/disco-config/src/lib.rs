mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Config, IdpIndex, Metadata, Search, Service, SpMetadata, Storage};

use std::{fs, path::Path, sync::LazyLock};

use regex::Regex;

static SQL_IDENT: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]+$").expect("Identifier pattern must compile."));

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	for (label, value) in [
		("service.http_bind", &cfg.service.http_bind),
		("service.admin_bind", &cfg.service.admin_bind),
	] {
		if value.trim().is_empty() {
			return Err(Error::Validation { message: format!("{label} must be non-empty.") });
		}
	}

	for (label, path) in [
		("storage.idp_index.path", &cfg.storage.idp_index.path),
		("storage.sp_metadata.path", &cfg.storage.sp_metadata.path),
	] {
		if path.as_os_str().is_empty() {
			return Err(Error::Validation { message: format!("{label} must be non-empty.") });
		}
	}

	for (label, value) in [
		("storage.idp_index.pool_max_conns", cfg.storage.idp_index.pool_max_conns),
		("storage.sp_metadata.pool_max_conns", cfg.storage.sp_metadata.pool_max_conns),
		("search.max_results", cfg.search.max_results),
		("search.max_chosen", cfg.search.max_chosen),
		("search.max_prioritized", cfg.search.max_prioritized),
	] {
		if value == 0 {
			return Err(Error::Validation {
				message: format!("{label} must be greater than zero."),
			});
		}
	}

	if !SQL_IDENT.is_match(&cfg.storage.sp_metadata.table_suffix) {
		return Err(Error::Validation {
			message: "storage.sp_metadata.table_suffix must only contain ASCII letters, digits, or underscores."
				.to_string(),
		});
	}
	if !SQL_IDENT.is_match(&cfg.search.prioritized_keyword) {
		return Err(Error::Validation {
			message: "search.prioritized_keyword must only contain ASCII letters, digits, or underscores."
				.to_string(),
		});
	}
	if cfg.metadata.max_inflated_bytes == 0 {
		return Err(Error::Validation {
			message: "metadata.max_inflated_bytes must be greater than zero.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	cfg.storage.sp_metadata.table_suffix = cfg.storage.sp_metadata.table_suffix.trim().to_string();
	cfg.search.prioritized_keyword = cfg.search.prioritized_keyword.trim().to_lowercase();

	if cfg.service.log_level.trim().is_empty() {
		cfg.service.log_level = "info".to_string();
	}
}
