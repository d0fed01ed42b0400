use std::{io, path::PathBuf};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Cannot read discovery config at {path:?}: {source}")]
	ReadConfig { path: PathBuf, source: io::Error },
	#[error("Discovery config at {path:?} is not valid TOML: {source}")]
	ParseConfig { path: PathBuf, source: toml::de::Error },
	#[error("Invalid discovery config: {message}")]
	Validation { message: String },
}
