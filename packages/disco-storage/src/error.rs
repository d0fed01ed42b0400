#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Failed to open store at {path:?}: {source}")]
	Open { path: std::path::PathBuf, source: sqlx::Error },
	#[error(transparent)]
	Sqlx(#[from] sqlx::Error),
}
