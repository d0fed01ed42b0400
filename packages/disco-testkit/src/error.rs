pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failures while building or publishing fixture stores.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("{0}")]
	Message(String),
	#[error("Fixture I/O failed: {0}")]
	Io(#[from] std::io::Error),
	#[error("Fixture database failed: {0}")]
	Sqlx(#[from] sqlx::Error),
	#[error("Fixture record could not be serialized: {0}")]
	Json(#[from] serde_json::Error),
}
