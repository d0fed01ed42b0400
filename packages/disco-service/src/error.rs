pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Request-fatal failures. None of them is retried here.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Store unavailable: {message}")]
	StoreUnavailable { message: String },
	#[error("Query failed: {message}")]
	QueryFailed { message: String },
	#[error("Decode failed: {message}")]
	DecodeFailed { message: String },
}

impl From<disco_storage::Error> for Error {
	fn from(err: disco_storage::Error) -> Self {
		match err {
			disco_storage::Error::Open { .. } => Self::StoreUnavailable { message: err.to_string() },
			disco_storage::Error::Sqlx(inner) => Self::QueryFailed { message: inner.to_string() },
		}
	}
}

impl From<disco_metadata::Error> for Error {
	fn from(err: disco_metadata::Error) -> Self {
		Self::DecodeFailed { message: err.to_string() }
	}
}

impl From<serde_json::Error> for Error {
	fn from(err: serde_json::Error) -> Self {
		Self::DecodeFailed { message: err.to_string() }
	}
}
