pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Failed to inflate metadata: {0}")]
	Inflate(#[from] std::io::Error),
	#[error("Inflated metadata exceeds {limit} bytes.")]
	TooLarge { limit: u64 },
	#[error("Metadata is not valid UTF-8.")]
	Utf8(#[from] std::string::FromUtf8Error),
	#[error("Failed to parse metadata XML: {message}")]
	Xml { message: String },
	#[error("Invalid projection path {path:?}: {message}")]
	Path { path: String, message: String },
}
