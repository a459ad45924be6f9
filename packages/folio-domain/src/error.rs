pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid page: {message}")]
	InvalidPage { message: String },
	#[error("Invalid chunk: {message}")]
	InvalidChunk { message: String },
}
