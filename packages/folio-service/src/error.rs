pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Structural failures surface here; component-local failures (a page that
/// will not chunk, a generation call that dies) are absorbed with safe
/// defaults closer to where they happen.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Retrieval requires a non-empty corpus.")]
	EmptyCorpus,
	#[error("No documents available for this session.")]
	NoDocuments,
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Ingestion failed: {message}")]
	Ingestion { message: String },
	#[error("Indexing failed: {message}")]
	Indexing { message: String },
	#[error("Provider error: {message}")]
	Provider { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
}
impl From<folio_storage::Error> for Error {
	fn from(err: folio_storage::Error) -> Self {
		Self::Storage { message: err.to_string() }
	}
}

impl From<folio_providers::Error> for Error {
	fn from(err: folio_providers::Error) -> Self {
		Self::Provider { message: err.to_string() }
	}
}
