use crate::{Error, Result, text};

/// One page of extracted document text, as produced by the upload boundary.
/// Text is whitespace-normalized on construction; page numbers are 1-based.
#[derive(Clone, Debug, PartialEq)]
pub struct Page {
	pub text: String,
	pub page_number: u32,
	pub source_file: String,
}
impl Page {
	pub fn new(text: &str, page_number: u32, source_file: &str) -> Result<Self> {
		let source_file = source_file.trim();

		if source_file.is_empty() {
			return Err(Error::InvalidPage { message: "source_file must be non-empty.".to_string() });
		}
		if page_number == 0 {
			return Err(Error::InvalidPage {
				message: "page_number must be 1 or greater.".to_string(),
			});
		}

		Ok(Self {
			text: text::normalize_whitespace(text),
			page_number,
			source_file: source_file.to_string(),
		})
	}
}

/// The atomic retrieval unit: a bounded, citation-taggable slice of one
/// page's text.
///
/// `chunk_id` is derived as `{source_file}_p{page_number}_c{sequence}`, so
/// re-chunking identical input yields identical ids and citation lookups stay
/// stable across uploads.
#[derive(Clone, Debug, PartialEq)]
pub struct Chunk {
	pub chunk_id: String,
	pub text: String,
	pub page_number: u32,
	pub source_file: String,
}
impl Chunk {
	pub fn new(source_file: &str, page_number: u32, sequence: usize, text: &str) -> Result<Self> {
		let chunk_id = format!("{source_file}_p{page_number}_c{sequence}");

		Self::from_parts(chunk_id, source_file, page_number, text)
	}

	/// Rebuild a chunk whose id is already known, e.g. from vector index
	/// payload metadata.
	pub fn from_parts(
		chunk_id: String,
		source_file: &str,
		page_number: u32,
		text: &str,
	) -> Result<Self> {
		if chunk_id.trim().is_empty() {
			return Err(Error::InvalidChunk { message: "chunk_id must be non-empty.".to_string() });
		}
		if source_file.trim().is_empty() {
			return Err(Error::InvalidChunk {
				message: "source_file must be non-empty.".to_string(),
			});
		}
		if page_number == 0 {
			return Err(Error::InvalidChunk {
				message: "page_number must be 1 or greater.".to_string(),
			});
		}
		if text.trim().is_empty() {
			return Err(Error::InvalidChunk { message: "text must be non-empty.".to_string() });
		}

		Ok(Self {
			chunk_id,
			text: text.to_string(),
			page_number,
			source_file: source_file.to_string(),
		})
	}
}

/// A scored chunk produced by retrieval or reranking. Transient: it lives for
/// one query and is never persisted.
#[derive(Clone, Debug)]
pub struct SearchResult {
	pub score: f32,
	pub chunk: Chunk,
}

/// A deduplicated pointer from an answer back to its evidence.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Citation {
	pub source_file: String,
	pub page_number: u32,
	pub snippet: String,
}
