use folio_chunking::ChunkingConfig;
use folio_domain::{Chunk, Page};
use folio_storage::VectorRecord;

use crate::{Error, FolioService, Result};

/// Chunks embedded per provider call.
const EMBED_BATCH_SIZE: usize = 50;

#[derive(Clone, Debug, serde::Deserialize)]
pub struct IngestFile {
	pub name: String,
	/// Pre-extracted page text, in page order. Extraction is a collaborator;
	/// this boundary never sees raw documents.
	pub pages: Vec<String>,
}

#[derive(Clone, Debug, serde::Deserialize)]
pub struct IngestRequest {
	pub session_id: String,
	pub files: Vec<IngestFile>,
	/// An upload replaces the session's documents unless this is set.
	#[serde(default)]
	pub keep_existing: bool,
}

#[derive(Clone, Debug, serde::Serialize)]
pub struct IngestResponse {
	pub session_id: String,
	pub files: Vec<String>,
	pub chunk_count: usize,
}

impl FolioService {
	/// Chunk, embed, index, and store an upload batch for one session.
	///
	/// Per-page failures are skipped; a file yielding no chunks is skipped; a
	/// batch yielding no chunks at all fails. Embedding and upsert failures
	/// propagate: a chunk that is not indexed can never be found semantically,
	/// and the caller must know ingestion did not fully succeed.
	pub async fn ingest(&self, req: IngestRequest) -> Result<IngestResponse> {
		let session_id = req.session_id.trim();

		if session_id.is_empty() {
			return Err(Error::InvalidRequest { message: "session_id is required.".to_string() });
		}
		if req.files.is_empty() {
			return Err(Error::InvalidRequest {
				message: "at least one file is required.".to_string(),
			});
		}

		if !req.keep_existing {
			// Replace, never merge: stale chunks from a previous document set
			// must not leak into new answers, in the store or in the index.
			self.store.clear_session(session_id).await;
			self.vectors
				.delete_session(session_id)
				.await
				.map_err(|err| Error::Indexing { message: err.to_string() })?;
		}

		let cfg = ChunkingConfig {
			chunk_size: self.cfg.chunking.chunk_size,
			overlap: self.cfg.chunking.chunk_overlap,
		};
		let mut all_chunks = Vec::new();
		let mut processed = Vec::new();

		for file in &req.files {
			let pages = build_pages(file);
			let chunks = folio_chunking::chunk_pages(&pages, &cfg);

			if chunks.is_empty() {
				tracing::warn!(file = %file.name, "File produced no chunks; skipping it.");

				continue;
			}

			processed.push(file.name.clone());
			all_chunks.extend(chunks);
		}

		if all_chunks.is_empty() {
			return Err(Error::Ingestion {
				message: "No chunks could be produced from the uploaded documents.".to_string(),
			});
		}

		self.index_chunks(session_id, &all_chunks).await?;

		let chunk_count = all_chunks.len();

		self.store.add_chunks(session_id, all_chunks).await;

		tracing::info!(
			session_id,
			file_count = processed.len(),
			chunk_count,
			"Ingested document batch."
		);

		Ok(IngestResponse { session_id: session_id.to_string(), files: processed, chunk_count })
	}

	async fn index_chunks(&self, session_id: &str, chunks: &[Chunk]) -> Result<()> {
		let dimensions = self.cfg.providers.embedding.dimensions as usize;

		for batch in chunks.chunks(EMBED_BATCH_SIZE) {
			let texts: Vec<String> = batch.iter().map(|chunk| chunk.text.clone()).collect();
			let vectors = self
				.providers
				.embedding
				.embed(&self.cfg.providers.embedding, &texts)
				.await
				.map_err(|err| Error::Indexing { message: err.to_string() })?;

			if vectors.len() != batch.len() {
				return Err(Error::Indexing {
					message: "Embedding provider returned a mismatched vector count.".to_string(),
				});
			}
			if vectors.iter().any(|vector| vector.len() != dimensions) {
				return Err(Error::Indexing {
					message: "Embedding vector dimension mismatch.".to_string(),
				});
			}

			let records: Vec<VectorRecord> = batch
				.iter()
				.zip(vectors)
				.map(|(chunk, vector)| VectorRecord {
					chunk_id: chunk.chunk_id.clone(),
					session_id: session_id.to_string(),
					source_file: chunk.source_file.clone(),
					page_number: chunk.page_number,
					text: chunk.text.clone(),
					vector,
				})
				.collect();

			self.vectors
				.upsert(&records)
				.await
				.map_err(|err| Error::Indexing { message: err.to_string() })?;
		}

		Ok(())
	}
}

fn build_pages(file: &IngestFile) -> Vec<Page> {
	let mut pages = Vec::with_capacity(file.pages.len());

	for (index, raw) in file.pages.iter().enumerate() {
		match Page::new(raw, index as u32 + 1, &file.name) {
			Ok(page) => pages.push(page),
			Err(err) => {
				tracing::warn!(
					error = %err,
					file = %file.name,
					page_number = index + 1,
					"Skipping invalid page."
				);
			},
		}
	}

	pages
}
