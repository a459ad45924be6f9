use ahash::AHashSet;

use folio_domain::Citation;

use crate::{
	Error, FolioService, Result,
	answer::{NO_EVIDENCE_ANSWER, SUMMARY_CONTEXT_BLOCKS, SUMMARY_SYSTEM_PROMPT},
	citation, rerank,
};

/// Broad retrieval query used to pull representative chunks for a summary.
const SUMMARY_QUERY: &str = "document summary main topics technical details evidence";
const SUMMARY_INSTRUCTION: &str = "Summarize the provided documents.";

#[derive(Clone, Debug, serde::Deserialize)]
pub struct SummarizeRequest {
	pub session_id: String,
}

#[derive(Clone, Debug, serde::Serialize)]
pub struct SummarizeResponse {
	pub summary: String,
	pub citations: Vec<Citation>,
	pub document_count: usize,
}

impl FolioService {
	/// Citation-grounded multi-section summary over the full session corpus.
	/// Summaries are not recorded into conversation history; they are not
	/// chat turns.
	pub async fn summarize(&self, req: SummarizeRequest) -> Result<SummarizeResponse> {
		let session_id = req.session_id.trim();

		if session_id.is_empty() {
			return Err(Error::InvalidRequest { message: "session_id is required.".to_string() });
		}

		let chunks = self.store.get_all_chunks(session_id).await;

		if chunks.is_empty() {
			return Err(Error::NoDocuments);
		}

		let document_count = chunks
			.iter()
			.map(|chunk| chunk.source_file.as_str())
			.collect::<AHashSet<_>>()
			.len();
		let top_k = self.cfg.retrieval.summary_top_k;
		let candidates = self.retrieve(session_id, &chunks, SUMMARY_QUERY, top_k).await?;
		let evidence = rerank::rerank(SUMMARY_QUERY, candidates, top_k as usize);

		if evidence.is_empty() {
			return Ok(SummarizeResponse {
				summary: NO_EVIDENCE_ANSWER.to_string(),
				citations: Vec::new(),
				document_count,
			});
		}

		let summary = self
			.answer_with_fallback(
				SUMMARY_SYSTEM_PROMPT,
				SUMMARY_INSTRUCTION,
				&evidence,
				SUMMARY_CONTEXT_BLOCKS,
			)
			.await;
		let citations = citation::build_citations(&evidence);

		Ok(SummarizeResponse { summary, citations, document_count })
	}
}
