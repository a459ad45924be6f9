use folio_domain::{Citation, Role};

use crate::{
	Error, FolioService, Result,
	answer::{NO_EVIDENCE_ANSWER, QA_CONTEXT_BLOCKS, QA_SYSTEM_PROMPT},
	citation, rerank,
};

#[derive(Clone, Debug, serde::Deserialize)]
pub struct ChatRequest {
	pub session_id: String,
	pub question: String,
	/// Restrict the retrieval corpus to these source files.
	#[serde(default)]
	pub documents: Option<Vec<String>>,
}

#[derive(Clone, Debug, serde::Serialize)]
pub struct ChatResponse {
	pub answer: String,
	pub citations: Vec<Citation>,
}

impl FolioService {
	/// Answer one question over the session's documents: rewrite, retrieve,
	/// rerank, generate (with extractive fallback), record.
	pub async fn chat(&self, req: ChatRequest) -> Result<ChatResponse> {
		let session_id = req.session_id.trim();
		let question = req.question.trim();

		if session_id.is_empty() {
			return Err(Error::InvalidRequest { message: "session_id is required.".to_string() });
		}
		if question.is_empty() {
			return Err(Error::InvalidRequest { message: "question is required.".to_string() });
		}

		let chunks = match &req.documents {
			Some(filenames) if !filenames.is_empty() => {
				self.store.get_documents(session_id, filenames).await
			},
			_ => self.store.get_all_chunks(session_id).await,
		};

		if chunks.is_empty() {
			return Err(Error::NoDocuments);
		}

		let history = self.memory.history(session_id).await;
		let standalone = self.rewrite_query(&history, question).await;
		let candidates = self
			.retrieve(session_id, &chunks, &standalone, self.cfg.retrieval.qa_top_k)
			.await?;
		let evidence =
			rerank::rerank(&standalone, candidates, self.cfg.retrieval.rerank_top_k as usize);

		if evidence.is_empty() {
			// Terminal: retrieval ran and found nothing relevant. Not an
			// error, and no generation call is made.
			return Ok(ChatResponse {
				answer: NO_EVIDENCE_ANSWER.to_string(),
				citations: Vec::new(),
			});
		}

		let answer = self
			.answer_with_fallback(QA_SYSTEM_PROMPT, &standalone, &evidence, QA_CONTEXT_BLOCKS)
			.await;
		let citations = citation::build_citations(&evidence);

		self.memory.append(session_id, Role::User, question).await;
		self.memory.append(session_id, Role::Assistant, &answer).await;

		Ok(ChatResponse { answer, citations })
	}
}
