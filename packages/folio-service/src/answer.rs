use folio_domain::{SearchResult, text};

use crate::FolioService;

/// Context block caps per flow. Question answering wants a tight, relevant
/// window; summarization reads broadly.
pub(crate) const QA_CONTEXT_BLOCKS: usize = 15;
pub(crate) const SUMMARY_CONTEXT_BLOCKS: usize = 60;

pub const NO_EVIDENCE_ANSWER: &str =
	"I could not find this information in the uploaded documents.";
/// Every extractive fallback answer starts with this marker.
pub const FALLBACK_MARKER: &str = "Generation unavailable.";

const FALLBACK_SNIPPET_CHARS: usize = 300;

pub(crate) const QA_SYSTEM_PROMPT: &str = "You are a document-grounded assistant.\n\
	Rules:\n\
	- Answer ONLY using the provided context.\n\
	- Every factual sentence must end with a citation marker like [Source 2].\n\
	- If the answer is not present, say: \"The answer is not available in the provided documents.\"\n\
	- Do NOT use external knowledge.\n\
	- Be concise and factual.";

pub(crate) const SUMMARY_SYSTEM_PROMPT: &str = "You are an expert technical analyst. Provide a \
	multi-level summary of the provided document context.\n\
	Structure your response as follows:\n\
	Executive Summary: a high-level three-sentence overview.\n\
	Key Themes: the 3-5 main themes or arguments.\n\
	Deep-Dive Analysis: one detailed paragraph per theme.\n\
	Data & Evidence: specific metrics, dates, identifiers, clauses.\n\
	Strict rules:\n\
	- Use ONLY the provided context.\n\
	- Every factual sentence MUST end with a citation marker like [Source 3].\n\
	- If information is missing, say \"Information not available in provided documents.\"\n\
	- Maintain a professional, objective tone.";

/// Outcome of one generation attempt. Failure is a value here, not an error:
/// the caller's fallback is a pure function of this outcome.
#[derive(Clone, Debug)]
pub enum GenerationOutcome {
	Generated(String),
	Unavailable,
}

/// Format evidence into numbered, source-labeled context blocks. The indices
/// line up with the citation markers the grounding prompts demand.
pub(crate) fn build_context(evidence: &[SearchResult], max_blocks: usize) -> String {
	let mut context = String::new();

	for (index, result) in evidence.iter().take(max_blocks).enumerate() {
		let chunk = &result.chunk;

		context.push_str(&format!(
			"[Source {}] {} (page {}):\n{}\n\n",
			index + 1,
			chunk.source_file,
			chunk.page_number,
			chunk.text,
		));
	}

	context
}

/// Deterministic substitute answer assembled from the evidence itself.
pub(crate) fn fallback_answer(evidence: &[SearchResult]) -> String {
	let mut answer = format!("{FALLBACK_MARKER} Relevant excerpts from the documents:\n");

	for result in evidence {
		answer.push_str("\n- ");
		answer.push_str(&text::snippet(&result.chunk.text, FALLBACK_SNIPPET_CHARS));
	}

	answer
}

impl FolioService {
	pub(crate) async fn generate(&self, system: &str, user: &str) -> GenerationOutcome {
		match self
			.providers
			.generation
			.complete(&self.cfg.providers.generation, system, user)
			.await
		{
			Ok(answer) => GenerationOutcome::Generated(answer),
			Err(err) => {
				tracing::warn!(error = %err, "Generation failed; taking the extractive fallback.");

				GenerationOutcome::Unavailable
			},
		}
	}

	/// Grounded answer over the evidence, or the extractive fallback if the
	/// generation capability is down. Never an error: this path must always
	/// produce an answer string.
	pub(crate) async fn answer_with_fallback(
		&self,
		system: &str,
		question: &str,
		evidence: &[SearchResult],
		max_blocks: usize,
	) -> String {
		let context = build_context(evidence, max_blocks);
		let user = format!("Context:\n{context}Question:\n{question}");

		match self.generate(system, &user).await {
			GenerationOutcome::Generated(answer) => answer,
			GenerationOutcome::Unavailable => fallback_answer(evidence),
		}
	}
}

#[cfg(test)]
mod tests {
	use folio_domain::Chunk;

	use super::*;

	fn result(sequence: usize, text: &str) -> SearchResult {
		SearchResult { score: 1.0, chunk: Chunk::new("doc.pdf", 1, sequence, text).unwrap() }
	}

	#[test]
	fn context_blocks_are_numbered_and_source_labeled() {
		let evidence = vec![result(0, "first block"), result(1, "second block")];
		let context = build_context(&evidence, 15);

		assert!(context.contains("[Source 1] doc.pdf (page 1):\nfirst block"));
		assert!(context.contains("[Source 2] doc.pdf (page 1):\nsecond block"));
	}

	#[test]
	fn context_respects_the_block_cap() {
		let evidence: Vec<SearchResult> =
			(0..20).map(|index| result(index, &format!("block {index}"))).collect();
		let context = build_context(&evidence, 15);

		assert!(context.contains("[Source 15]"));
		assert!(!context.contains("[Source 16]"));
	}

	#[test]
	fn fallback_starts_with_the_marker_and_truncates_snippets() {
		let long = "y".repeat(600);
		let evidence = vec![result(0, &long)];
		let answer = fallback_answer(&evidence);

		assert!(answer.starts_with(FALLBACK_MARKER));

		let excerpt = answer.lines().last().unwrap().trim_start_matches("- ");

		assert_eq!(excerpt.chars().count(), 300);
	}
}
