use std::cmp::Ordering;

use ahash::{AHashMap, AHashSet};

use folio_domain::{Chunk, SearchResult};
use folio_storage::VectorMatch;

use crate::{Error, FolioService, Result};

const BM25_K1: f32 = 1.2;
const BM25_B: f32 = 0.75;
/// Candidates from the two legs are matched on (file, page, text prefix);
/// the prefix keeps the key cheap while still telling sibling chunks on the
/// same page apart.
const FUSION_PREFIX_CHARS: usize = 80;

/// Lowercased alphanumeric tokens. Shared by the lexical index and the
/// reranker so both sides score the same token stream.
pub fn tokenize(text: &str) -> Vec<String> {
	text.split(|ch: char| !ch.is_alphanumeric())
		.filter(|token| !token.is_empty())
		.map(|token| token.to_lowercase())
		.collect()
}

/// BM25 statistics fit to one session's corpus. Never shared across
/// sessions: document frequencies are only meaningful for the vocabulary the
/// index was fit to.
pub struct Bm25Index {
	doc_tokens: Vec<Vec<String>>,
	doc_freq: AHashMap<String, usize>,
	avg_len: f32,
}
impl Bm25Index {
	pub fn fit<'a>(texts: impl IntoIterator<Item = &'a str>) -> Self {
		let doc_tokens: Vec<Vec<String>> = texts.into_iter().map(tokenize).collect();
		let mut doc_freq = AHashMap::new();

		for tokens in &doc_tokens {
			let mut seen = AHashSet::new();

			for token in tokens {
				if seen.insert(token.as_str()) {
					*doc_freq.entry(token.clone()).or_insert(0) += 1;
				}
			}
		}

		let avg_len = if doc_tokens.is_empty() {
			0.0
		} else {
			doc_tokens.iter().map(|tokens| tokens.len() as f32).sum::<f32>()
				/ doc_tokens.len() as f32
		};

		Self { doc_tokens, doc_freq, avg_len }
	}

	/// One score per document, in corpus order. Documents sharing no term
	/// with the query score zero.
	pub fn scores(&self, query_tokens: &[String]) -> Vec<f32> {
		self.doc_tokens.iter().map(|tokens| self.score_doc(query_tokens, tokens)).collect()
	}

	fn score_doc(&self, query_tokens: &[String], doc_tokens: &[String]) -> f32 {
		if doc_tokens.is_empty() {
			return 0.0;
		}

		let total_docs = self.doc_tokens.len() as f32;
		let doc_len = doc_tokens.len() as f32;
		let mut term_freq = AHashMap::new();

		for token in doc_tokens {
			*term_freq.entry(token.as_str()).or_insert(0_usize) += 1;
		}

		let mut score = 0.0;

		for token in query_tokens {
			let Some(&freq) = term_freq.get(token.as_str()) else {
				continue;
			};
			let doc_freq = self.doc_freq.get(token).copied().unwrap_or(1) as f32;
			let idf = (1.0 + (total_docs - doc_freq + 0.5) / (doc_freq + 0.5)).ln();
			let numerator = freq as f32 * (BM25_K1 + 1.0);
			let denominator = freq as f32
				+ BM25_K1 * (1.0 - BM25_B + BM25_B * (doc_len / self.avg_len.max(1e-3)));

			score += idf * (numerator / denominator.max(1e-6));
		}

		score
	}
}

/// Per-request retriever over exactly one session's chunks. The lexical index
/// is fit at construction, so instances must never be cached or shared across
/// sessions.
pub struct HybridRetriever<'a> {
	chunks: &'a [Chunk],
	bm25: Bm25Index,
}
impl<'a> HybridRetriever<'a> {
	/// Fails fast on an empty corpus: querying before any upload is a caller
	/// bug, not a "no results" case.
	pub fn new(chunks: &'a [Chunk]) -> Result<Self> {
		if chunks.is_empty() {
			return Err(Error::EmptyCorpus);
		}

		Ok(Self { chunks, bm25: Bm25Index::fit(chunks.iter().map(|chunk| chunk.text.as_str())) })
	}

	pub fn lexical_candidates(&self, query: &str, limit: usize) -> Vec<SearchResult> {
		let query_tokens = tokenize(query);

		if query_tokens.is_empty() {
			tracing::warn!("Blank query passed to lexical retrieval.");

			return Vec::new();
		}

		let scores = self.bm25.scores(&query_tokens);
		let mut ranked: Vec<(usize, f32)> =
			scores.into_iter().enumerate().filter(|(_, score)| *score > 0.0).collect();

		ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
		ranked.truncate(limit);

		ranked
			.into_iter()
			.map(|(index, score)| SearchResult { score, chunk: self.chunks[index].clone() })
			.collect()
	}
}

type FusionKey = (String, u32, String);

fn fusion_key(source_file: &str, page_number: u32, text: &str) -> FusionKey {
	(source_file.to_string(), page_number, text.chars().take(FUSION_PREFIX_CHARS).collect())
}

/// Merge the two candidate lists into one ranking. Scores for the same key
/// are summed, not normalized; the sort is stable, so ties keep discovery
/// order with lexical candidates ahead of semantic ones.
pub fn fuse(
	lexical: Vec<SearchResult>,
	semantic: Vec<VectorMatch>,
	top_k: usize,
) -> Vec<SearchResult> {
	let mut order = Vec::new();
	let mut merged: AHashMap<FusionKey, SearchResult> = AHashMap::new();

	for result in lexical {
		let key =
			fusion_key(&result.chunk.source_file, result.chunk.page_number, &result.chunk.text);

		match merged.get_mut(&key) {
			Some(existing) => existing.score += result.score,
			None => {
				order.push(key.clone());
				merged.insert(key, result);
			},
		}
	}

	for hit in semantic {
		let key = fusion_key(&hit.source_file, hit.page_number, &hit.text);

		match merged.get_mut(&key) {
			Some(existing) => existing.score += hit.score,
			None => {
				let chunk = match Chunk::from_parts(
					hit.chunk_id,
					&hit.source_file,
					hit.page_number,
					&hit.text,
				) {
					Ok(chunk) => chunk,
					Err(err) => {
						tracing::warn!(
							error = %err,
							"Dropping semantic candidate with invalid metadata."
						);

						continue;
					},
				};

				order.push(key.clone());
				merged.insert(key, SearchResult { score: hit.score, chunk });
			},
		}
	}

	let mut results: Vec<SearchResult> =
		order.into_iter().filter_map(|key| merged.remove(&key)).collect();

	results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
	results.truncate(top_k);

	results
}

impl FolioService {
	/// Ranked evidence for one query over one session's chunk slice. The
	/// semantic leg runs concurrently with the lexical scoring and is allowed
	/// to fail: retrieval then degrades to lexical-only rather than failing
	/// the request.
	pub(crate) async fn retrieve(
		&self,
		session_id: &str,
		chunks: &[Chunk],
		query: &str,
		top_k: u32,
	) -> Result<Vec<SearchResult>> {
		let retriever = HybridRetriever::new(chunks)?;
		let leg_k = self.cfg.retrieval.candidate_k.max(top_k);
		let (semantic, lexical) = tokio::join!(
			self.semantic_candidates(session_id, query, leg_k),
			async { retriever.lexical_candidates(query, leg_k as usize) },
		);
		let semantic = match semantic {
			Ok(hits) => hits,
			Err(err) => {
				tracing::warn!(
					error = %err,
					"Semantic leg failed; degrading to lexical-only retrieval."
				);

				Vec::new()
			},
		};
		// The index is session-scoped, but the corpus may be narrower still
		// (a documents filter). Only chunks in the corpus are evidence.
		let corpus_ids: AHashSet<&str> =
			chunks.iter().map(|chunk| chunk.chunk_id.as_str()).collect();
		let semantic: Vec<VectorMatch> = semantic
			.into_iter()
			.filter(|hit| corpus_ids.contains(hit.chunk_id.as_str()))
			.collect();

		Ok(fuse(lexical, semantic, top_k as usize))
	}

	async fn semantic_candidates(
		&self,
		session_id: &str,
		query: &str,
		top_k: u32,
	) -> Result<Vec<VectorMatch>> {
		let vector = self.embed_query(query).await?;

		Ok(self.vectors.query(session_id, vector, top_k).await?)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn chunk(source_file: &str, page: u32, sequence: usize, text: &str) -> Chunk {
		Chunk::new(source_file, page, sequence, text).unwrap()
	}

	fn hit(chunk: &Chunk, score: f32) -> VectorMatch {
		VectorMatch {
			chunk_id: chunk.chunk_id.clone(),
			source_file: chunk.source_file.clone(),
			page_number: chunk.page_number,
			text: chunk.text.clone(),
			score,
		}
	}

	#[test]
	fn tokenize_lowercases_and_strips_punctuation() {
		assert_eq!(tokenize("Hello, World! 42"), ["hello", "world", "42"]);
	}

	#[test]
	fn empty_corpus_fails_fast() {
		assert!(matches!(HybridRetriever::new(&[]), Err(Error::EmptyCorpus)));
	}

	#[test]
	fn bm25_prefers_the_matching_document() {
		let chunks = vec![
			chunk("doc.pdf", 1, 0, "sentiment analysis classifies text polarity"),
			chunk("doc.pdf", 1, 1, "transformers process sequences in parallel"),
			chunk("doc.pdf", 2, 0, "gradient descent minimizes loss functions"),
		];
		let retriever = HybridRetriever::new(&chunks).unwrap();
		let results = retriever.lexical_candidates("what is sentiment analysis", 3);

		assert!(!results.is_empty());
		assert_eq!(results[0].chunk.chunk_id, "doc.pdf_p1_c0");
	}

	#[test]
	fn non_matching_documents_are_excluded() {
		let chunks = vec![
			chunk("doc.pdf", 1, 0, "alpha beta gamma"),
			chunk("doc.pdf", 1, 1, "delta epsilon zeta"),
		];
		let retriever = HybridRetriever::new(&chunks).unwrap();
		let results = retriever.lexical_candidates("alpha", 10);

		assert_eq!(results.len(), 1);
		assert_eq!(results[0].chunk.chunk_id, "doc.pdf_p1_c0");
	}

	#[test]
	fn blank_query_yields_no_lexical_candidates() {
		let chunks = vec![chunk("doc.pdf", 1, 0, "some text")];
		let retriever = HybridRetriever::new(&chunks).unwrap();

		assert!(retriever.lexical_candidates("  !!  ", 10).is_empty());
	}

	#[test]
	fn fusion_sums_scores_for_the_same_chunk() {
		let shared = chunk("doc.pdf", 1, 0, "shared candidate text");
		let lexical = vec![SearchResult { score: 2.0, chunk: shared.clone() }];
		let semantic = vec![hit(&shared, 0.5)];
		let fused = fuse(lexical, semantic, 10);

		assert_eq!(fused.len(), 1);
		assert!((fused[0].score - 2.5).abs() < 1e-6);
	}

	#[test]
	fn fusion_keeps_semantic_only_candidates() {
		let lexical_chunk = chunk("doc.pdf", 1, 0, "keyword match text");
		let semantic_chunk = chunk("doc.pdf", 2, 0, "semantically related text");
		let fused = fuse(
			vec![SearchResult { score: 1.0, chunk: lexical_chunk }],
			vec![hit(&semantic_chunk, 0.9)],
			10,
		);

		assert_eq!(fused.len(), 2);
	}

	#[test]
	fn fusion_ties_keep_lexical_discovery_order() {
		let first = chunk("doc.pdf", 1, 0, "first text");
		let second = chunk("doc.pdf", 1, 1, "second text");
		let fused = fuse(
			vec![
				SearchResult { score: 1.0, chunk: first },
				SearchResult { score: 1.0, chunk: second },
			],
			Vec::new(),
			10,
		);

		assert_eq!(fused[0].chunk.chunk_id, "doc.pdf_p1_c0");
		assert_eq!(fused[1].chunk.chunk_id, "doc.pdf_p1_c1");
	}

	#[test]
	fn fusion_truncates_to_top_k() {
		let chunks: Vec<Chunk> =
			(0..5).map(|index| chunk("doc.pdf", 1, index, &format!("text {index}"))).collect();
		let lexical = chunks
			.iter()
			.enumerate()
			.map(|(index, chunk)| SearchResult { score: index as f32, chunk: chunk.clone() })
			.collect();
		let fused = fuse(lexical, Vec::new(), 2);

		assert_eq!(fused.len(), 2);
		assert_eq!(fused[0].chunk.chunk_id, "doc.pdf_p1_c4");
	}

	#[test]
	fn distinct_chunks_sharing_a_page_do_not_merge() {
		let first = chunk("doc.pdf", 1, 0, "completely different opening words here");
		let second = chunk("doc.pdf", 1, 1, "another body of text on the same page");
		let fused = fuse(
			vec![SearchResult { score: 1.0, chunk: first }],
			vec![hit(&second, 0.4)],
			10,
		);

		assert_eq!(fused.len(), 2);
	}
}
