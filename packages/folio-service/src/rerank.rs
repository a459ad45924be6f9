use ahash::AHashSet;

use folio_domain::SearchResult;

use crate::retrieve::tokenize;

/// Cheap second pass over the hybrid candidates: score by token overlap with
/// the query and keep the best `top_k`. Not a learned model; it exists to
/// shed hybrid-retrieval false positives before answer generation.
///
/// The sort is stable, so candidates with equal overlap keep their original
/// order, and the output is always a subset of the input.
pub fn rerank(query: &str, candidates: Vec<SearchResult>, top_k: usize) -> Vec<SearchResult> {
	let query_terms: AHashSet<String> = tokenize(query).into_iter().collect();
	let mut scored: Vec<(usize, SearchResult)> = candidates
		.into_iter()
		.map(|candidate| {
			let text_terms: AHashSet<String> =
				tokenize(&candidate.chunk.text).into_iter().collect();
			let overlap = query_terms.intersection(&text_terms).count();

			(overlap, candidate)
		})
		.collect();

	scored.sort_by(|a, b| b.0.cmp(&a.0));

	scored
		.into_iter()
		.take(top_k)
		.map(|(overlap, mut candidate)| {
			candidate.score = overlap as f32;

			candidate
		})
		.collect()
}
