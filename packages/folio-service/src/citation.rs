use ahash::AHashSet;

use folio_domain::{Citation, SearchResult, text};

pub const SNIPPET_MAX_CHARS: usize = 200;

/// Map evidence to deduplicated citations. One citation per
/// (source_file, page_number) pair, keeping the first occurrence's snippet,
/// in first-seen order rather than score order, so citation numbering in a
/// rendered answer is reproducible.
pub fn build_citations(evidence: &[SearchResult]) -> Vec<Citation> {
	let mut seen = AHashSet::new();
	let mut citations = Vec::new();

	for result in evidence {
		let chunk = &result.chunk;

		// Chunks are validated at construction; this guards metadata that
		// arrived from outside the store, e.g. index payloads.
		if chunk.source_file.is_empty() || chunk.page_number == 0 {
			continue;
		}
		if !seen.insert((chunk.source_file.clone(), chunk.page_number)) {
			continue;
		}

		citations.push(Citation {
			source_file: chunk.source_file.clone(),
			page_number: chunk.page_number,
			snippet: text::snippet(&chunk.text, SNIPPET_MAX_CHARS),
		});
	}

	citations
}

#[cfg(test)]
mod tests {
	use folio_domain::Chunk;

	use super::*;

	fn result(source_file: &str, page: u32, sequence: usize, text: &str) -> SearchResult {
		SearchResult { score: 1.0, chunk: Chunk::new(source_file, page, sequence, text).unwrap() }
	}

	#[test]
	fn deduplicates_by_file_and_page() {
		let evidence = vec![
			result("a.pdf", 1, 0, "first snippet"),
			result("a.pdf", 1, 1, "second snippet, same page"),
			result("a.pdf", 2, 0, "different page"),
			result("b.pdf", 1, 0, "different file"),
		];
		let citations = build_citations(&evidence);

		assert_eq!(citations.len(), 3);
		assert_eq!(citations[0].snippet, "first snippet");
	}

	#[test]
	fn keeps_first_seen_order() {
		let evidence = vec![
			result("b.pdf", 9, 0, "ranked first"),
			result("a.pdf", 1, 0, "ranked second"),
		];
		let citations = build_citations(&evidence);

		assert_eq!(citations[0].source_file, "b.pdf");
		assert_eq!(citations[1].source_file, "a.pdf");
	}

	#[test]
	fn snippets_are_capped_at_200_chars() {
		let long = "x".repeat(500);
		let citations = build_citations(&[result("a.pdf", 1, 0, &long)]);

		assert_eq!(citations[0].snippet.chars().count(), SNIPPET_MAX_CHARS);
	}

	#[test]
	fn empty_evidence_produces_no_citations() {
		assert!(build_citations(&[]).is_empty());
	}
}
