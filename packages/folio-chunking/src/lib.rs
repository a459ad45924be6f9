use unicode_segmentation::UnicodeSegmentation;

use folio_domain::{Chunk, Error, Page, Result};

#[derive(Clone, Debug)]
pub struct ChunkingConfig {
	/// Maximum window length in characters.
	pub chunk_size: usize,
	/// Characters shared between consecutive windows.
	pub overlap: usize,
}

/// Split every page into overlapping, citation-tagged windows.
///
/// A page that fails to split (blank text, or chunk construction rejected by
/// domain validation) is skipped with a warning; one bad page never aborts
/// the batch. Identical input produces identical chunk ids.
pub fn chunk_pages(pages: &[Page], cfg: &ChunkingConfig) -> Vec<Chunk> {
	let mut chunks = Vec::new();

	for page in pages {
		match chunk_page(page, cfg) {
			Ok(mut page_chunks) => chunks.append(&mut page_chunks),
			Err(err) => {
				tracing::warn!(
					error = %err,
					source_file = %page.source_file,
					page_number = page.page_number,
					"Chunking failed for page; skipping it."
				);
			},
		}
	}

	tracing::debug!(chunk_count = chunks.len(), "Chunked page batch.");

	chunks
}

fn chunk_page(page: &Page, cfg: &ChunkingConfig) -> Result<Vec<Chunk>> {
	let windows = split_text(&page.text, cfg);

	if windows.is_empty() {
		return Err(Error::InvalidPage { message: "page text is blank.".to_string() });
	}

	windows
		.into_iter()
		.enumerate()
		.map(|(sequence, window)| {
			Chunk::new(&page.source_file, page.page_number, sequence, &window)
		})
		.collect()
}

/// Split text into windows of at most `chunk_size` characters, each sharing
/// `overlap` characters with its predecessor. Cuts prefer a word boundary
/// when one falls late enough in the window to keep forward progress;
/// otherwise the cut is a hard character cut.
pub fn split_text(text: &str, cfg: &ChunkingConfig) -> Vec<String> {
	if text.trim().is_empty() {
		return Vec::new();
	}

	let chunk_size = cfg.chunk_size.max(1);
	let overlap = cfg.overlap.min(chunk_size - 1);
	// Byte offset of every char boundary, with the text end appended so any
	// char index in 0..=total maps to a slice position.
	let mut offsets: Vec<usize> = text.char_indices().map(|(offset, _)| offset).collect();
	let total = offsets.len();

	offsets.push(text.len());

	if total <= chunk_size {
		return vec![text.trim().to_string()];
	}

	// Char index of every word boundary, for preferring clean cuts.
	let mut bounds = Vec::new();
	let mut cursor = 0_usize;

	for (_, word) in text.split_word_bound_indices() {
		bounds.push(cursor);

		cursor += word.chars().count();
	}

	bounds.push(total);

	let mut windows = Vec::new();
	let mut start = 0_usize;

	loop {
		let hard_end = (start + chunk_size).min(total);
		let end = if hard_end < total {
			// The boundary must sit past the shared overlap, or the next
			// window would start at or before this one.
			let in_window = bounds.partition_point(|&bound| bound <= hard_end);

			bounds[..in_window]
				.iter()
				.rev()
				.find(|&&bound| bound > start + overlap)
				.copied()
				.unwrap_or(hard_end)
		} else {
			total
		};
		let window = text[offsets[start]..offsets[end]].trim();

		if !window.is_empty() {
			windows.push(window.to_string());
		}
		if end == total {
			break;
		}

		start = end - overlap;
	}

	windows
}
