use std::sync::LazyLock;

use regex::Regex;

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("static pattern"));

/// Collapse whitespace runs into single spaces and trim the ends.
///
/// Extracted page text arrives with arbitrary line breaks and padding; every
/// downstream consumer (chunking, indexing, snippets) expects one-line prose.
pub fn normalize_whitespace(text: &str) -> String {
	WHITESPACE.replace_all(text.trim(), " ").into_owned()
}

/// Truncate to at most `max_chars` characters, never splitting a character.
pub fn snippet(text: &str, max_chars: usize) -> String {
	if text.chars().count() <= max_chars {
		return text.to_string();
	}

	text.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn normalizes_whitespace_runs() {
		assert_eq!(normalize_whitespace("  a\n\tb   c  "), "a b c");
	}

	#[test]
	fn normalize_of_blank_text_is_empty() {
		assert_eq!(normalize_whitespace(" \n\t "), "");
	}

	#[test]
	fn snippet_respects_char_boundaries() {
		let text = "héllo wörld";
		let cut = snippet(text, 4);

		assert_eq!(cut, "héll");
		assert_eq!(cut.chars().count(), 4);
	}

	#[test]
	fn snippet_keeps_short_text_intact() {
		assert_eq!(snippet("short", 200), "short");
	}
}
