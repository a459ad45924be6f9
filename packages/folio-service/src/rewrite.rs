use folio_domain::ChatMessage;

use crate::FolioService;

/// Turns of history offered to the rewriter. Older turns add noise faster
/// than context.
const HISTORY_WINDOW: usize = 6;
const REWRITE_SYSTEM_PROMPT: &str = "Given a conversation history and the latest question, \
	rewrite the question to be fully self-contained. Return only the rewritten question. \
	Do not answer it.";

pub fn build_rewrite_input(history: &[ChatMessage], question: &str) -> String {
	let recent = &history[history.len().saturating_sub(HISTORY_WINDOW)..];
	let mut input = String::from("History:\n");

	for message in recent {
		input.push_str(message.role.as_str());
		input.push_str(": ");
		input.push_str(&message.content);
		input.push('\n');
	}

	input.push_str("\nQuestion:\n");
	input.push_str(question);

	input
}

impl FolioService {
	/// Rewrite a follow-up into a standalone question. Rewriting is an
	/// accuracy enhancement, never a correctness dependency: with no history
	/// there is no call at all, and any failure falls back to the original
	/// question.
	pub async fn rewrite_query(&self, history: &[ChatMessage], question: &str) -> String {
		if history.is_empty() {
			return question.to_string();
		}

		let input = build_rewrite_input(history, question);

		match self
			.providers
			.generation
			.complete(&self.cfg.providers.generation, REWRITE_SYSTEM_PROMPT, &input)
			.await
		{
			Ok(rewritten) if !rewritten.trim().is_empty() => rewritten.trim().to_string(),
			Ok(_) => {
				tracing::warn!("Query rewrite came back blank; using the original question.");

				question.to_string()
			},
			Err(err) => {
				tracing::warn!(error = %err, "Query rewriting failed; using the original question.");

				question.to_string()
			},
		}
	}
}

#[cfg(test)]
mod tests {
	use folio_domain::Role;

	use super::*;

	fn message(role: Role, content: &str) -> ChatMessage {
		ChatMessage::new(role, content)
	}

	#[test]
	fn input_contains_only_the_last_six_turns() {
		let history: Vec<ChatMessage> =
			(0..9).map(|index| message(Role::User, &format!("turn {index}"))).collect();
		let input = build_rewrite_input(&history, "latest question");

		assert!(!input.contains("turn 2"));
		assert!(input.contains("turn 3"));
		assert!(input.contains("turn 8"));
		assert!(input.ends_with("latest question"));
	}

	#[test]
	fn input_labels_roles() {
		let history = vec![
			message(Role::User, "what is BM25?"),
			message(Role::Assistant, "a lexical ranking function"),
		];
		let input = build_rewrite_input(&history, "and its parameters?");

		assert!(input.contains("user: what is BM25?"));
		assert!(input.contains("assistant: a lexical ranking function"));
	}
}
