use std::{collections::HashMap, sync::Arc};

use tokio::sync::RwLock;

use folio_domain::Chunk;

type SessionSlot = Arc<RwLock<Vec<Chunk>>>;

/// Session-keyed chunk store and the gate against cross-session leakage.
///
/// The outer lock is held only long enough to find or create a session slot;
/// chunk reads and writes go through the slot's own lock, so operations on
/// different sessions never block each other.
#[derive(Default)]
pub struct DocumentStore {
	sessions: RwLock<HashMap<String, SessionSlot>>,
}
impl DocumentStore {
	pub fn new() -> Self {
		Self::default()
	}

	async fn slot(&self, session_id: &str) -> Option<SessionSlot> {
		self.sessions.read().await.get(session_id).cloned()
	}

	async fn slot_or_create(&self, session_id: &str) -> SessionSlot {
		if let Some(slot) = self.slot(session_id).await {
			return slot;
		}

		self.sessions.write().await.entry(session_id.to_string()).or_default().clone()
	}

	/// Append chunks, creating the session entry if absent.
	pub async fn add_chunks(&self, session_id: &str, chunks: Vec<Chunk>) {
		let slot = self.slot_or_create(session_id).await;

		slot.write().await.extend(chunks);
	}

	/// Every chunk of the session in insertion order; empty for an unknown
	/// session, never an error.
	pub async fn get_all_chunks(&self, session_id: &str) -> Vec<Chunk> {
		match self.slot(session_id).await {
			Some(slot) => slot.read().await.clone(),
			None => Vec::new(),
		}
	}

	/// The subsequence of the session's chunks whose source file is in
	/// `filenames`, preserving store order.
	pub async fn get_documents(&self, session_id: &str, filenames: &[String]) -> Vec<Chunk> {
		let Some(slot) = self.slot(session_id).await else {
			return Vec::new();
		};
		let chunks = slot.read().await;

		chunks
			.iter()
			.filter(|chunk| filenames.iter().any(|name| name == &chunk.source_file))
			.cloned()
			.collect()
	}

	/// Remove the session entry entirely.
	pub async fn clear_session(&self, session_id: &str) {
		self.sessions.write().await.remove(session_id);
	}
}
