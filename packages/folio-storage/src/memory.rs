use std::{collections::HashMap, sync::Arc};

use tokio::sync::RwLock;

use folio_domain::{ChatMessage, Role};

type HistorySlot = Arc<RwLock<Vec<ChatMessage>>>;

/// Append-only per-session conversation log, sharded like [`DocumentStore`]
/// so sessions never contend with each other.
///
/// [`DocumentStore`]: crate::DocumentStore
#[derive(Default)]
pub struct ChatMemory {
	sessions: RwLock<HashMap<String, HistorySlot>>,
}
impl ChatMemory {
	pub fn new() -> Self {
		Self::default()
	}

	pub async fn append(&self, session_id: &str, role: Role, content: &str) {
		let slot = {
			let sessions = self.sessions.read().await;

			sessions.get(session_id).cloned()
		};
		let slot = match slot {
			Some(slot) => slot,
			None => {
				self.sessions.write().await.entry(session_id.to_string()).or_default().clone()
			},
		};

		slot.write().await.push(ChatMessage::new(role, content));
	}

	pub async fn history(&self, session_id: &str) -> Vec<ChatMessage> {
		let slot = self.sessions.read().await.get(session_id).cloned();

		match slot {
			Some(slot) => slot.read().await.clone(),
			None => Vec::new(),
		}
	}
}
