use time::OffsetDateTime;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
	User,
	Assistant,
}
impl Role {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::User => "user",
			Self::Assistant => "assistant",
		}
	}
}

/// One turn of a session's conversation log. The log is append-only and
/// strictly chronological; messages are never mutated after creation.
#[derive(Clone, Debug)]
pub struct ChatMessage {
	pub role: Role,
	pub content: String,
	pub created_at: OffsetDateTime,
}
impl ChatMessage {
	pub fn new(role: Role, content: impl Into<String>) -> Self {
		Self { role, content: content.into(), created_at: OffsetDateTime::now_utc() }
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn role_labels() {
		assert_eq!(Role::User.as_str(), "user");
		assert_eq!(Role::Assistant.as_str(), "assistant");
	}
}
