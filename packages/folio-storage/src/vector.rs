use std::{future::Future, pin::Pin};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// One chunk's entry in the nearest-neighbor index. The session id travels
/// with the point so queries can be scoped to exactly one session.
#[derive(Clone, Debug)]
pub struct VectorRecord {
	pub chunk_id: String,
	pub session_id: String,
	pub source_file: String,
	pub page_number: u32,
	pub text: String,
	pub vector: Vec<f32>,
}

/// A nearest-neighbor hit with the chunk metadata that was stored alongside
/// the vector.
#[derive(Clone, Debug)]
pub struct VectorMatch {
	pub chunk_id: String,
	pub source_file: String,
	pub page_number: u32,
	pub text: String,
	pub score: f32,
}

/// External keyed nearest-neighbor search. Vector dimensionality is fixed for
/// the lifetime of an index; switching embedding models means a new index.
pub trait VectorIndex
where
	Self: Send + Sync,
{
	fn upsert<'a>(&'a self, records: &'a [VectorRecord]) -> BoxFuture<'a, crate::Result<()>>;

	/// Top-`top_k` nearest neighbors among the given session's points only.
	fn query<'a>(
		&'a self,
		session_id: &'a str,
		vector: Vec<f32>,
		top_k: u32,
	) -> BoxFuture<'a, crate::Result<Vec<VectorMatch>>>;

	/// Drop every point belonging to the session. Called before a replacing
	/// upload so stale vectors cannot resurface in later queries.
	fn delete_session<'a>(&'a self, session_id: &'a str) -> BoxFuture<'a, crate::Result<()>>;
}
