//! Test doubles for the service and API suites: a deterministic embedder, an
//! in-memory vector index, and scripted/failing generation providers. Nothing
//! here touches the network.

use std::{
	collections::hash_map::DefaultHasher,
	hash::{Hash, Hasher},
	sync::atomic::{AtomicUsize, Ordering},
};

use tokio::sync::RwLock;

use folio_config::{
	Chunking, Config, EmbeddingProviderConfig, GenerationProviderConfig, Providers, Qdrant,
	Retrieval, Service, Storage,
};
use folio_domain::Chunk;
use folio_service::{EmbeddingProvider, GenerationProvider};
use folio_storage::{BoxFuture, VectorIndex, VectorMatch, VectorRecord};

/// A config wired for offline tests: fake endpoints, small vectors.
pub fn test_config(dimensions: u32) -> Config {
	Config {
		service: Service { http_bind: "127.0.0.1:0".to_string(), log_level: "info".to_string() },
		storage: Storage {
			qdrant: Qdrant {
				url: "http://127.0.0.1:6334".to_string(),
				collection: "folio_test".to_string(),
				vector_dim: dimensions,
			},
		},
		providers: Providers {
			embedding: EmbeddingProviderConfig {
				provider_id: "fake".to_string(),
				api_base: "http://127.0.0.1:0".to_string(),
				api_key: "test-key".to_string(),
				path: "/v1/embeddings".to_string(),
				model: "fake-embedding".to_string(),
				dimensions,
				timeout_ms: 1_000,
				default_headers: serde_json::Map::new(),
			},
			generation: GenerationProviderConfig {
				provider_id: "fake".to_string(),
				api_base: "http://127.0.0.1:0".to_string(),
				api_key: "test-key".to_string(),
				path: "/v1/chat/completions".to_string(),
				model: "fake-generation".to_string(),
				temperature: 0.0,
				timeout_ms: 1_000,
				default_headers: serde_json::Map::new(),
			},
		},
		chunking: Chunking { chunk_size: 800, chunk_overlap: 150 },
		retrieval: Retrieval { candidate_k: 12, qa_top_k: 12, summary_top_k: 60, rerank_top_k: 8 },
	}
}

pub fn make_chunk(source_file: &str, page: u32, sequence: usize, text: &str) -> Chunk {
	Chunk::new(source_file, page, sequence, text).expect("valid test chunk")
}

/// Bag-of-tokens embedding: each token hashes to one dimension, the vector is
/// L2-normalized. Texts sharing vocabulary get high cosine similarity, which
/// is all the retrieval tests need, and identical text always embeds
/// identically.
pub fn embed_text(text: &str, dimensions: usize) -> Vec<f32> {
	let mut vector = vec![0.0_f32; dimensions.max(1)];

	for token in text.split_whitespace() {
		let token = token.to_lowercase();
		let mut hasher = DefaultHasher::new();

		token.hash(&mut hasher);

		let slot = (hasher.finish() % vector.len() as u64) as usize;

		vector[slot] += 1.0;
	}

	let norm = vector.iter().map(|value| value * value).sum::<f32>().sqrt();

	if norm > 0.0 {
		for value in &mut vector {
			*value /= norm;
		}
	}

	vector
}

pub fn cosine(a: &[f32], b: &[f32]) -> f32 {
	let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
	let norm_a: f32 = a.iter().map(|value| value * value).sum::<f32>().sqrt();
	let norm_b: f32 = b.iter().map(|value| value * value).sum::<f32>().sqrt();

	if norm_a == 0.0 || norm_b == 0.0 { 0.0 } else { dot / (norm_a * norm_b) }
}

/// Deterministic [`EmbeddingProvider`] built on [`embed_text`].
pub struct HashEmbedding;

impl EmbeddingProvider for HashEmbedding {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, folio_providers::Result<Vec<Vec<f32>>>> {
		let vectors =
			texts.iter().map(|text| embed_text(text, cfg.dimensions as usize)).collect();

		Box::pin(async move { Ok(vectors) })
	}
}

/// In-memory stand-in for the external nearest-neighbor service. Filters by
/// session id exactly like the real index.
#[derive(Default)]
pub struct MemoryVectorIndex {
	records: RwLock<Vec<VectorRecord>>,
}
impl MemoryVectorIndex {
	pub fn new() -> Self {
		Self::default()
	}

	pub async fn len(&self) -> usize {
		self.records.read().await.len()
	}

	pub async fn is_empty(&self) -> bool {
		self.records.read().await.is_empty()
	}
}
impl VectorIndex for MemoryVectorIndex {
	fn upsert<'a>(
		&'a self,
		records: &'a [VectorRecord],
	) -> BoxFuture<'a, folio_storage::Result<()>> {
		Box::pin(async move {
			let mut stored = self.records.write().await;

			for record in records {
				stored.retain(|existing| {
					existing.session_id != record.session_id
						|| existing.chunk_id != record.chunk_id
				});
				stored.push(record.clone());
			}

			Ok(())
		})
	}

	fn query<'a>(
		&'a self,
		session_id: &'a str,
		vector: Vec<f32>,
		top_k: u32,
	) -> BoxFuture<'a, folio_storage::Result<Vec<VectorMatch>>> {
		Box::pin(async move {
			let stored = self.records.read().await;
			let mut hits: Vec<VectorMatch> = stored
				.iter()
				.filter(|record| record.session_id == session_id)
				.map(|record| VectorMatch {
					chunk_id: record.chunk_id.clone(),
					source_file: record.source_file.clone(),
					page_number: record.page_number,
					text: record.text.clone(),
					score: cosine(&vector, &record.vector),
				})
				.collect();

			hits.sort_by(|a, b| {
				b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal)
			});
			hits.truncate(top_k as usize);

			Ok(hits)
		})
	}

	fn delete_session<'a>(
		&'a self,
		session_id: &'a str,
	) -> BoxFuture<'a, folio_storage::Result<()>> {
		Box::pin(async move {
			self.records.write().await.retain(|record| record.session_id != session_id);

			Ok(())
		})
	}
}

/// Generation provider that always answers with the same text and counts its
/// calls.
pub struct ScriptedGeneration {
	reply: String,
	calls: AtomicUsize,
}
impl ScriptedGeneration {
	pub fn new(reply: impl Into<String>) -> Self {
		Self { reply: reply.into(), calls: AtomicUsize::new(0) }
	}

	pub fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}
}
impl GenerationProvider for ScriptedGeneration {
	fn complete<'a>(
		&'a self,
		_cfg: &'a GenerationProviderConfig,
		_system: &'a str,
		_user: &'a str,
	) -> BoxFuture<'a, folio_providers::Result<String>> {
		self.calls.fetch_add(1, Ordering::SeqCst);

		let reply = self.reply.clone();

		Box::pin(async move { Ok(reply) })
	}
}

/// Generation provider that fails every call, for exercising fallback paths.
#[derive(Default)]
pub struct FailingGeneration {
	calls: AtomicUsize,
}
impl FailingGeneration {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}
}
impl GenerationProvider for FailingGeneration {
	fn complete<'a>(
		&'a self,
		_cfg: &'a GenerationProviderConfig,
		_system: &'a str,
		_user: &'a str,
	) -> BoxFuture<'a, folio_providers::Result<String>> {
		self.calls.fetch_add(1, Ordering::SeqCst);

		Box::pin(async move {
			Err(folio_providers::Error::InvalidResponse {
				message: "generation provider is down".to_string(),
			})
		})
	}
}
