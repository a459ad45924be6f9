pub mod answer;
pub mod chat;
pub mod citation;
pub mod ingest;
pub mod rerank;
pub mod retrieve;
pub mod rewrite;
pub mod summarize;

mod error;

use std::sync::Arc;

use folio_config::{Config, EmbeddingProviderConfig, GenerationProviderConfig};
use folio_providers::{embedding, generation};
use folio_storage::{BoxFuture, ChatMemory, DocumentStore, VectorIndex};

pub use answer::{FALLBACK_MARKER, GenerationOutcome, NO_EVIDENCE_ANSWER};
pub use chat::{ChatRequest, ChatResponse};
pub use error::{Error, Result};
pub use ingest::{IngestFile, IngestRequest, IngestResponse};
pub use retrieve::HybridRetriever;
pub use summarize::{SummarizeRequest, SummarizeResponse};

pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, folio_providers::Result<Vec<Vec<f32>>>>;
}

pub trait GenerationProvider
where
	Self: Send + Sync,
{
	fn complete<'a>(
		&'a self,
		cfg: &'a GenerationProviderConfig,
		system: &'a str,
		user: &'a str,
	) -> BoxFuture<'a, folio_providers::Result<String>>;
}

struct DefaultProviders;

impl EmbeddingProvider for DefaultProviders {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, folio_providers::Result<Vec<Vec<f32>>>> {
		Box::pin(embedding::embed(cfg, texts))
	}
}

impl GenerationProvider for DefaultProviders {
	fn complete<'a>(
		&'a self,
		cfg: &'a GenerationProviderConfig,
		system: &'a str,
		user: &'a str,
	) -> BoxFuture<'a, folio_providers::Result<String>> {
		Box::pin(generation::complete(cfg, system, user))
	}
}

#[derive(Clone)]
pub struct Providers {
	pub embedding: Arc<dyn EmbeddingProvider>,
	pub generation: Arc<dyn GenerationProvider>,
}
impl Default for Providers {
	fn default() -> Self {
		let provider = Arc::new(DefaultProviders);

		Self { embedding: provider.clone(), generation: provider }
	}
}

pub struct FolioService {
	pub cfg: Config,
	pub store: DocumentStore,
	pub memory: ChatMemory,
	pub vectors: Arc<dyn VectorIndex>,
	pub providers: Providers,
}
impl FolioService {
	pub fn new(cfg: Config, vectors: Arc<dyn VectorIndex>) -> Self {
		Self::with_providers(cfg, vectors, Providers::default())
	}

	pub fn with_providers(
		cfg: Config,
		vectors: Arc<dyn VectorIndex>,
		providers: Providers,
	) -> Self {
		Self { cfg, store: DocumentStore::new(), memory: ChatMemory::new(), vectors, providers }
	}

	pub(crate) async fn embed_query(&self, query: &str) -> Result<Vec<f32>> {
		let embeddings = self
			.providers
			.embedding
			.embed(&self.cfg.providers.embedding, std::slice::from_ref(&query.to_string()))
			.await?;
		let vector = embeddings.into_iter().next().ok_or_else(|| Error::Provider {
			message: "Embedding provider returned no vectors.".to_string(),
		})?;

		if vector.len() != self.cfg.providers.embedding.dimensions as usize {
			return Err(Error::Provider {
				message: "Embedding vector dimension mismatch.".to_string(),
			});
		}

		Ok(vector)
	}
}
