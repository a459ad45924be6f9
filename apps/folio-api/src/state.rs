use std::sync::Arc;

use folio_service::FolioService;
use folio_storage::QdrantIndex;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<FolioService>,
}
impl AppState {
	pub async fn new(config: folio_config::Config) -> color_eyre::Result<Self> {
		let qdrant = QdrantIndex::new(&config.storage.qdrant)?;

		qdrant.ensure_collection().await?;

		let service = FolioService::new(config, Arc::new(qdrant));

		Ok(Self { service: Arc::new(service) })
	}

	/// Wrap an already-wired service; used by tests to inject offline
	/// providers and an in-memory vector index.
	pub fn with_service(service: FolioService) -> Self {
		Self { service: Arc::new(service) }
	}
}
