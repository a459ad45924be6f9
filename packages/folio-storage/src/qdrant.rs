use std::collections::HashMap;

use qdrant_client::{
	Qdrant,
	client::Payload,
	qdrant::{
		Condition, CreateCollectionBuilder, DeletePointsBuilder, Distance, Filter, PointStruct,
		Query, QueryPointsBuilder, ScoredPoint, UpsertPointsBuilder, Value, VectorParamsBuilder,
		value::Kind,
	},
};
use uuid::Uuid;

use crate::{BoxFuture, Result, VectorIndex, VectorMatch, VectorRecord};

/// Qdrant-backed nearest-neighbor index. One cosine-metric dense vector per
/// chunk; chunk metadata and the owning session id live in the point payload,
/// and every query filters on the session id.
pub struct QdrantIndex {
	pub client: Qdrant,
	pub collection: String,
	pub vector_dim: u32,
}
impl QdrantIndex {
	pub fn new(cfg: &folio_config::Qdrant) -> Result<Self> {
		let client = Qdrant::from_url(&cfg.url).build()?;

		Ok(Self { client, collection: cfg.collection.clone(), vector_dim: cfg.vector_dim })
	}

	/// Create the collection if it does not exist yet. Idempotent; the vector
	/// dimension is fixed for the lifetime of the collection.
	pub async fn ensure_collection(&self) -> Result<()> {
		if self.client.collection_exists(&self.collection).await? {
			return Ok(());
		}

		let builder = CreateCollectionBuilder::new(self.collection.clone())
			.vectors_config(VectorParamsBuilder::new(self.vector_dim.into(), Distance::Cosine));

		self.client.create_collection(builder).await?;

		Ok(())
	}

	fn session_filter(session_id: &str) -> Filter {
		Filter::all([Condition::matches("session_id", session_id.to_string())])
	}

	/// Qdrant point ids must be integers or UUIDs, so the string chunk id is
	/// mapped to a deterministic UUID. The session id is part of the input:
	/// two sessions uploading the same file must not collide on points.
	fn point_id(session_id: &str, chunk_id: &str) -> String {
		Uuid::new_v5(&Uuid::NAMESPACE_OID, format!("{session_id}/{chunk_id}").as_bytes())
			.to_string()
	}
}
impl VectorIndex for QdrantIndex {
	fn upsert<'a>(&'a self, records: &'a [VectorRecord]) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			let mut points = Vec::with_capacity(records.len());

			for record in records {
				let mut payload_map = HashMap::new();

				payload_map.insert("chunk_id".to_string(), Value::from(record.chunk_id.clone()));
				payload_map
					.insert("session_id".to_string(), Value::from(record.session_id.clone()));
				payload_map
					.insert("source_file".to_string(), Value::from(record.source_file.clone()));
				payload_map
					.insert("page_number".to_string(), Value::from(record.page_number as i64));
				payload_map.insert("text".to_string(), Value::from(record.text.clone()));

				let point = PointStruct::new(
					Self::point_id(&record.session_id, &record.chunk_id),
					record.vector.clone(),
					Payload::from(payload_map),
				);

				points.push(point);
			}

			let upsert = UpsertPointsBuilder::new(self.collection.clone(), points).wait(true);

			self.client.upsert_points(upsert).await?;

			Ok(())
		})
	}

	fn query<'a>(
		&'a self,
		session_id: &'a str,
		vector: Vec<f32>,
		top_k: u32,
	) -> BoxFuture<'a, Result<Vec<VectorMatch>>> {
		Box::pin(async move {
			let search = QueryPointsBuilder::new(self.collection.clone())
				.query(Query::new_nearest(vector))
				.filter(Self::session_filter(session_id))
				.with_payload(true)
				.limit(top_k as u64);
			let response = self.client.query(search).await?;
			let mut matches = Vec::with_capacity(response.result.len());

			for point in response.result {
				match parse_match(point) {
					Ok(hit) => matches.push(hit),
					Err(err) => {
						tracing::warn!(error = %err, "Dropping vector match with bad payload.");
					},
				}
			}

			Ok(matches)
		})
	}

	fn delete_session<'a>(&'a self, session_id: &'a str) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			let delete = DeletePointsBuilder::new(self.collection.clone())
				.points(Self::session_filter(session_id))
				.wait(true);

			self.client.delete_points(delete).await?;

			Ok(())
		})
	}
}

fn parse_match(point: ScoredPoint) -> Result<VectorMatch> {
	let chunk_id = payload_str(&point.payload, "chunk_id")?;
	let source_file = payload_str(&point.payload, "source_file")?;
	let page_number = payload_u32(&point.payload, "page_number")?;
	let text = payload_str(&point.payload, "text")?;

	Ok(VectorMatch { chunk_id, source_file, page_number, text, score: point.score })
}

fn payload_str(payload: &HashMap<String, Value>, key: &str) -> Result<String> {
	match payload.get(key).and_then(|value| value.kind.as_ref()) {
		Some(Kind::StringValue(value)) => Ok(value.clone()),
		_ => Err(crate::Error::InvalidPayload(format!("missing string field {key:?}"))),
	}
}

fn payload_u32(payload: &HashMap<String, Value>, key: &str) -> Result<u32> {
	match payload.get(key).and_then(|value| value.kind.as_ref()) {
		Some(Kind::IntegerValue(value)) => u32::try_from(*value)
			.map_err(|_| crate::Error::InvalidPayload(format!("field {key:?} out of range"))),
		_ => Err(crate::Error::InvalidPayload(format!("missing integer field {key:?}"))),
	}
}
