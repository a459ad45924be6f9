use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;

use folio_service::{
	ChatRequest, ChatResponse, Error as ServiceError, IngestRequest, IngestResponse,
	SummarizeRequest, SummarizeResponse,
};

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/documents/upload", post(upload))
		.route("/v1/chat", post(chat))
		.route("/v1/summarize", post(summarize))
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn upload(
	State(state): State<AppState>,
	Json(payload): Json<IngestRequest>,
) -> Result<Json<IngestResponse>, ApiError> {
	let response = state.service.ingest(payload).await?;

	Ok(Json(response))
}

async fn chat(
	State(state): State<AppState>,
	Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
	let response = state.service.chat(payload).await?;

	Ok(Json(response))
}

async fn summarize(
	State(state): State<AppState>,
	Json(payload): Json<SummarizeRequest>,
) -> Result<Json<SummarizeResponse>, ApiError> {
	let response = state.service.summarize(payload).await?;

	Ok(Json(response))
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
}

/// Every service failure leaves this boundary as a well-formed JSON error;
/// raw errors never reach the client.
#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: &'static str,
	message: String,
}

impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		let (status, error_code) = match &err {
			ServiceError::EmptyCorpus => (StatusCode::BAD_REQUEST, "empty_corpus"),
			ServiceError::NoDocuments => (StatusCode::BAD_REQUEST, "no_documents"),
			ServiceError::InvalidRequest { .. } => (StatusCode::BAD_REQUEST, "invalid_request"),
			ServiceError::Ingestion { .. } => {
				(StatusCode::UNPROCESSABLE_ENTITY, "ingestion_failed")
			},
			ServiceError::Indexing { .. } => (StatusCode::BAD_GATEWAY, "indexing_failed"),
			ServiceError::Provider { .. } => (StatusCode::BAD_GATEWAY, "provider_error"),
			ServiceError::Storage { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "storage_error"),
		};

		Self { status, error_code, message: err.to_string() }
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body =
			ErrorBody { error_code: self.error_code.to_string(), message: self.message };

		(self.status, Json(body)).into_response()
	}
}
