use folio_config::{Config, validate};

fn base_toml() -> String {
	r#"
[service]
http_bind = "127.0.0.1:8080"
log_level = "info"

[storage.qdrant]
url        = "http://127.0.0.1:6334"
collection = "folio_chunks"
vector_dim = 384

[providers.embedding]
provider_id = "openai"
api_base    = "https://api.openai.com"
api_key     = "sk-test"
path        = "/v1/embeddings"
model       = "text-embedding-3-small"
dimensions  = 384
timeout_ms  = 10000

[providers.generation]
provider_id = "groq"
api_base    = "https://api.groq.com/openai"
api_key     = "gsk-test"
path        = "/v1/chat/completions"
model       = "llama-3.1-8b-instant"
temperature = 0.0
timeout_ms  = 30000

[chunking]
chunk_size    = 800
chunk_overlap = 150

[retrieval]
candidate_k   = 12
qa_top_k      = 12
summary_top_k = 60
rerank_top_k  = 8
"#
	.to_string()
}

fn parse(raw: &str) -> Config {
	toml::from_str(raw).expect("config should parse")
}

#[test]
fn base_config_is_valid() {
	assert!(validate(&parse(&base_toml())).is_ok());
}

#[test]
fn rejects_dimension_mismatch() {
	let raw = base_toml().replace("vector_dim = 384", "vector_dim = 768");
	let err = validate(&parse(&raw)).unwrap_err();

	assert!(err.to_string().contains("vector_dim"));
}

#[test]
fn rejects_overlap_at_or_above_chunk_size() {
	let raw = base_toml().replace("chunk_overlap = 150", "chunk_overlap = 800");

	assert!(validate(&parse(&raw)).is_err());
}

#[test]
fn rejects_zero_chunk_size() {
	let raw = base_toml()
		.replace("chunk_size    = 800", "chunk_size    = 0")
		.replace("chunk_overlap = 150", "chunk_overlap = 0");

	assert!(validate(&parse(&raw)).is_err());
}

#[test]
fn rejects_empty_http_bind() {
	let raw = base_toml().replace("http_bind = \"127.0.0.1:8080\"", "http_bind = \"\"");

	assert!(validate(&parse(&raw)).is_err());
}

#[test]
fn rejects_zero_top_k() {
	let raw = base_toml().replace("qa_top_k      = 12", "qa_top_k      = 0");

	assert!(validate(&parse(&raw)).is_err());
}

#[test]
fn normalize_strips_trailing_slash_from_api_base() {
	let raw = base_toml().replace(
		"api_base    = \"https://api.openai.com\"",
		"api_base    = \"https://api.openai.com/\"",
	);
	let mut cfg = parse(&raw);

	folio_config::normalize(&mut cfg);

	assert_eq!(cfg.providers.embedding.api_base, "https://api.openai.com");
}

#[test]
fn missing_default_headers_defaults_to_empty() {
	let cfg = parse(&base_toml());

	assert!(cfg.providers.embedding.default_headers.is_empty());
	assert!(cfg.providers.generation.default_headers.is_empty());
}
