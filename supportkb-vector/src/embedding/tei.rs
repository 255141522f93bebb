//! Remote provider backed by a Text Embeddings Inference server.
//!
//! Batches go to `POST {base_url}/embed`; the server does tokenization and
//! pooling. Only the base URL is recorded in the index's identity.

use serde::Serialize;
use ureq::Agent;

use super::{batch_dimension, Embedder, ProviderIdentity, ProviderKind};
use crate::error::VectorError;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct TeiConfig {
	pub base_url: String,
	/// Whole-request deadline, connect through body read.
	pub timeout_secs: u64,
	/// Ask the server for unit-length vectors. Recorded in the identity.
	pub normalize: bool,
	/// Let the server cut inputs longer than the model window.
	pub truncate: bool,
}

impl Default for TeiConfig {
	fn default() -> Self {
		Self {
			base_url: "http://localhost:8080".to_string(),
			timeout_secs: DEFAULT_TIMEOUT_SECS,
			normalize: true,
			truncate: true,
		}
	}
}

#[derive(Serialize)]
struct EmbedBody<'a> {
	inputs: &'a [String],
	normalize: bool,
	truncate: bool,
}

pub struct TeiEmbedder {
	endpoint: String,
	agent: Agent,
	config: TeiConfig,
}

impl TeiEmbedder {
	pub fn new(config: TeiConfig) -> Self {
		let endpoint = format!("{}/embed", config.base_url.trim_end_matches('/'));
		let agent = Agent::new_with_config(
			Agent::config_builder()
				.timeout_global(Some(std::time::Duration::from_secs(config.timeout_secs)))
				.build(),
		);
		Self {
			endpoint,
			agent,
			config,
		}
	}

	pub fn url(&self) -> &str {
		&self.endpoint
	}
}

impl Embedder for TeiEmbedder {
	fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, VectorError> {
		if texts.is_empty() {
			return Ok(vec![]);
		}

		tracing::debug!(batch = texts.len(), endpoint = %self.endpoint, "TEI embed request");

		let body = EmbedBody {
			inputs: texts,
			normalize: self.config.normalize,
			truncate: self.config.truncate,
		};

		let embeddings: Vec<Vec<f32>> = self
			.agent
			.post(&self.endpoint)
			.send_json(&body)
			.map_err(|e| VectorError::Embedding(format!("TEI request failed: {}", e)))?
			.body_mut()
			.read_json()
			.map_err(|e| VectorError::Embedding(format!("TEI response parse error: {}", e)))?;

		if embeddings.len() != texts.len() {
			return Err(VectorError::Embedding(format!(
				"TEI returned {} embeddings for {} inputs",
				embeddings.len(),
				texts.len()
			)));
		}
		let dim = batch_dimension(&embeddings)?;

		tracing::debug!(batch = texts.len(), dimension = dim, "TEI embed response");

		Ok(embeddings)
	}

	fn identity(&self) -> ProviderIdentity {
		ProviderIdentity {
			provider: ProviderKind::Tei,
			model: self.config.base_url.clone(),
			dimension: 0,
			normalized: self.config.normalize,
		}
	}
}
