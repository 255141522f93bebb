//! Embedding providers.
//!
//! An [`Embedder`] maps text to fixed-dimension vectors. The provider that built
//! an index is recorded as a [`ProviderIdentity`] next to it, and the recommender
//! rebuilds the same provider from that identity at startup.

pub mod tei;

use serde::{Deserialize, Serialize};

use crate::error::VectorError;

pub use tei::{TeiConfig, TeiEmbedder};

/// Default output dimension of the hashing provider.
pub const DEFAULT_DIMENSION: usize = 384;

/// Name recorded for the hashing scheme implemented by [`HashingEmbedder`].
pub const HASHING_MODEL: &str = "fnv1a-token-hash-v1";

// ── Traits ────────────────────────────────────────────────────────────────

/// Trait for embedding providers.
pub trait Embedder: Send + Sync {
	/// Generate embeddings for a batch of texts, one vector per input, in order.
	fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, VectorError>;

	/// Identity recorded alongside an index built with this provider.
	fn identity(&self) -> ProviderIdentity;
}

// ── Identity ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
	Hashing,
	Tei,
}

impl std::str::FromStr for ProviderKind {
	type Err = VectorError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"hashing" => Ok(Self::Hashing),
			"tei" => Ok(Self::Tei),
			other => Err(VectorError::InvalidConfig(format!(
				"Unknown embedding provider '{}', expected 'hashing' or 'tei'",
				other
			))),
		}
	}
}

/// Which provider produced an index's vectors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderIdentity {
	pub provider: ProviderKind,
	/// Hashing scheme name, or the TEI base URL.
	pub model: String,
	/// Output dimension; 0 until known for remote providers.
	pub dimension: usize,
	/// Whether stored vectors are unit length (inner product == cosine), by
	/// the provider itself or by the builder.
	pub normalized: bool,
}

/// Serve-time settings that may replace what the identity recorded.
#[derive(Debug, Clone, Default)]
pub struct ProviderOverrides {
	pub tei_url: Option<String>,
	pub timeout_secs: Option<u64>,
}

/// Rebuild the provider named in a persisted identity.
pub fn embedder_from_identity(
	identity: &ProviderIdentity,
	overrides: &ProviderOverrides,
) -> Result<Box<dyn Embedder>, VectorError> {
	match identity.provider {
		ProviderKind::Hashing => {
			if identity.model != HASHING_MODEL {
				return Err(VectorError::ArtifactCorrupt(format!(
					"Unknown hashing scheme '{}'",
					identity.model
				)));
			}
			Ok(Box::new(HashingEmbedder::new(identity.dimension)?))
		}
		ProviderKind::Tei => {
			let mut config = TeiConfig {
				base_url: identity.model.clone(),
				normalize: identity.normalized,
				..Default::default()
			};
			if let Some(url) = &overrides.tei_url {
				config.base_url = url.clone();
			}
			if let Some(secs) = overrides.timeout_secs {
				config.timeout_secs = secs;
			}
			Ok(Box::new(TeiEmbedder::new(config)))
		}
	}
}

/// Check that every vector in a batch has the same length and return it.
pub fn batch_dimension(vectors: &[Vec<f32>]) -> Result<usize, VectorError> {
	let dim = vectors.first().map_or(0, |v| v.len());
	if let Some(bad) = vectors.iter().find(|v| v.len() != dim) {
		return Err(VectorError::DimensionMismatch {
			expected: dim,
			actual: bad.len(),
		});
	}
	Ok(dim)
}

// ── Hashing provider ──────────────────────────────────────────────────────

/// 64-bit FNV-1a. Stable across platforms and releases.
pub fn fnv1a(bytes: &[u8]) -> u64 {
	const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
	const PRIME: u64 = 0x0000_0100_0000_01b3;
	let mut hash = OFFSET;
	for &b in bytes {
		hash ^= b as u64;
		hash = hash.wrapping_mul(PRIME);
	}
	hash
}

/// Lowercased alphanumeric tokens of at least two characters.
pub fn tokenize(text: &str) -> Vec<String> {
	text.split(|c: char| !c.is_alphanumeric())
		.filter(|t| t.chars().count() > 1)
		.map(|t| t.to_lowercase())
		.collect()
}

/// Deterministic local provider: signed feature hashing of word tokens.
///
/// Texts sharing vocabulary land on shared buckets, so similarity tracks
/// lexical overlap. No model download, no network.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
	dimension: usize,
}

impl HashingEmbedder {
	pub fn new(dimension: usize) -> Result<Self, VectorError> {
		if dimension == 0 {
			return Err(VectorError::InvalidConfig(
				"Embedding dimension must be positive".into(),
			));
		}
		Ok(Self { dimension })
	}

	pub fn dimension(&self) -> usize {
		self.dimension
	}

	fn embed_one(&self, text: &str) -> Vec<f32> {
		let mut v = vec![0.0f32; self.dimension];
		for token in tokenize(text) {
			let h = fnv1a(token.as_bytes());
			let bucket = (h % self.dimension as u64) as usize;
			let sign = if h >> 63 == 0 { 1.0 } else { -1.0 };
			v[bucket] += sign;
		}
		v
	}
}

impl Embedder for HashingEmbedder {
	fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, VectorError> {
		Ok(texts.iter().map(|t| self.embed_one(t)).collect())
	}

	fn identity(&self) -> ProviderIdentity {
		ProviderIdentity {
			provider: ProviderKind::Hashing,
			model: HASHING_MODEL.to_string(),
			dimension: self.dimension,
			normalized: false,
		}
	}
}
