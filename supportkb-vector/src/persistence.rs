// ---------------------------------------------------------------------------
// On-disk artifacts: index + article metadata + provider identity
// ---------------------------------------------------------------------------
//
// Three files form one unit and are always written and read together:
//
//   article_index.gz   gzipped JSON { "version": 1, "dimension": D,
//                      "vectors": ["<base64 f32 LE>", ...] } in row order
//   articles_meta.json JSON array of { "title", "body" }, row-aligned
//   embed_model.json   ProviderIdentity
//
// Writes go to a sibling staging directory which is then swapped into place,
// so a reader never sees a half-written triple.
// ---------------------------------------------------------------------------

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use flate2::read::{GzDecoder, GzEncoder};
use flate2::Compression;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::embedding::ProviderIdentity;
use crate::error::VectorError;
use crate::index::FlatIndex;
use crate::types::Article;

pub const INDEX_FILE: &str = "article_index.gz";
pub const METADATA_FILE: &str = "articles_meta.json";
pub const PROVIDER_FILE: &str = "embed_model.json";

const INDEX_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Embedding encode / decode
// ---------------------------------------------------------------------------

/// Encode a f32 slice as base64 of Float32 little-endian bytes.
pub fn encode_embedding(embedding: &[f32]) -> String {
	let bytes: Vec<u8> = embedding.iter().flat_map(|f| f.to_le_bytes()).collect();
	STANDARD.encode(&bytes)
}

/// Decode a base64-encoded Float32 LE byte string back to `Vec<f32>`.
pub fn decode_embedding(encoded: &str) -> Result<Vec<f32>, VectorError> {
	let bytes = STANDARD
		.decode(encoded)
		.map_err(|e| VectorError::ArtifactCorrupt(format!("Invalid base64: {}", e)))?;
	if bytes.len() % 4 != 0 {
		return Err(VectorError::ArtifactCorrupt(
			"Invalid embedding length".into(),
		));
	}
	Ok(bytes
		.chunks_exact(4)
		.map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
		.collect())
}

// ---------------------------------------------------------------------------
// Gzip compress / decompress
// ---------------------------------------------------------------------------

/// Gzip-compress a byte slice (level 6).
pub fn compress(data: &[u8]) -> Result<Vec<u8>, VectorError> {
	let mut encoder = GzEncoder::new(data, Compression::new(6));
	let mut compressed = Vec::new();
	encoder.read_to_end(&mut compressed)?;
	Ok(compressed)
}

/// Gunzip-decompress a byte slice.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>, VectorError> {
	let mut decoder = GzDecoder::new(data);
	let mut decompressed = Vec::new();
	decoder
		.read_to_end(&mut decompressed)
		.map_err(|e| VectorError::ArtifactCorrupt(format!("Invalid gzip data: {}", e)))?;
	Ok(decompressed)
}

/// Check if data starts with gzip magic bytes (0x1f, 0x8b).
pub fn is_gzipped(data: &[u8]) -> bool {
	data.len() >= 2 && data[0] == 0x1f && data[1] == 0x8b
}

// ---------------------------------------------------------------------------
// Index file
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
struct IndexFileV1 {
	version: u32,
	dimension: usize,
	vectors: Vec<String>,
}

fn encode_index(index: &FlatIndex) -> Result<Vec<u8>, VectorError> {
	let file = IndexFileV1 {
		version: INDEX_VERSION,
		dimension: index.dimension(),
		vectors: index.rows().map(encode_embedding).collect(),
	};
	let json = serde_json::to_vec(&file)
		.map_err(|e| VectorError::Serialization(format!("Failed to serialize index: {}", e)))?;
	compress(&json)
}

fn decode_index(raw: &[u8]) -> Result<FlatIndex, VectorError> {
	if !is_gzipped(raw) {
		return Err(VectorError::ArtifactCorrupt(format!(
			"{} is not gzip data",
			INDEX_FILE
		)));
	}
	let json = decompress(raw)?;
	let file: IndexFileV1 = serde_json::from_slice(&json)
		.map_err(|e| VectorError::ArtifactCorrupt(format!("Invalid index JSON: {}", e)))?;

	if file.version != INDEX_VERSION {
		return Err(VectorError::ArtifactCorrupt(format!(
			"Unsupported index version: {}",
			file.version
		)));
	}

	let mut index = FlatIndex::new(file.dimension)
		.map_err(|e| VectorError::ArtifactCorrupt(e.to_string()))?;
	for (row, encoded) in file.vectors.iter().enumerate() {
		let vector = decode_embedding(encoded)?;
		index.add(&vector).map_err(|e| {
			VectorError::ArtifactCorrupt(format!("Row {}: {}", row, e))
		})?;
	}
	Ok(index)
}

// ---------------------------------------------------------------------------
// Directory save / load
// ---------------------------------------------------------------------------

/// Everything the recommender needs, loaded as one unit.
#[derive(Debug, Clone)]
pub struct Artifacts {
	pub index: FlatIndex,
	pub articles: Vec<Article>,
	pub identity: ProviderIdentity,
}

fn sibling(dir: &Path, tag: &str) -> PathBuf {
	let name = dir
		.file_name()
		.map(|n| n.to_string_lossy().into_owned())
		.unwrap_or_else(|| "models".to_string());
	dir.with_file_name(format!(".{}.{}-{}", name, tag, Uuid::new_v4()))
}

fn write_triple(
	dir: &Path,
	index: &FlatIndex,
	articles: &[Article],
	identity: &ProviderIdentity,
) -> Result<(), VectorError> {
	std::fs::create_dir_all(dir)?;
	std::fs::write(dir.join(INDEX_FILE), encode_index(index)?)?;

	let meta = serde_json::to_vec_pretty(articles)
		.map_err(|e| VectorError::Serialization(format!("Failed to serialize metadata: {}", e)))?;
	std::fs::write(dir.join(METADATA_FILE), meta)?;

	let ident = serde_json::to_vec_pretty(identity)
		.map_err(|e| VectorError::Serialization(format!("Failed to serialize identity: {}", e)))?;
	std::fs::write(dir.join(PROVIDER_FILE), ident)?;
	Ok(())
}

/// Persist the index, its row-aligned metadata and the provider identity.
///
/// The destination directory is owned by the builder: any prior contents are
/// replaced as a whole.
pub fn save_to_directory(
	dir: impl AsRef<Path>,
	index: &FlatIndex,
	articles: &[Article],
	identity: &ProviderIdentity,
) -> Result<(), VectorError> {
	let dir = dir.as_ref();
	if index.len() != articles.len() {
		return Err(VectorError::Schema(format!(
			"Index has {} rows but metadata has {} articles",
			index.len(),
			articles.len()
		)));
	}
	if let Some(parent) = dir.parent().filter(|p| !p.as_os_str().is_empty()) {
		std::fs::create_dir_all(parent)?;
	}

	let staging = sibling(dir, "staging");
	if let Err(e) = write_triple(&staging, index, articles, identity) {
		let _ = std::fs::remove_dir_all(&staging);
		return Err(e);
	}

	let retired = if dir.exists() {
		let retired = sibling(dir, "retired");
		std::fs::rename(dir, &retired)?;
		Some(retired)
	} else {
		None
	};

	if let Err(e) = std::fs::rename(&staging, dir) {
		if let Some(old) = &retired {
			let _ = std::fs::rename(old, dir);
		}
		let _ = std::fs::remove_dir_all(&staging);
		return Err(e.into());
	}

	if let Some(old) = retired {
		if let Err(e) = std::fs::remove_dir_all(&old) {
			tracing::warn!(path = %old.display(), "Failed to remove previous index: {}", e);
		}
	}

	tracing::info!(
		dir = %dir.display(),
		rows = index.len(),
		dimension = index.dimension(),
		"Saved index artifacts"
	);
	Ok(())
}

fn read_artifact(dir: &Path, name: &str) -> Result<Vec<u8>, VectorError> {
	let path = dir.join(name);
	if !path.is_file() {
		return Err(VectorError::ArtifactMissing(path.display().to_string()));
	}
	Ok(std::fs::read(&path)?)
}

/// Load the three artifacts written by [`save_to_directory`].
pub fn load_from_directory(dir: impl AsRef<Path>) -> Result<Artifacts, VectorError> {
	let dir = dir.as_ref();

	// Check presence of all three before parsing any of them.
	let raw_index = read_artifact(dir, INDEX_FILE)?;
	let raw_meta = read_artifact(dir, METADATA_FILE)?;
	let raw_ident = read_artifact(dir, PROVIDER_FILE)?;

	let index = decode_index(&raw_index)?;
	let articles: Vec<Article> = serde_json::from_slice(&raw_meta)
		.map_err(|e| VectorError::ArtifactCorrupt(format!("Invalid metadata JSON: {}", e)))?;
	let identity: ProviderIdentity = serde_json::from_slice(&raw_ident)
		.map_err(|e| VectorError::ArtifactCorrupt(format!("Invalid provider identity: {}", e)))?;

	if articles.len() != index.len() {
		return Err(VectorError::ArtifactCorrupt(format!(
			"Index has {} rows but metadata has {} articles",
			index.len(),
			articles.len()
		)));
	}
	if identity.dimension != 0 && identity.dimension != index.dimension() {
		return Err(VectorError::ArtifactCorrupt(format!(
			"Provider identity records dimension {} but index has {}",
			identity.dimension,
			index.dimension()
		)));
	}

	Ok(Artifacts {
		index,
		articles,
		identity,
	})
}

/// Load only the article metadata table, e.g. for catalog joins.
pub fn load_metadata(dir: impl AsRef<Path>) -> Result<Vec<Article>, VectorError> {
	let raw = read_artifact(dir.as_ref(), METADATA_FILE)?;
	serde_json::from_slice(&raw)
		.map_err(|e| VectorError::ArtifactCorrupt(format!("Invalid metadata JSON: {}", e)))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
