// ---------------------------------------------------------------------------
// IndexBuilder: corpus → embeddings → flat index → artifacts
// ---------------------------------------------------------------------------

use std::path::{Path, PathBuf};

use crate::corpus;
use crate::cosine::normalize_l2;
use crate::embedding::{batch_dimension, Embedder, ProviderIdentity};
use crate::error::VectorError;
use crate::index::FlatIndex;
use crate::persistence;
use crate::types::Article;

/// Batch size for provider calls. Keeps remote request bodies bounded.
const EMBED_BATCH: usize = 64;

/// Configuration for an [`IndexBuilder`].
#[derive(Debug, Clone)]
pub struct BuildConfig {
	pub corpus_path: PathBuf,
	pub output_dir: PathBuf,
	/// L2-normalize vectors so inner product equals cosine similarity.
	pub normalize: bool,
}

impl Default for BuildConfig {
	fn default() -> Self {
		Self {
			corpus_path: PathBuf::from("data/raw/knowledge_base_articles.csv"),
			output_dir: PathBuf::from("models"),
			normalize: true,
		}
	}
}

/// What a completed build produced.
#[derive(Debug, Clone)]
pub struct BuildSummary {
	pub articles: usize,
	pub dimension: usize,
	pub output_dir: PathBuf,
}

pub struct IndexBuilder<'a> {
	config: BuildConfig,
	embedder: &'a dyn Embedder,
}

impl<'a> IndexBuilder<'a> {
	pub fn new(config: BuildConfig, embedder: &'a dyn Embedder) -> Self {
		Self { config, embedder }
	}

	pub fn load(&self) -> Result<Vec<Article>, VectorError> {
		corpus::load_articles(&self.config.corpus_path)
	}

	/// One vector per article, in article order.
	pub fn embed(&self, articles: &[Article]) -> Result<Vec<Vec<f32>>, VectorError> {
		embed_articles(self.embedder, articles, self.config.normalize)
	}

	pub fn build(&self, vectors: &[Vec<f32>]) -> Result<FlatIndex, VectorError> {
		let index = FlatIndex::build(vectors)?;
		tracing::info!(
			rows = index.len(),
			dimension = index.dimension(),
			"Flat index built"
		);
		Ok(index)
	}

	pub fn persist(&self, index: &FlatIndex, articles: &[Article]) -> Result<(), VectorError> {
		let identity = self.identity_for(index);
		persistence::save_to_directory(&self.config.output_dir, index, articles, &identity)
	}

	/// Identity with the dimension and normalization policy of this build.
	/// Vectors count as normalized if either the provider or the builder did it.
	pub fn identity_for(&self, index: &FlatIndex) -> ProviderIdentity {
		let mut identity = self.embedder.identity();
		identity.dimension = index.dimension();
		identity.normalized |= self.config.normalize;
		identity
	}

	pub fn run_full_pipeline(&self) -> Result<BuildSummary, VectorError> {
		let articles = self.load()?;
		let vectors = self.embed(&articles)?;
		let index = self.build(&vectors)?;
		self.persist(&index, &articles)?;
		Ok(BuildSummary {
			articles: articles.len(),
			dimension: index.dimension(),
			output_dir: self.config.output_dir.clone(),
		})
	}

	pub fn output_dir(&self) -> &Path {
		&self.config.output_dir
	}
}

/// Embed article texts in batches, normalizing when requested.
pub fn embed_articles(
	embedder: &dyn Embedder,
	articles: &[Article],
	normalize: bool,
) -> Result<Vec<Vec<f32>>, VectorError> {
	let texts: Vec<String> = articles.iter().map(Article::text).collect();
	let mut vectors = Vec::with_capacity(texts.len());

	for (n, chunk) in texts.chunks(EMBED_BATCH).enumerate() {
		let batch = embedder.embed(chunk)?;
		if batch.len() != chunk.len() {
			return Err(VectorError::Embedding(format!(
				"Provider returned {} vectors for {} texts",
				batch.len(),
				chunk.len()
			)));
		}
		tracing::debug!(batch = n, size = chunk.len(), "Embedded batch");
		vectors.extend(batch);
	}

	batch_dimension(&vectors)?;
	if normalize {
		for v in vectors.iter_mut() {
			normalize_l2(v);
		}
	}

	tracing::info!(count = vectors.len(), normalize, "Computed article embeddings");
	Ok(vectors)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::cosine::compute_magnitude;
	use crate::embedding::HashingEmbedder;

	fn corpus(dir: &tempfile::TempDir, body: &str) -> PathBuf {
		let path = dir.path().join("kb.csv");
		std::fs::write(&path, body).unwrap();
		path
	}

	fn config(dir: &tempfile::TempDir, corpus_path: PathBuf) -> BuildConfig {
		BuildConfig {
			corpus_path,
			output_dir: dir.path().join("models"),
			normalize: true,
		}
	}

	#[test]
	fn full_pipeline_persists_one_row_per_article() {
		let dir = tempfile::tempdir().unwrap();
		let path = corpus(
			&dir,
			"title,body\nReset Password,Use the link\nRefund Policy,Refunds in 30 days\nShipping,Ships fast\n",
		);
		let embedder = HashingEmbedder::new(64).unwrap();
		let builder = IndexBuilder::new(config(&dir, path), &embedder);

		let summary = builder.run_full_pipeline().unwrap();
		assert_eq!(summary.articles, 3);
		assert_eq!(summary.dimension, 64);

		let loaded = persistence::load_from_directory(builder.output_dir()).unwrap();
		assert_eq!(loaded.index.len(), 3);
		assert_eq!(loaded.articles[2].title, "Shipping");
		assert_eq!(loaded.identity.dimension, 64);
		assert!(loaded.identity.normalized);
	}

	#[test]
	fn vectors_are_unit_length_when_normalizing() {
		let embedder = HashingEmbedder::new(32).unwrap();
		let articles = vec![Article::new("Refund Policy", "refunds refunds refunds")];
		let vectors = embed_articles(&embedder, &articles, true).unwrap();
		assert!((compute_magnitude(&vectors[0]) - 1.0).abs() < 1e-6);
	}

	struct FixedEmbedder {
		normalized: bool,
	}

	impl Embedder for FixedEmbedder {
		fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, VectorError> {
			Ok(texts.iter().map(|_| vec![3.0, 4.0]).collect())
		}

		fn identity(&self) -> ProviderIdentity {
			ProviderIdentity {
				provider: crate::embedding::ProviderKind::Tei,
				model: "http://localhost:8080".into(),
				dimension: 0,
				normalized: self.normalized,
			}
		}
	}

	#[test]
	fn identity_records_who_normalized() {
		let dir = tempfile::tempdir().unwrap();
		let path = corpus(&dir, "title,body
A,a
");
		let index = FlatIndex::build(&[vec![0.6, 0.8]]).unwrap();
		let raw = |provider: bool, builder: bool| {
			let mut cfg = config(&dir, path.clone());
			cfg.normalize = builder;
			let embedder = FixedEmbedder {
				normalized: provider,
			};
			IndexBuilder::new(cfg, &embedder).identity_for(&index)
		};

		assert!(!raw(false, false).normalized);
		assert!(raw(true, false).normalized);
		assert!(raw(false, true).normalized);
		assert_eq!(raw(false, false).dimension, 2);
	}

	#[test]
	fn raw_build_keeps_provider_vectors() {
		let embedder = FixedEmbedder { normalized: false };
		let vectors = embed_articles(&embedder, &[Article::new("A", "a")], false).unwrap();
		assert_eq!(vectors[0], vec![3.0, 4.0]);
	}

	#[test]
	fn embedding_is_deterministic_and_ordered() {
		let embedder = HashingEmbedder::new(32).unwrap();
		let articles: Vec<Article> = (0..150)
			.map(|i| Article::new(format!("Title {}", i), format!("body number{}", i)))
			.collect();
		let a = embed_articles(&embedder, &articles, true).unwrap();
		let b = embed_articles(&embedder, &articles, true).unwrap();
		assert_eq!(a.len(), 150);
		assert_eq!(a, b);

		let single = embed_articles(&embedder, &articles[120..121], true).unwrap();
		assert_eq!(single[0], a[120]);
	}

	#[test]
	fn empty_corpus_fails_without_writing() {
		let dir = tempfile::tempdir().unwrap();
		let path = corpus(&dir, "title,body\n");
		let embedder = HashingEmbedder::new(16).unwrap();
		let builder = IndexBuilder::new(config(&dir, path), &embedder);

		assert!(matches!(
			builder.run_full_pipeline(),
			Err(VectorError::Schema(_))
		));
		assert!(!builder.output_dir().exists());
	}

	#[test]
	fn missing_corpus_is_data_not_found() {
		let dir = tempfile::tempdir().unwrap();
		let embedder = HashingEmbedder::new(16).unwrap();
		let builder = IndexBuilder::new(config(&dir, dir.path().join("none.csv")), &embedder);
		assert!(matches!(
			builder.run_full_pipeline(),
			Err(VectorError::DataNotFound(_))
		));
	}
}
