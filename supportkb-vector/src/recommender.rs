// ---------------------------------------------------------------------------
// Recommender: load once, serve many
// ---------------------------------------------------------------------------
//
// Holds the provider, the index and the metadata table for the lifetime of
// the serving process. Nothing here is mutated after `initialize`, so a
// `&Recommender` can be shared by any number of callers; the event log
// serializes its own appends.
// ---------------------------------------------------------------------------

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::cosine::normalize_l2;
use crate::embedding::{embedder_from_identity, Embedder, ProviderIdentity, ProviderOverrides};
use crate::error::VectorError;
use crate::event_log::EventLog;
use crate::index::FlatIndex;
use crate::persistence::{self, Artifacts};
use crate::types::{
	Article, BatchOutcome, RecommendationEvent, RecommendationResponse, RecommendedArticle,
	TicketRequest,
};

pub const DEFAULT_TOP_K: usize = 3;

const DIMENSION_CHECK_TEXT: &str = "dimension check";

/// Startup settings for a [`Recommender`].
#[derive(Debug, Clone)]
pub struct RecommenderConfig {
	pub top_k: usize,
	pub overrides: ProviderOverrides,
}

impl Default for RecommenderConfig {
	fn default() -> Self {
		Self {
			top_k: DEFAULT_TOP_K,
			overrides: ProviderOverrides::default(),
		}
	}
}

fn current_timestamp_ms() -> u64 {
	SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.unwrap_or_default()
		.as_millis() as u64
}

pub struct Recommender {
	embedder: Box<dyn Embedder>,
	identity: ProviderIdentity,
	articles: Vec<Article>,
	index: FlatIndex,
	events: EventLog,
	top_k: usize,
}

impl Recommender {
	/// Load the artifacts in `model_dir`, rebuild the recorded provider and
	/// open the event log. Any failure here is fatal for serving.
	pub fn initialize(
		model_dir: impl AsRef<Path>,
		events: EventLog,
		config: RecommenderConfig,
	) -> Result<Self, VectorError> {
		let model_dir = model_dir.as_ref();
		let artifacts = persistence::load_from_directory(model_dir)?;
		let embedder = embedder_from_identity(&artifacts.identity, &config.overrides)?;
		let recommender = Self::from_parts(artifacts, embedder, events, config.top_k)?;

		tracing::info!(
			model_dir = %model_dir.display(),
			articles = recommender.articles.len(),
			dimension = recommender.index.dimension(),
			provider = ?recommender.identity.provider,
			top_k = recommender.top_k,
			"Recommender initialized"
		);
		Ok(recommender)
	}

	/// Assemble a recommender from already-loaded parts. The provider embeds one
	/// sample text to confirm its output matches the index dimension.
	pub fn from_parts(
		artifacts: Artifacts,
		embedder: Box<dyn Embedder>,
		events: EventLog,
		top_k: usize,
	) -> Result<Self, VectorError> {
		if top_k == 0 {
			return Err(VectorError::InvalidConfig("top_k must be positive".into()));
		}

		let sample = embedder.embed(&[DIMENSION_CHECK_TEXT.to_string()])?;
		let actual = sample.first().map_or(0, |v| v.len());
		if actual != artifacts.index.dimension() {
			return Err(VectorError::DimensionMismatch {
				expected: artifacts.index.dimension(),
				actual,
			});
		}

		Ok(Self {
			embedder,
			identity: artifacts.identity,
			articles: artifacts.articles,
			index: artifacts.index,
			events,
			top_k,
		})
	}

	pub fn top_k(&self) -> usize {
		self.top_k
	}

	pub fn article_count(&self) -> usize {
		self.articles.len()
	}

	pub fn identity(&self) -> &ProviderIdentity {
		&self.identity
	}

	/// Ranked search without logging. Used by `recommend` and by callers that
	/// need to compare results without producing events.
	pub fn search(&self, ticket_text: &str) -> Result<Vec<RecommendedArticle>, VectorError> {
		if ticket_text.trim().is_empty() {
			return Err(VectorError::EmptyText);
		}

		let mut query = self
			.embedder
			.embed(&[ticket_text.to_string()])?
			.pop()
			.ok_or_else(|| VectorError::Embedding("Provider returned no vector".into()))?;
		if self.identity.normalized {
			normalize_l2(&mut query);
		}

		let hits = self.index.search(&query, self.top_k)?;
		hits.into_iter()
			.enumerate()
			.map(|(i, hit)| {
				let article = self.articles.get(hit.row).ok_or_else(|| {
					VectorError::ArtifactCorrupt(format!("Index row {} has no metadata", hit.row))
				})?;
				Ok(RecommendedArticle {
					rank: i + 1,
					article_title: article.title.clone(),
					score: hit.score,
				})
			})
			.collect()
	}

	/// Top-k articles for a ticket. Appends one event to the log; if the
	/// append fails the request fails too.
	pub fn recommend(
		&self,
		ticket_id: &str,
		ticket_text: &str,
	) -> Result<Vec<RecommendedArticle>, VectorError> {
		let results = self.search(ticket_text)?;

		self.events.append(&RecommendationEvent {
			ticket_id: ticket_id.to_string(),
			ticket_text: ticket_text.to_string(),
			results: results.clone(),
			timestamp: current_timestamp_ms(),
		})?;

		tracing::debug!(ticket_id, results = results.len(), "Served recommendation");
		Ok(results)
	}

	pub fn respond(&self, request: TicketRequest) -> Result<RecommendationResponse, VectorError> {
		let recommendations = self.recommend(&request.ticket_id, &request.ticket_text)?;
		Ok(RecommendationResponse {
			ticket_id: request.ticket_id,
			ticket_text: request.ticket_text,
			recommendations,
		})
	}

	/// Serve tickets in order. A failed ticket is recorded and the run continues.
	pub fn recommend_batch(&self, tickets: &[TicketRequest]) -> Vec<BatchOutcome> {
		let outcomes: Vec<BatchOutcome> = tickets
			.iter()
			.map(|t| match self.recommend(&t.ticket_id, &t.ticket_text) {
				Ok(recs) => BatchOutcome {
					ticket_id: t.ticket_id.clone(),
					recommendations: Some(recs),
					error: None,
				},
				Err(e) => {
					tracing::warn!(ticket_id = %t.ticket_id, "Recommendation failed: {}", e);
					BatchOutcome {
						ticket_id: t.ticket_id.clone(),
						recommendations: None,
						error: Some(e.to_string()),
					}
				}
			})
			.collect();

		let failed = outcomes.iter().filter(|o| o.error.is_some()).count();
		tracing::info!(
			total = outcomes.len(),
			succeeded = outcomes.len() - failed,
			failed,
			"Batch recommendation complete"
		);
		outcomes
	}
}
