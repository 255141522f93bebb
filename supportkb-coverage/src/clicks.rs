//! Click counts per article.
//!
//! The event log records impressions only. Clicks come either from an
//! external telemetry export ([`RecordedClickSource`]) or, when none is
//! available, from a seeded placeholder ([`SimulatedClickSource`]).

use std::collections::HashMap;
use std::path::Path;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use supportkb_vector::embedding::fnv1a;

use crate::error::CoverageError;

pub const DEFAULT_SEED: u64 = 42;

pub trait ClickSource {
	/// Clicks recorded for `article` over `impressions` impressions.
	fn clicks(&self, article: &str, impressions: u64) -> u64;

	/// True when the counts are placeholders rather than observed data.
	fn is_simulated(&self) -> bool;
}

/// Uniform clicks in `[0, impressions]`, stable per article and seed.
#[derive(Debug, Clone, Copy)]
pub struct SimulatedClickSource {
	seed: u64,
}

impl SimulatedClickSource {
	pub fn new(seed: u64) -> Self {
		Self { seed }
	}
}

impl Default for SimulatedClickSource {
	fn default() -> Self {
		Self::new(DEFAULT_SEED)
	}
}

impl ClickSource for SimulatedClickSource {
	fn clicks(&self, article: &str, impressions: u64) -> u64 {
		let mut rng = StdRng::seed_from_u64(self.seed ^ fnv1a(article.as_bytes()));
		rng.random_range(0..=impressions)
	}

	fn is_simulated(&self) -> bool {
		true
	}
}

/// Observed clicks keyed by article title.
#[derive(Debug, Clone, Default)]
pub struct RecordedClickSource {
	clicks: HashMap<String, u64>,
}

impl RecordedClickSource {
	pub fn new(clicks: HashMap<String, u64>) -> Self {
		Self { clicks }
	}

	/// Read an `article,clicks` CSV export. Repeated titles are summed.
	pub fn from_csv(path: impl AsRef<Path>) -> Result<Self, CoverageError> {
		let path = path.as_ref();
		let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_path(path)?;
		let mut clicks: HashMap<String, u64> = HashMap::new();
		for record in reader.deserialize::<ClickRecord>() {
			let record = record?;
			*clicks.entry(record.article).or_default() += record.clicks;
		}
		tracing::info!(articles = clicks.len(), path = %path.display(), "Loaded click export");
		Ok(Self { clicks })
	}
}

#[derive(serde::Deserialize)]
struct ClickRecord {
	article: String,
	clicks: u64,
}

impl ClickSource for RecordedClickSource {
	fn clicks(&self, article: &str, _impressions: u64) -> u64 {
		self.clicks.get(article).copied().unwrap_or(0)
	}

	fn is_simulated(&self) -> bool {
		false
	}
}
