// ---------------------------------------------------------------------------
// CoverageAnalyzer: event log → coverage report
// ---------------------------------------------------------------------------

use std::path::PathBuf;

use supportkb_vector::persistence;
use supportkb_vector::types::RecommendationEvent;

use crate::clicks::{ClickSource, SimulatedClickSource};
use crate::error::CoverageError;
use crate::events::load_events;
use crate::metrics::{
	compute_metrics, detect_low_engagement, expand, include_catalog, CoverageRow, ExpandedRow,
	DEFAULT_CTR_THRESHOLD,
};
use crate::report::write_report;

#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
	pub log_path: PathBuf,
	pub output_dir: PathBuf,
	pub report_name: String,
	pub ctr_threshold: f64,
	/// When set, never-recommended articles from this index are reported too.
	pub model_dir: Option<PathBuf>,
}

impl Default for AnalyzerConfig {
	fn default() -> Self {
		Self {
			log_path: PathBuf::from("logs/recommendation_events.jsonl"),
			output_dir: PathBuf::from("logs"),
			report_name: "coverage_report.csv".to_string(),
			ctr_threshold: DEFAULT_CTR_THRESHOLD,
			model_dir: None,
		}
	}
}

/// Everything one analysis run produced.
#[derive(Debug, Clone)]
pub struct AnalysisBundle {
	pub events: Vec<RecommendationEvent>,
	pub skipped: usize,
	pub expanded: Vec<ExpandedRow>,
	pub coverage: Vec<CoverageRow>,
	pub low_ctr: Vec<CoverageRow>,
	pub unused: Vec<CoverageRow>,
	pub report_path: PathBuf,
	pub clicks_simulated: bool,
}

pub struct CoverageAnalyzer {
	config: AnalyzerConfig,
	clicks: Box<dyn ClickSource>,
}

impl CoverageAnalyzer {
	/// Analyzer with simulated clicks (default seed).
	pub fn new(config: AnalyzerConfig) -> Self {
		Self::with_click_source(config, Box::new(SimulatedClickSource::default()))
	}

	pub fn with_click_source(config: AnalyzerConfig, clicks: Box<dyn ClickSource>) -> Self {
		Self { config, clicks }
	}

	pub fn report_path(&self) -> PathBuf {
		self.config.output_dir.join(&self.config.report_name)
	}

	pub fn run_full_analysis(&self) -> Result<AnalysisBundle, CoverageError> {
		let loaded = load_events(&self.config.log_path)?;
		let expanded = expand(&loaded.events)?;
		let mut coverage = compute_metrics(&expanded, self.clicks.as_ref());

		if let Some(model_dir) = &self.config.model_dir {
			let titles: Vec<String> = persistence::load_metadata(model_dir)?
				.into_iter()
				.map(|a| a.title)
				.collect();
			coverage = include_catalog(coverage, &titles);
		}

		let (low_ctr, unused) = detect_low_engagement(&coverage, self.config.ctr_threshold)?;
		let report_path = write_report(&coverage, self.report_path())?;

		tracing::info!(
			articles = coverage.len(),
			low_ctr = low_ctr.len(),
			unused = unused.len(),
			skipped = loaded.skipped,
			clicks_simulated = self.clicks.is_simulated(),
			report = %report_path.display(),
			"Coverage analysis complete"
		);

		Ok(AnalysisBundle {
			events: loaded.events,
			skipped: loaded.skipped,
			expanded,
			coverage,
			low_ctr,
			unused,
			report_path,
			clicks_simulated: self.clicks.is_simulated(),
		})
	}
}
