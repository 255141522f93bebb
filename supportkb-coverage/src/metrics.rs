// ---------------------------------------------------------------------------
// Per-article coverage metrics
// ---------------------------------------------------------------------------

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use supportkb_vector::types::RecommendationEvent;

use crate::clicks::ClickSource;
use crate::error::CoverageError;

pub const DEFAULT_CTR_THRESHOLD: f64 = 0.6;

/// One (ticket, recommended article) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpandedRow {
	pub ticket_id: String,
	pub article: String,
	pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageRow {
	pub article: String,
	pub impressions: u64,
	pub avg_score: f64,
	pub clicks: u64,
	#[serde(rename = "CTR")]
	pub ctr: f64,
}

impl CoverageRow {
	fn unused(article: impl Into<String>) -> Self {
		Self {
			article: article.into(),
			impressions: 0,
			avg_score: 0.0,
			clicks: 0,
			ctr: 0.0,
		}
	}
}

/// Flatten events into one row per recommended article.
pub fn expand(events: &[RecommendationEvent]) -> Result<Vec<ExpandedRow>, CoverageError> {
	let rows: Vec<ExpandedRow> = events
		.iter()
		.flat_map(|e| {
			e.results.iter().map(move |r| ExpandedRow {
				ticket_id: e.ticket_id.clone(),
				article: r.article_title.clone(),
				score: r.score,
			})
		})
		.collect();

	if rows.is_empty() {
		return Err(CoverageError::NoRecommendationsFound);
	}
	tracing::info!(rows = rows.len(), "Expanded recommendation rows");
	Ok(rows)
}

/// Group rows by article (sorted by title) and attach clicks and CTR.
pub fn compute_metrics(rows: &[ExpandedRow], clicks: &dyn ClickSource) -> Vec<CoverageRow> {
	let mut groups: BTreeMap<&str, (u64, f64)> = BTreeMap::new();
	for row in rows {
		let entry = groups.entry(row.article.as_str()).or_default();
		entry.0 += 1;
		entry.1 += row.score;
	}

	if clicks.is_simulated() {
		tracing::warn!("Click counts are simulated placeholders, not observed telemetry");
	}

	groups
		.into_iter()
		.map(|(article, (impressions, total))| {
			let mut c = clicks.clicks(article, impressions);
			if c > impressions {
				tracing::warn!(article, clicks = c, impressions, "Clicks exceed impressions, clamping");
				c = impressions;
			}
			CoverageRow {
				article: article.to_string(),
				impressions,
				avg_score: total / impressions as f64,
				clicks: c,
				ctr: c as f64 / impressions.max(1) as f64,
			}
		})
		.collect()
}

/// Add zero rows for catalog articles that were never recommended.
pub fn include_catalog<S: AsRef<str>>(rows: Vec<CoverageRow>, titles: &[S]) -> Vec<CoverageRow> {
	let mut by_title: BTreeMap<String, CoverageRow> =
		rows.into_iter().map(|r| (r.article.clone(), r)).collect();
	let before = by_title.len();
	for title in titles {
		let title = title.as_ref();
		if !by_title.contains_key(title) {
			by_title.insert(title.to_string(), CoverageRow::unused(title));
		}
	}
	tracing::debug!(added = by_title.len() - before, "Joined article catalog");
	by_title.into_values().collect()
}

/// Split out rows with `CTR < threshold` and rows with no impressions.
pub fn detect_low_engagement(
	rows: &[CoverageRow],
	ctr_threshold: f64,
) -> Result<(Vec<CoverageRow>, Vec<CoverageRow>), CoverageError> {
	if !(0.0..=1.0).contains(&ctr_threshold) {
		return Err(CoverageError::InvalidThreshold(ctr_threshold));
	}

	let low_ctr: Vec<CoverageRow> = rows.iter().filter(|r| r.ctr < ctr_threshold).cloned().collect();
	let unused: Vec<CoverageRow> = rows.iter().filter(|r| r.impressions == 0).cloned().collect();

	tracing::info!(
		low_ctr = low_ctr.len(),
		unused = unused.len(),
		ctr_threshold,
		"Detected low-engagement articles"
	);
	Ok((low_ctr, unused))
}
