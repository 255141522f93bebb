// ---------------------------------------------------------------------------
// Event log reader
// ---------------------------------------------------------------------------
//
// Reads the NDJSON log written by the recommender. Each line is decoded on
// its own; a bad line is reported and skipped so one corrupt record never
// sinks a run.
// ---------------------------------------------------------------------------

use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::Deserialize;
use supportkb_vector::types::{RecommendationEvent, RecommendedArticle};

use crate::error::CoverageError;

const UNKNOWN_ARTICLE: &str = "Unknown";

/// Events that parsed, plus how many lines were skipped.
#[derive(Debug, Clone, Default)]
pub struct LoadedEvents {
	pub events: Vec<RecommendationEvent>,
	pub skipped: usize,
}

#[derive(Deserialize)]
struct RawEvent {
	ticket_id: serde_json::Value,
	#[serde(default)]
	ticket_text: String,
	results: RawResults,
	#[serde(default)]
	timestamp: u64,
}

/// Current logs carry an array; older ones stored it as a JSON string.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawResults {
	List(Vec<RawResult>),
	Encoded(String),
}

#[derive(Deserialize)]
struct RawResult {
	#[serde(default)]
	rank: Option<usize>,
	#[serde(default)]
	article_title: Option<String>,
	#[serde(default)]
	score: Option<f64>,
}

fn parse_line(line_no: usize, bytes: &[u8]) -> Result<RecommendationEvent, CoverageError> {
	let malformed = |reason: String| CoverageError::MalformedLogRecord {
		line: line_no,
		reason,
	};

	let line = std::str::from_utf8(bytes).map_err(|e| malformed(format!("not valid UTF-8: {}", e)))?;
	let raw: RawEvent = serde_json::from_str(line).map_err(|e| malformed(e.to_string()))?;

	let ticket_id = match raw.ticket_id {
		serde_json::Value::String(s) => s,
		serde_json::Value::Number(n) => n.to_string(),
		other => return Err(malformed(format!("ticket_id must be a string, got {}", other))),
	};

	let results = match raw.results {
		RawResults::List(list) => list,
		RawResults::Encoded(text) => serde_json::from_str::<Vec<RawResult>>(&text)
			.map_err(|e| malformed(format!("results string is not a JSON array: {}", e)))?,
	};

	let results = results
		.into_iter()
		.enumerate()
		.map(|(i, r)| RecommendedArticle {
			rank: r.rank.unwrap_or(i + 1),
			article_title: r.article_title.unwrap_or_else(|| UNKNOWN_ARTICLE.to_string()),
			score: r.score.unwrap_or(0.0),
		})
		.collect();

	Ok(RecommendationEvent {
		ticket_id,
		ticket_text: raw.ticket_text,
		results,
		timestamp: raw.timestamp,
	})
}

/// Load every well-formed event from the log at `path`.
pub fn load_events(path: impl AsRef<Path>) -> Result<LoadedEvents, CoverageError> {
	let path = path.as_ref();
	if !path.exists() {
		return Err(CoverageError::LogNotFound(path.display().to_string()));
	}

	let reader = BufReader::new(std::fs::File::open(path)?);
	let mut loaded = LoadedEvents::default();

	// Split on raw bytes: a record that is not UTF-8 is malformed, not an I/O failure.
	for (i, chunk) in reader.split(b'\n').enumerate() {
		let chunk = chunk?;
		let bytes = chunk.strip_suffix(b"\r").unwrap_or(&chunk[..]);
		if bytes.iter().all(u8::is_ascii_whitespace) {
			continue;
		}
		match parse_line(i + 1, bytes) {
			Ok(event) => loaded.events.push(event),
			Err(e) => {
				tracing::warn!(path = %path.display(), "Skipping record: {}", e);
				loaded.skipped += 1;
			}
		}
	}

	tracing::info!(
		events = loaded.events.len(),
		skipped = loaded.skipped,
		path = %path.display(),
		"Loaded recommendation events"
	);
	Ok(loaded)
}
