// ---------------------------------------------------------------------------
// Append-only recommendation event log (NDJSON)
// ---------------------------------------------------------------------------
//
// One `RecommendationEvent` per line. Appends are serialized behind a mutex
// and each record goes out in a single `write_all`, so concurrent callers in
// one process never interleave partial lines.
// ---------------------------------------------------------------------------

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::VectorError;
use crate::types::RecommendationEvent;

pub struct EventLog {
	path: PathBuf,
	file: Mutex<File>,
}

impl EventLog {
	/// Open (creating if needed) the log at `path` for appending.
	pub fn open(path: impl AsRef<Path>) -> Result<Self, VectorError> {
		let path = path.as_ref().to_path_buf();
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			std::fs::create_dir_all(parent)?;
		}
		let file = OpenOptions::new().create(true).append(true).open(&path)?;
		tracing::debug!(path = %path.display(), "Opened event log");
		Ok(Self {
			path,
			file: Mutex::new(file),
		})
	}

	pub fn append(&self, event: &RecommendationEvent) -> Result<(), VectorError> {
		let mut line = serde_json::to_string(event)
			.map_err(|e| VectorError::EventLog(format!("Failed to serialize event: {}", e)))?;
		line.push('\n');

		let mut file = self
			.file
			.lock()
			.map_err(|_| VectorError::EventLog("Event log lock poisoned".into()))?;
		file.write_all(line.as_bytes())
			.and_then(|_| file.flush())
			.map_err(|e| {
				VectorError::EventLog(format!("Failed to append to {}: {}", self.path.display(), e))
			})
	}
}
