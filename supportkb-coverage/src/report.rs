use std::path::{Path, PathBuf};

use crate::error::CoverageError;
use crate::metrics::CoverageRow;

/// Write `rows` as CSV (`article,impressions,avg_score,clicks,CTR`) to
/// `destination`, creating parent directories.
pub fn write_report(rows: &[CoverageRow], destination: impl AsRef<Path>) -> Result<PathBuf, CoverageError> {
	let destination = destination.as_ref();
	if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
		std::fs::create_dir_all(parent)?;
	}

	let mut writer = csv::Writer::from_path(destination)?;
	if rows.is_empty() {
		writer.write_record(["article", "impressions", "avg_score", "clicks", "CTR"])?;
	}
	for row in rows {
		writer.serialize(row)?;
	}
	writer.flush()?;

	tracing::info!(rows = rows.len(), path = %destination.display(), "Coverage report saved");
	Ok(destination.to_path_buf())
}
