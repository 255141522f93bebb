use supportkb_vector::error::VectorError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoverageError {
	#[error("Recommendation log not found: {0}")]
	LogNotFound(String),
	#[error("Malformed log record at line {line}: {reason}")]
	MalformedLogRecord { line: usize, reason: String },
	#[error("No recommendations found in the event log")]
	NoRecommendationsFound,
	#[error("Invalid CTR threshold: {0}")]
	InvalidThreshold(f64),
	#[error("CSV error: {0}")]
	Csv(#[from] csv::Error),
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	#[error(transparent)]
	Vector(#[from] VectorError),
}

impl CoverageError {
	pub fn code(&self) -> &str {
		match self {
			Self::LogNotFound(_) => "COVERAGE_LOG_NOT_FOUND",
			Self::MalformedLogRecord { .. } => "COVERAGE_MALFORMED_RECORD",
			Self::NoRecommendationsFound => "COVERAGE_NO_RECOMMENDATIONS",
			Self::InvalidThreshold(_) => "COVERAGE_INVALID_THRESHOLD",
			Self::Csv(_) => "COVERAGE_CSV",
			Self::Io(_) => "COVERAGE_IO",
			Self::Vector(e) => e.code(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn vector_errors_keep_their_code() {
		let err: CoverageError = VectorError::DataNotFound("kb.csv".into()).into();
		assert_eq!(err.code(), "KB_DATA_NOT_FOUND");
		assert_eq!(err.to_string(), "Data not found: kb.csv");
	}

	#[test]
	fn malformed_record_message_names_line() {
		let err = CoverageError::MalformedLogRecord {
			line: 4,
			reason: "expected value".into(),
		};
		assert_eq!(err.code(), "COVERAGE_MALFORMED_RECORD");
		assert!(err.to_string().contains("line 4"));
	}
}
