use thiserror::Error;

#[derive(Debug, Error)]
pub enum VectorError {
	#[error("Data not found: {0}")]
	DataNotFound(String),
	#[error("Schema error: {0}")]
	Schema(String),
	#[error("Artifact missing: {0}")]
	ArtifactMissing(String),
	#[error("Artifact corrupt: {0}")]
	ArtifactCorrupt(String),
	#[error("Dimension mismatch: index has {expected}, provider produced {actual}")]
	DimensionMismatch { expected: usize, actual: usize },
	#[error("Embedding failed: {0}")]
	Embedding(String),
	#[error("Empty text: cannot recommend for an empty ticket")]
	EmptyText,
	#[error("Event log error: {0}")]
	EventLog(String),
	#[error("Invalid configuration: {0}")]
	InvalidConfig(String),
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	#[error("Serialization error: {0}")]
	Serialization(String),
}

impl VectorError {
	pub fn code(&self) -> &str {
		match self {
			Self::DataNotFound(_) => "KB_DATA_NOT_FOUND",
			Self::Schema(_) => "KB_SCHEMA",
			Self::ArtifactMissing(_) => "KB_ARTIFACT_MISSING",
			Self::ArtifactCorrupt(_) => "KB_ARTIFACT_CORRUPT",
			Self::DimensionMismatch { .. } => "KB_DIMENSION_MISMATCH",
			Self::Embedding(_) => "KB_EMBEDDING",
			Self::EmptyText => "KB_EMPTY_TEXT",
			Self::EventLog(_) => "KB_EVENT_LOG",
			Self::InvalidConfig(_) => "KB_INVALID_CONFIG",
			Self::Io(_) => "KB_IO",
			Self::Serialization(_) => "KB_SERIALIZATION",
		}
	}

	/// True for failures scoped to a single request; the server keeps serving.
	pub fn is_request_level(&self) -> bool {
		matches!(
			self,
			Self::Embedding(_)
				| Self::EmptyText
				| Self::EventLog(_)
				| Self::DimensionMismatch { .. }
				| Self::Serialization(_)
		)
	}

	pub fn to_json_rpc_error(&self) -> serde_json::Value {
		serde_json::json!({
			"vectorCode": self.code(),
			"message": self.to_string(),
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn codes_are_stable() {
		assert_eq!(VectorError::EmptyText.code(), "KB_EMPTY_TEXT");
		assert_eq!(
			VectorError::DimensionMismatch {
				expected: 4,
				actual: 8
			}
			.code(),
			"KB_DIMENSION_MISMATCH"
		);
	}

	#[test]
	fn json_rpc_payload_carries_code_and_message() {
		let err = VectorError::ArtifactMissing("models/embed_model.json".into());
		let payload = err.to_json_rpc_error();
		assert_eq!(payload["vectorCode"], "KB_ARTIFACT_MISSING");
		assert!(payload["message"]
			.as_str()
			.unwrap()
			.contains("embed_model.json"));
	}

	#[test]
	fn startup_errors_are_not_request_level() {
		assert!(!VectorError::ArtifactCorrupt("x".into()).is_request_level());
		assert!(VectorError::Embedding("timeout".into()).is_request_level());
	}
}
