use serde::{Deserialize, Serialize};

/// A knowledge-base article. Its id is the row position in the metadata table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
	pub title: String,
	pub body: String,
}

impl Article {
	pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
		Self {
			title: title.into(),
			body: body.into(),
		}
	}

	/// Text submitted to the embedding provider.
	pub fn text(&self) -> String {
		format!("{} {}", self.title, self.body)
	}
}

/// A raw index hit: row position plus similarity score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lookup {
	pub row: usize,
	pub score: f64,
}

/// One ranked article in a recommendation response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendedArticle {
	pub rank: usize,
	pub article_title: String,
	pub score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketRequest {
	pub ticket_id: String,
	pub ticket_text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationResponse {
	pub ticket_id: String,
	pub ticket_text: String,
	pub recommendations: Vec<RecommendedArticle>,
}

/// Append-only log record written once per served request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationEvent {
	pub ticket_id: String,
	pub ticket_text: String,
	pub results: Vec<RecommendedArticle>,
	#[serde(default)]
	pub timestamp: u64,
}

/// Outcome of one ticket in a batch run.
#[derive(Debug, Clone, Serialize)]
pub struct BatchOutcome {
	pub ticket_id: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub recommendations: Option<Vec<RecommendedArticle>>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub error: Option<String>,
}
