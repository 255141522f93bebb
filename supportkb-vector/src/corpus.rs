// ---------------------------------------------------------------------------
// Corpus and ticket CSV loading
// ---------------------------------------------------------------------------
//
// Knowledge-base exports are frequently Latin-1 rather than UTF-8, so the raw
// bytes are decoded as UTF-8 first and fall back to ISO-8859-1.
// ---------------------------------------------------------------------------

use std::path::Path;

use crate::error::VectorError;
use crate::types::{Article, TicketRequest};

/// Decode bytes as UTF-8, falling back to ISO-8859-1 (every byte maps to the
/// code point of the same value).
pub fn decode_text(bytes: Vec<u8>) -> String {
	match String::from_utf8(bytes) {
		Ok(s) => s,
		Err(e) => e.into_bytes().iter().map(|&b| b as char).collect(),
	}
}

/// A CSV table read fully into memory with named-column access.
struct Table {
	headers: Vec<String>,
	rows: Vec<csv::StringRecord>,
}

impl Table {
	fn read(path: &Path) -> Result<Self, VectorError> {
		if !path.exists() {
			return Err(VectorError::DataNotFound(path.display().to_string()));
		}
		let text = decode_text(std::fs::read(path)?);
		let mut reader = csv::ReaderBuilder::new()
			.flexible(true)
			.from_reader(text.as_bytes());

		let headers = reader
			.headers()
			.map_err(|e| VectorError::Schema(format!("Failed to read headers: {}", e)))?
			.iter()
			.map(|h| h.trim().trim_start_matches('\u{feff}').to_string())
			.collect();

		let mut rows = Vec::new();
		for (i, record) in reader.records().enumerate() {
			let record = record.map_err(|e| {
				VectorError::Schema(format!("Failed to read row {}: {}", i + 2, e))
			})?;
			rows.push(record);
		}

		Ok(Self { headers, rows })
	}

	fn require(&self, columns: &[&str]) -> Result<Vec<usize>, VectorError> {
		let missing: Vec<&str> = columns
			.iter()
			.copied()
			.filter(|c| !self.headers.iter().any(|h| h == c))
			.collect();
		if !missing.is_empty() {
			return Err(VectorError::Schema(format!(
				"CSV must contain {:?} columns; missing {:?}, found {:?}",
				columns, missing, self.headers
			)));
		}
		Ok(columns
			.iter()
			.filter_map(|c| self.headers.iter().position(|h| h == c))
			.collect())
	}
}

fn cell(record: &csv::StringRecord, idx: usize) -> String {
	record.get(idx).unwrap_or_default().to_string()
}

/// Load knowledge-base articles from a CSV with `title` and `body` columns.
///
/// Fails with `DataNotFound` if the file is absent and with `Schema` if the
/// required columns are missing or the corpus has no rows.
pub fn load_articles(path: impl AsRef<Path>) -> Result<Vec<Article>, VectorError> {
	let path = path.as_ref();
	let table = Table::read(path)?;
	let cols = table.require(&["title", "body"])?;

	let articles: Vec<Article> = table
		.rows
		.iter()
		.map(|r| Article::new(cell(r, cols[0]), cell(r, cols[1])))
		.collect();

	if articles.is_empty() {
		return Err(VectorError::Schema(format!(
			"Corpus {} contains no articles",
			path.display()
		)));
	}

	tracing::info!(count = articles.len(), path = %path.display(), "Loaded articles");
	Ok(articles)
}

/// Load tickets from a CSV with `ticket_id` and `ticket_text` columns.
pub fn load_tickets(path: impl AsRef<Path>) -> Result<Vec<TicketRequest>, VectorError> {
	let path = path.as_ref();
	let table = Table::read(path)?;
	let cols = table.require(&["ticket_id", "ticket_text"])?;

	let tickets: Vec<TicketRequest> = table
		.rows
		.iter()
		.map(|r| TicketRequest {
			ticket_id: cell(r, cols[0]),
			ticket_text: cell(r, cols[1]),
		})
		.collect();

	tracing::info!(count = tickets.len(), path = %path.display(), "Loaded tickets");
	Ok(tickets)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn write(dir: &tempfile::TempDir, name: &str, bytes: &[u8]) -> std::path::PathBuf {
		let path = dir.path().join(name);
		std::fs::write(&path, bytes).unwrap();
		path
	}

	#[test]
	fn loads_title_and_body() {
		let dir = tempfile::tempdir().unwrap();
		let path = write(
			&dir,
			"kb.csv",
			b"title,body\nReset Password,Use the reset link\nRefund Policy,\"Refunds within 30 days, no questions\"\n",
		);
		let articles = load_articles(&path).unwrap();
		assert_eq!(articles.len(), 2);
		assert_eq!(articles[0].title, "Reset Password");
		assert_eq!(articles[1].body, "Refunds within 30 days, no questions");
		assert_eq!(articles[0].text(), "Reset Password Use the reset link");
	}

	#[test]
	fn extra_columns_and_order_are_ignored() {
		let dir = tempfile::tempdir().unwrap();
		let path = write(&dir, "kb.csv", b"id,body,title\n1,Body one,Title one\n");
		let articles = load_articles(&path).unwrap();
		assert_eq!(articles[0], Article::new("Title one", "Body one"));
	}

	#[test]
	fn missing_file_is_data_not_found() {
		let err = load_articles("/definitely/not/here.csv").unwrap_err();
		assert!(matches!(err, VectorError::DataNotFound(_)));
	}

	#[test]
	fn missing_body_column_is_schema_error() {
		let dir = tempfile::tempdir().unwrap();
		let path = write(&dir, "kb.csv", b"title,content\nA,B\n");
		let err = load_articles(&path).unwrap_err();
		assert!(matches!(err, VectorError::Schema(_)));
		assert!(err.to_string().contains("body"));
	}

	#[test]
	fn empty_corpus_is_schema_error() {
		let dir = tempfile::tempdir().unwrap();
		let path = write(&dir, "kb.csv", b"title,body\n");
		assert!(matches!(
			load_articles(&path).unwrap_err(),
			VectorError::Schema(_)
		));
	}

	#[test]
	fn latin1_corpus_is_decoded() {
		let dir = tempfile::tempdir().unwrap();
		// "Caf\xe9" is Latin-1 for "Café" and invalid as UTF-8.
		let path = write(&dir, "kb.csv", b"title,body\nCaf\xe9 Hours,Open daily\n");
		let articles = load_articles(&path).unwrap();
		assert_eq!(articles[0].title, "Café Hours");
	}

	#[test]
	fn short_rows_yield_empty_cells() {
		let dir = tempfile::tempdir().unwrap();
		let path = write(&dir, "kb.csv", b"title,body\nOnly Title\n");
		let articles = load_articles(&path).unwrap();
		assert_eq!(articles[0].body, "");
	}

	#[test]
	fn loads_tickets() {
		let dir = tempfile::tempdir().unwrap();
		let path = write(
			&dir,
			"tickets.csv",
			b"ticket_id,ticket_text\nT1,I need a refund\nT2,Cannot log in\n",
		);
		let tickets = load_tickets(&path).unwrap();
		assert_eq!(tickets.len(), 2);
		assert_eq!(tickets[1].ticket_id, "T2");
		assert_eq!(tickets[0].ticket_text, "I need a refund");
	}
}
