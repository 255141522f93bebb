// ---------------------------------------------------------------------------
// VectorServer: JSON-RPC dispatcher
// ---------------------------------------------------------------------------
//
// Reads JSON-RPC 2.0 requests (NDJSON over stdin) and answers each one from
// the shared `Recommender`. Per-request failures become error responses; the
// loop only ends when stdin closes.
// ---------------------------------------------------------------------------

use std::io::{self, BufRead, Write};

use crate::error::VectorError;
use crate::protocol::*;
use crate::recommender::Recommender;
use crate::transport::NdjsonTransport;
use crate::types::TicketRequest;

/// JSON-RPC server that dispatches requests to a [`Recommender`].
pub struct VectorServer<W: Write = io::Stdout> {
	transport: NdjsonTransport<W>,
	recommender: Recommender,
}

impl<W: Write> VectorServer<W> {
	pub fn new(transport: NdjsonTransport<W>, recommender: Recommender) -> Self {
		Self {
			transport,
			recommender,
		}
	}

	/// Main loop: read JSON-RPC messages from stdin, dispatch to handlers.
	pub fn run(&mut self) -> Result<(), VectorError> {
		let stdin = io::stdin();
		self.serve(stdin.lock())
	}

	/// Serve every request line from `reader` until EOF. Only a read failure
	/// on the input ends the loop early; bad lines get an error response.
	pub fn serve<R: BufRead>(&mut self, reader: R) -> Result<(), VectorError> {
		for chunk in reader.split(b'\n') {
			let chunk = chunk?;
			if chunk.iter().all(u8::is_ascii_whitespace) {
				continue;
			}

			let value: serde_json::Value = match serde_json::from_slice(&chunk) {
				Ok(v) => v,
				Err(e) => {
					tracing::error!("Failed to parse request: {}", e);
					self.transport
						.write_error(None, PARSE_ERROR, format!("Parse error: {}", e), None);
					continue;
				}
			};

			let id = value.get("id").and_then(serde_json::Value::as_u64);
			let request: JsonRpcRequest = match serde_json::from_value(value) {
				Ok(r) => r,
				Err(e) => {
					tracing::error!("Invalid request: {}", e);
					self.transport.write_error(
						id,
						INVALID_REQUEST,
						format!("Invalid request: {}", e),
						None,
					);
					continue;
				}
			};

			self.dispatch(request);
		}

		Ok(())
	}

	pub fn into_transport(self) -> NdjsonTransport<W> {
		self.transport
	}

	// ── Dispatch ──────────────────────────────────────────────────────────

	fn dispatch(&mut self, req: JsonRpcRequest) {
		let id = req.id;
		let result = match req.method.as_str() {
			"recommend" => {
				let params: RecommendParams = match serde_json::from_value(req.params) {
					Ok(p) => p,
					Err(e) => {
						self.transport.write_error(
							Some(id),
							INVALID_PARAMS,
							format!("Invalid params: {}", e),
							None,
						);
						return;
					}
				};
				handle_recommend(&self.recommender, params)
			}
			"health" => Ok(handle_health(&self.recommender)),
			_ => {
				self.transport.write_error(
					Some(id),
					METHOD_NOT_FOUND,
					format!("Unknown method: {}", req.method),
					None,
				);
				return;
			}
		};

		match result {
			Ok(value) => self.transport.write_response(id, value),
			Err(e) => {
				tracing::warn!(id, code = e.code(), "Request failed: {}", e);
				self.transport.write_error(
					Some(id),
					VECTOR_ERROR,
					e.to_string(),
					Some(e.to_json_rpc_error()),
				)
			}
		}
	}
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

fn handle_recommend(
	recommender: &Recommender,
	params: RecommendParams,
) -> Result<serde_json::Value, VectorError> {
	let response = recommender.respond(TicketRequest {
		ticket_id: params.ticket_id,
		ticket_text: params.ticket_text,
	})?;
	serde_json::to_value(response).map_err(|e| VectorError::Serialization(e.to_string()))
}

fn handle_health(recommender: &Recommender) -> serde_json::Value {
	serde_json::json!({
		"status": "ok",
		"articles": recommender.article_count(),
		"k": recommender.top_k(),
		"provider": recommender.identity(),
	})
}
