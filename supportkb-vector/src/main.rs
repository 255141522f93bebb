use anyhow::{Context, Result};
use clap::Parser;
use supportkb_vector::config::ServeArgs;
use supportkb_vector::corpus::load_tickets;
use supportkb_vector::event_log::EventLog;
use supportkb_vector::recommender::Recommender;
use supportkb_vector::server::VectorServer;
use supportkb_vector::transport::NdjsonTransport;

fn main() -> Result<()> {
	let args = ServeArgs::parse();

	// stdout carries the JSON-RPC channel; logs go to stderr
	tracing_subscriber::fmt()
		.with_writer(std::io::stderr)
		.with_env_filter(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&args.log_level)),
		)
		.init();

	let events = EventLog::open(&args.log_path)
		.with_context(|| format!("opening event log {}", args.log_path.display()))?;
	let recommender = match Recommender::initialize(&args.model_dir, events, args.recommender_config()) {
		Ok(r) => r,
		Err(e) => {
			tracing::error!(code = e.code(), "Failed to load recommender: {}", e);
			std::process::exit(1);
		}
	};

	if let Some(path) = &args.tickets {
		let tickets = load_tickets(path)?;
		let outcomes = recommender.recommend_batch(&tickets);
		println!("{}", serde_json::to_string_pretty(&outcomes)?);
		return Ok(());
	}

	let mut server = VectorServer::new(NdjsonTransport::new(), recommender);

	tracing::info!("supportkb-vector ready");

	if let Err(e) = server.run() {
		tracing::error!("Server error: {}", e);
		std::process::exit(1);
	}
	Ok(())
}
