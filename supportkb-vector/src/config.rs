use std::path::PathBuf;

use clap::Parser;

use crate::builder::BuildConfig;
use crate::embedding::{ProviderKind, ProviderOverrides, DEFAULT_DIMENSION};
use crate::recommender::{RecommenderConfig, DEFAULT_TOP_K};

#[derive(Parser, Debug)]
#[command(
	name = "supportkb-index",
	about = "Build the knowledge-base article index from a CSV corpus"
)]
pub struct IndexArgs {
	/// Article corpus CSV with `title` and `body` columns
	#[arg(
		long,
		default_value = "data/raw/knowledge_base_articles.csv",
		env = "SUPPORTKB_CORPUS"
	)]
	pub corpus: PathBuf,

	/// Directory receiving the index, metadata and provider identity
	#[arg(long, default_value = "models", env = "SUPPORTKB_MODEL_DIR")]
	pub output_dir: PathBuf,

	/// Embedding provider: "hashing" (local, deterministic) or "tei"
	#[arg(long, default_value = "hashing", env = "SUPPORTKB_PROVIDER")]
	pub provider: ProviderKind,

	/// Output dimension of the hashing provider
	#[arg(long, default_value_t = DEFAULT_DIMENSION)]
	pub dimension: usize,

	/// TEI server URL (required with --provider tei)
	#[arg(long, env = "SUPPORTKB_TEI_URL")]
	pub tei_url: Option<String>,

	/// Per-request timeout for the TEI provider, in seconds
	#[arg(long, default_value = "30")]
	pub timeout_secs: u64,

	/// Store raw vectors instead of L2-normalized ones
	#[arg(long)]
	pub no_normalize: bool,

	/// Log level (trace, debug, info, warn, error)
	#[arg(long, default_value = "info", env = "SUPPORTKB_LOG_LEVEL")]
	pub log_level: String,
}

impl IndexArgs {
	pub fn build_config(&self) -> BuildConfig {
		BuildConfig {
			corpus_path: self.corpus.clone(),
			output_dir: self.output_dir.clone(),
			normalize: !self.no_normalize,
		}
	}
}

#[derive(Parser, Debug)]
#[command(
	name = "supportkb-vector",
	about = "Recommend knowledge-base articles for support tickets over JSON-RPC 2.0 / NDJSON stdio"
)]
pub struct ServeArgs {
	/// Directory holding a built index
	#[arg(long, default_value = "models", env = "SUPPORTKB_MODEL_DIR")]
	pub model_dir: PathBuf,

	/// Append-only NDJSON log of served recommendations
	#[arg(
		long,
		default_value = "logs/recommendation_events.jsonl",
		env = "SUPPORTKB_EVENT_LOG"
	)]
	pub log_path: PathBuf,

	/// Number of articles returned per ticket
	#[arg(long, default_value_t = DEFAULT_TOP_K, env = "SUPPORTKB_TOP_K")]
	pub top_k: usize,

	/// Replace the TEI URL recorded at build time
	#[arg(long, env = "SUPPORTKB_TEI_URL")]
	pub tei_url: Option<String>,

	/// Per-request timeout for the TEI provider, in seconds
	#[arg(long)]
	pub timeout_secs: Option<u64>,

	/// Serve every ticket in this CSV (`ticket_id`, `ticket_text`), print the
	/// results as JSON and exit instead of reading stdin
	#[arg(long)]
	pub tickets: Option<PathBuf>,

	/// Log level (trace, debug, info, warn, error)
	#[arg(long, default_value = "info", env = "SUPPORTKB_LOG_LEVEL")]
	pub log_level: String,
}

impl ServeArgs {
	pub fn recommender_config(&self) -> RecommenderConfig {
		RecommenderConfig {
			top_k: self.top_k,
			overrides: ProviderOverrides {
				tei_url: self.tei_url.clone(),
				timeout_secs: self.timeout_secs,
			},
		}
	}
}
