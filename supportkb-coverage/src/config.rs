use std::path::PathBuf;

use clap::Parser;

use crate::analyzer::AnalyzerConfig;
use crate::clicks::DEFAULT_SEED;
use crate::metrics::DEFAULT_CTR_THRESHOLD;

#[derive(Parser, Debug)]
#[command(
	name = "supportkb-coverage",
	about = "Per-article coverage and engagement report from recommendation event logs"
)]
pub struct CliArgs {
	/// NDJSON event log written by supportkb-vector
	#[arg(
		long,
		default_value = "logs/recommendation_events.jsonl",
		env = "SUPPORTKB_EVENT_LOG"
	)]
	pub log_path: PathBuf,

	/// Directory receiving the coverage report
	#[arg(long, default_value = "logs")]
	pub output_dir: PathBuf,

	/// Report file name inside --output-dir
	#[arg(long, default_value = "coverage_report.csv")]
	pub report_name: String,

	/// Articles with CTR below this are flagged as low engagement
	#[arg(long, default_value_t = DEFAULT_CTR_THRESHOLD)]
	pub ctr_threshold: f64,

	/// Built index directory; its articles are joined so unused ones are reported
	#[arg(long, env = "SUPPORTKB_MODEL_DIR")]
	pub model_dir: Option<PathBuf>,

	/// Recorded click export (`article,clicks` CSV). Clicks are simulated without it.
	#[arg(long)]
	pub clicks: Option<PathBuf>,

	/// Seed for simulated clicks
	#[arg(long, default_value_t = DEFAULT_SEED)]
	pub seed: u64,

	/// Log level (trace, debug, info, warn, error)
	#[arg(long, default_value = "info", env = "SUPPORTKB_LOG_LEVEL")]
	pub log_level: String,
}

impl CliArgs {
	pub fn analyzer_config(&self) -> AnalyzerConfig {
		AnalyzerConfig {
			log_path: self.log_path.clone(),
			output_dir: self.output_dir.clone(),
			report_name: self.report_name.clone(),
			ctr_threshold: self.ctr_threshold,
			model_dir: self.model_dir.clone(),
		}
	}
}
