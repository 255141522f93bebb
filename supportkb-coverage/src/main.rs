use anyhow::Result;
use clap::Parser;
use supportkb_coverage::analyzer::CoverageAnalyzer;
use supportkb_coverage::clicks::{ClickSource, RecordedClickSource, SimulatedClickSource};
use supportkb_coverage::config::CliArgs;

fn main() -> Result<()> {
	let args = CliArgs::parse();

	tracing_subscriber::fmt()
		.with_writer(std::io::stderr)
		.with_env_filter(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&args.log_level)),
		)
		.init();

	let clicks: Box<dyn ClickSource> = match &args.clicks {
		Some(path) => Box::new(RecordedClickSource::from_csv(path)?),
		None => Box::new(SimulatedClickSource::new(args.seed)),
	};

	let analyzer = CoverageAnalyzer::with_click_source(args.analyzer_config(), clicks);
	let bundle = match analyzer.run_full_analysis() {
		Ok(b) => b,
		Err(e) => {
			tracing::error!(code = e.code(), "Coverage analysis failed: {}", e);
			std::process::exit(1);
		}
	};

	println!("Total articles analyzed: {}", bundle.coverage.len());
	println!("Low CTR articles: {}", bundle.low_ctr.len());
	for row in &bundle.low_ctr {
		println!("  {} (CTR {:.2}, impressions {})", row.article, row.ctr, row.impressions);
	}
	println!("Unused articles: {}", bundle.unused.len());
	for row in &bundle.unused {
		println!("  {}", row.article);
	}
	if bundle.skipped > 0 {
		println!("Skipped malformed records: {}", bundle.skipped);
	}
	println!("Report: {}", bundle.report_path.display());
	Ok(())
}
