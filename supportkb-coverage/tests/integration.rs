// ---------------------------------------------------------------------------
// End-to-end: build an index, serve tickets, analyze the resulting log
// ---------------------------------------------------------------------------

use std::path::PathBuf;
use std::process::Command;

use supportkb_coverage::analyzer::{AnalyzerConfig, CoverageAnalyzer};
use supportkb_coverage::metrics::CoverageRow;
use supportkb_vector::builder::{BuildConfig, IndexBuilder};
use supportkb_vector::embedding::HashingEmbedder;
use supportkb_vector::event_log::EventLog;
use supportkb_vector::recommender::{Recommender, RecommenderConfig};

const CORPUS: &str = "\
title,body
Reset Password,Reset your password from the login page
Refund Policy,Refunds are issued within 30 days
Shipping Times,Orders ship within two business days
Cancel Subscription,Cancel your subscription from account settings
Update Billing,Update your billing card in account settings
";

struct Pipeline {
	dir: tempfile::TempDir,
}

impl Pipeline {
	/// Build the index and serve `tickets` with k=1.
	fn run(tickets: &[(&str, &str)]) -> Self {
		let dir = tempfile::tempdir().unwrap();
		let corpus_path = dir.path().join("kb.csv");
		std::fs::write(&corpus_path, CORPUS).unwrap();

		let embedder = HashingEmbedder::new(256).unwrap();
		IndexBuilder::new(
			BuildConfig {
				corpus_path,
				output_dir: dir.path().join("models"),
				normalize: true,
			},
			&embedder,
		)
		.run_full_pipeline()
		.unwrap();

		let events = EventLog::open(dir.path().join("logs").join("events.jsonl")).unwrap();
		let recommender = Recommender::initialize(
			dir.path().join("models"),
			events,
			RecommenderConfig {
				top_k: 1,
				..Default::default()
			},
		)
		.unwrap();
		for (id, text) in tickets {
			recommender.recommend(id, text).unwrap();
		}

		Self { dir }
	}

	fn path(&self, name: &str) -> PathBuf {
		self.dir.path().join(name)
	}

	fn config(&self) -> AnalyzerConfig {
		AnalyzerConfig {
			log_path: self.path("logs").join("events.jsonl"),
			output_dir: self.path("reports"),
			model_dir: Some(self.path("models")),
			..Default::default()
		}
	}
}

const TICKETS: &[(&str, &str)] = &[
	("T1", "I need a refund"),
	("T2", "refund for my order please"),
	("T3", "forgot my password"),
	("T4", "I need a refund"),
];

#[test]
fn served_tickets_become_coverage_rows() {
	let pipeline = Pipeline::run(TICKETS);
	let bundle = CoverageAnalyzer::new(pipeline.config()).run_full_analysis().unwrap();

	assert_eq!(bundle.events.len(), 4);
	assert_eq!(bundle.skipped, 0);
	assert_eq!(bundle.expanded.len(), 4);

	let titles: Vec<&str> = bundle.coverage.iter().map(|r| r.article.as_str()).collect();
	assert_eq!(
		titles,
		[
			"Cancel Subscription",
			"Refund Policy",
			"Reset Password",
			"Shipping Times",
			"Update Billing"
		]
	);

	let refund = &bundle.coverage[1];
	assert_eq!(refund.impressions, 3);
	assert!(refund.clicks <= refund.impressions);

	let unused: Vec<&str> = bundle.unused.iter().map(|r| r.article.as_str()).collect();
	assert_eq!(unused, ["Cancel Subscription", "Shipping Times", "Update Billing"]);
	assert!(bundle.low_ctr.iter().all(|r| r.ctr < 0.6));
}

#[test]
fn repeated_runs_give_identical_reports() {
	let pipeline = Pipeline::run(TICKETS);
	let first = CoverageAnalyzer::new(pipeline.config()).run_full_analysis().unwrap();
	let first_report = std::fs::read_to_string(&first.report_path).unwrap();
	let second = CoverageAnalyzer::new(pipeline.config()).run_full_analysis().unwrap();
	let second_report = std::fs::read_to_string(&second.report_path).unwrap();

	assert_eq!(first.coverage, second.coverage);
	assert_eq!(first_report, second_report);
}

#[test]
fn binary_writes_report() {
	let pipeline = Pipeline::run(TICKETS);
	std::fs::write(pipeline.path("clicks.csv"), "article,clicks\nRefund Policy,3\n").unwrap();

	let output = Command::new(env!("CARGO_BIN_EXE_supportkb-coverage"))
		.arg("--log-path")
		.arg(pipeline.path("logs").join("events.jsonl"))
		.arg("--output-dir")
		.arg(pipeline.path("reports"))
		.arg("--model-dir")
		.arg(pipeline.path("models"))
		.arg("--clicks")
		.arg(pipeline.path("clicks.csv"))
		.env_remove("RUST_LOG")
		.output()
		.expect("failed to run supportkb-coverage");
	assert!(output.status.success());

	let stdout = String::from_utf8_lossy(&output.stdout);
	assert!(stdout.contains("Total articles analyzed: 5"));
	assert!(stdout.contains("Unused articles: 3"));

	let report = pipeline.path("reports").join("coverage_report.csv");
	let rows: Vec<CoverageRow> = csv::Reader::from_path(&report)
		.unwrap()
		.deserialize()
		.collect::<Result<_, _>>()
		.unwrap();
	let refund = rows.iter().find(|r| r.article == "Refund Policy").unwrap();
	assert_eq!((refund.impressions, refund.clicks, refund.ctr), (3, 3, 1.0));
	let reset = rows.iter().find(|r| r.article == "Reset Password").unwrap();
	assert_eq!(reset.ctr, 0.0);
}

#[test]
fn binary_fails_without_log() {
	let dir = tempfile::tempdir().unwrap();
	let status = Command::new(env!("CARGO_BIN_EXE_supportkb-coverage"))
		.arg("--log-path")
		.arg(dir.path().join("missing.jsonl"))
		.arg("--output-dir")
		.arg(dir.path())
		.env_remove("SUPPORTKB_MODEL_DIR")
		.status()
		.unwrap();
	assert!(!status.success());
}
