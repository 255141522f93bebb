use anyhow::{bail, Result};
use clap::Parser;
use supportkb_vector::builder::IndexBuilder;
use supportkb_vector::config::IndexArgs;
use supportkb_vector::embedding::{Embedder, HashingEmbedder, ProviderKind, TeiConfig, TeiEmbedder};

fn main() -> Result<()> {
	let args = IndexArgs::parse();

	tracing_subscriber::fmt()
		.with_writer(std::io::stderr)
		.with_env_filter(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&args.log_level)),
		)
		.init();

	let embedder: Box<dyn Embedder> = match args.provider {
		ProviderKind::Hashing => Box::new(HashingEmbedder::new(args.dimension)?),
		ProviderKind::Tei => {
			let Some(url) = args.tei_url.clone() else {
				bail!("--tei-url is required with --provider tei");
			};
			Box::new(TeiEmbedder::new(TeiConfig {
				base_url: url,
				timeout_secs: args.timeout_secs,
				normalize: !args.no_normalize,
				..Default::default()
			}))
		}
	};

	tracing::info!(
		corpus = %args.corpus.display(),
		provider = ?args.provider,
		"Building article index"
	);

	let builder = IndexBuilder::new(args.build_config(), embedder.as_ref());
	let summary = builder.run_full_pipeline()?;

	tracing::info!(
		articles = summary.articles,
		dimension = summary.dimension,
		output_dir = %summary.output_dir.display(),
		"Index build complete"
	);
	Ok(())
}
