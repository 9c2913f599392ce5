//! Localisation metrics on attribution/mask images
//!
//! Reads `attributions/` and `masks/` under a root directory, pairs files by
//! stem and scores every pair with the selected metrics. Pairs are evaluated
//! in mini-batches so that results accumulate across calls.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin evaluate_dir -- data/
//!
//! cargo run --bin evaluate_dir -- data/ --metric rma --batch-size 16 --json
//! ```

use std::path::PathBuf;

use anyhow::{ensure, Context, Result};
use clap::Parser;
use localisation::EvaluationOutput;
use localisation_demos::{
    collect_pairs, create_device, get_backend_name, init_logging, load_batch, DemoConfig,
    MetricKind, MetricReport, SelectedBackend,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory holding `attributions/` and `masks/`
    root: PathBuf,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Metric to run; repeat for several (default: all)
    #[arg(short, long = "metric")]
    metrics: Vec<MetricKind>,

    /// Pairs per evaluation call
    #[arg(long, default_value = "8")]
    batch_size: usize,

    /// Override the mask binarization threshold
    #[arg(long)]
    mask_threshold: Option<f32>,

    /// Override k of the top-k intersection
    #[arg(long)]
    top_k: Option<usize>,

    /// Print reports as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();
    ensure!(args.batch_size > 0, "Batch size must be at least 1");

    let mut config = DemoConfig::load(args.config.as_deref())?;
    if !args.metrics.is_empty() {
        config.metrics = args.metrics;
    }
    config.mask_threshold = args.mask_threshold.unwrap_or(config.mask_threshold);
    config.top_k = args.top_k.unwrap_or(config.top_k);
    // Per-sample scores are needed to report per-file results.
    config.return_aggregate = false;

    let device = create_device();
    tracing::info!("Using backend: {}", get_backend_name());

    let pairs = collect_pairs(&args.root)?;
    let scenario = args
        .root
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "pairs".to_owned());

    let mut reports = Vec::new();
    for &kind in &config.metrics {
        let mut metric = kind.build::<SelectedBackend, 4>(&config)?;
        for chunk in pairs.chunks(args.batch_size) {
            let batch = load_batch::<SelectedBackend>(chunk, &device)?;
            metric
                .evaluate(None, &batch)
                .with_context(|| format!("{} failed", metric.name()))?;
        }

        let scores = metric.accumulated_results().to_vec();
        if !args.json {
            for (pair, score) in pairs.iter().zip(&scores) {
                tracing::debug!("{} {}: {score:.4}", metric.name(), pair.name());
            }
        }
        reports.push(MetricReport::new(
            metric.name(),
            &scenario,
            EvaluationOutput::PerSample(scores),
            metric.warnings(),
        ));
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        for report in &reports {
            println!("{}", report.line());
        }
    }
    Ok(())
}
