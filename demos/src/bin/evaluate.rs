//! Localisation metrics on synthetic scenarios
//!
//! Runs every selected mask-based metric on three scenarios whose attribution
//! hits, straddles or misses the mask, then a random control-variate
//! explainer, then the focus metric on mosaics scored by a Sobel explainer.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin evaluate
//!
//! # Selected metrics, aggregated, as JSON
//! cargo run --bin evaluate -- --metric auc --metric top-k --aggregate --json
//!
//! # WGPU backend
//! cargo run --bin evaluate --features wgpu --no-default-features
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use burn::prelude::*;
use classifiers::LeNetConfig;
use clap::Parser;
use localisation::{
    mosaic_creation, AggregationFunc, ConstantExplainer, FillValue, FocusConfig, ModelWrapper,
    SobelExplainer,
};
use localisation_demos::{
    create_device, get_backend_name, init_logging, labelled_images, synthetic_batch, DemoConfig,
    MetricKind, MetricReport, Placement, SelectedBackend,
};

const MOSAIC_CLASSES: usize = 3;
const IMAGES_PER_CLASS: usize = 4;
const DIGIT_SIDE: usize = 28;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Metric to run; repeat for several (default: all)
    #[arg(short, long = "metric")]
    metrics: Vec<MetricKind>,

    /// Override samples per scenario
    #[arg(long)]
    samples: Option<usize>,

    /// Override image side length
    #[arg(long)]
    side: Option<usize>,

    /// Override the random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Override k of the top-k intersection
    #[arg(long)]
    top_k: Option<usize>,

    /// Use the weighted metric variants
    #[arg(long)]
    weighted: bool,

    /// Return one aggregate per call instead of per-sample scores
    #[arg(long)]
    aggregate: bool,

    /// Aggregation function (mean or median)
    #[arg(long)]
    aggregate_func: Option<AggregationFunc>,

    /// Skip the focus metric
    #[arg(long)]
    skip_focus: bool,

    /// Print reports as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();

    let mut config = DemoConfig::load(args.config.as_deref())?;
    if !args.metrics.is_empty() {
        config.metrics = args.metrics;
    }
    config.samples = args.samples.unwrap_or(config.samples);
    config.side = args.side.unwrap_or(config.side);
    config.seed = args.seed.unwrap_or(config.seed);
    config.top_k = args.top_k.unwrap_or(config.top_k);
    config.weighted |= args.weighted;
    config.return_aggregate |= args.aggregate;
    if let Some(func) = args.aggregate_func {
        config.aggregate_func = func;
    }

    let device = create_device();
    tracing::info!("Using backend: {}", get_backend_name());

    let mut reports = scenario_reports(&config, &device)?;
    reports.extend(control_variate_reports(&config, &device)?);
    if !args.skip_focus {
        reports.push(focus_report(&config, &device)?);
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

fn scenario_reports(
    config: &DemoConfig,
    device: &<SelectedBackend as Backend>::Device,
) -> Result<Vec<MetricReport>> {
    let mut reports = Vec::new();
    for placement in Placement::ALL {
        let batch = synthetic_batch::<SelectedBackend>(
            placement,
            config.samples,
            config.side,
            config.seed,
            device,
        );
        let scenario = format!("{placement:?}").to_lowercase();
        for &kind in &config.metrics {
            let mut metric = kind.build::<SelectedBackend, 4>(config)?;
            let output = metric
                .evaluate(None, &batch)
                .with_context(|| format!("{} failed on the {scenario} scenario", metric.name()))?;
            reports.push(MetricReport::new(
                metric.name(),
                &scenario,
                output,
                metric.warnings(),
            ));
        }
    }
    Ok(reports)
}

/// Scores random constant attributions, the baseline a real explainer should beat.
fn control_variate_reports(
    config: &DemoConfig,
    device: &<SelectedBackend as Backend>::Device,
) -> Result<Vec<MetricReport>> {
    let model = ModelWrapper::<SelectedBackend, _>::new(LeNetConfig::new().init(device)).eval();
    let mut batch = synthetic_batch::<SelectedBackend>(
        Placement::Inside,
        config.samples,
        config.side,
        config.seed,
        device,
    );
    batch.attributions = None;

    let mut reports = Vec::new();
    for &kind in &config.metrics {
        let mut metric = kind
            .build::<SelectedBackend, 4>(config)?
            .with_explainer(ConstantExplainer::new(FillValue::Random));
        let output = metric.evaluate(Some(&model), &batch)?;
        reports.push(MetricReport::new(
            metric.name(),
            "random",
            output,
            metric.warnings(),
        ));
    }
    Ok(reports)
}

fn focus_report(
    config: &DemoConfig,
    device: &<SelectedBackend as Backend>::Device,
) -> Result<MetricReport> {
    let model = ModelWrapper::<SelectedBackend, _>::new(LeNetConfig::new().init(device)).eval();
    let (images, labels) = labelled_images::<SelectedBackend>(
        MOSAIC_CLASSES,
        IMAGES_PER_CLASS,
        DIGIT_SIDE,
        config.seed,
        device,
    );
    let set = mosaic_creation(images, &labels, 2, config.seed)?;
    tracing::info!("Created {} mosaics", set.len());

    let mut metric = FocusConfig::new()
        .with_evaluation(config.evaluation())
        .init::<SelectedBackend>()?
        .with_explainer(SobelExplainer);
    let output = metric.evaluate(Some(&model), &set.into_batch(None))?;
    Ok(MetricReport::new(
        metric.name(),
        "mosaics",
        output,
        metric.warnings(),
    ))
}
