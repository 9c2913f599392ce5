//! Localisation metric demos
//!
//! ## Available binaries
//!
//! - `evaluate`: scores synthetic scenarios whose attribution hits, straddles
//!   or misses the mask, then runs the focus metric on generated mosaics
//! - `evaluate_dir`: scores attribution/mask image pairs read from disk
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin evaluate -- --metric auc --metric pointing-game
//!
//! cargo run --bin evaluate_dir -- data/ --config demo.json --json
//! ```

pub mod backend;
pub mod config;
pub mod pairs;
pub mod report;
pub mod scenario;

pub use backend::{create_device, get_backend_name, SelectedBackend, SelectedDevice};
pub use config::{DemoConfig, MetricKind};
pub use pairs::{collect_pairs, load_batch, ImagePair};
pub use report::MetricReport;
pub use scenario::{labelled_images, synthetic_batch, Placement};

/// Installs a `tracing` subscriber honouring `RUST_LOG`, `info` by default.
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();
}
