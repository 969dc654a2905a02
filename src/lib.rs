// Hazard Classifier Core
// Sliding-window sample construction, shape normalization and a per-domain
// HTTP inference gate for seismic and cyclone classifiers

// Module declarations
pub mod config;
pub mod dataset;
pub mod error;
pub mod evaluation;
pub mod gate;
pub mod http;
pub mod model;
pub mod normalize;
pub mod signal;
pub mod windowing;

use once_cell::sync::OnceCell;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static LOGGING: OnceCell<()> = OnceCell::new();

/// Install the global `tracing` subscriber (also captures `log` records)
///
/// Honors `RUST_LOG`, defaulting to `info`. Safe to call more than once.
pub fn init_logging() {
    LOGGING.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let installed = tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init();
        if let Err(err) = installed {
            eprintln!("[Logging] Subscriber already installed: {}", err);
        }
    });
}
