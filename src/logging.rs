//! Logging initialisation
//!
//! All logs go to stderr so that enriched records written to stdout stay
//! machine-readable. The level filter comes from `RUST_LOG` and defaults to
//! `info`, e.g. `RUST_LOG=sales_pipeline=debug`.

use tracing_subscriber::{fmt, EnvFilter};

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber
///
/// `json` switches from human-readable lines to one JSON object per event.
/// Calling this more than once keeps the first subscriber.
pub fn init(json: bool) {
    let builder = fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true);

    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}

/// Install a debug-level subscriber that writes through the test harness
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
