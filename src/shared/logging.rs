//! Tracing subscriber setup.
//!
//! Log output goes to stderr so that reports and summaries on stdout stay
//! machine-readable. `RUST_LOG` takes precedence over the `--debug` flag.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global subscriber. Calling it twice is a no-op.
pub fn init(debug: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(debug)));

    let layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(debug)
        .without_time();

    // try_init fails only when a subscriber is already installed (e.g. in tests).
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init();
}

fn default_directive(debug: bool) -> String {
    let level = if debug { "debug" } else { "info" };
    format!("warn,pds_issues={level}")
}
