//! Tracing subscriber setup for the `bumpcheck` binary.
//!
//! Library crates only emit `tracing` events; this is the one place a
//! subscriber is installed. `RUST_LOG` wins over `--verbose` when set.

use std::sync::Once;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: Once = Once::new();

/// Install a stderr subscriber. Later calls are ignored.
pub fn init(verbose: bool) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_directives(verbose)));

        let layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(verbose)
            .without_time();

        // Another subscriber may already be installed by an embedding process.
        let _ = tracing_subscriber::registry().with(filter).with(layer).try_init();
    });
}

fn default_directives(verbose: bool) -> &'static str {
    if verbose {
        "warn,bumpcheck=debug"
    } else {
        "warn"
    }
}
