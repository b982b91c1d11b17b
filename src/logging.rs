//! Logging initialization.
//!
//! Logs go to stderr so they never interleave with REPL output on stdout.
//! `RUST_LOG` overrides the default filter.

use std::sync::Once;

use tracing_subscriber::EnvFilter;

static INIT_ONCE: Once = Once::new();

pub fn init(verbose: bool) {
    INIT_ONCE.call_once(|| {
        let default = if verbose { "roster=debug" } else { "roster=warn" };
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

        // A subscriber installed by the host (e.g. in tests) wins.
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    });
}
