//! Structured logging setup for the runner
//!
//! Log lines carry the runner mode so batch and interactive sessions can be
//! told apart when their output is collected together.

use std::sync::Once;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

static INIT: Once = Once::new();

/// Initialize tracing for the runner
///
/// This sets up a tracing subscriber with:
/// - Env filter from RUST_LOG (defaults to "off")
/// - Compact formatting on stderr, so stdout only carries rendered records
pub fn init_tracing(mode: &str) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new("off"))
            .unwrap();

        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(true)
                    .compact()
                    .with_target(true)
                    .with_thread_ids(false),
            )
            .init();

        tracing::info!(mode = %mode, "=== Runner initialized ===");
    });
}
