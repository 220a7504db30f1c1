//! An in-memory record-management core.
//!
//! This crate admits records of declared resource types through a validation
//! pipeline, stores them with monotonically assigned identifiers and serves
//! them back through a field projection that narrows a record to the subset
//! of fields a client asked for.
//!
//! Every component is exposed as a [`tower::Service`] so that the request
//! boundary (HTTP, gRPC, a CLI) can compose them with timeouts or other
//! layers without the core knowing about transport.
//!
//! The store is volatile: its whole state lives in the process and is
//! discarded at exit.

#[cfg(test)]
pub mod tests;

pub mod records;

#[cfg(feature = "recordkeep_tracing")]
pub mod recordkeep_tracing {
    use std::sync::Once;
    use tracing_subscriber::{EnvFilter, fmt};

    static INIT: Once = Once::new();

    /// Initialize tracing for tests
    /// This sets up a tracing subscriber that will display logs during test execution.
    /// Call this at the beginning of tests that need to see tracing output.
    pub fn init() {
        INIT.call_once(|| {
            let filter = EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new("off"))
                .unwrap();

            fmt()
                .with_target(false)
                .with_test_writer()
                .with_env_filter(filter)
                .init();
        });
    }
}
