//! External-facing API of the record core.
//!
//! - **Record API**: the request boundary service that validates creation
//!   payloads, dispatches them to the store of their resource type and
//!   narrows records on retrieval.

pub mod record_api;
pub mod types;

// Re-export all types for convenience
pub use types::*;
