//! Core services of the record core.
//!
//! - **Store**: per-resource record storage with identifier assignment
//! - **Projection**: narrowing of records to requested fields

pub mod projection;
pub mod store;
