//! Record module.
//!
//! This module provides the ingestion-and-projection core: validated
//! creation of records with server-computed fields and monotonically
//! assigned identifiers, and retrieval of records narrowed to a
//! client-controlled set of fields.
//!
//! ## Core Architecture
//!
//! ### Record API
//! The request boundary forwards two kinds of requests:
//! - **Create**: a raw payload is validated against the field specification
//!   of its resource type and admitted by that type's store
//! - **Read**: a record is looked up by identifier and narrowed to the
//!   requested fields
//!
//! ## Service Components
//!
//! ### Core Services
//! - **Store**: holds the records of one resource type, assigns identifiers
//!   and computes derived fields
//! - **Projection**: narrows a record to a requested field set
//!
//! ### Infrastructure
//! - **Schema**: declarative field specifications
//! - **Validation**: total validation of raw payloads
//! - **Selection**: client field selectors
//!
//! ## Initialization Helpers
//!
//! - `init_records()`: the default stack with the `order` and
//!   `user_profile` resource types
//! - `init_records_with()`: a stack with one store per supplied spec
pub mod api;
pub mod error;
pub mod infrastructure;
pub mod services;

use infrastructure::schema::FieldSpec;

/// Standard record API service stack backed by in-memory stores.
pub type RecordApiDefaultStack = api::record_api::RecordApiService<services::store::RecordStore>;

/// Initialize the default record stack.
///
/// Registers one store for orders and one for user profiles.
pub fn init_records() -> RecordApiDefaultStack {
    init_records_with([FieldSpec::orders(), FieldSpec::user_profiles()])
}

/// Initialize a record stack with one store per field specification.
pub fn init_records_with(specs: impl IntoIterator<Item = FieldSpec>) -> RecordApiDefaultStack {
    specs.into_iter().fold(api::record_api::RecordApiService::new(), |service, spec| {
        service.with_store(services::store::RecordStore::new(spec))
    })
}
