//! Record API type definitions.
//!
//! This module defines the request and response types of the record core.
//!
//! ## Client API
//! [`ApiRequest`] / [`ApiResponse`] are the two request patterns a boundary
//! forwards to the core: creation of a record from a raw payload, and
//! retrieval of a record narrowed to a set of requested fields.
//!
//! ## Internal Service APIs
//! [`StoreRequest`] / [`StoreResponse`] address the per-resource record
//! store.

use serde_json::Value;

use crate::records::infrastructure::{
    selection::FieldSelection,
    value::{NormalizedPayload, PartialRecord, Record},
};

/// Client request types.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiRequest {
    /// Validate a raw payload and admit it as a new record.
    Create {
        /// Resource type the record belongs to (e.g. `order`)
        resource: String,
        /// Raw creation payload, expected to be a JSON object
        payload: Value,
    },

    /// Fetch a record and narrow it to the requested fields.
    Read {
        /// Resource type the record belongs to
        resource: String,
        /// Identifier assigned at creation
        id: u64,
        /// Requested fields, empty for all of them
        fields: FieldSelection,
    },
}

impl ApiRequest {
    pub fn resource(&self) -> &str {
        match self {
            ApiRequest::Create { resource, .. } | ApiRequest::Read { resource, .. } => resource,
        }
    }
}

/// Client response types.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse {
    /// The fully materialized record admitted by a `Create` request.
    Created(Record),
    /// The narrowed view returned by a `Read` request.
    Found(PartialRecord),
}

/// Record store request types.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreRequest {
    /// Admit a validated payload, assigning the next identifier.
    Insert(NormalizedPayload),
    /// Fetch the record with the given identifier.
    Lookup(u64),
    /// Number of records held by the store.
    Count,
}

/// Record store response types.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreResponse {
    Record(Record),
    Count(usize),
}
