//! Infrastructure primitives for the record core.
//!
//! This module provides the foundational types shared by every service:
//! field values and record shapes, resource field specifications, requested
//! field sets and creation payload validation.

pub mod schema;
pub mod selection;
pub mod validation;
pub mod value;
