//! Record projection.
//!
//! Narrows a full record to the fields a client asked for. Output follows
//! record field order, never request order, so the same record and the same
//! selection always render the same view.
//!
//! Unknown names are dropped by default so older and newer clients can keep
//! asking for fields a resource type does or does not carry. A strict
//! projector rejects them instead.
#[cfg(feature = "recordkeep_tracing")]
use tracing::debug;

use crate::records::{
    error::RecordError,
    infrastructure::{
        schema::FieldSpec,
        selection::FieldSelection,
        value::{PartialRecord, Record},
    },
};

/// Narrows `record` to `selection`, silently dropping unknown names.
///
/// An empty selection yields the full record.
pub fn narrow(record: &Record, selection: &FieldSelection) -> PartialRecord {
    if selection.is_all() {
        return PartialRecord::from(record);
    }
    PartialRecord::new(
        record
            .entries()
            .filter(|(name, _)| selection.contains(name))
            .map(|(name, value)| (name.to_string(), value))
            .collect(),
    )
}

/// Projection policy.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub struct Projector {
    strict: bool,
}

impl Projector {
    /// Projector dropping unknown field names.
    pub fn permissive() -> Self {
        Self { strict: false }
    }

    /// Projector rejecting unknown field names.
    pub fn strict() -> Self {
        Self { strict: true }
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Narrows `record` to `selection`.
    ///
    /// In strict mode, the first requested name (in sorted order) that the
    /// resource type does not declare is reported as
    /// [`RecordError::UnknownField`]. Declared optional fields the record
    /// does not carry are not an error.
    pub fn narrow(
        &self,
        spec: &FieldSpec,
        record: &Record,
        selection: &FieldSelection,
    ) -> Result<PartialRecord, RecordError> {
        if self.strict
            && let Some(unknown) = selection.iter().find(|name| !spec.declares(name))
        {
            return Err(RecordError::UnknownField(unknown.to_string()));
        }
        let partial = narrow(record, selection);
        #[cfg(feature = "recordkeep_tracing")]
        debug!(
            "[projection-{}] {} of {} requested fields kept",
            spec.resource(),
            partial.len(),
            selection.len()
        );
        Ok(partial)
    }
}
