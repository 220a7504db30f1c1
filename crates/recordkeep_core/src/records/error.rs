use thiserror::Error;

use crate::records::infrastructure::validation::ViolationList;

#[derive(Debug, Error, PartialEq)]
pub enum RecordError {
    #[error("Record error, validation failed ({0})")]
    ValidationFailed(ViolationList),

    #[error("Record error, record not found (id: {0})")]
    RecordNotFound(u64),

    #[error("Record error, unknown resource type (resource: {0})")]
    UnknownResource(String),

    #[error("Record error, malformed payload (expected a JSON object)")]
    MalformedPayload,

    #[error("Record error, unknown field (field: {0})")]
    UnknownField(String),

    #[error("Record error, payload does not belong to this store (expected: {expected}, got: {actual})")]
    ResourceMismatch { expected: String, actual: String },

    #[error("Record error, invalid schema ({0})")]
    InvalidSchema(String),

    #[error("Record error, internal record API error")]
    InternalRecordError,
}

impl RecordError {
    /// Stable machine-readable code, suitable for a transport layer to map
    /// onto its own status codes.
    pub fn code(&self) -> &'static str {
        match self {
            RecordError::ValidationFailed(_) => "VALIDATION_FAILED",
            RecordError::RecordNotFound(_) => "RECORD_NOT_FOUND",
            RecordError::UnknownResource(_) => "UNKNOWN_RESOURCE",
            RecordError::MalformedPayload => "MALFORMED_PAYLOAD",
            RecordError::UnknownField(_) => "UNKNOWN_FIELD",
            RecordError::ResourceMismatch { .. } => "RESOURCE_MISMATCH",
            RecordError::InvalidSchema(_) => "INVALID_SCHEMA",
            RecordError::InternalRecordError => "INTERNAL",
        }
    }
}
