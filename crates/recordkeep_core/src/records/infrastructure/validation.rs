//! Creation payload validation.
//!
//! Raw payloads arrive as untyped JSON objects. The validator checks them
//! against a [`FieldSpec`] and either produces a typed [`NormalizedPayload`]
//! or the complete list of problems found.
//!
//! ## Validation Rules
//!
//! - **Presence**: every required field must be present and non-null
//!   (`MISSING_FIELD` otherwise). Absent or null optional fields are skipped.
//! - **Type**: every present field must conform to its declared kind
//!   (`INVALID_VALUE`). A mistyped field is not checked further.
//! - **Rules**: every declared rule of a well-typed field is evaluated, each
//!   failure reported as its own `INVALID_VALUE`.
//!
//! Validation never stops at the first failure: all fields are checked so
//! the caller can report every problem at once. Input fields that the field spec
//! does not declare are discarded.

use std::{fmt::Display, sync::Arc};

use serde::Serialize;
use serde_json::{Map, Value};

use crate::records::infrastructure::{
    schema::{FieldDef, FieldKind, FieldSpec},
    value::{FieldValue, NormalizedPayload},
};

/// Raw creation payload.
pub type RawPayload = Map<String, Value>;

/// Category of a validation failure.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
pub enum ViolationKind {
    #[serde(rename = "MISSING_FIELD")]
    MissingField,
    #[serde(rename = "INVALID_VALUE")]
    InvalidValue,
}

impl ViolationKind {
    pub fn code(&self) -> &'static str {
        match self {
            ViolationKind::MissingField => "MISSING_FIELD",
            ViolationKind::InvalidValue => "INVALID_VALUE",
        }
    }
}

/// A single validation failure.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct Violation {
    pub kind: ViolationKind,
    pub field: String,
    pub reason: String,
}

impl Violation {
    pub fn missing(field: &str) -> Self {
        Self {
            kind: ViolationKind::MissingField,
            field: field.to_string(),
            reason: "is required".to_string(),
        }
    }

    pub fn invalid(field: &str, reason: impl Into<String>) -> Self {
        Self { kind: ViolationKind::InvalidValue, field: field.to_string(), reason: reason.into() }
    }
}

/// Every validation failure found for one creation attempt, in declared
/// field order.
///
/// Never empty: only built from at least one violation.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ViolationList(Vec<Violation>);

impl ViolationList {
    /// Returns `None` when there is nothing to report.
    pub(crate) fn from_violations(violations: impl IntoIterator<Item = Violation>) -> Option<Self> {
        let violations: Vec<Violation> = violations.into_iter().collect();
        (!violations.is_empty()).then_some(Self(violations))
    }

    pub fn violations(&self) -> &[Violation] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Violations reported for `field`.
    pub fn for_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a Violation> + 'a {
        self.0.iter().filter(move |violation| violation.field == field)
    }
}

impl Display for ViolationList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (index, violation) in self.0.iter().enumerate() {
            if index > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{} {}: {}", violation.kind.code(), violation.field, violation.reason)?;
        }
        Ok(())
    }
}

/// Converts a raw JSON value into the declared kind, if it conforms.
fn conform(kind: FieldKind, raw: &Value) -> Option<FieldValue> {
    match kind {
        FieldKind::Integer => raw.as_i64().map(FieldValue::Integer),
        FieldKind::Number => raw.as_f64().map(FieldValue::Number),
        FieldKind::Text => raw.as_str().map(|text| FieldValue::Text(text.to_string())),
        FieldKind::IntegerList => raw
            .as_array()?
            .iter()
            .map(Value::as_i64)
            .collect::<Option<Vec<_>>>()
            .map(FieldValue::IntegerList),
        FieldKind::TextList => raw
            .as_array()?
            .iter()
            .map(|item| item.as_str().map(str::to_string))
            .collect::<Option<Vec<_>>>()
            .map(FieldValue::TextList),
    }
}

fn check_field(
    field: &FieldDef,
    raw: &RawPayload,
    violations: &mut Vec<Violation>,
) -> Option<FieldValue> {
    let value = match raw.get(&field.name) {
        None | Some(Value::Null) => {
            if field.required {
                violations.push(Violation::missing(&field.name));
            }
            return None;
        }
        Some(value) => value,
    };
    let Some(value) = conform(field.kind, value) else {
        violations.push(Violation::invalid(&field.name, format!("expected {}", field.kind)));
        return None;
    };
    let mut valid = true;
    for rule in &field.rules {
        if !rule.check.holds(&value) {
            violations.push(Violation::invalid(&field.name, rule.message()));
            valid = false;
        }
    }
    valid.then_some(value)
}

/// Validates `raw` against `spec`.
///
/// Pure function of its inputs.
pub fn validate(raw: &RawPayload, spec: &FieldSpec) -> Result<NormalizedPayload, ViolationList> {
    let mut violations = Vec::new();
    let mut fields = Vec::with_capacity(spec.fields().len());
    for field in spec.fields() {
        if let Some(value) = check_field(field, raw, &mut violations) {
            fields.push((field.name.clone(), value));
        }
    }
    match ViolationList::from_violations(violations) {
        None => Ok(NormalizedPayload::new(spec.resource().to_string(), fields)),
        Some(violations) => Err(violations),
    }
}

/// Payload validator bound to the field specification of one resource type.
#[derive(Debug, Clone)]
pub struct Validator {
    spec: Arc<FieldSpec>,
}

impl Validator {
    pub fn new(spec: Arc<FieldSpec>) -> Self {
        Self { spec }
    }

    pub fn spec(&self) -> &FieldSpec {
        &self.spec
    }

    pub fn validate(&self, raw: &RawPayload) -> Result<NormalizedPayload, ViolationList> {
        validate(raw, &self.spec)
    }
}
