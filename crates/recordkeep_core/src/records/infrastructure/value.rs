//! Field values and the record shapes built from them.
//!
//! ## Record Layout
//!
//! A [`Record`] always exposes its fields in the same order: `id` first, then
//! the declared input fields that were supplied (in declaration order), then
//! the derived fields, then `created_at`. Both the JSON serialization and the
//! projection rely on this order, so two records of the same resource type
//! always render identically shaped objects.
//!
//! ## Construction
//!
//! [`NormalizedPayload`] can only be produced by the validator, and a
//! [`Record`] only by the store. This keeps the "validated before admitted"
//! and "immutable after creation" guarantees at the type level.

use serde::{Serialize, Serializer, ser::SerializeMap};

/// Name under which the record identifier is exposed.
pub const ID_FIELD: &str = "id";
/// Name under which the creation timestamp is exposed.
pub const CREATED_AT_FIELD: &str = "created_at";

/// A typed field value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Integer(i64),
    Number(f64),
    Text(String),
    IntegerList(Vec<i64>),
    TextList(Vec<String>),
}

impl FieldValue {
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(value) => Some(*value),
            _ => None,
        }
    }

    /// Number of chars for text, number of elements for sequences.
    pub fn len(&self) -> Option<usize> {
        match self {
            FieldValue::Text(text) => Some(text.chars().count()),
            FieldValue::IntegerList(items) => Some(items.len()),
            FieldValue::TextList(items) => Some(items.len()),
            FieldValue::Integer(_) | FieldValue::Number(_) => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == Some(0)
    }
}

/// Typed payload accepted by the validator for one resource type.
///
/// Holds exactly the declared fields that were present in the raw input, in
/// declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedPayload {
    resource: String,
    fields: Vec<(String, FieldValue)>,
}

impl NormalizedPayload {
    pub(crate) fn new(resource: String, fields: Vec<(String, FieldValue)>) -> Self {
        Self { resource, fields }
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn fields(&self) -> &[(String, FieldValue)] {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(field, _)| field == name).map(|(_, value)| value)
    }

    pub(crate) fn into_fields(self) -> Vec<(String, FieldValue)> {
        self.fields
    }
}

/// A stored entity of one resource type.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    id: u64,
    resource: String,
    fields: Vec<(String, FieldValue)>,
    created_at: u64,
}

impl Record {
    pub(crate) fn new(
        id: u64,
        resource: String,
        fields: Vec<(String, FieldValue)>,
        created_at: u64,
    ) -> Self {
        Self { id, resource, fields, created_at }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// Creation timestamp in milliseconds since the UNIX epoch.
    pub fn created_at(&self) -> u64 {
        self.created_at
    }

    /// Input and derived fields, without `id` and `created_at`.
    pub fn fields(&self) -> &[(String, FieldValue)] {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(field, _)| field == name).map(|(_, value)| value)
    }

    /// Every field of the record, in record order, including `id` and
    /// `created_at`.
    ///
    /// Values beyond `i64::MAX` saturate.
    pub fn entries(&self) -> impl Iterator<Item = (&str, FieldValue)> + '_ {
        let id = i64::try_from(self.id).unwrap_or(i64::MAX);
        let created_at = i64::try_from(self.created_at).unwrap_or(i64::MAX);
        std::iter::once((ID_FIELD, FieldValue::Integer(id)))
            .chain(self.fields.iter().map(|(name, value)| (name.as_str(), value.clone())))
            .chain(std::iter::once((CREATED_AT_FIELD, FieldValue::Integer(created_at))))
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len() + 2))?;
        map.serialize_entry(ID_FIELD, &self.id)?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.serialize_entry(CREATED_AT_FIELD, &self.created_at)?;
        map.end()
    }
}

/// A narrowed view of a record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialRecord {
    entries: Vec<(String, FieldValue)>,
}

impl PartialRecord {
    pub(crate) fn new(entries: Vec<(String, FieldValue)>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[(String, FieldValue)] {
        &self.entries
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.entries.iter().find(|(field, _)| field == name).map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<&Record> for PartialRecord {
    fn from(record: &Record) -> Self {
        Self::new(record.entries().map(|(name, value)| (name.to_string(), value)).collect())
    }
}

impl Serialize for PartialRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
