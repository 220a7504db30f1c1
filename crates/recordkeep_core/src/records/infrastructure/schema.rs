//! Declarative field specifications for resource types.
//!
//! A [`FieldSpec`] is an explicit table describing, for one resource type,
//! which fields a creation payload may carry, their semantic type, whether
//! they are required and which rules their values must satisfy. It also
//! carries the derivation rules that compute server-side fields at insert.
//!
//! Validation consults this table through a single generic routine (see
//! [`validation`](super::validation)), so the rule set stays inspectable and
//! testable on its own.

use std::{collections::HashSet, fmt::Display};

use crate::records::{
    error::RecordError,
    infrastructure::value::{CREATED_AT_FIELD, FieldValue, ID_FIELD, NormalizedPayload},
};

/// Semantic type of a declared field.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum FieldKind {
    Integer,
    Number,
    Text,
    IntegerList,
    TextList,
}

impl Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldKind::Integer => write!(f, "an integer"),
            FieldKind::Number => write!(f, "a number"),
            FieldKind::Text => write!(f, "a string"),
            FieldKind::IntegerList => write!(f, "a sequence of integers"),
            FieldKind::TextList => write!(f, "a sequence of strings"),
        }
    }
}

/// A predicate over a well-typed field value.
#[derive(Debug, Clone, PartialEq)]
pub enum Check {
    /// Numeric value must be `>=` the bound.
    MinValue(i64),
    /// Numeric value must be `<=` the bound.
    MaxValue(i64),
    /// Text length (chars) or sequence length must be `>=` the bound.
    MinLength(usize),
    /// Text length (chars) or sequence length must be `<=` the bound.
    MaxLength(usize),
    /// Text must look like `local@domain.tld`.
    Email,
}

impl Check {
    /// Returns whether the value satisfies the check.
    ///
    /// Checks that do not apply to the value's kind pass.
    pub fn holds(&self, value: &FieldValue) -> bool {
        match (self, value) {
            (Check::MinValue(min), FieldValue::Integer(v)) => v >= min,
            (Check::MinValue(min), FieldValue::Number(v)) => *v >= *min as f64,
            (Check::MaxValue(max), FieldValue::Integer(v)) => v <= max,
            (Check::MaxValue(max), FieldValue::Number(v)) => *v <= *max as f64,
            (Check::MinLength(min), value) => value.len().is_none_or(|len| len >= *min),
            (Check::MaxLength(max), value) => value.len().is_none_or(|len| len <= *max),
            (Check::Email, FieldValue::Text(text)) => is_email(text),
            _ => true,
        }
    }

    fn default_message(&self) -> String {
        match self {
            Check::MinValue(min) => format!("must be at least {min}"),
            Check::MaxValue(max) => format!("must be at most {max}"),
            Check::MinLength(min) => format!("must contain at least {min} element(s)"),
            Check::MaxLength(max) => format!("must contain at most {max} element(s)"),
            Check::Email => "must be a valid email address".to_string(),
        }
    }
}

fn is_email(text: &str) -> bool {
    match text.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && !text.chars().any(char::is_whitespace)
                && domain
                    .split_once('.')
                    .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
        }
        None => false,
    }
}

/// A check together with the message reported when it fails.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub check: Check,
    message: Option<String>,
}

impl Rule {
    pub fn new(check: Check) -> Self {
        Self { check, message: None }
    }

    pub fn with_message(check: Check, message: impl Into<String>) -> Self {
        Self { check, message: Some(message.into()) }
    }

    pub fn message(&self) -> String {
        self.message.clone().unwrap_or_else(|| self.check.default_message())
    }
}

/// One row of a field specification.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    pub name: String,
    pub kind: FieldKind,
    pub required: bool,
    pub rules: Vec<Rule>,
}

impl FieldDef {
    pub fn required(name: impl Into<String>, kind: FieldKind) -> Self {
        Self { name: name.into(), kind, required: true, rules: Vec::new() }
    }

    pub fn optional(name: impl Into<String>, kind: FieldKind) -> Self {
        Self { name: name.into(), kind, required: false, rules: Vec::new() }
    }

    pub fn rule(mut self, check: Check) -> Self {
        self.rules.push(Rule::new(check));
        self
    }

    pub fn rule_with_message(mut self, check: Check, message: impl Into<String>) -> Self {
        self.rules.push(Rule::with_message(check, message));
        self
    }
}

/// How a derived field is computed from input fields.
#[derive(Debug, Clone, PartialEq)]
pub enum DeriveRule {
    /// `source * factor`
    Scale { source: String, factor: i64 },
    /// `left * right`
    Product { left: String, right: String },
    /// Number of elements (sequences) or chars (text) of `source`.
    Length { source: String },
}

impl DeriveRule {
    fn sources(&self) -> Vec<&str> {
        match self {
            DeriveRule::Scale { source, .. } | DeriveRule::Length { source } => {
                vec![source.as_str()]
            }
            DeriveRule::Product { left, right } => vec![left.as_str(), right.as_str()],
        }
    }

    fn accepts(&self, kind: FieldKind) -> bool {
        match self {
            DeriveRule::Scale { .. } | DeriveRule::Product { .. } => kind == FieldKind::Integer,
            DeriveRule::Length { .. } => {
                matches!(kind, FieldKind::Text | FieldKind::IntegerList | FieldKind::TextList)
            }
        }
    }

    fn integer(payload: &NormalizedPayload, name: &str) -> i64 {
        payload.get(name).and_then(FieldValue::as_integer).unwrap_or_default()
    }

    /// Computes the derived value.
    ///
    /// Sources are required fields of a checked kind (enforced when the field spec
    /// is built), so every lookup here hits. Arithmetic saturates.
    pub fn derive(&self, payload: &NormalizedPayload) -> FieldValue {
        match self {
            DeriveRule::Scale { source, factor } => {
                FieldValue::Integer(Self::integer(payload, source).saturating_mul(*factor))
            }
            DeriveRule::Product { left, right } => FieldValue::Integer(
                Self::integer(payload, left).saturating_mul(Self::integer(payload, right)),
            ),
            DeriveRule::Length { source } => FieldValue::Integer(
                payload
                    .get(source)
                    .and_then(FieldValue::len)
                    .map(|len| i64::try_from(len).unwrap_or(i64::MAX))
                    .unwrap_or_default(),
            ),
        }
    }
}

/// A server-computed field.
#[derive(Debug, Clone, PartialEq)]
pub struct Derivation {
    pub name: String,
    pub rule: DeriveRule,
}

/// Declared schema of one resource type.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    resource: String,
    fields: Vec<FieldDef>,
    derived: Vec<Derivation>,
}

impl FieldSpec {
    pub fn builder(resource: impl Into<String>) -> FieldSpecBuilder {
        FieldSpecBuilder { resource: resource.into(), fields: Vec::new(), derived: Vec::new() }
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    pub fn derived(&self) -> &[Derivation] {
        &self.derived
    }

    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Whether `name` is a field a record of this type can expose.
    pub fn declares(&self, name: &str) -> bool {
        name == ID_FIELD
            || name == CREATED_AT_FIELD
            || self.field(name).is_some()
            || self.derived.iter().any(|derivation| derivation.name == name)
    }

    /// Order resource: `total = quantity * 1000`.
    pub fn orders() -> Self {
        Self {
            resource: "order".to_string(),
            fields: vec![
                FieldDef::required("products", FieldKind::IntegerList).rule(Check::MinLength(1)),
                FieldDef::required("quantity", FieldKind::Integer).rule(Check::MinValue(1)),
                FieldDef::required("shipping_address", FieldKind::Text)
                    .rule_with_message(Check::MinLength(1), "must not be empty"),
            ],
            derived: vec![Derivation {
                name: "total".to_string(),
                rule: DeriveRule::Scale { source: "quantity".to_string(), factor: 1000 },
            }],
        }
    }

    /// User profile resource.
    pub fn user_profiles() -> Self {
        Self {
            resource: "user_profile".to_string(),
            fields: vec![
                FieldDef::required("name", FieldKind::Text)
                    .rule_with_message(Check::MinLength(1), "must not be empty")
                    .rule_with_message(Check::MaxLength(100), "must be at most 100 characters"),
                FieldDef::required("email", FieldKind::Text).rule(Check::Email),
                FieldDef::optional("age", FieldKind::Integer)
                    .rule(Check::MinValue(0))
                    .rule(Check::MaxValue(150)),
                FieldDef::optional("preferences", FieldKind::TextList),
            ],
            derived: Vec::new(),
        }
    }
}

/// Builder checking a [`FieldSpec`] for consistency.
#[derive(Debug, Clone)]
pub struct FieldSpecBuilder {
    resource: String,
    fields: Vec<FieldDef>,
    derived: Vec<Derivation>,
}

impl FieldSpecBuilder {
    pub fn field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    pub fn derive(mut self, name: impl Into<String>, rule: DeriveRule) -> Self {
        self.derived.push(Derivation { name: name.into(), rule });
        self
    }

    /// Rejects duplicate or reserved names and derivations whose sources are
    /// not required fields of a compatible kind.
    pub fn build(self) -> Result<FieldSpec, RecordError> {
        if self.resource.is_empty() {
            return Err(RecordError::InvalidSchema("empty resource name".to_string()));
        }
        let mut seen = HashSet::new();
        let names = self
            .fields
            .iter()
            .map(|field| &field.name)
            .chain(self.derived.iter().map(|derivation| &derivation.name));
        for name in names {
            if name == ID_FIELD || name == CREATED_AT_FIELD {
                return Err(RecordError::InvalidSchema(format!("'{name}' is reserved")));
            }
            if !seen.insert(name.as_str()) {
                return Err(RecordError::InvalidSchema(format!("duplicate field '{name}'")));
            }
        }
        for derivation in &self.derived {
            for source in derivation.rule.sources() {
                match self.fields.iter().find(|field| field.name == source) {
                    Some(field) if field.required && derivation.rule.accepts(field.kind) => {}
                    _ => {
                        return Err(RecordError::InvalidSchema(format!(
                            "derived field '{}' needs a required source field '{source}' of a compatible kind",
                            derivation.name
                        )));
                    }
                }
            }
        }
        Ok(FieldSpec { resource: self.resource, fields: self.fields, derived: self.derived })
    }
}
