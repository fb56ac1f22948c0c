//! Declarative request validation.
//!
//! Each method declares a fixed schema of `(name, kind, required)` entries.
//! [`validate`] filters the decoded params down to the fields that are both
//! declared and of the declared kind, then checks that every required field
//! survived. Handlers read the result through [`Args`].

use rpcd_common::Error;
use serde_json::{Map, Value};
use std::collections::HashMap;
use thiserror::Error;

/// Wire type of a request field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Int32,
    String,
    Array,
    Table,
    Bool,
}

impl FieldKind {
    /// Whether `value` conforms to this kind.
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            FieldKind::Int32 => value
                .as_i64()
                .is_some_and(|n| (i64::from(i32::MIN)..=i64::from(u32::MAX)).contains(&n)),
            FieldKind::String => value.is_string(),
            FieldKind::Array => value.is_array(),
            FieldKind::Table => value.is_object(),
            FieldKind::Bool => value.is_boolean(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Int32 => "int32",
            FieldKind::String => "string",
            FieldKind::Array => "array",
            FieldKind::Table => "table",
            FieldKind::Bool => "boolean",
        }
    }
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One declared request field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

impl FieldSpec {
    pub const fn required(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: true,
        }
    }

    pub const fn optional(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: false,
        }
    }
}

/// Request rejected before reaching its handler.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("request arguments must be a table")]
    NotAnObject,

    #[error("missing or mistyped required field `{name}` (expected {kind})")]
    MissingField { name: &'static str, kind: FieldKind },
}

impl From<ValidationError> for Error {
    fn from(err: ValidationError) -> Self {
        Error::InvalidArgument(err.to_string())
    }
}

/// The validated subset of a request.
#[derive(Debug, Default)]
pub struct Args<'a> {
    fields: HashMap<&'static str, &'a Value>,
}

impl<'a> Args<'a> {
    pub fn get(&self, name: &str) -> Option<&'a Value> {
        self.fields.get(name).copied()
    }

    pub fn int(&self, name: &str) -> Option<i64> {
        self.get(name)?.as_i64()
    }

    pub fn str(&self, name: &str) -> Option<&'a str> {
        self.get(name)?.as_str()
    }

    pub fn array(&self, name: &str) -> Option<&'a [Value]> {
        self.get(name)?.as_array().map(Vec::as_slice)
    }

    pub fn table(&self, name: &str) -> Option<&'a Map<String, Value>> {
        self.get(name)?.as_object()
    }

    pub fn bool(&self, name: &str) -> Option<bool> {
        self.get(name)?.as_bool()
    }

    /// Like [`Args::int`], failing with invalid-argument when absent.
    pub fn require_int(&self, name: &str) -> Result<i64, Error> {
        self.int(name)
            .ok_or_else(|| Error::InvalidArgument(format!("missing field `{name}`")))
    }

    pub fn require_str(&self, name: &str) -> Result<&'a str, Error> {
        self.str(name)
            .ok_or_else(|| Error::InvalidArgument(format!("missing field `{name}`")))
    }

    pub fn require_array(&self, name: &str) -> Result<&'a [Value], Error> {
        self.array(name)
            .ok_or_else(|| Error::InvalidArgument(format!("missing field `{name}`")))
    }
}

/// Validate decoded params against `schema`.
///
/// `params` may be absent (`Null`) or a table; anything else is rejected.
pub fn validate<'a>(schema: &[FieldSpec], params: &'a Value) -> Result<Args<'a>, ValidationError> {
    let object = match params {
        Value::Null => None,
        Value::Object(map) => Some(map),
        _ => return Err(ValidationError::NotAnObject),
    };

    let mut args = Args::default();
    for spec in schema {
        match object.and_then(|map| map.get(spec.name)) {
            Some(value) if spec.kind.accepts(value) => {
                args.fields.insert(spec.name, value);
            }
            Some(_) => {
                tracing::debug!(field = spec.name, expected = %spec.kind, "dropping mistyped field");
            }
            None => {}
        }
    }

    for spec in schema.iter().filter(|s| s.required) {
        if !args.fields.contains_key(spec.name) {
            return Err(ValidationError::MissingField {
                name: spec.name,
                kind: spec.kind,
            });
        }
    }

    Ok(args)
}
