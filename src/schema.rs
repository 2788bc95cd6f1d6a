//! Request schemas: field whitelists and the field -> messages error map
//!
//! Every request payload is loaded from a raw JSON value in two steps:
//! each key is checked against the schema's declared fields (known name,
//! JSON type, nullability), then the object is deserialized into the typed
//! request. Field-level checks (required, lengths, ranges) are declared
//! with `validator` on the request types and reported through
//! [`FieldErrors`] as well.

use std::collections::BTreeMap;
use std::fmt;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use validator::ValidationErrors;

/// Key used for errors that do not belong to a single field
pub const SCHEMA_KEY: &str = "_schema";

pub const UNKNOWN_FIELD: &str = "Unknown field.";
pub const MISSING_FIELD: &str = "Missing data for required field.";
pub const NULL_FIELD: &str = "Field may not be null.";
pub const INVALID_INPUT: &str = "Invalid input type.";
pub const NOT_INTEGER: &str = "Not a valid integer.";
pub const NOT_STRING: &str = "Not a valid string.";

/// JSON type accepted for a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Integer fitting in an `i32`
    Integer,
    String,
}

/// A declared request field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub kind: FieldKind,
    pub nullable: bool,
}

impl Field {
    pub const fn integer(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Integer,
            nullable: false,
        }
    }

    pub const fn string(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::String,
            nullable: false,
        }
    }

    pub const fn nullable(self) -> Self {
        Self {
            nullable: true,
            ..self
        }
    }

    /// Error message for `value`, if it does not fit this field.
    fn check(&self, value: &Value) -> Option<&'static str> {
        match (value, self.kind) {
            (Value::Null, _) if self.nullable => None,
            (Value::Null, _) => Some(NULL_FIELD),
            (Value::Number(n), FieldKind::Integer)
                if n.as_i64().and_then(|n| i32::try_from(n).ok()).is_some() =>
            {
                None
            }
            (_, FieldKind::Integer) => Some(NOT_INTEGER),
            (Value::String(_), FieldKind::String) => None,
            (_, FieldKind::String) => Some(NOT_STRING),
        }
    }
}

/// A request type loadable from a JSON object restricted to `FIELDS`.
pub trait Schema: DeserializeOwned {
    const FIELDS: &'static [Field];
}

/// Field name -> list of error messages, serialized as a flat JSON object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn merge(&mut self, other: FieldErrors) {
        for (field, messages) in other.0 {
            self.0.entry(field).or_default().extend(messages);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// `Ok(value)` when no error was recorded.
    pub fn into_result<T>(self, value: T) -> Result<T, FieldErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            first = false;
            write!(f, "{}: {}", field, messages.join(" "))?;
        }
        Ok(())
    }
}

impl From<ValidationErrors> for FieldErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut out = FieldErrors::new();
        for (field, field_errors) in errors.field_errors() {
            for error in field_errors {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| error.code.to_string());
                out.add(field.to_string(), message);
            }
        }
        out
    }
}

/// Load a JSON payload into `T`.
///
/// Every offending key is reported under its own name: unknown keys,
/// values of the wrong JSON type and nulls on non-nullable fields.
pub fn load<T: Schema>(payload: Value) -> Result<T, FieldErrors> {
    let object = match payload {
        Value::Object(object) => object,
        _ => return Err(FieldErrors::single(SCHEMA_KEY, INVALID_INPUT)),
    };

    let mut errors = FieldErrors::new();
    for (key, value) in &object {
        match T::FIELDS.iter().find(|field| field.name == key.as_str()) {
            None => errors.add(key.as_str(), UNKNOWN_FIELD),
            Some(field) => {
                if let Some(message) = field.check(value) {
                    errors.add(key.as_str(), message);
                }
            }
        }
    }
    if !errors.is_empty() {
        return Err(errors);
    }

    serde_json::from_value(Value::Object(object))
        .map_err(|e| FieldErrors::single(SCHEMA_KEY, e.to_string()))
}
