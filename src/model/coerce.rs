//! Raw-string coercion and structural checks against a [`TypeDescriptor`].
//!
//! Path, query, and header values arrive as strings and are converted here
//! before the typed decode runs. Body values are already JSON; [`check_value`]
//! walks them against the descriptor so that every failing field is reported,
//! not just the first one serde would stop at.

use super::core::{ScalarType, Shape, TypeDescriptor};
use crate::error::ErrorReason;
use serde_json::{Number, Value};

/// One structural problem found inside a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Dotted location relative to the checked value; empty for the root.
    pub location: String,
    pub reason: ErrorReason,
    pub message: String,
}

impl Violation {
    fn new(location: &str, reason: ErrorReason, message: impl Into<String>) -> Self {
        Self {
            location: location.to_string(),
            reason,
            message: message.into(),
        }
    }
}

/// Convert one raw string into the JSON value for a scalar or enum descriptor.
pub fn coerce_scalar(raw: &str, descriptor: &TypeDescriptor) -> Result<Value, Violation> {
    match &descriptor.shape {
        Shape::Scalar(ScalarType::String) => Ok(Value::String(raw.to_string())),
        Shape::Scalar(ScalarType::Integer) => {
            let trimmed = raw.trim();
            trimmed
                .parse::<i64>()
                .map(Value::from)
                .or_else(|_| trimmed.parse::<u64>().map(Value::from))
                .map_err(|_| {
                    Violation::new(
                        "",
                        ErrorReason::TypeCoercion,
                        format!("expected integer, got `{raw}`"),
                    )
                })
        }
        Shape::Scalar(ScalarType::Number) => raw
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| {
                Violation::new(
                    "",
                    ErrorReason::TypeCoercion,
                    format!("expected number, got `{raw}`"),
                )
            }),
        Shape::Scalar(ScalarType::Boolean) => match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(Value::Bool(true)),
            "false" | "0" | "no" | "off" => Ok(Value::Bool(false)),
            _ => Err(Violation::new(
                "",
                ErrorReason::TypeCoercion,
                format!("expected boolean, got `{raw}`"),
            )),
        },
        Shape::Enum { variants, .. } => {
            if variants.iter().any(|v| v == raw) {
                Ok(Value::String(raw.to_string()))
            } else {
                Err(Violation::new(
                    "",
                    ErrorReason::UnknownVariant,
                    format!("expected one of [{}], got `{raw}`", variants.join(", ")),
                ))
            }
        }
        _ => Err(Violation::new(
            "",
            ErrorReason::TypeCoercion,
            "value cannot be read from a raw string",
        )),
    }
}

/// Coerce every raw value of a multi-valued parameter into a JSON array.
pub fn coerce_list<'a, I>(raws: I, item: &TypeDescriptor) -> Result<Value, Vec<Violation>>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut values = Vec::new();
    let mut violations = Vec::new();
    for (idx, raw) in raws.into_iter().enumerate() {
        match coerce_scalar(raw, item) {
            Ok(v) => values.push(v),
            Err(mut violation) => {
                violation.location = idx.to_string();
                violations.push(violation);
            }
        }
    }
    if violations.is_empty() {
        Ok(Value::Array(values))
    } else {
        Err(violations)
    }
}

/// Walk `value` against `descriptor`, collecting every mismatch.
pub fn check_value(value: &Value, descriptor: &TypeDescriptor) -> Vec<Violation> {
    let mut violations = Vec::new();
    walk(value, descriptor, "", &mut violations);
    violations
}

fn join(location: &str, segment: &str) -> String {
    if location.is_empty() {
        segment.to_string()
    } else {
        format!("{location}.{segment}")
    }
}

fn mismatch(location: &str, expected: &str, value: &Value, out: &mut Vec<Violation>) {
    out.push(Violation::new(
        location,
        ErrorReason::TypeCoercion,
        format!("expected {expected}, got {}", json_kind(value)),
    ));
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn walk(value: &Value, descriptor: &TypeDescriptor, location: &str, out: &mut Vec<Violation>) {
    if value.is_null() && descriptor.nullable {
        return;
    }
    match &descriptor.shape {
        Shape::Any | Shape::Unsupported(_) => {}
        Shape::Scalar(ScalarType::Boolean) if !value.is_boolean() => {
            mismatch(location, "boolean", value, out)
        }
        Shape::Scalar(ScalarType::Integer) if !(value.is_i64() || value.is_u64()) => {
            mismatch(location, "integer", value, out)
        }
        Shape::Scalar(ScalarType::Number) if !value.is_number() => {
            mismatch(location, "number", value, out)
        }
        Shape::Scalar(ScalarType::String) if !value.is_string() => {
            mismatch(location, "string", value, out)
        }
        Shape::Scalar(_) => {}
        Shape::Enum { variants, .. } => match value.as_str() {
            Some(s) if variants.iter().any(|v| v == s) => {}
            Some(s) => out.push(Violation::new(
                location,
                ErrorReason::UnknownVariant,
                format!("expected one of [{}], got `{s}`", variants.join(", ")),
            )),
            None => mismatch(location, "string", value, out),
        },
        Shape::List { item, .. } => match value.as_array() {
            Some(items) => {
                for (idx, v) in items.iter().enumerate() {
                    walk(v, item, &join(location, &idx.to_string()), out);
                }
            }
            None => mismatch(location, "array", value, out),
        },
        Shape::Tuple(items) => match value.as_array() {
            Some(values) if values.len() == items.len() => {
                for (idx, (v, d)) in values.iter().zip(items).enumerate() {
                    walk(v, d, &join(location, &idx.to_string()), out);
                }
            }
            Some(values) => out.push(Violation::new(
                location,
                ErrorReason::TypeCoercion,
                format!("expected {} items, got {}", items.len(), values.len()),
            )),
            None => mismatch(location, "array", value, out),
        },
        Shape::Mapping(inner) => match value.as_object() {
            Some(map) => {
                for (key, v) in map {
                    walk(v, inner, &join(location, key), out);
                }
            }
            None => mismatch(location, "object", value, out),
        },
        Shape::Object { fields, .. } => match value.as_object() {
            Some(map) => {
                for field in fields {
                    let field_location = join(location, &field.name);
                    match map.get(&field.name) {
                        Some(v) => walk(v, &field.descriptor, &field_location, out),
                        None if field.descriptor.required => out.push(Violation::new(
                            &field_location,
                            ErrorReason::Missing,
                            "field required",
                        )),
                        None => {}
                    }
                }
            }
            None => mismatch(location, "object", value, out),
        },
    }
}
