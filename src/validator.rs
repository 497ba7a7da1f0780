//! The validation and normalization engine.
//!
//! Walks a raw document against a [`TypeSchema`] in the context of a
//! [`Scope`], producing a normalized document (defaults substituted,
//! empty-as-default applied) or the first [`ValidationError`] encountered.
//!
//! Struct validation is two-pass: the per-field pass resolves defaults and
//! validates each present value in declaration order, then the cross-field
//! pass checks conflicts and requires against the resolved field set. The
//! engine fails fast: the first offending field in declaration order is
//! reported, per-field errors before cross-field errors.

use serde_json::{Map, Value};

use crate::error::{ValidationError, ValidationErrorKind};
use crate::schema::{EnumSchema, FloatSchema, IntSchema, MapSchema, StringSchema, StructSchema, TypeSchema};
use crate::scope::Scope;
use crate::types::json_type_name;

/// Validates `raw` against `schema`, returning the normalized value.
pub(crate) fn validate_type(
    scope: &Scope,
    schema: &TypeSchema,
    raw: &Value,
    path: &str,
) -> Result<Value, ValidationError> {
    match schema {
        TypeSchema::String(s) => validate_string(s, raw, path),
        TypeSchema::Int(s) => validate_int(s, raw, path),
        TypeSchema::Float(s) => validate_float(s, raw, path),
        TypeSchema::Enum(s) => validate_enum(s, raw, path),
        TypeSchema::List(s) => {
            let Value::Array(items) = raw else {
                return Err(mismatch(path, "array", raw));
            };
            let mut out = Vec::with_capacity(items.len());
            for (index, item) in items.iter().enumerate() {
                out.push(validate_type(
                    scope,
                    &s.items,
                    item,
                    &format!("{path}/{index}"),
                )?);
            }
            Ok(Value::Array(out))
        }
        TypeSchema::Map(s) => validate_map(scope, s, raw, path),
        TypeSchema::Struct(s) => validate_struct(scope, s, raw, path),
        TypeSchema::Ref(r) => validate_struct(scope, scope.resolve(&r.target), raw, path),
    }
}

fn mismatch(path: &str, expected: &'static str, raw: &Value) -> ValidationError {
    ValidationError::new(
        path,
        ValidationErrorKind::TypeMismatch {
            expected,
            actual: json_type_name(raw),
        },
    )
}

/// Renders optional inclusive bounds as `min..=max`, `min..` or `..=max`.
fn bounds<T: std::fmt::Display>(min: Option<T>, max: Option<T>) -> String {
    match (min, max) {
        (Some(min), Some(max)) => format!("{min}..={max}"),
        (Some(min), None) => format!("{min}.."),
        (None, Some(max)) => format!("..={max}"),
        (None, None) => "..".to_string(),
    }
}

fn validate_string(schema: &StringSchema, raw: &Value, path: &str) -> Result<Value, ValidationError> {
    let Value::String(s) = raw else {
        return Err(mismatch(path, "string", raw));
    };
    let length = s.chars().count();
    if schema.min_length.is_some_and(|min| length < min)
        || schema.max_length.is_some_and(|max| length > max)
    {
        return Err(ValidationError::new(
            path,
            ValidationErrorKind::LengthOutOfRange {
                length,
                bounds: bounds(schema.min_length, schema.max_length),
            },
        ));
    }
    if let Some(pattern) = &schema.pattern {
        if !pattern.is_match(s) {
            return Err(ValidationError::new(
                path,
                ValidationErrorKind::PatternMismatch {
                    pattern: pattern.as_str().to_string(),
                },
            ));
        }
    }
    Ok(raw.clone())
}

fn validate_int(schema: &IntSchema, raw: &Value, path: &str) -> Result<Value, ValidationError> {
    let value = match raw {
        Value::Number(n) => n.as_i64().ok_or_else(|| mismatch(path, "integer", raw))?,
        _ => return Err(mismatch(path, "integer", raw)),
    };
    if schema.min.is_some_and(|min| value < min) || schema.max.is_some_and(|max| value > max) {
        return Err(ValidationError::new(
            path,
            ValidationErrorKind::OutOfRange {
                value: value.to_string(),
                bounds: bounds(schema.min, schema.max),
            },
        ));
    }
    Ok(raw.clone())
}

fn validate_float(schema: &FloatSchema, raw: &Value, path: &str) -> Result<Value, ValidationError> {
    let value = match raw {
        Value::Number(n) => n.as_f64().ok_or_else(|| mismatch(path, "number", raw))?,
        _ => return Err(mismatch(path, "number", raw)),
    };
    if schema.min.is_some_and(|min| value < min) || schema.max.is_some_and(|max| value > max) {
        return Err(ValidationError::new(
            path,
            ValidationErrorKind::OutOfRange {
                value: value.to_string(),
                bounds: bounds(schema.min, schema.max),
            },
        ));
    }
    Ok(raw.clone())
}

fn validate_enum(schema: &EnumSchema, raw: &Value, path: &str) -> Result<Value, ValidationError> {
    let Value::String(s) = raw else {
        return Err(mismatch(path, "string", raw));
    };
    if schema.values.iter().any(|v| v.value == *s) {
        Ok(raw.clone())
    } else {
        Err(ValidationError::new(
            path,
            ValidationErrorKind::NotInEnum {
                allowed: schema.allowed(),
            },
        ))
    }
}

fn validate_map(
    scope: &Scope,
    schema: &MapSchema,
    raw: &Value,
    path: &str,
) -> Result<Value, ValidationError> {
    let Value::Object(entries) = raw else {
        return Err(mismatch(path, "object", raw));
    };
    let mut out = Map::new();
    for (key, value) in entries {
        let entry_path = format!("{path}/{key}");
        let normalized_key =
            validate_type(scope, &schema.keys, &Value::String(key.clone()), &entry_path)?;
        let Value::String(normalized_key) = normalized_key else {
            return Err(mismatch(&entry_path, "string", &normalized_key));
        };
        let normalized_value = validate_type(scope, &schema.values, value, &entry_path)?;
        if out.insert(normalized_key, normalized_value).is_some() {
            return Err(ValidationError::new(
                entry_path,
                ValidationErrorKind::DuplicateKey { key: key.clone() },
            ));
        }
    }
    Ok(Value::Object(out))
}

/// The type's zero-equivalent, used by the treat-empty-as-default rule.
fn is_zero_value(value: &Value) -> bool {
    match value {
        Value::String(s) => s.is_empty(),
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::Array(items) => items.is_empty(),
        Value::Object(entries) => entries.is_empty(),
        _ => false,
    }
}

fn validate_struct(
    scope: &Scope,
    schema: &StructSchema,
    raw: &Value,
    path: &str,
) -> Result<Value, ValidationError> {
    let Value::Object(entries) = raw else {
        return Err(mismatch(path, "object", raw));
    };

    // Structs are closed: reject undeclared fields before anything else.
    for key in entries.keys() {
        if schema.get(key).is_none() {
            return Err(ValidationError::new(
                format!("{path}/{key}"),
                ValidationErrorKind::UnknownField,
            ));
        }
    }

    // Per-field pass: defaulting, empty-as-default, required, type checks.
    let mut out = Map::new();
    for (field, prop) in schema.fields() {
        let field_path = format!("{path}/{field}");
        let raw_value = entries.get(field).filter(|value| {
            // Present-but-zero counts as absent when the field opts in.
            !(prop.empty_is_default() && is_zero_value(value))
        });
        match raw_value {
            Some(value) => {
                let normalized = validate_type(scope, prop.type_schema(), value, &field_path)?;
                out.insert(field.to_string(), normalized);
            }
            None => {
                if let Some(default) = prop.default() {
                    // Defaults were checked at scope construction; substitute as-is.
                    out.insert(field.to_string(), default.clone());
                } else if prop.is_required() {
                    return Err(ValidationError::new(
                        field_path,
                        ValidationErrorKind::MissingField,
                    ));
                }
            }
        }
    }

    // Cross-field pass over the resolved field set.
    for (field, prop) in schema.fields() {
        if !out.contains_key(field) {
            continue;
        }
        let field_path = format!("{path}/{field}");
        for other in prop.conflicts() {
            if out.contains_key(other) {
                return Err(ValidationError::new(
                    field_path,
                    ValidationErrorKind::Conflict {
                        other: other.clone(),
                    },
                ));
            }
        }
        for missing in prop.required_siblings() {
            if !out.contains_key(missing) {
                return Err(ValidationError::new(
                    field_path,
                    ValidationErrorKind::Dependency {
                        missing: missing.clone(),
                    },
                ));
            }
        }
    }

    Ok(Value::Object(out))
}
