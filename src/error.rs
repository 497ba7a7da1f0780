//! Error types for schema construction, input validation and step dispatch.

use thiserror::Error;

/// Authoring defects in a schema definition.
///
/// These are raised when a [`Scope`](crate::Scope) is built, never while a
/// document is being validated: a schema that constructs successfully cannot
/// produce a `SchemaError` at request time.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("unresolved reference \"{name}\" (known objects: {})", known.join(", "))]
    UnresolvedRef { name: String, known: Vec<String> },

    #[error("object \"{name}\" is defined more than once")]
    DuplicateDefinition { name: String },

    #[error("object \"{object}\" declares field \"{field}\" more than once")]
    DuplicateField { object: String, field: String },

    #[error("field \"{field}\" constrains undeclared sibling \"{target}\"")]
    UnknownSibling { field: String, target: String },

    #[error("field \"{field}\" both conflicts with and requires \"{target}\"")]
    ContradictoryConstraint { field: String, target: String },

    #[error("invalid default for field \"{field}\": {source}")]
    InvalidDefault {
        field: String,
        #[source]
        source: ValidationError,
    },
}

impl SchemaError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        2
    }
}

/// A rejected input document, pointing at the first offending field.
///
/// `path` is a JSON-Pointer-style path into the raw document (e.g.
/// `/connection/cacert`).
#[derive(Debug, Error)]
#[error("{path}: {kind}")]
pub struct ValidationError {
    pub path: String,
    pub kind: ValidationErrorKind,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, kind: ValidationErrorKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        1
    }
}

/// The individual ways a field can fail validation.
#[derive(Debug, Error)]
pub enum ValidationErrorKind {
    #[error("missing required field")]
    MissingField,

    #[error("unknown field")]
    UnknownField,

    #[error("expected {expected}, got {actual}")]
    TypeMismatch {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("length {length} is outside the allowed bounds {bounds}")]
    LengthOutOfRange { length: usize, bounds: String },

    #[error("value {value} is outside the allowed bounds {bounds}")]
    OutOfRange { value: String, bounds: String },

    #[error("value does not match pattern {pattern}")]
    PatternMismatch { pattern: String },

    #[error("not one of the allowed values: {}", allowed.join(", "))]
    NotInEnum { allowed: Vec<String> },

    #[error("duplicate key \"{key}\"")]
    DuplicateKey { key: String },

    #[error("conflicts with field \"{other}\"")]
    Conflict { other: String },

    #[error("requires field \"{missing}\"")]
    Dependency { missing: String },
}

/// Errors during step dispatch.
///
/// Only failures attributable to the caller appear here. A handler returning
/// an undeclared output variant, or output that fails its own declared
/// schema, is a programming error in the step itself and panics instead
/// (see [`CallableSchema::dispatch`](crate::CallableSchema::dispatch)).
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("unknown step \"{name}\"")]
    UnknownStep { name: String },

    #[error("invalid input for step \"{step}\": {source}")]
    InvalidInput {
        step: String,
        #[source]
        source: ValidationError,
    },
}

impl DispatchError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            DispatchError::UnknownStep { .. } => 2,
            DispatchError::InvalidInput { .. } => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_error_exit_code() {
        let err = SchemaError::UnresolvedRef {
            name: "Connection".into(),
            known: vec!["input".into(), "Service".into()],
        };
        assert_eq!(err.exit_code(), 2);
        assert_eq!(
            err.to_string(),
            "unresolved reference \"Connection\" (known objects: input, Service)"
        );
    }

    #[test]
    fn validation_error_display_includes_path() {
        let err = ValidationError::new(
            "/connection/cacert",
            ValidationErrorKind::Dependency {
                missing: "cert".into(),
            },
        );
        assert_eq!(err.exit_code(), 1);
        assert_eq!(
            err.to_string(),
            "/connection/cacert: requires field \"cert\""
        );
    }

    #[test]
    fn type_mismatch_display() {
        let err = ValidationError::new(
            "/service",
            ValidationErrorKind::TypeMismatch {
                expected: "object",
                actual: "string",
            },
        );
        assert_eq!(err.to_string(), "/service: expected object, got string");
    }

    #[test]
    fn dispatch_error_exit_codes() {
        let err = DispatchError::UnknownStep {
            name: "delete".into(),
        };
        assert_eq!(err.exit_code(), 2);

        let err = DispatchError::InvalidInput {
            step: "create".into(),
            source: ValidationError::new("/service", ValidationErrorKind::MissingField),
        };
        assert_eq!(err.exit_code(), 1);
        assert_eq!(
            err.to_string(),
            "invalid input for step \"create\": /service: missing required field"
        );
    }
}
