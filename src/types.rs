//! Shared helpers for working with untyped documents.
//!
//! The untyped boundary of this crate is `serde_json::Value`: a parsed
//! JSON/YAML tree of maps, sequences, strings, numbers, booleans and null.
//! Everything that crosses the dispatch boundary is such a document; typed
//! structs only exist after a document has been validated and decoded.

use serde_json::{json, Value};

/// Returns the JSON type name for error messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Presentation metadata attached to schemas, properties and steps.
///
/// Carried for introspection only; it never affects validation.
#[derive(Debug, Clone, Default)]
pub struct DisplayValue {
    pub name: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
}

impl DisplayValue {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            description: None,
            icon: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    /// Serializes the metadata for schema introspection.
    pub fn describe(&self) -> Value {
        let mut out = json!({});
        if let Some(name) = &self.name {
            out["name"] = json!(name);
        }
        if let Some(description) = &self.description {
            out["description"] = json!(description);
        }
        if let Some(icon) = &self.icon {
            out["icon"] = json!(icon);
        }
        out
    }
}
