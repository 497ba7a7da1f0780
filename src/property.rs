//! Property schemas: per-field constraints beyond the raw type.
//!
//! A property wraps a [`TypeSchema`] with the cross-field rules a struct
//! field can carry: required-ness, mutually exclusive siblings (conflicts),
//! co-required siblings (requires), a default literal, and the
//! treat-empty-as-default rule.

use serde_json::{json, Value};

use crate::schema::TypeSchema;
use crate::types::DisplayValue;

/// A struct field: a type schema plus its cross-field constraints.
#[derive(Debug, Clone)]
pub struct PropertySchema {
    type_schema: TypeSchema,
    display: Option<DisplayValue>,
    required: bool,
    conflicts: Vec<String>,
    requires: Vec<String>,
    default: Option<Value>,
    empty_is_default: bool,
}

impl PropertySchema {
    pub fn new(type_schema: impl Into<TypeSchema>) -> Self {
        Self {
            type_schema: type_schema.into(),
            display: None,
            required: false,
            conflicts: Vec::new(),
            requires: Vec::new(),
            default: None,
            empty_is_default: false,
        }
    }

    pub fn display(mut self, display: DisplayValue) -> Self {
        self.display = Some(display);
        self
    }

    /// Marks the field as required: absent and non-defaulted input is
    /// rejected with a missing-field error.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Declares a sibling field this one cannot appear together with.
    pub fn conflicts_with(mut self, field: impl Into<String>) -> Self {
        self.conflicts.push(field.into());
        self
    }

    /// Declares a sibling field that must be present when this one is.
    pub fn requires(mut self, field: impl Into<String>) -> Self {
        self.requires.push(field.into());
        self
    }

    /// Sets the literal substituted when the field is absent. The literal is
    /// checked against the field's type schema when the scope is built.
    pub fn default_value(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    /// Treat the type's zero-equivalent (empty string, zero number, empty
    /// list or map) as if the field were absent, so the default applies.
    pub fn treat_empty_as_default(mut self) -> Self {
        self.empty_is_default = true;
        self
    }

    pub fn type_schema(&self) -> &TypeSchema {
        &self.type_schema
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn conflicts(&self) -> &[String] {
        &self.conflicts
    }

    pub fn required_siblings(&self) -> &[String] {
        &self.requires
    }

    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn empty_is_default(&self) -> bool {
        self.empty_is_default
    }

    /// Serializes the property for introspection.
    pub fn describe(&self) -> Value {
        let mut out = json!({
            "schema": self.type_schema.describe(),
            "required": self.required,
        });
        if !self.conflicts.is_empty() {
            out["conflicts"] = json!(self.conflicts);
        }
        if !self.requires.is_empty() {
            out["requires"] = json!(self.requires);
        }
        if let Some(default) = &self.default {
            out["default"] = default.clone();
        }
        if self.empty_is_default {
            out["empty_is_default"] = json!(true);
        }
        if let Some(display) = &self.display {
            out["display"] = display.describe();
        }
        out
    }
}
