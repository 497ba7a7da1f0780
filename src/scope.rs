//! Scopes: named registries of object schemas.
//!
//! A scope owns a set of [`StructSchema`] definitions keyed by name, one of
//! which is the root. [`RefSchema`](crate::schema::RefSchema) targets are
//! resolved against this registry by name, which lets definitions reference
//! each other (including forward and self references) without live object
//! cycles.
//!
//! Building a scope runs the authoring checks: every reference must resolve,
//! conflicts/requires must point at declared siblings, a field cannot both
//! conflict with and require the same sibling, and default literals must
//! satisfy their own type schema. A scope that builds successfully cannot
//! fail for schema reasons at validation time.

use serde_json::{json, Map, Value};

use crate::error::{SchemaError, ValidationError};
use crate::schema::{StructSchema, TypeSchema};
use crate::validator::validate_type;

/// An immutable registry of object schemas with a designated root.
#[derive(Debug, Clone)]
pub struct Scope {
    root: String,
    definitions: Vec<(String, StructSchema)>,
}

impl Scope {
    /// Starts building a scope with `root` as the root object. The root is
    /// registered under its own name, so it may reference itself.
    pub fn builder(root: StructSchema) -> ScopeBuilder {
        let root_name = root.name().to_string();
        ScopeBuilder {
            root: root_name.clone(),
            definitions: vec![(root_name, root)],
        }
    }

    /// The name of the root object.
    pub fn root_name(&self) -> &str {
        &self.root
    }

    /// The root object schema.
    pub fn root(&self) -> &StructSchema {
        self.lookup(&self.root)
            .unwrap_or_else(|| panic!("scope root \"{}\" missing from registry", self.root))
    }

    /// Looks up a definition by name.
    pub fn lookup(&self, name: &str) -> Option<&StructSchema> {
        self.definitions
            .iter()
            .find(|(def_name, _)| def_name == name)
            .map(|(_, schema)| schema)
    }

    /// Resolves a reference target. Panics if the name is absent: the builder
    /// checks all references, so this indicates scope misuse, not bad input.
    pub(crate) fn resolve(&self, name: &str) -> &StructSchema {
        self.lookup(name)
            .unwrap_or_else(|| panic!("unresolved reference \"{name}\" in a built scope"))
    }

    /// Validates and normalizes a raw document against the root object.
    pub fn validate(&self, raw: &Value) -> Result<Value, ValidationError> {
        validate_type(self, &TypeSchema::Struct(self.root().clone()), raw, "")
    }

    /// Serializes the scope for introspection.
    pub fn describe(&self) -> Value {
        let mut objects = Map::new();
        for (name, schema) in &self.definitions {
            objects.insert(name.clone(), schema.describe());
        }
        json!({"root": self.root, "objects": objects})
    }

    fn known_names(&self) -> Vec<String> {
        self.definitions
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }

    fn check(&self) -> Result<(), SchemaError> {
        for (_, schema) in &self.definitions {
            self.check_struct(schema)?;
        }
        Ok(())
    }

    fn check_struct(&self, schema: &StructSchema) -> Result<(), SchemaError> {
        let mut seen: Vec<&str> = Vec::new();
        for (field, _) in schema.fields() {
            if seen.contains(&field) {
                return Err(SchemaError::DuplicateField {
                    object: schema.name().to_string(),
                    field: field.to_string(),
                });
            }
            seen.push(field);
        }

        for (field, prop) in schema.fields() {
            for target in prop.conflicts() {
                if schema.get(target).is_none() {
                    return Err(SchemaError::UnknownSibling {
                        field: field.to_string(),
                        target: target.clone(),
                    });
                }
                if prop.required_siblings().contains(target) {
                    return Err(SchemaError::ContradictoryConstraint {
                        field: field.to_string(),
                        target: target.clone(),
                    });
                }
            }
            for target in prop.required_siblings() {
                if schema.get(target).is_none() {
                    return Err(SchemaError::UnknownSibling {
                        field: field.to_string(),
                        target: target.clone(),
                    });
                }
            }

            self.check_type(prop.type_schema())?;

            if let Some(default) = prop.default() {
                validate_type(self, prop.type_schema(), default, "").map_err(|source| {
                    SchemaError::InvalidDefault {
                        field: field.to_string(),
                        source,
                    }
                })?;
            }
        }
        Ok(())
    }

    fn check_type(&self, schema: &TypeSchema) -> Result<(), SchemaError> {
        match schema {
            TypeSchema::Ref(r) => {
                if self.lookup(&r.target).is_none() {
                    return Err(SchemaError::UnresolvedRef {
                        name: r.target.clone(),
                        known: self.known_names(),
                    });
                }
                Ok(())
            }
            TypeSchema::List(l) => self.check_type(&l.items),
            TypeSchema::Map(m) => {
                self.check_type(&m.keys)?;
                self.check_type(&m.values)
            }
            TypeSchema::Struct(s) => self.check_struct(s),
            _ => Ok(()),
        }
    }
}

/// Builder for [`Scope`]. Definitions are keyed by their schema name.
#[derive(Debug)]
pub struct ScopeBuilder {
    root: String,
    definitions: Vec<(String, StructSchema)>,
}

impl ScopeBuilder {
    /// Registers another object schema under its own name.
    pub fn define(mut self, schema: StructSchema) -> Self {
        self.definitions.push((schema.name().to_string(), schema));
        self
    }

    /// Finishes the scope, running all authoring checks.
    pub fn build(self) -> Result<Scope, SchemaError> {
        let mut seen: Vec<&str> = Vec::new();
        for (name, _) in &self.definitions {
            if seen.contains(&name.as_str()) {
                return Err(SchemaError::DuplicateDefinition { name: name.clone() });
            }
            seen.push(name);
        }

        let scope = Scope {
            root: self.root,
            definitions: self.definitions,
        };
        scope.check()?;
        Ok(scope)
    }
}
