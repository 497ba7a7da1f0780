//! Type schemas: the self-describing shapes documents are validated against.
//!
//! A [`TypeSchema`] is a tagged variant over the eight shapes the engine
//! understands. Leaf variants (string, integer, float, enum) carry their own
//! constraints; composite variants (list, map, object) nest further schemas;
//! [`RefSchema`] points at a named object in the enclosing
//! [`Scope`](crate::Scope) and is resolved by name at validation time.
//!
//! Schemas are built once at process start and never mutated afterwards, so
//! they can be shared freely between concurrent dispatch calls.

use regex::Regex;
use serde_json::{json, Map, Value};

use crate::property::PropertySchema;

/// A type schema for one position in a document.
#[derive(Debug, Clone)]
pub enum TypeSchema {
    String(StringSchema),
    Int(IntSchema),
    Float(FloatSchema),
    Enum(EnumSchema),
    List(ListSchema),
    Map(MapSchema),
    Struct(StructSchema),
    Ref(RefSchema),
}

impl TypeSchema {
    /// The type name used in `expected ..., got ...` error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            TypeSchema::String(_) => "string",
            TypeSchema::Int(_) => "integer",
            TypeSchema::Float(_) => "number",
            TypeSchema::Enum(_) => "string",
            TypeSchema::List(_) => "array",
            TypeSchema::Map(_) => "object",
            TypeSchema::Struct(_) => "object",
            TypeSchema::Ref(_) => "object",
        }
    }

    /// Serializes the schema for introspection.
    pub fn describe(&self) -> Value {
        match self {
            TypeSchema::String(s) => s.describe(),
            TypeSchema::Int(s) => s.describe(),
            TypeSchema::Float(s) => s.describe(),
            TypeSchema::Enum(s) => s.describe(),
            TypeSchema::List(s) => json!({"type": "list", "items": s.items.describe()}),
            TypeSchema::Map(s) => json!({
                "type": "map",
                "keys": s.keys.describe(),
                "values": s.values.describe(),
            }),
            TypeSchema::Struct(s) => s.describe(),
            TypeSchema::Ref(s) => json!({"type": "ref", "id": s.target}),
        }
    }
}

/// String schema with optional length bounds and a regular-expression pattern.
#[derive(Debug, Clone, Default)]
pub struct StringSchema {
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub pattern: Option<Regex>,
}

impl StringSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn min_length(mut self, min: usize) -> Self {
        self.min_length = Some(min);
        self
    }

    pub fn max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    pub fn pattern(mut self, pattern: Regex) -> Self {
        self.pattern = Some(pattern);
        self
    }

    fn describe(&self) -> Value {
        let mut out = json!({"type": "string"});
        if let Some(min) = self.min_length {
            out["min_length"] = json!(min);
        }
        if let Some(max) = self.max_length {
            out["max_length"] = json!(max);
        }
        if let Some(pattern) = &self.pattern {
            out["pattern"] = json!(pattern.as_str());
        }
        out
    }
}

/// Integer schema with optional inclusive bounds.
#[derive(Debug, Clone, Default)]
pub struct IntSchema {
    pub min: Option<i64>,
    pub max: Option<i64>,
}

impl IntSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn min(mut self, min: i64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn max(mut self, max: i64) -> Self {
        self.max = Some(max);
        self
    }

    fn describe(&self) -> Value {
        let mut out = json!({"type": "integer"});
        if let Some(min) = self.min {
            out["min"] = json!(min);
        }
        if let Some(max) = self.max {
            out["max"] = json!(max);
        }
        out
    }
}

/// Float schema with optional inclusive bounds and a display-only unit.
#[derive(Debug, Clone, Default)]
pub struct FloatSchema {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub units: Option<Units>,
}

impl FloatSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    pub fn units(mut self, units: Units) -> Self {
        self.units = Some(units);
        self
    }

    fn describe(&self) -> Value {
        let mut out = json!({"type": "float"});
        if let Some(min) = self.min {
            out["min"] = json!(min);
        }
        if let Some(max) = self.max {
            out["max"] = json!(max);
        }
        if let Some(units) = &self.units {
            out["units"] = json!({"singular": units.singular, "plural": units.plural});
        }
        out
    }
}

/// Unit-of-measure label for float schemas. Presentation only.
#[derive(Debug, Clone)]
pub struct Units {
    pub singular: String,
    pub plural: String,
}

impl Units {
    pub fn new(singular: impl Into<String>, plural: impl Into<String>) -> Self {
        Self {
            singular: singular.into(),
            plural: plural.into(),
        }
    }
}

/// Enumeration over a finite set of string literals.
#[derive(Debug, Clone, Default)]
pub struct EnumSchema {
    pub values: Vec<EnumValue>,
}

impl EnumSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.values.push(EnumValue {
            value: value.into(),
            label: None,
        });
        self
    }

    pub fn labeled_value(mut self, value: impl Into<String>, label: impl Into<String>) -> Self {
        self.values.push(EnumValue {
            value: value.into(),
            label: Some(label.into()),
        });
        self
    }

    /// The allowed literals, in declaration order.
    pub fn allowed(&self) -> Vec<String> {
        self.values.iter().map(|v| v.value.clone()).collect()
    }

    fn describe(&self) -> Value {
        let values: Vec<Value> = self
            .values
            .iter()
            .map(|v| match &v.label {
                Some(label) => json!({"value": v.value, "label": label}),
                None => json!({"value": v.value}),
            })
            .collect();
        json!({"type": "enum", "values": values})
    }
}

/// One enum literal with an optional human-readable label.
#[derive(Debug, Clone)]
pub struct EnumValue {
    pub value: String,
    pub label: Option<String>,
}

/// Homogeneous list of elements.
#[derive(Debug, Clone)]
pub struct ListSchema {
    pub items: Box<TypeSchema>,
}

impl ListSchema {
    pub fn new(items: impl Into<TypeSchema>) -> Self {
        Self {
            items: Box::new(items.into()),
        }
    }
}

/// Map with typed keys and typed values.
#[derive(Debug, Clone)]
pub struct MapSchema {
    pub keys: Box<TypeSchema>,
    pub values: Box<TypeSchema>,
}

impl MapSchema {
    pub fn new(keys: impl Into<TypeSchema>, values: impl Into<TypeSchema>) -> Self {
        Self {
            keys: Box::new(keys.into()),
            values: Box::new(values.into()),
        }
    }
}

/// Structured object: an ordered mapping of field names to constrained
/// properties. Fields are iterated in declaration order so error reporting
/// is deterministic. All structs are closed: undeclared fields are rejected.
#[derive(Debug, Clone)]
pub struct StructSchema {
    name: String,
    fields: Vec<(String, PropertySchema)>,
}

impl StructSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Appends a field. Declaration order is preserved; duplicates are
    /// reported when the enclosing scope is built.
    pub fn field(mut self, name: impl Into<String>, property: PropertySchema) -> Self {
        self.fields.push((name.into(), property));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &PropertySchema)> {
        self.fields.iter().map(|(name, prop)| (name.as_str(), prop))
    }

    pub fn get(&self, name: &str) -> Option<&PropertySchema> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, prop)| prop)
    }

    pub(crate) fn describe(&self) -> Value {
        let mut properties = Map::new();
        for (name, prop) in self.fields() {
            properties.insert(name.to_string(), prop.describe());
        }
        json!({"type": "object", "id": self.name, "properties": properties})
    }
}

/// By-name reference to an object schema in the enclosing scope.
///
/// Resolution happens when the scope is built; an unresolved target is an
/// authoring error, not an input error.
#[derive(Debug, Clone)]
pub struct RefSchema {
    pub target: String,
}

impl RefSchema {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
        }
    }
}

impl From<StringSchema> for TypeSchema {
    fn from(schema: StringSchema) -> Self {
        TypeSchema::String(schema)
    }
}

impl From<IntSchema> for TypeSchema {
    fn from(schema: IntSchema) -> Self {
        TypeSchema::Int(schema)
    }
}

impl From<FloatSchema> for TypeSchema {
    fn from(schema: FloatSchema) -> Self {
        TypeSchema::Float(schema)
    }
}

impl From<EnumSchema> for TypeSchema {
    fn from(schema: EnumSchema) -> Self {
        TypeSchema::Enum(schema)
    }
}

impl From<ListSchema> for TypeSchema {
    fn from(schema: ListSchema) -> Self {
        TypeSchema::List(schema)
    }
}

impl From<MapSchema> for TypeSchema {
    fn from(schema: MapSchema) -> Self {
        TypeSchema::Map(schema)
    }
}

impl From<StructSchema> for TypeSchema {
    fn from(schema: StructSchema) -> Self {
        TypeSchema::Struct(schema)
    }
}

impl From<RefSchema> for TypeSchema {
    fn from(schema: RefSchema) -> Self {
        TypeSchema::Ref(schema)
    }
}
