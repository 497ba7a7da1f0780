//! Schema-driven plugin step that creates a Kubernetes service.
//!
//! The core of this crate is a declarative schema and step-dispatch engine:
//! schemas describe the shape of a step's input and its tagged output
//! variants, raw documents (`serde_json::Value` trees) are validated and
//! normalized against those schemas, and a dispatcher invokes the step's
//! handler between the two validation phases. The one concrete step,
//! `create`, connects to a Kubernetes cluster and creates a service.
//!
//! # Example
//!
//! ```
//! use kube_service_step::{PropertySchema, Scope, StringSchema, StructSchema};
//! use serde_json::json;
//!
//! let root = StructSchema::new("greeting")
//!     .field(
//!         "name",
//!         PropertySchema::new(StringSchema::new().min_length(1)).required(),
//!     )
//!     .field(
//!         "salutation",
//!         PropertySchema::new(StringSchema::new())
//!             .default_value(json!("hello"))
//!             .treat_empty_as_default(),
//!     );
//! let scope = Scope::builder(root).build().unwrap();
//!
//! // Validation normalizes the document: the empty salutation falls back
//! // to its default.
//! let normalized = scope
//!     .validate(&json!({"name": "world", "salutation": ""}))
//!     .unwrap();
//! assert_eq!(normalized, json!({"name": "world", "salutation": "hello"}));
//!
//! // A missing required field is rejected with its path.
//! let err = scope.validate(&json!({})).unwrap_err();
//! assert_eq!(err.to_string(), "/name: missing required field");
//! ```
//!
//! # Error taxonomy
//!
//! | Error | Meaning | Handling |
//! |-------|---------|----------|
//! | [`SchemaError`] | Authoring defect (unresolved ref, bad default) | Fatal at scope construction |
//! | [`ValidationError`] | Bad input document | Structured rejection, handler not invoked |
//! | [`DispatchError`] | Unknown step or invalid input | Structured rejection |
//! | Output contract violation | Handler bug (undeclared variant, bad output) | Panic |

#[cfg(feature = "remote")]
mod client;
mod error;
mod property;
mod schema;
mod scope;
mod service;
mod step;
mod types;
mod validator;

pub use error::{DispatchError, SchemaError, ValidationError, ValidationErrorKind};
pub use property::PropertySchema;
pub use schema::{
    EnumSchema, EnumValue, FloatSchema, IntSchema, ListSchema, MapSchema, RefSchema, StringSchema,
    StructSchema, TypeSchema, Units,
};
pub use scope::{Scope, ScopeBuilder};
pub use service::{
    callable_schema, input_scope, ApiError, Connection, CreateServiceResult, ErrorOutput, Input,
    ObjectMeta, Service, ServiceApi, ServicePort, ServiceSpec, SuccessOutput,
    GENERATED_NAME_PREFIX,
};
pub use step::{CallableSchema, Step, StepOutcome, StepOutput};
pub use types::{json_type_name, DisplayValue};

#[cfg(feature = "remote")]
pub use client::KubeClient;
