//! Steps: named operations with a validated input and tagged output variants.
//!
//! A [`Step`] binds one operation name to an input [`Scope`], an ordered set
//! of named output variants (each its own scope, flagged normal or error) and
//! a handler. The [`CallableSchema`] is the registry of steps and the single
//! dispatch entry point.
//!
//! Dispatch for one call moves through input validation, the handler, then
//! output validation; a failure in either validation phase terminates the
//! call and the handler runs at most once. Input failures are recoverable
//! [`DispatchError`]s. Output contract violations (undeclared variant,
//! output failing its declared schema) are defects in the step itself and
//! panic so they stop the process instead of masquerading as bad input.

use serde_json::{json, Map, Value};

use crate::error::DispatchError;
use crate::scope::Scope;
use crate::types::DisplayValue;

/// The handler's verdict: which declared output variant, with what value.
#[derive(Debug, Clone)]
pub struct StepOutcome {
    pub variant: String,
    pub value: Value,
}

impl StepOutcome {
    pub fn new(variant: impl Into<String>, value: Value) -> Self {
        Self {
            variant: variant.into(),
            value,
        }
    }
}

type StepHandler = Box<dyn Fn(Value) -> StepOutcome + Send + Sync>;

/// One declared output variant of a step.
#[derive(Debug, Clone)]
pub struct StepOutput {
    schema: Scope,
    display: Option<DisplayValue>,
    error: bool,
}

impl StepOutput {
    pub fn new(schema: Scope) -> Self {
        Self {
            schema,
            display: None,
            error: false,
        }
    }

    pub fn display(mut self, display: DisplayValue) -> Self {
        self.display = Some(display);
        self
    }

    /// Flags this variant as a failure outcome for reporting purposes.
    pub fn error(mut self) -> Self {
        self.error = true;
        self
    }

    pub fn schema(&self) -> &Scope {
        &self.schema
    }

    pub fn is_error(&self) -> bool {
        self.error
    }

    fn describe(&self) -> Value {
        let mut out = json!({
            "schema": self.schema.describe(),
            "error": self.error,
        });
        if let Some(display) = &self.display {
            out["display"] = display.describe();
        }
        out
    }
}

/// One named operation: input scope, output variants and handler.
pub struct Step {
    name: String,
    input: Scope,
    outputs: Vec<(String, StepOutput)>,
    display: Option<DisplayValue>,
    handler: StepHandler,
}

impl Step {
    pub fn new(
        name: impl Into<String>,
        input: Scope,
        handler: impl Fn(Value) -> StepOutcome + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            input,
            outputs: Vec::new(),
            display: None,
            handler: Box::new(handler),
        }
    }

    /// Declares an output variant. Declaration order is preserved for
    /// introspection.
    pub fn output(mut self, name: impl Into<String>, output: StepOutput) -> Self {
        self.outputs.push((name.into(), output));
        self
    }

    pub fn display(mut self, display: DisplayValue) -> Self {
        self.display = Some(display);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn input_schema(&self) -> &Scope {
        &self.input
    }

    pub fn outputs(&self) -> impl Iterator<Item = (&str, &StepOutput)> {
        self.outputs
            .iter()
            .map(|(name, output)| (name.as_str(), output))
    }

    pub fn get_output(&self, name: &str) -> Option<&StepOutput> {
        self.outputs
            .iter()
            .find(|(output_name, _)| output_name == name)
            .map(|(_, output)| output)
    }

    fn describe(&self) -> Value {
        let mut outputs = Map::new();
        for (name, output) in self.outputs() {
            outputs.insert(name.to_string(), output.describe());
        }
        let mut out = json!({
            "input": self.input.describe(),
            "outputs": outputs,
        });
        if let Some(display) = &self.display {
            out["display"] = display.describe();
        }
        out
    }
}

impl std::fmt::Debug for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Step")
            .field("name", &self.name)
            .field(
                "outputs",
                &self.outputs.iter().map(|(n, _)| n).collect::<Vec<_>>(),
            )
            .finish_non_exhaustive()
    }
}

/// The registry of steps exposed by this plugin.
///
/// Constructed once at process start and read concurrently by any number of
/// dispatch calls; nothing here is mutated after construction.
#[derive(Debug, Default)]
pub struct CallableSchema {
    steps: Vec<(String, Step)>,
}

impl CallableSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(mut self, step: Step) -> Self {
        self.steps.push((step.name().to_string(), step));
        self
    }

    pub fn get(&self, name: &str) -> Option<&Step> {
        self.steps
            .iter()
            .find(|(step_name, _)| step_name == name)
            .map(|(_, step)| step)
    }

    pub fn steps(&self) -> impl Iterator<Item = &Step> {
        self.steps.iter().map(|(_, step)| step)
    }

    /// Dispatches one call: validates the raw input, runs the handler once,
    /// validates the selected output, and returns the variant name with the
    /// encoded output document.
    ///
    /// # Panics
    ///
    /// Panics if the handler names an undeclared variant or returns a value
    /// that fails the variant's own schema. Both are programming errors in
    /// the step descriptor: variant names are a closed, statically known set
    /// and output shapes are fully under the implementer's control.
    pub fn dispatch(&self, step_name: &str, raw_input: &Value) -> Result<(String, Value), DispatchError> {
        let step = self.get(step_name).ok_or_else(|| DispatchError::UnknownStep {
            name: step_name.to_string(),
        })?;

        let input = step
            .input
            .validate(raw_input)
            .map_err(|source| DispatchError::InvalidInput {
                step: step_name.to_string(),
                source,
            })?;

        let outcome = (step.handler)(input);

        let output = step.get_output(&outcome.variant).unwrap_or_else(|| {
            panic!(
                "step \"{}\" returned undeclared output variant \"{}\"",
                step.name, outcome.variant
            )
        });
        let encoded = output.schema.validate(&outcome.value).unwrap_or_else(|err| {
            panic!(
                "step \"{}\" produced invalid \"{}\" output: {err}",
                step.name, outcome.variant
            )
        });

        Ok((outcome.variant, encoded))
    }

    /// Serializes every step with its input scope and output variants, for
    /// external tooling and the transport layer.
    pub fn describe(&self) -> Value {
        let mut steps = Map::new();
        for (name, step) in &self.steps {
            steps.insert(name.clone(), step.describe());
        }
        json!({"steps": steps})
    }
}
