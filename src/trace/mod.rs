//! Recorded traces and navigation through them
//!
//! The instrumented entry returns `{ steps, returnValue, code }` as a live
//! runtime value. [`TraceOutput::from_value`] detaches it into plain data:
//! - [`TraceValue`]: a runtime value with arrays and objects copied out;
//!   a container that contains itself is cut off as `"[Circular]"`
//! - [`TraceStep`]: one recorded step
//! - [`TraceOutput`]: the whole result, serializable to the JSON shape the
//!   entry produced
//!
//! Objects are recorded by reference, so every step shows an object as it
//! was when the trace was extracted, not when the step ran.
//!
//! [`TraceTimeline`] walks the steps forward and backward for the viewer.

use crate::memory::Value;
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Placeholder for a container reached again while it is being copied
pub const CIRCULAR: &str = "[Circular]";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TraceError {
    #[error("{what} is not an object")]
    NotAnObject { what: &'static str },

    #[error("trace result has no `{field}` field")]
    MissingField { field: &'static str },

    #[error("`{field}` should be {expected}")]
    InvalidField {
        field: &'static str,
        expected: &'static str,
    },

    #[error("the trace has no steps")]
    Empty,

    #[error("already at the first step")]
    AtStart,

    #[error("already at the last step")]
    AtEnd,
}

/// A runtime value copied out of the interpreter
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TraceValue {
    /// Serialized as `null`
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    /// Strings, and the text standing in for functions and cycles
    String(String),
    Array(Vec<TraceValue>),
    Object(IndexMap<String, TraceValue>),
}

impl TraceValue {
    pub fn from_value(value: &Value) -> Self {
        let mut seen = Vec::new();
        Self::copy(value, &mut seen)
    }

    fn copy(value: &Value, seen: &mut Vec<*const ()>) -> Self {
        match value {
            Value::Undefined => TraceValue::Undefined,
            Value::Null => TraceValue::Null,
            Value::Bool(b) => TraceValue::Bool(*b),
            Value::Number(n) => TraceValue::Number(*n),
            Value::String(s) => TraceValue::String(s.to_string()),
            Value::Array(elements) => {
                let id = std::rc::Rc::as_ptr(elements) as *const ();
                if seen.contains(&id) {
                    return TraceValue::String(CIRCULAR.to_string());
                }
                seen.push(id);
                let copied = elements.borrow().iter().map(|v| Self::copy(v, seen)).collect();
                seen.pop();
                TraceValue::Array(copied)
            }
            Value::Object(properties) => {
                let id = std::rc::Rc::as_ptr(properties) as *const ();
                if seen.contains(&id) {
                    return TraceValue::String(CIRCULAR.to_string());
                }
                seen.push(id);
                let copied = properties
                    .borrow()
                    .iter()
                    .map(|(k, v)| (k.clone(), Self::copy(v, seen)))
                    .collect();
                seen.pop();
                TraceValue::Object(copied)
            }
            Value::Function(_) | Value::Native(_) => TraceValue::String(value.display()),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            TraceValue::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl From<f64> for TraceValue {
    fn from(n: f64) -> Self {
        TraceValue::Number(n)
    }
}

impl From<&str> for TraceValue {
    fn from(s: &str) -> Self {
        TraceValue::String(s.to_string())
    }
}

/// JavaScript-flavored rendering for display (`undefined`, quoted strings)
impl fmt::Display for TraceValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraceValue::Undefined => f.write_str("undefined"),
            TraceValue::Null => f.write_str("null"),
            TraceValue::Bool(b) => write!(f, "{}", b),
            TraceValue::Number(n) => f.write_str(&crate::codegen::format_number(*n)),
            TraceValue::String(s) if s == CIRCULAR => f.write_str(s),
            TraceValue::String(s) => f.write_str(&crate::codegen::quote_string(s)),
            TraceValue::Array(elements) => {
                f.write_str("[")?;
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", element)?;
                }
                f.write_str("]")
            }
            TraceValue::Object(properties) if properties.is_empty() => f.write_str("{}"),
            TraceValue::Object(properties) => {
                f.write_str("{ ")?;
                for (i, (key, value)) in properties.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                f.write_str(" }")
            }
        }
    }
}

/// One recorded step
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceStep {
    pub call_count: usize,
    pub line: usize,
    /// Tracked name to value, in first-declaration order
    pub context: IndexMap<String, TraceValue>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub increment_call_count: bool,
    /// Present on return steps only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_value: Option<TraceValue>,
}

impl TraceStep {
    fn from_value(value: &Value) -> Result<Self, TraceError> {
        let Value::Object(fields) = value else {
            return Err(TraceError::NotAnObject { what: "step" });
        };
        let fields = fields.borrow();

        let count = |field: &'static str| -> Result<usize, TraceError> {
            match fields.get(field) {
                Some(Value::Number(n)) if *n >= 0.0 && n.fract() == 0.0 => Ok(*n as usize),
                Some(_) => Err(TraceError::InvalidField {
                    field,
                    expected: "a non-negative integer",
                }),
                None => Err(TraceError::MissingField { field }),
            }
        };

        let context = match fields.get("context") {
            Some(Value::Object(context)) => context
                .borrow()
                .iter()
                .map(|(k, v)| (k.clone(), TraceValue::from_value(v)))
                .collect(),
            Some(_) => {
                return Err(TraceError::InvalidField {
                    field: "context",
                    expected: "an object",
                })
            }
            None => return Err(TraceError::MissingField { field: "context" }),
        };

        Ok(TraceStep {
            call_count: count("callCount")?,
            line: count("line")?,
            context,
            increment_call_count: fields
                .get("incrementCallCount")
                .is_some_and(Value::truthy),
            return_value: fields.get("returnValue").map(TraceValue::from_value),
        })
    }

    pub fn is_return(&self) -> bool {
        self.return_value.is_some()
    }
}

/// What a call of the instrumented entry returns
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceOutput {
    pub steps: Vec<TraceStep>,
    pub return_value: TraceValue,
    pub code: String,
}

impl TraceOutput {
    /// Detach the entry's `{ steps, returnValue, code }` result
    pub fn from_value(value: &Value) -> Result<Self, TraceError> {
        let Value::Object(fields) = value else {
            return Err(TraceError::NotAnObject {
                what: "trace result",
            });
        };
        let fields = fields.borrow();

        let steps = match fields.get("steps") {
            Some(Value::Array(steps)) => steps
                .borrow()
                .iter()
                .map(TraceStep::from_value)
                .collect::<Result<Vec<_>, _>>()?,
            Some(_) => {
                return Err(TraceError::InvalidField {
                    field: "steps",
                    expected: "an array",
                })
            }
            None => return Err(TraceError::MissingField { field: "steps" }),
        };

        let return_value = fields
            .get("returnValue")
            .map(TraceValue::from_value)
            .ok_or(TraceError::MissingField {
                field: "returnValue",
            })?;

        let code = match fields.get("code") {
            Some(Value::String(code)) => code.to_string(),
            Some(_) => {
                return Err(TraceError::InvalidField {
                    field: "code",
                    expected: "a string",
                })
            }
            None => return Err(TraceError::MissingField { field: "code" }),
        };

        Ok(TraceOutput {
            steps,
            return_value,
            code,
        })
    }
}

/// Runtime value for a JSON argument
pub fn value_from_json(json: &serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
        serde_json::Value::String(s) => Value::string(s.as_str()),
        serde_json::Value::Array(elements) => {
            Value::array(elements.iter().map(value_from_json).collect())
        }
        serde_json::Value::Object(fields) => Value::object(
            fields
                .iter()
                .map(|(k, v)| (k.clone(), value_from_json(v)))
                .collect(),
        ),
    }
}

/// Cursor over the steps of one trace
#[derive(Debug, Clone)]
pub struct TraceTimeline {
    output: TraceOutput,
    position: usize,
}

impl TraceTimeline {
    pub fn new(output: TraceOutput) -> Self {
        TraceTimeline {
            output,
            position: 0,
        }
    }

    pub fn output(&self) -> &TraceOutput {
        &self.output
    }

    pub fn steps(&self) -> &[TraceStep] {
        &self.output.steps
    }

    pub fn len(&self) -> usize {
        self.output.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.output.steps.is_empty()
    }

    /// Index of the current step
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn current(&self) -> Option<&TraceStep> {
        self.output.steps.get(self.position)
    }

    pub fn is_at_start(&self) -> bool {
        self.position == 0
    }

    pub fn is_at_end(&self) -> bool {
        self.position + 1 >= self.len()
    }

    pub fn step_forward(&mut self) -> Result<&TraceStep, TraceError> {
        if self.is_empty() {
            return Err(TraceError::Empty);
        }
        if self.is_at_end() {
            return Err(TraceError::AtEnd);
        }
        self.position += 1;
        Ok(&self.output.steps[self.position])
    }

    pub fn step_backward(&mut self) -> Result<&TraceStep, TraceError> {
        if self.is_empty() {
            return Err(TraceError::Empty);
        }
        if self.is_at_start() {
            return Err(TraceError::AtStart);
        }
        self.position -= 1;
        Ok(&self.output.steps[self.position])
    }

    pub fn rewind_to_start(&mut self) -> Result<&TraceStep, TraceError> {
        self.position = 0;
        self.current().ok_or(TraceError::Empty)
    }

    pub fn jump_to_end(&mut self) -> Result<&TraceStep, TraceError> {
        self.position = self.len().saturating_sub(1);
        self.current().ok_or(TraceError::Empty)
    }
}
