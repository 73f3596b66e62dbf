//! Step-recording call synthesis
//!
//! Builds the call that hands one step to the recorder:
//!
//! ```text
//! __trace(__context, { line: 4, context: { a: a, b: b }, returnValue: _uid })
//! ```
//!
//! Context values are references to the live variables, so the recorder
//! sees each value as it is when the call runs. A tracked name whose
//! binding is out of scope at the call site, or not initialized yet, is
//! reported as a literal `undefined` and never read. The recorder returns
//! nothing, so the call always evaluates to `undefined`.

use super::synth;
use crate::parser::ast::{Expr, Stmt};

/// One tracked name as seen from a recorder call site
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextEntry<'a> {
    pub name: &'a str,
    pub in_scope: bool,
}

impl<'a> ContextEntry<'a> {
    pub fn live(name: &'a str) -> Self {
        Self {
            name,
            in_scope: true,
        }
    }

    pub fn out_of_scope(name: &'a str) -> Self {
        Self {
            name,
            in_scope: false,
        }
    }
}

/// What one recorded step should contain
#[derive(Debug, Clone)]
pub struct StepSpec<'a> {
    pub line: usize,
    pub context: Vec<ContextEntry<'a>>,
    pub increment_call_count: bool,
    pub return_value: Option<Expr>,
}

impl<'a> StepSpec<'a> {
    pub fn new(line: usize, context: Vec<ContextEntry<'a>>) -> Self {
        Self {
            line,
            context,
            increment_call_count: false,
            return_value: None,
        }
    }

    /// Mark this step as the entry of a new invocation
    pub fn entry(mut self) -> Self {
        self.increment_call_count = true;
        self
    }

    pub fn returning(mut self, value: Expr) -> Self {
        self.return_value = Some(value);
        self
    }
}

#[derive(Debug, Clone)]
pub struct TraceCallSynthesizer {
    recorder_name: String,
    context_name: String,
}

impl TraceCallSynthesizer {
    pub fn new(recorder_name: &str, context_name: &str) -> Self {
        Self {
            recorder_name: recorder_name.to_string(),
            context_name: context_name.to_string(),
        }
    }

    /// The recorder call as an expression
    pub fn build(&self, step: StepSpec<'_>) -> Expr {
        let context = step
            .context
            .iter()
            .map(|entry| {
                let value = if entry.in_scope {
                    synth::ident(entry.name)
                } else {
                    synth::undefined()
                };
                synth::property(entry.name, value)
            })
            .collect();

        let mut fields = vec![
            synth::property("line", synth::number(step.line as f64)),
            synth::property("context", synth::object(context)),
        ];
        if step.increment_call_count {
            fields.push(synth::property("incrementCallCount", synth::boolean(true)));
        }
        if let Some(value) = step.return_value {
            fields.push(synth::property("returnValue", value));
        }

        tracing::trace!(
            line = step.line,
            tracked = step.context.len(),
            entry = step.increment_call_count,
            "synthesized recorder call"
        );

        synth::call(
            synth::ident(&self.recorder_name),
            vec![synth::ident(&self.context_name), synth::object(fields)],
        )
    }

    /// The recorder call as a statement
    pub fn statement(&self, step: StepSpec<'_>) -> Stmt {
        synth::expr_stmt(self.build(step))
    }
}
