//! Step-tracing instrumentation
//!
//! Takes the parsed source unit, finds its single `export default` function,
//! rewrites that function's body so that every declaration, assignment,
//! return and branch/loop test records a step, and wraps it in a scaffold
//! that collects the steps and returns them next to the original result.
//!
//! # Components
//!
//! - [`bindings`]: the Binding Tracker, the names each step reports
//! - [`trace_call`]: builds one recorder call from a [`trace_call::StepSpec`]
//! - [`rules`]: the rewrite rules, applied in one pre-order pass
//! - [`wrapper`]: recorder routine, context slot and exported entry
//!
//! The instrumenter never runs the code it produces. Feed
//! [`InstrumentedProgram::into_program`] to [`crate::codegen`] for text, or
//! to [`crate::interpreter`] to execute it.

pub mod bindings;
pub mod errors;
pub mod rules;
mod synth;
pub mod trace_call;
mod uid;
pub mod wrapper;

use crate::parser::ast::*;
use crate::parser::visit::{NameCollector, Visit};
use bindings::BindingTracker;
use rules::{RewriteStats, Rewriter};
use serde::{Deserialize, Serialize};
use trace_call::{ContextEntry, StepSpec, TraceCallSynthesizer};
use uid::UidGenerator;

pub use errors::InstrumentError;

/// How a recorder call is combined with a branch or loop test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum TestSequencing {
    /// `__trace(...) || test`
    #[default]
    LogicalOr,
    /// `(__trace(...), test)`
    Comma,
}

/// Names and shapes used in the generated code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstrumentOptions {
    pub recorder_name: String,
    pub context_name: String,
    /// Temporaries are named `_<prefix>`, `_<prefix>2`, ...
    pub temp_prefix: String,
    pub test_sequencing: TestSequencing,
}

impl Default for InstrumentOptions {
    fn default() -> Self {
        Self {
            recorder_name: "__trace".to_string(),
            context_name: "__context".to_string(),
            temp_prefix: "uid".to_string(),
            test_sequencing: TestSequencing::default(),
        }
    }
}

/// Result of instrumenting one source unit
#[derive(Debug, Clone, PartialEq)]
pub struct InstrumentedProgram {
    /// Top-level statements other than the default export, in source order
    pub prelude: Vec<Stmt>,
    /// The recorder routine
    pub recorder: Stmt,
    /// Module-level `let` holding the current trace context
    pub context_slot: Stmt,
    /// The rewritten function, declared at module level
    pub traced: Function,
    /// The exported entry
    pub entry: Function,
    pub function_name: String,
    /// Original source, without a leading `export default `
    pub code: String,
    pub stats: RewriteStats,
}

impl InstrumentedProgram {
    /// Assemble the output module
    pub fn into_program(self) -> Program {
        let mut items: Vec<ModuleItem> = self.prelude.into_iter().map(ModuleItem::Stmt).collect();
        items.push(ModuleItem::Stmt(self.recorder));
        items.push(ModuleItem::Stmt(self.context_slot));
        let traced_origin = self.traced.origin;
        items.push(ModuleItem::Stmt(Stmt::FunctionDecl {
            function: self.traced,
            origin: traced_origin,
        }));
        items.push(ModuleItem::ExportDefault {
            declaration: ExportDefault::Function(self.entry),
            origin: Origin::Synthesized,
        });
        Program { items }
    }

    /// The rewritten traced function
    pub fn traced_function(&self) -> &Function {
        &self.traced
    }

    /// Generated JavaScript for the whole module
    pub fn to_source(&self) -> String {
        crate::codegen::print_program(&self.clone().into_program())
    }
}

pub struct Instrumenter {
    options: InstrumentOptions,
}

impl Instrumenter {
    pub fn new(options: InstrumentOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &InstrumentOptions {
        &self.options
    }

    /// Instrument a parsed source unit. `source` is the text it was parsed
    /// from, reported back as `code`.
    pub fn instrument(
        &self,
        program: Program,
        source: &str,
    ) -> Result<InstrumentedProgram, InstrumentError> {
        let (prelude, function, export_line) = split_default_export(program)?;
        self.check_reserved_names(&prelude, &function)?;

        let name = function.name.clone().unwrap_or_default();
        let params = function.param_names();
        let body_line = function
            .body_origin
            .line()
            .or(function.origin.line())
            .unwrap_or(export_line);

        let mut taken = NameCollector::from_function(&function).names;
        taken.insert(self.options.recorder_name.clone());
        taken.insert(self.options.context_name.clone());
        taken.insert(wrapper::RETURN_VALUE_NAME.to_string());

        let calls =
            TraceCallSynthesizer::new(&self.options.recorder_name, &self.options.context_name);
        let tracker = BindingTracker::with_params(params.iter().cloned());
        let params_context = tracker.names().map(ContextEntry::live).collect();
        let entry_step = calls.statement(StepSpec::new(body_line, params_context).entry());

        let mut rewriter = Rewriter::new(
            tracker,
            calls,
            UidGenerator::new(&self.options.temp_prefix, taken),
            self.options.test_sequencing,
        );

        let stmts = match function.body {
            FunctionBody::Block(stmts) => stmts,
            // Declarations always have block bodies
            FunctionBody::Expression(expr) => vec![Stmt::Return {
                argument: Some(*expr),
                origin: function.body_origin,
            }],
        };
        let mut body = Vec::with_capacity(stmts.len() * 2 + 1);
        body.push(entry_step);
        body.extend(rewriter.rewrite_body(stmts));

        let stats = rewriter.stats();
        tracing::debug!(
            function = %name,
            declarations = stats.declarations,
            assignments = stats.assignments,
            returns = stats.returns,
            tests = stats.tests,
            updates = stats.updates,
            tracked = rewriter.bindings().len(),
            "rewrote function body"
        );

        let traced = Function {
            name: Some(name.clone()),
            params: function.params,
            body: FunctionBody::Block(body),
            is_arrow: false,
            body_origin: function.body_origin.instrumented(),
            origin: function.origin.instrumented(),
        };

        let code = wrapper::strip_export_default(source);
        Ok(InstrumentedProgram {
            prelude,
            recorder: wrapper::recorder_function(&self.options.recorder_name),
            context_slot: wrapper::context_slot(&self.options.context_name),
            entry: wrapper::entry_function(&self.options.context_name, &name, &code),
            traced,
            function_name: name,
            code,
            stats,
        })
    }

    /// The scaffold's own names must not appear anywhere in the input
    fn check_reserved_names(
        &self,
        prelude: &[Stmt],
        function: &Function,
    ) -> Result<(), InstrumentError> {
        let mut collector = NameCollector::from_function(function);
        for stmt in prelude {
            collector.visit_stmt(stmt);
        }

        let reserved = [
            self.options.recorder_name.as_str(),
            self.options.context_name.as_str(),
            wrapper::RETURN_VALUE_NAME,
        ];
        if let Some(name) = reserved.iter().find(|name| collector.names.contains(**name)) {
            return Err(InstrumentError::ReservedName {
                name: name.to_string(),
            });
        }

        // Inside the entry the rest parameter would shadow the traced
        // function
        if function.name.as_deref() == Some(wrapper::ARGS_NAME) {
            return Err(InstrumentError::ReservedName {
                name: wrapper::ARGS_NAME.to_string(),
            });
        }
        Ok(())
    }
}

/// Split the program into the statements around the default export and the
/// exported named function
fn split_default_export(
    program: Program,
) -> Result<(Vec<Stmt>, Function, usize), InstrumentError> {
    let count = program.default_exports().count();
    match count {
        0 => return Err(InstrumentError::MissingDefaultExport),
        1 => {}
        _ => return Err(InstrumentError::MultipleDefaultExports { count }),
    }

    let mut prelude = Vec::new();
    let mut export = None;
    for item in program.items {
        match item {
            ModuleItem::Stmt(stmt) => prelude.push(stmt),
            ModuleItem::ExportDefault {
                declaration,
                origin,
            } => export = Some((declaration, origin.line().unwrap_or(0))),
        }
    }

    let (declaration, line) = export.ok_or(InstrumentError::MissingDefaultExport)?;
    let function = match declaration {
        ExportDefault::Function(function) if function.name.is_some() => function,
        ExportDefault::Function(_) => return Err(InstrumentError::AnonymousFunction { line }),
        ExportDefault::Expression(Expr::Function(function)) if function.name.is_none() => {
            return Err(InstrumentError::AnonymousFunction { line })
        }
        ExportDefault::Expression(_) => return Err(InstrumentError::NotAFunction { line }),
    };

    Ok((prelude, function, line))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_program;
    use pretty_assertions::assert_eq;

    fn instrument(source: &str) -> Result<InstrumentedProgram, InstrumentError> {
        let program = parse_program(source).unwrap();
        Instrumenter::new(InstrumentOptions::default()).instrument(program, source)
    }

    #[test]
    fn test_full_output() {
        let source = "export default function add(a, b) {\n  return a + b;\n}";
        let instrumented = instrument(source).unwrap();
        assert_eq!(instrumented.function_name, "add");
        assert_eq!(
            instrumented.to_source(),
            "function __trace(context, step) {\n\
             \x20 if (step.incrementCallCount) {\n\
             \x20   context.callCount++;\n\
             \x20 }\n\
             \x20 context.steps.push({ callCount: context.callCount, ...step });\n\
             }\n\
             let __context;\n\
             function add(a, b) {\n\
             \x20 __trace(__context, { line: 1, context: { a: a, b: b }, incrementCallCount: true });\n\
             \x20 const _uid = a + b;\n\
             \x20 __trace(__context, { line: 2, context: { a: a, b: b }, returnValue: _uid });\n\
             \x20 return _uid;\n\
             }\n\
             export default function (...args) {\n\
             \x20 __context = { steps: [], callCount: 0 };\n\
             \x20 const __returnValue = add(...args);\n\
             \x20 return { steps: __context.steps, returnValue: __returnValue, code: \"function add(a, b) {\\n  return a + b;\\n}\" };\n\
             }\n"
        );
    }

    #[test]
    fn test_prelude_kept_in_order() {
        let instrumented =
            instrument("const K = 3;\nexport default function f() { return K; }\nfunction g() {}")
                .unwrap();
        assert_eq!(instrumented.prelude.len(), 2);
        assert!(matches!(instrumented.prelude[0], Stmt::VarDecl { .. }));
        assert!(matches!(instrumented.prelude[1], Stmt::FunctionDecl { .. }));
    }

    #[test]
    fn test_missing_export() {
        assert_eq!(
            instrument("function f() {}").unwrap_err(),
            InstrumentError::MissingDefaultExport
        );
    }

    #[test]
    fn test_multiple_exports() {
        assert_eq!(
            instrument("export default function f() {}\nexport default function g() {}")
                .unwrap_err(),
            InstrumentError::MultipleDefaultExports { count: 2 }
        );
    }

    #[test]
    fn test_not_a_function() {
        assert_eq!(
            instrument("\nexport default 42;").unwrap_err(),
            InstrumentError::NotAFunction { line: 2 }
        );
    }

    #[test]
    fn test_anonymous_function() {
        assert_eq!(
            instrument("export default function (a) { return a; }").unwrap_err(),
            InstrumentError::AnonymousFunction { line: 1 }
        );
        assert_eq!(
            instrument("export default (a) => a;").unwrap_err(),
            InstrumentError::AnonymousFunction { line: 1 }
        );
    }

    #[test]
    fn test_reserved_names() {
        assert_eq!(
            instrument("export default function f() { let __context = 1; return __context; }")
                .unwrap_err(),
            InstrumentError::ReservedName {
                name: "__context".to_string()
            }
        );
        assert_eq!(
            instrument("const __trace = 0;\nexport default function f() {}").unwrap_err(),
            InstrumentError::ReservedName {
                name: "__trace".to_string()
            }
        );
        assert_eq!(
            instrument("export default function args() {}").unwrap_err(),
            InstrumentError::ReservedName {
                name: "args".to_string()
            }
        );
    }

    #[test]
    fn test_custom_names() {
        let source = "export default function f(x) { if (x) { x = 0; } }";
        let program = parse_program(source).unwrap();
        let options = InstrumentOptions {
            recorder_name: "record".to_string(),
            context_name: "ctx".to_string(),
            temp_prefix: "tmp".to_string(),
            test_sequencing: TestSequencing::Comma,
        };
        let out = Instrumenter::new(options)
            .instrument(program, source)
            .unwrap()
            .to_source();
        assert!(out.contains("function record(context, step)"));
        assert!(out.contains("let ctx;"));
        assert!(out.contains("  ctx = { steps: [], callCount: 0 };"));
        assert!(out.contains("if (record(ctx, { line: 1, context: { x: x } }), x) {"));
    }

    #[test]
    fn test_temporaries_avoid_user_names() {
        let instrumented =
            instrument("export default function f(_uid) { return _uid; }").unwrap();
        assert!(instrumented.to_source().contains("const _uid2 = _uid;"));
    }
}
