//! Statement and expression rewrite rules
//!
//! One pre-order pass over a function body in source order. Each statement
//! is matched against a closed set of rules and its replacement is pushed to
//! an output list, so statements inserted by a rule are never visited again.
//!
//! | Node | Rewrite |
//! |------|---------|
//! | `let a = x;` | record `a`, then `let a = x; trace;` |
//! | `a = x;` (any assignment operator) | `a = x; trace;` |
//! | `return x;` | `const _uid = x; trace(returnValue: _uid); return _uid;` |
//! | `if (T)` / `while (T)` / `do … while (T)` / `for (…; T; …)` | `trace \|\| T` or `(trace, T)` |
//! | `for (…; …; a = a + 1)` | `(a = a + 1, trace)` |
//!
//! The pass also follows the lexical blocks it walks through. A tracked
//! `let`/`const` name whose block has been left, or whose declaration in
//! the current block has not been reached yet, is reported as `undefined`
//! instead of being read, since reading it there would throw.
//!
//! Only [`Origin::Source`] statements are rewritten. A rewritten statement is
//! re-tagged [`Origin::Instrumented`]; instrumented and synthesized
//! statements are passed through without being descended into, which makes a
//! second pass over the output a no-op. Nested functions are left alone.

use super::bindings::BindingTracker;
use super::synth;
use super::trace_call::{ContextEntry, StepSpec, TraceCallSynthesizer};
use super::uid::UidGenerator;
use super::TestSequencing;
use crate::parser::ast::*;
use rustc_hash::FxHashSet;

/// Counts of rule applications during one pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RewriteStats {
    pub declarations: usize,
    pub assignments: usize,
    pub returns: usize,
    pub tests: usize,
    pub updates: usize,
    pub skipped: usize,
}

impl RewriteStats {
    pub fn total(&self) -> usize {
        self.declarations + self.assignments + self.returns + self.tests + self.updates
    }
}

/// `let`/`const` names of one block, split at the current point of the pass
#[derive(Debug, Default)]
struct BlockScope {
    /// Declared further down in the block, still uninitialized here
    pending: FxHashSet<String>,
    declared: FxHashSet<String>,
}

impl BlockScope {
    fn for_statements(stmts: &[Stmt]) -> Self {
        let pending = stmts
            .iter()
            .filter_map(|stmt| match stmt {
                Stmt::VarDecl {
                    kind, declarators, ..
                } if *kind != VarKind::Var => Some(declarators),
                _ => None,
            })
            .flatten()
            .map(|declarator| declarator.name.clone())
            .collect();
        Self {
            pending,
            declared: FxHashSet::default(),
        }
    }

    fn declare(&mut self, name: &str) {
        self.pending.remove(name);
        self.declared.insert(name.to_string());
    }
}

pub struct Rewriter {
    bindings: BindingTracker,
    calls: TraceCallSynthesizer,
    uids: UidGenerator,
    sequencing: TestSequencing,
    /// Innermost last; the first entry is the function body
    scopes: Vec<BlockScope>,
    /// Parameters and `var` names, readable anywhere in the function
    function_scoped: FxHashSet<String>,
    stats: RewriteStats,
}

impl Rewriter {
    pub fn new(
        bindings: BindingTracker,
        calls: TraceCallSynthesizer,
        uids: UidGenerator,
        sequencing: TestSequencing,
    ) -> Self {
        let function_scoped = bindings.names().map(str::to_string).collect();
        Self {
            bindings,
            calls,
            uids,
            sequencing,
            scopes: Vec::new(),
            function_scoped,
            stats: RewriteStats::default(),
        }
    }

    pub fn stats(&self) -> RewriteStats {
        self.stats
    }

    pub fn bindings(&self) -> &BindingTracker {
        &self.bindings
    }

    /// Rewrite the statements of a function body or block
    pub fn rewrite_body(&mut self, stmts: Vec<Stmt>) -> Vec<Stmt> {
        self.scopes.push(BlockScope::for_statements(&stmts));
        let mut out = Vec::with_capacity(stmts.len() * 2);
        for stmt in stmts {
            self.rewrite_into(stmt, &mut out);
        }
        self.scopes.pop();
        out
    }

    /// Rewrite one statement, pushing its replacement(s) to `out`
    fn rewrite_into(&mut self, stmt: Stmt, out: &mut Vec<Stmt>) {
        let origin = *stmt.origin();
        let Origin::Source(loc) = origin else {
            self.stats.skipped += 1;
            out.push(stmt);
            return;
        };
        let origin = origin.instrumented();

        match stmt {
            Stmt::VarDecl {
                kind, declarators, ..
            } => {
                self.declare(kind, &declarators);
                tracing::trace!(line = loc.line, count = declarators.len(), "declaration rule");
                self.stats.declarations += 1;

                out.push(Stmt::VarDecl {
                    kind,
                    declarators,
                    origin,
                });
                out.push(self.step(loc.line));
            }

            Stmt::Expression { expr, .. } if expr.is_assignment() => {
                let line = expr.origin().line().unwrap_or(loc.line);
                tracing::trace!(line, "assignment rule");
                self.stats.assignments += 1;

                out.push(Stmt::Expression { expr, origin });
                out.push(self.step(line));
            }

            Stmt::Return { argument, .. } => {
                let uid = self.uids.next_uid();
                tracing::trace!(line = loc.line, temp = %uid, "return rule");
                self.stats.returns += 1;

                out.push(synth::const_decl(
                    &uid,
                    argument.unwrap_or_else(synth::undefined),
                ));
                let step = StepSpec::new(loc.line, self.context()).returning(synth::ident(&uid));
                out.push(self.calls.statement(step));
                out.push(synth::return_stmt(synth::ident(&uid)));
            }

            Stmt::If {
                test,
                consequent,
                alternate,
                ..
            } => {
                let test = self.instrument_test(test, loc.line);
                let consequent = Box::new(self.rewrite_nested(*consequent));
                let alternate = alternate.map(|alt| Box::new(self.rewrite_nested(*alt)));
                out.push(Stmt::If {
                    test,
                    consequent,
                    alternate,
                    origin,
                });
            }

            Stmt::While { test, body, .. } => {
                let test = self.instrument_test(test, loc.line);
                let body = Box::new(self.rewrite_nested(*body));
                out.push(Stmt::While { test, body, origin });
            }

            Stmt::DoWhile { body, test, .. } => {
                // Source order: the body precedes the test
                let body = Box::new(self.rewrite_nested(*body));
                let test = self.instrument_test(test, loc.line);
                out.push(Stmt::DoWhile { body, test, origin });
            }

            Stmt::For {
                init,
                test,
                update,
                body,
                ..
            } => {
                // The header's `let` names are scoped to the whole loop
                self.scopes.push(BlockScope::default());
                let init = init.map(|init| Box::new(self.register_for_init(*init)));
                let test = test.map(|test| self.instrument_test(test, loc.line));
                let update = update.map(|update| self.instrument_update(update, loc.line));
                let body = Box::new(self.rewrite_nested(*body));
                self.scopes.pop();
                out.push(Stmt::For {
                    init,
                    test,
                    update,
                    body,
                    origin,
                });
            }

            Stmt::Block { body, .. } => {
                let body = self.rewrite_body(body);
                out.push(Stmt::Block { body, origin });
            }

            // Calls, updates, nested functions, jumps: nothing to record
            other => out.push(other),
        }
    }

    /// Rewrite a statement sitting in a single-statement position (an `if`
    /// branch or a loop body). An expansion into several statements gets a
    /// synthesized block around it.
    fn rewrite_nested(&mut self, stmt: Stmt) -> Stmt {
        self.scopes.push(BlockScope::default());
        let mut out = Vec::with_capacity(3);
        self.rewrite_into(stmt, &mut out);
        self.scopes.pop();

        if out.len() == 1 {
            if let Some(single) = out.pop() {
                return single;
            }
        }
        synth::block(out)
    }

    /// A `for` initializer declaration registers its names; there is no
    /// statement position after it for a step.
    fn register_for_init(&mut self, init: Stmt) -> Stmt {
        match init {
            Stmt::VarDecl {
                kind,
                declarators,
                origin: Origin::Source(loc),
            } => {
                self.declare(kind, &declarators);
                Stmt::VarDecl {
                    kind,
                    declarators,
                    origin: Origin::Instrumented(loc),
                }
            }
            other => other,
        }
    }

    /// `T` → `trace || T` (or `(trace, T)`): the recorder runs first, then
    /// the test produces its own value.
    fn instrument_test(&mut self, test: Expr, fallback_line: usize) -> Expr {
        let line = test.origin().line().unwrap_or(fallback_line);
        tracing::trace!(line, "test rule");
        self.stats.tests += 1;

        let call = self.calls.build(StepSpec::new(line, self.context()));
        match self.sequencing {
            TestSequencing::LogicalOr => synth::logical_or(call, test),
            TestSequencing::Comma => synth::sequence(vec![call, test]),
        }
    }

    /// An assignment update records a step after it runs
    fn instrument_update(&mut self, update: Expr, fallback_line: usize) -> Expr {
        if !update.is_assignment() {
            return update;
        }
        let line = update.origin().line().unwrap_or(fallback_line);
        tracing::trace!(line, "update rule");
        self.stats.updates += 1;

        let call = self.calls.build(StepSpec::new(line, self.context()));
        synth::sequence(vec![update, call])
    }

    fn step(&self, line: usize) -> Stmt {
        self.calls.statement(StepSpec::new(line, self.context()))
    }

    /// Track the declared names and make them readable from here on
    fn declare(&mut self, kind: VarKind, declarators: &[Declarator]) {
        for declarator in declarators {
            let name = declarator.name.as_str();
            self.bindings.record(name);
            match (kind, self.scopes.last_mut()) {
                (VarKind::Var, _) | (_, None) => {
                    self.function_scoped.insert(name.to_string());
                }
                (_, Some(scope)) => scope.declare(name),
            }
        }
    }

    /// Whether `name` can be read at the current point without throwing.
    /// The innermost block that declares the name decides.
    fn in_scope(&self, name: &str) -> bool {
        for scope in self.scopes.iter().rev() {
            if scope.declared.contains(name) {
                return true;
            }
            if scope.pending.contains(name) {
                return false;
            }
        }
        self.function_scoped.contains(name)
    }

    /// The tracker's snapshot as seen from the current point
    fn context(&self) -> Vec<ContextEntry<'_>> {
        self.bindings
            .snapshot()
            .iter()
            .map(|name| ContextEntry {
                name: name.as_str(),
                in_scope: self.in_scope(name),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::print_statements;
    use crate::parser::parse_program;
    use pretty_assertions::assert_eq;
    use rustc_hash::FxHashSet;

    fn body(source: &str) -> (Vec<String>, Vec<Stmt>) {
        let program = parse_program(source).unwrap();
        match program.items.into_iter().next() {
            Some(ModuleItem::ExportDefault {
                declaration: ExportDefault::Function(f),
                ..
            }) => {
                let params = f.param_names();
                match f.body {
                    FunctionBody::Block(stmts) => (params, stmts),
                    FunctionBody::Expression(_) => unreachable!(),
                }
            }
            other => panic!("Expected function export, got {:?}", other),
        }
    }

    fn rewriter(params: &[String], sequencing: TestSequencing) -> Rewriter {
        Rewriter::new(
            BindingTracker::with_params(params.iter().cloned()),
            TraceCallSynthesizer::new("__trace", "__context"),
            UidGenerator::new("uid", FxHashSet::default()),
            sequencing,
        )
    }

    fn rewrite(source: &str, sequencing: TestSequencing) -> (String, RewriteStats) {
        let (params, stmts) = body(source);
        let mut rewriter = rewriter(&params, sequencing);
        let out = rewriter.rewrite_body(stmts);
        (print_statements(&out), rewriter.stats())
    }

    #[test]
    fn test_declaration_then_return() {
        let (code, stats) = rewrite(
            "export default function f(a) {\n  const b = a + 1;\n  return b;\n}",
            TestSequencing::LogicalOr,
        );
        assert_eq!(
            code,
            "const b = a + 1;\n\
             __trace(__context, { line: 2, context: { a: a, b: b } });\n\
             const _uid = b;\n\
             __trace(__context, { line: 3, context: { a: a, b: b }, returnValue: _uid });\n\
             return _uid;\n"
        );
        assert_eq!(stats.declarations, 1);
        assert_eq!(stats.returns, 1);
    }

    #[test]
    fn test_if_test_and_single_statement_return() {
        let (code, _) = rewrite(
            "export default function f(x) {\n  if (x > 0) return 1;\n  return 0;\n}",
            TestSequencing::LogicalOr,
        );
        assert_eq!(
            code,
            "if (__trace(__context, { line: 2, context: { x: x } }) || x > 0) {\n\
             \x20 const _uid = 1;\n\
             \x20 __trace(__context, { line: 2, context: { x: x }, returnValue: _uid });\n\
             \x20 return _uid;\n\
             }\n\
             const _uid2 = 0;\n\
             __trace(__context, { line: 3, context: { x: x }, returnValue: _uid2 });\n\
             return _uid2;\n"
        );
    }

    #[test]
    fn test_comma_sequencing() {
        let (code, stats) = rewrite(
            "export default function f(n) {\n  while (n > 0) {\n    n -= 1;\n  }\n}",
            TestSequencing::Comma,
        );
        assert_eq!(
            code,
            "while (__trace(__context, { line: 2, context: { n: n } }), n > 0) {\n\
             \x20 n -= 1;\n\
             \x20 __trace(__context, { line: 3, context: { n: n } });\n\
             }\n"
        );
        assert_eq!(stats.tests, 1);
        assert_eq!(stats.assignments, 1);
    }

    #[test]
    fn test_for_header() {
        let (code, stats) = rewrite(
            "export default function f() {\n  for (let i = 0; i < 2; i = i + 1) {}\n}",
            TestSequencing::LogicalOr,
        );
        assert_eq!(
            code,
            "for (let i = 0; __trace(__context, { line: 2, context: { i: i } }) || i < 2; i = i + 1, __trace(__context, { line: 2, context: { i: i } })) {}\n"
        );
        assert_eq!(stats.updates, 1);
        assert_eq!(stats.declarations, 0);
    }

    #[test]
    fn test_postfix_update_records_nothing() {
        let (code, stats) = rewrite(
            "export default function f() {\n  var i = 0;\n  i++;\n}",
            TestSequencing::LogicalOr,
        );
        assert_eq!(
            code,
            "var i = 0;\n__trace(__context, { line: 2, context: { i: i } });\ni++;\n"
        );
        assert_eq!(stats.total(), 1);
    }

    #[test]
    fn test_nested_functions_untouched() {
        let (code, stats) = rewrite(
            "export default function f() {\n  function g(y) {\n    let z = y;\n    return z;\n  }\n}",
            TestSequencing::LogicalOr,
        );
        assert_eq!(code, "function g(y) {\n  let z = y;\n  return z;\n}\n");
        assert_eq!(stats.total(), 0);
    }

    #[test]
    fn test_var_in_exited_block_stays_tracked() {
        let (params, stmts) = body(
            "export default function f() {\n  if (true) {\n    var inner = 1;\n  }\n  let after = 2;\n}",
        );
        let mut rewriter = rewriter(&params, TestSequencing::LogicalOr);
        let out = rewriter.rewrite_body(stmts);
        let names: Vec<&str> = rewriter.bindings().names().collect();
        assert_eq!(names, vec!["inner", "after"]);
        assert!(print_statements(&out)
            .contains("__trace(__context, { line: 5, context: { inner: inner, after: after } });"));
    }

    #[test]
    fn test_names_outside_their_block_are_not_read() {
        let (code, _) = rewrite(
            "export default function f() {\n  for (let i = 0; i < 2; i = i + 1) {\n    let sq = i * i;\n  }\n  var done = 1;\n}",
            TestSequencing::LogicalOr,
        );
        assert!(code.contains("__trace(__context, { line: 3, context: { i: i, sq: sq } });"));
        assert!(code.contains(
            "__trace(__context, { line: 5, context: { i: undefined, sq: undefined, done: done } });"
        ));
    }

    #[test]
    fn test_uninitialized_shadow_is_not_read() {
        let (code, _) = rewrite(
            "export default function f() {\n  let u = 0;\n  let t = 1;\n  {\n    u = 2;\n    let t = 3;\n  }\n  return t;\n}",
            TestSequencing::LogicalOr,
        );
        // Inside the block `t` names the inner binding, which is not
        // initialized until line 6
        assert!(code.contains("__trace(__context, { line: 5, context: { u: u, t: undefined } });"));
        assert!(code.contains("__trace(__context, { line: 6, context: { u: u, t: t } });"));
        assert!(code.contains("__trace(__context, { line: 8, context: { u: u, t: t }, returnValue: _uid });"));
    }

    #[test]
    fn test_second_pass_is_noop() {
        let (params, stmts) = body(
            "export default function f(a) {\n  let s = 0;\n  for (let i = 0; i < a; i = i + 1) {\n    if (i % 2 === 0) s += i;\n  }\n  do { s--; } while (s > 10);\n  return s;\n}",
        );
        let mut first = rewriter(&params, TestSequencing::LogicalOr);
        let once = first.rewrite_body(stmts);

        let mut second = rewriter(&params, TestSequencing::LogicalOr);
        let twice = second.rewrite_body(once.clone());
        assert_eq!(twice, once);
        assert_eq!(second.stats().total(), 0);
    }
}
