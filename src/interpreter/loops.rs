//! Loop statement execution (`while`, `do-while`, `for`).
//!
//! Adds `impl Interpreter` methods for the three loop forms of the subset.
//! `break` and `continue` are reported through `LoopBodyResult` so the loop
//! driver can react without inspecting the body's control flow itself.
//!
//! A `return` inside a loop body yields `LoopBodyResult::Exit`, which makes
//! the loop unwind immediately and hand the control flow to its caller.

use crate::interpreter::engine::{ControlFlow, Interpreter};
use crate::interpreter::errors::RuntimeError;
use crate::memory::Environment;
use crate::parser::ast::{Expr, Stmt, VarKind};

/// Result returned by [`Interpreter::execute_loop_body`] to signal how the body ended.
pub(crate) enum LoopBodyResult {
    /// Body completed normally or via `continue`, the loop should iterate again.
    Continue,
    /// `break` was encountered, the loop should exit cleanly.
    Break,
    /// `return` was executed; the loop unwinds and passes it on.
    Exit(ControlFlow),
}

impl Interpreter {
    pub(crate) fn execute_loop_body(&mut self, body: &Stmt) -> Result<LoopBodyResult, RuntimeError> {
        match self.execute_statement(body)? {
            ControlFlow::Normal | ControlFlow::Continue => Ok(LoopBodyResult::Continue),
            ControlFlow::Break => Ok(LoopBodyResult::Break),
            flow @ ControlFlow::Return(_) => Ok(LoopBodyResult::Exit(flow)),
        }
    }

    /// Executes a `while (test) body` loop.
    pub(crate) fn execute_while(&mut self, test: &Expr, body: &Stmt) -> Result<ControlFlow, RuntimeError> {
        loop {
            if !self.evaluate_expr(test)?.truthy() {
                break;
            }
            match self.execute_loop_body(body)? {
                LoopBodyResult::Exit(flow) => return Ok(flow),
                LoopBodyResult::Break => break,
                LoopBodyResult::Continue => {}
            }
        }
        Ok(ControlFlow::Normal)
    }

    /// Executes a `do body while (test)` loop.
    ///
    /// The body always runs at least once; the test is checked after each
    /// iteration.
    pub(crate) fn execute_do_while(&mut self, body: &Stmt, test: &Expr) -> Result<ControlFlow, RuntimeError> {
        loop {
            match self.execute_loop_body(body)? {
                LoopBodyResult::Exit(flow) => return Ok(flow),
                LoopBodyResult::Break => break,
                LoopBodyResult::Continue => {}
            }
            if !self.evaluate_expr(test)?.truthy() {
                break;
            }
        }
        Ok(ControlFlow::Normal)
    }

    /// Executes a `for (init; test; update) body` loop.
    ///
    /// All three header parts are optional; a missing test is always true.
    /// The header gets its own scope. `let` loop variables are copied into a
    /// fresh scope before every update, so closures created in the body see
    /// the value of their own iteration.
    pub(crate) fn execute_for(
        &mut self,
        init: Option<&Stmt>,
        test: Option<&Expr>,
        update: Option<&Expr>,
        body: &Stmt,
    ) -> Result<ControlFlow, RuntimeError> {
        let outer = self.env.clone();
        let per_iteration: Vec<&str> = match init {
            Some(Stmt::VarDecl {
                kind: VarKind::Let,
                declarators,
                ..
            }) => declarators.iter().map(|d| d.name.as_str()).collect(),
            _ => Vec::new(),
        };

        self.with_env(outer.block_scope(), |this| {
            if let Some(init) = init {
                this.execute_statement(init)?;
            }
            loop {
                if let Some(test) = test {
                    if !this.evaluate_expr(test)?.truthy() {
                        break;
                    }
                }
                match this.execute_loop_body(body)? {
                    LoopBodyResult::Exit(flow) => return Ok(flow),
                    LoopBodyResult::Break => break,
                    LoopBodyResult::Continue => {}
                }
                if !per_iteration.is_empty() {
                    this.env = this.next_iteration_scope(&outer, &per_iteration);
                }
                if let Some(update) = update {
                    this.evaluate_expr(update)?;
                }
            }
            Ok(ControlFlow::Normal)
        })
    }

    fn next_iteration_scope(&self, outer: &Environment, names: &[&str]) -> Environment {
        let next = outer.block_scope();
        for name in names {
            next.declare(name, self.env.get(name).unwrap_or_default(), false);
        }
        next
    }
}

#[cfg(test)]
mod tests {
    use crate::interpreter::{ExecutionLimits, Interpreter};
    use crate::memory::Value;
    use crate::parser::parse_program;

    fn run(source: &str) -> Value {
        let mut interp = Interpreter::new(ExecutionLimits::default());
        interp.load(parse_program(source).unwrap()).unwrap();
        interp.call_default_export(Vec::new()).unwrap()
    }

    #[test]
    fn test_while_with_break_and_continue() {
        let source = "
export default function f() {
  let i = 0, sum = 0;
  while (true) {
    i++;
    if (i > 10) break;
    if (i % 2 === 0) continue;
    sum += i;
  }
  return sum;
}";
        assert_eq!(run(source), Value::Number(25.0));
    }

    #[test]
    fn test_do_while_runs_once() {
        let source = "export default function f() { let n = 0; do { n++; } while (false); return n; }";
        assert_eq!(run(source), Value::Number(1.0));
    }

    #[test]
    fn test_for_return_inside_body() {
        let source = "
export default function f() {
  for (let i = 0; i < 10; i++) {
    if (i * i > 20) return i;
  }
  return -1;
}";
        assert_eq!(run(source), Value::Number(5.0));
    }

    #[test]
    fn test_for_let_is_scoped_to_loop() {
        let source = "
export default function f() {
  for (let i = 0; i < 2; i++) {}
  return typeof i;
}";
        assert_eq!(run(source), Value::string("undefined"));
    }

    #[test]
    fn test_for_var_survives_loop() {
        let source = "export default function f() { for (var i = 0; i < 4; i++); return i; }";
        assert_eq!(run(source), Value::Number(4.0));
    }
}
