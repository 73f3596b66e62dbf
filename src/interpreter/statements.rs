//! Statement execution implementation
//!
//! This module handles the execution of all statement types:
//!
//! - Variable declarations (`var`, `let`, `const`)
//! - Control flow (`if`/`else`; loops live in [`super::loops`])
//! - Returns, `break` and `continue`
//! - Blocks, which open a block scope
//!
//! Every statement executed counts once against the step limit.
//!
//! # Control Flow
//!
//! Statements return a [`ControlFlow`]; anything other than
//! [`ControlFlow::Normal`] stops the enclosing statement list and unwinds to
//! the loop or function that handles it.

use crate::interpreter::engine::{ControlFlow, Interpreter};
use crate::interpreter::errors::RuntimeError;
use crate::memory::Value;
use crate::parser::ast::*;

impl Interpreter {
    /// Execute `stmts` in order until one does not complete normally
    pub(crate) fn execute_statements(&mut self, stmts: &[Stmt]) -> Result<ControlFlow, RuntimeError> {
        for stmt in stmts {
            let flow = self.execute_statement(stmt)?;
            if !matches!(flow, ControlFlow::Normal) {
                return Ok(flow);
            }
        }
        Ok(ControlFlow::Normal)
    }

    pub(crate) fn execute_statement(&mut self, stmt: &Stmt) -> Result<ControlFlow, RuntimeError> {
        self.tick(stmt.location())?;

        match stmt {
            Stmt::VarDecl {
                kind, declarators, ..
            } => {
                self.execute_var_decl(*kind, declarators)?;
                Ok(ControlFlow::Normal)
            }

            // Declared when the enclosing body or block was entered
            Stmt::FunctionDecl { .. } => Ok(ControlFlow::Normal),

            Stmt::Expression { expr, .. } => {
                self.evaluate_expr(expr)?;
                Ok(ControlFlow::Normal)
            }

            Stmt::Return { argument, .. } => {
                let value = match argument {
                    Some(argument) => self.evaluate_expr(argument)?,
                    None => Value::Undefined,
                };
                Ok(ControlFlow::Return(value))
            }

            Stmt::If {
                test,
                consequent,
                alternate,
                ..
            } => {
                if self.evaluate_expr(test)?.truthy() {
                    self.execute_statement(consequent)
                } else if let Some(alternate) = alternate {
                    self.execute_statement(alternate)
                } else {
                    Ok(ControlFlow::Normal)
                }
            }

            Stmt::While { test, body, .. } => self.execute_while(test, body),

            Stmt::DoWhile { body, test, .. } => self.execute_do_while(body, test),

            Stmt::For {
                init,
                test,
                update,
                body,
                ..
            } => self.execute_for(init.as_deref(), test.as_ref(), update.as_ref(), body),

            Stmt::Block { body, .. } => self.execute_block(body),

            Stmt::Break { .. } => Ok(ControlFlow::Break),
            Stmt::Continue { .. } => Ok(ControlFlow::Continue),
            Stmt::Empty { .. } => Ok(ControlFlow::Normal),
        }
    }

    /// Run a block body in a fresh block scope
    pub(crate) fn execute_block(&mut self, body: &[Stmt]) -> Result<ControlFlow, RuntimeError> {
        let scope = self.env.block_scope();
        self.with_env(scope, |this| {
            this.hoist_functions(body);
            this.execute_statements(body)
        })
    }

    pub(crate) fn execute_var_decl(
        &mut self,
        kind: VarKind,
        declarators: &[Declarator],
    ) -> Result<(), RuntimeError> {
        for declarator in declarators {
            let value = match &declarator.init {
                Some(init) => self.evaluate_expr(init)?,
                // `var x;` keeps whatever x already holds
                None if kind == VarKind::Var => continue,
                None => Value::Undefined,
            };
            self.env.declare_kind(kind, &declarator.name, value);
        }
        Ok(())
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
    fn test_if_else_chain() {
        let source = "
export default function f() {
  const x = 5;
  if (x < 3) return 'small';
  else if (x < 10) return 'medium';
  else return 'large';
}";
        assert_eq!(run(source), Value::string("medium"));
    }

    #[test]
    fn test_var_redeclaration_keeps_value() {
        let source = "export default function f() { var a = 1; var a; return a; }";
        assert_eq!(run(source), Value::Number(1.0));
    }

    #[test]
    fn test_missing_return_is_undefined() {
        assert_eq!(run("export default function f() { let a = 1; }"), Value::Undefined);
    }

    #[test]
    fn test_block_function_declaration() {
        let source = "
export default function f() {
  {
    return g();
    function g() { return 7; }
  }
}";
        assert_eq!(run(source), Value::Number(7.0));
    }
}
