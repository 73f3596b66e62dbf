//! Lexical environments
//!
//! An [`Environment`] is a handle to one [`Scope`] in a chain of scopes:
//! - function scopes hold parameters, `var` bindings and function declarations
//! - block scopes hold `let` and `const` bindings
//!
//! Closures keep the environment they were created in alive, so a scope
//! outlives the call that created it whenever a function captured it.
//!
//! Unlike the tracer's binding list, scopes do shrink: leaving a block drops
//! its scope, and its `let`/`const` names stop resolving.

use super::value::Value;
use crate::parser::ast::VarKind;
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::rc::Rc;

/// A single binding
#[derive(Debug, Clone)]
pub struct Binding {
    pub value: Value,
    pub is_const: bool,
}

/// Why an assignment to a name failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignFailure {
    Undeclared,
    Const,
}

#[derive(Debug)]
pub struct Scope {
    vars: FxHashMap<String, Binding>,
    parent: Option<Environment>,
    is_function: bool,
}

/// Shared handle to a scope
#[derive(Debug, Clone)]
pub struct Environment(Rc<RefCell<Scope>>);

impl Environment {
    /// The outermost scope; acts as a function scope for top-level `var`
    pub fn global() -> Self {
        Self::with_parent(None, true)
    }

    fn with_parent(parent: Option<Environment>, is_function: bool) -> Self {
        Environment(Rc::new(RefCell::new(Scope {
            vars: FxHashMap::default(),
            parent,
            is_function,
        })))
    }

    /// New scope for a function call
    pub fn function_scope(&self) -> Self {
        Self::with_parent(Some(self.clone()), true)
    }

    /// New scope for a block or a `for` header
    pub fn block_scope(&self) -> Self {
        Self::with_parent(Some(self.clone()), false)
    }

    /// Declare `name` in this scope, replacing any binding it already has
    pub fn declare(&self, name: &str, value: Value, is_const: bool) {
        self.0
            .borrow_mut()
            .vars
            .insert(name.to_string(), Binding { value, is_const });
    }

    /// Declare according to `kind`: `var` goes to the nearest function scope
    pub fn declare_kind(&self, kind: VarKind, name: &str, value: Value) {
        match kind {
            VarKind::Var => self.var_scope().declare(name, value, false),
            VarKind::Let => self.declare(name, value, false),
            VarKind::Const => self.declare(name, value, true),
        }
    }

    /// Hoist a `var` name: bind it to `undefined` unless already bound here
    pub fn hoist_var(&self, name: &str) {
        let mut scope = self.0.borrow_mut();
        if !scope.vars.contains_key(name) {
            scope.vars.insert(
                name.to_string(),
                Binding {
                    value: Value::Undefined,
                    is_const: false,
                },
            );
        }
    }

    /// The nearest enclosing function scope (possibly this one)
    pub fn var_scope(&self) -> Environment {
        let mut current = self.clone();
        loop {
            let parent = {
                let scope = current.0.borrow();
                if scope.is_function {
                    None
                } else {
                    scope.parent.clone()
                }
            };
            match parent {
                Some(parent) => current = parent,
                None => return current,
            }
        }
    }

    /// Resolve `name` through the scope chain
    pub fn get(&self, name: &str) -> Option<Value> {
        let mut current = self.clone();
        loop {
            let parent = {
                let scope = current.0.borrow();
                if let Some(binding) = scope.vars.get(name) {
                    return Some(binding.value.clone());
                }
                scope.parent.clone()
            };
            current = parent?;
        }
    }

    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Assign to an existing binding through the scope chain
    pub fn set(&self, name: &str, value: Value) -> Result<(), AssignFailure> {
        let mut current = self.clone();
        loop {
            let parent = {
                let mut scope = current.0.borrow_mut();
                if let Some(binding) = scope.vars.get_mut(name) {
                    if binding.is_const {
                        return Err(AssignFailure::Const);
                    }
                    binding.value = value;
                    return Ok(());
                }
                scope.parent.clone()
            };
            match parent {
                Some(parent) => current = parent,
                None => return Err(AssignFailure::Undeclared),
            }
        }
    }

    /// Names bound directly in this scope, sorted (for display)
    pub fn local_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.0.borrow().vars.keys().cloned().collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_scope_shadowing() {
        let global = Environment::global();
        global.declare("x", Value::Number(1.0), false);
        let block = global.block_scope();
        block.declare_kind(VarKind::Let, "x", Value::Number(2.0));
        assert_eq!(block.get("x"), Some(Value::Number(2.0)));
        assert_eq!(global.get("x"), Some(Value::Number(1.0)));
    }

    #[test]
    fn test_var_goes_to_function_scope() {
        let function = Environment::global().function_scope();
        let block = function.block_scope().block_scope();
        block.declare_kind(VarKind::Var, "v", Value::Bool(true));
        block.declare_kind(VarKind::Let, "l", Value::Bool(true));
        assert!(function.has("v"));
        assert!(!function.has("l"));
        assert!(block.has("l"));
    }

    #[test]
    fn test_set_respects_const() {
        let env = Environment::global();
        env.declare_kind(VarKind::Const, "c", Value::Number(1.0));
        assert_eq!(env.set("c", Value::Number(2.0)), Err(AssignFailure::Const));
        assert_eq!(env.set("missing", Value::Null), Err(AssignFailure::Undeclared));
    }

    #[test]
    fn test_hoist_keeps_existing_value() {
        let env = Environment::global();
        env.declare("a", Value::Number(5.0), false);
        env.hoist_var("a");
        env.hoist_var("b");
        assert_eq!(env.get("a"), Some(Value::Number(5.0)));
        assert_eq!(env.get("b"), Some(Value::Undefined));
    }
}
