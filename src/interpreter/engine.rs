// Execution engine for the host runtime

use crate::interpreter::builtins;
use crate::interpreter::console::Console;
use crate::interpreter::errors::RuntimeError;
use crate::memory::{Closure, Environment, Value};
use crate::parser::ast::*;
use crate::parser::visit::HoistCollector;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::rc::Rc;

/// Bounds on a single call of the default export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionLimits {
    /// Statements executed before giving up
    pub max_steps: usize,
    /// Nested user-function calls before giving up
    pub max_call_depth: usize,
}

impl Default for ExecutionLimits {
    fn default() -> Self {
        Self {
            max_steps: 1_000_000,
            max_call_depth: 256,
        }
    }
}

/// How a statement finished
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ControlFlow {
    Normal,
    Break,
    Continue,
    Return(Value),
}

/// Tree-walking interpreter for the JavaScript subset
pub struct Interpreter {
    /// Module scope; holds the built-ins and top-level declarations
    global: Environment,

    /// Scope the current statement runs in
    pub(crate) env: Environment,

    /// Captured `console.log` output
    pub(crate) console: Console,

    limits: ExecutionLimits,

    /// Statements executed since the last entry call
    steps: usize,

    call_depth: usize,

    /// Location of the statement being executed
    pub(crate) current_location: SourceLocation,

    /// One shared copy of each function's tree, keyed by its node address.
    /// Keys point into `programs` or into the cached functions themselves.
    functions: FxHashMap<*const Function, Rc<Function>>,

    /// Loaded programs, kept alive for `functions`
    programs: Vec<Rc<Program>>,

    default_export: Option<Value>,
}

impl Interpreter {
    pub fn new(limits: ExecutionLimits) -> Self {
        let global = Environment::global();
        builtins::install_globals(&global);
        Interpreter {
            env: global.clone(),
            global,
            console: Console::new(),
            limits,
            steps: 0,
            call_depth: 0,
            current_location: SourceLocation::new(1, 1),
            functions: FxHashMap::default(),
            programs: Vec::new(),
            default_export: None,
        }
    }

    /// Run a program's top level: hoist its declarations, execute its
    /// statements in order and remember its default export.
    pub fn load(&mut self, program: Program) -> Result<(), RuntimeError> {
        let program = Rc::new(program);
        self.programs.push(Rc::clone(&program));
        self.env = self.global.clone();
        self.steps = 0;

        for item in &program.items {
            match item {
                ModuleItem::Stmt(stmt) => {
                    let stmts = std::slice::from_ref(stmt);
                    self.hoist_vars(stmts);
                    self.hoist_functions(stmts);
                }
                ModuleItem::ExportDefault {
                    declaration: ExportDefault::Function(function),
                    ..
                } => {
                    let closure = self.make_closure(function);
                    if let Some(name) = &function.name {
                        self.env.declare(name, closure.clone(), false);
                    }
                    self.default_export = Some(closure);
                }
                ModuleItem::ExportDefault { .. } => {}
            }
        }

        for item in &program.items {
            match item {
                ModuleItem::Stmt(stmt) => match self.execute_statement(stmt)? {
                    ControlFlow::Normal => {}
                    _ => {
                        return Err(RuntimeError::Unsupported {
                            message: "`return`, `break` or `continue` at the top level".to_string(),
                            location: self.current_location,
                        })
                    }
                },
                ModuleItem::ExportDefault {
                    declaration: ExportDefault::Expression(expr),
                    ..
                } => {
                    let value = self.evaluate_expr(expr)?;
                    self.default_export = Some(value);
                }
                ModuleItem::ExportDefault { .. } => {}
            }
        }

        tracing::debug!(steps = self.steps, "loaded program");
        Ok(())
    }

    /// Call the loaded program's default export with `args`
    pub fn call_default_export(&mut self, args: Vec<Value>) -> Result<Value, RuntimeError> {
        let entry = self
            .default_export
            .clone()
            .ok_or(RuntimeError::NoDefaultExport)?;
        self.steps = 0;
        self.call_depth = 0;
        self.env = self.global.clone();
        let location = self.current_location;
        let result = self.call_value(&entry, args, location);
        tracing::debug!(steps = self.steps, ok = result.is_ok(), "entry call finished");
        result
    }

    pub fn default_export(&self) -> Option<&Value> {
        self.default_export.as_ref()
    }

    pub fn global(&self) -> &Environment {
        &self.global
    }

    pub fn console(&self) -> &Console {
        &self.console
    }

    pub fn limits(&self) -> ExecutionLimits {
        self.limits
    }

    /// Statements executed by the last `load` or entry call
    pub fn steps_executed(&self) -> usize {
        self.steps
    }

    /// Count one executed statement against the step limit
    pub(crate) fn tick(&mut self, location: Option<SourceLocation>) -> Result<(), RuntimeError> {
        if let Some(location) = location {
            self.current_location = location;
        }
        self.steps += 1;
        if self.steps > self.limits.max_steps {
            return Err(RuntimeError::StepLimitExceeded {
                limit: self.limits.max_steps,
                location: self.current_location,
            });
        }
        Ok(())
    }

    /// Location of a node, falling back to the statement being executed
    pub(crate) fn location_of(&self, origin: &Origin) -> SourceLocation {
        origin.location().unwrap_or(self.current_location)
    }

    /// Run `f` with `env` as the current scope, restoring the previous scope afterwards
    pub(crate) fn with_env<T>(
        &mut self,
        env: Environment,
        f: impl FnOnce(&mut Self) -> Result<T, RuntimeError>,
    ) -> Result<T, RuntimeError> {
        let saved = std::mem::replace(&mut self.env, env);
        let result = f(self);
        self.env = saved;
        result
    }

    pub(crate) fn lookup(&self, name: &str, location: SourceLocation) -> Result<Value, RuntimeError> {
        self.env.get(name).ok_or_else(|| RuntimeError::ReferenceError {
            name: name.to_string(),
            location,
        })
    }

    /// Close over the current scope
    pub(crate) fn make_closure(&mut self, function: &Function) -> Value {
        let key = function as *const Function;
        let function = Rc::clone(
            self.functions
                .entry(key)
                .or_insert_with(|| Rc::new(function.clone())),
        );
        Value::Function(Rc::new(Closure {
            function,
            env: self.env.clone(),
        }))
    }

    /// Bind every `var` in `stmts` (outside nested functions) to `undefined`
    pub(crate) fn hoist_vars(&mut self, stmts: &[Stmt]) {
        let hoisted = HoistCollector::collect(stmts);
        let scope = self.env.var_scope();
        for name in hoisted.var_names {
            scope.hoist_var(name);
        }
    }

    /// Declare the function declarations directly in `stmts`
    pub(crate) fn hoist_functions(&mut self, stmts: &[Stmt]) {
        let hoisted = HoistCollector::collect(stmts);
        for function in hoisted.functions {
            if let Some(name) = &function.name {
                let closure = self.make_closure(function);
                self.env.declare(name, closure, false);
            }
        }
    }

    pub(crate) fn call_value(
        &mut self,
        callee: &Value,
        args: Vec<Value>,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        match callee {
            Value::Function(closure) => self.call_closure(Rc::clone(closure), args, location),
            Value::Native(native) => self.call_native(native, args, location),
            other => Err(RuntimeError::type_error(
                format!("{} is not a function", other.to_js_string()),
                location,
            )),
        }
    }

    fn call_closure(
        &mut self,
        closure: Rc<Closure>,
        args: Vec<Value>,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        if self.call_depth >= self.limits.max_call_depth {
            return Err(RuntimeError::CallDepthExceeded {
                limit: self.limits.max_call_depth,
                location,
            });
        }

        let scope = closure.env.function_scope();
        let mut args = args.into_iter();
        for param in &closure.function.params {
            let value = if param.rest {
                Value::array(args.by_ref().collect())
            } else {
                args.next().unwrap_or_default()
            };
            scope.declare(&param.name, value, false);
        }

        let function = Rc::clone(&closure.function);
        tracing::trace!(function = closure.name(), depth = self.call_depth + 1, "call");
        self.call_depth += 1;
        let result = self.with_env(scope, |this| this.run_function_body(&function));
        self.call_depth -= 1;
        result
    }

    fn run_function_body(&mut self, function: &Function) -> Result<Value, RuntimeError> {
        match &function.body {
            FunctionBody::Expression(expr) => self.evaluate_expr(expr),
            FunctionBody::Block(stmts) => {
                self.hoist_vars(stmts);
                self.hoist_functions(stmts);
                match self.execute_statements(stmts)? {
                    ControlFlow::Return(value) => Ok(value),
                    ControlFlow::Normal => Ok(Value::Undefined),
                    ControlFlow::Break | ControlFlow::Continue => Err(RuntimeError::Unsupported {
                        message: "`break` or `continue` outside of a loop".to_string(),
                        location: self.current_location,
                    }),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_program;

    fn run_with(source: &str, args: Vec<Value>, limits: ExecutionLimits) -> Result<Value, RuntimeError> {
        let mut interp = Interpreter::new(limits);
        interp.load(parse_program(source).unwrap())?;
        interp.call_default_export(args)
    }

    fn run(source: &str, args: Vec<Value>) -> Value {
        run_with(source, args, ExecutionLimits::default()).unwrap()
    }

    #[test]
    fn test_simple_return() {
        let value = run(
            "export default function f(a) { const b = a + 1; return b; }",
            vec![Value::Number(2.0)],
        );
        assert_eq!(value, Value::Number(3.0));
    }

    #[test]
    fn test_recursion_and_hoisting() {
        let source = "
export default function fact(n) {
  return helper(n);
  function helper(k) {
    if (k <= 1) return 1;
    return k * helper(k - 1);
  }
}";
        assert_eq!(run(source, vec![Value::Number(5.0)]), Value::Number(120.0));
    }

    #[test]
    fn test_var_hoisting_and_block_scope() {
        let source = "
export default function f() {
  var seen = typeof later;
  { let inner = 1; var later = inner + 1; }
  return seen + ':' + later + ':' + typeof inner;
}";
        assert_eq!(run(source, vec![]), Value::string("undefined:2:undefined"));
    }

    #[test]
    fn test_prelude_is_visible() {
        let source = "
const base = 10;
function twice(x) { return x * 2; }
export default function f(a) { return twice(a) + base; }";
        assert_eq!(run(source, vec![Value::Number(1.0)]), Value::Number(12.0));
    }

    #[test]
    fn test_rest_parameters_and_spread() {
        let source = "export default function f(...args) { return [0, ...args].length; }";
        assert_eq!(
            run(source, vec![Value::Number(1.0), Value::Number(2.0)]),
            Value::Number(3.0)
        );
    }

    #[test]
    fn test_closures_capture_per_iteration_bindings() {
        let source = "
export default function f() {
  const fns = [];
  for (let i = 0; i < 3; i++) { fns.push(() => i); }
  return fns[0]() + fns[1]() + fns[2]();
}";
        assert_eq!(run(source, vec![]), Value::Number(3.0));
    }

    #[test]
    fn test_const_assignment_fails() {
        let err = run_with(
            "export default function f() {\n  const a = 1;\n  a = 2;\n}",
            vec![],
            ExecutionLimits::default(),
        )
        .unwrap_err();
        assert!(matches!(err, RuntimeError::ConstAssignment { ref name, .. } if name == "a"));
        assert_eq!(err.location().map(|l| l.line), Some(3));
    }

    #[test]
    fn test_reference_error() {
        let err = run_with(
            "export default function f() { return missing; }",
            vec![],
            ExecutionLimits::default(),
        )
        .unwrap_err();
        assert!(matches!(err, RuntimeError::ReferenceError { ref name, .. } if name == "missing"));
    }

    #[test]
    fn test_step_limit() {
        let limits = ExecutionLimits {
            max_steps: 100,
            ..ExecutionLimits::default()
        };
        let err = run_with("export default function f() { while (true) {} }", vec![], limits)
            .unwrap_err();
        assert!(matches!(err, RuntimeError::StepLimitExceeded { limit: 100, .. }));
    }

    #[test]
    fn test_call_depth_limit() {
        let limits = ExecutionLimits {
            max_call_depth: 8,
            ..ExecutionLimits::default()
        };
        let err = run_with("export default function f(n) { return f(n + 1); }", vec![Value::Number(0.0)], limits)
            .unwrap_err();
        assert!(matches!(err, RuntimeError::CallDepthExceeded { limit: 8, .. }));
    }

    #[test]
    fn test_missing_default_export() {
        let mut interp = Interpreter::new(ExecutionLimits::default());
        interp.load(parse_program("const a = 1;").unwrap()).unwrap();
        assert_eq!(interp.call_default_export(vec![]), Err(RuntimeError::NoDefaultExport));
    }

    #[test]
    fn test_default_export_expression() {
        let mut interp = Interpreter::new(ExecutionLimits::default());
        interp
            .load(parse_program("export default (a, b) => a * b;").unwrap())
            .unwrap();
        let value = interp
            .call_default_export(vec![Value::Number(6.0), Value::Number(7.0)])
            .unwrap();
        assert_eq!(value, Value::Number(42.0));
    }
}
