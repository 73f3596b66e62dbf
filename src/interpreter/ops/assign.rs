//! Assignment and update operators
//!
//! Both resolve their target to a [`Place`] once, so `o[f()] += 1` calls `f`
//! a single time, then read, combine and write back.

use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::RuntimeError;
use crate::interpreter::ops::binary::binary_op;
use crate::memory::{AssignFailure, Value};
use crate::parser::ast::*;

/// Where an assignment writes
enum Place {
    Binding(String),
    Property { object: Value, key: String },
}

impl Interpreter {
    fn resolve_place(&mut self, target: &Expr, location: SourceLocation) -> Result<Place, RuntimeError> {
        match target {
            Expr::Identifier(name, _) => Ok(Place::Binding(name.clone())),
            Expr::Member {
                object, property, ..
            } => {
                let object = self.evaluate_expr(object)?;
                let key = self.property_key(property)?;
                Ok(Place::Property { object, key })
            }
            _ => Err(RuntimeError::Unsupported {
                message: "invalid assignment target".to_string(),
                location,
            }),
        }
    }

    fn read_place(&mut self, place: &Place, location: SourceLocation) -> Result<Value, RuntimeError> {
        match place {
            Place::Binding(name) => self.lookup(name, location),
            Place::Property { object, key } => self.get_property(object, key, location),
        }
    }

    fn write_place(&mut self, place: Place, value: Value, location: SourceLocation) -> Result<(), RuntimeError> {
        match place {
            Place::Binding(name) => self.env.set(&name, value).map_err(|failure| match failure {
                AssignFailure::Undeclared => RuntimeError::ReferenceError { name, location },
                AssignFailure::Const => RuntimeError::ConstAssignment { name, location },
            }),
            Place::Property { object, key } => self.set_property(&object, &key, value, location),
        }
    }

    /// `target op= value`; evaluates to the stored value
    pub(crate) fn evaluate_assignment(
        &mut self,
        op: AssignOp,
        target: &Expr,
        value: &Expr,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        let place = self.resolve_place(target, location)?;
        let new_value = match op.binary_op() {
            None => self.evaluate_expr(value)?,
            Some(bin) => {
                let current = self.read_place(&place, location)?;
                let rhs = self.evaluate_expr(value)?;
                binary_op(bin, &current, &rhs)
            }
        };
        self.write_place(place, new_value.clone(), location)?;
        Ok(new_value)
    }

    /// `++x`, `x--`, ...; the old value is numeric even when the stored one was not
    pub(crate) fn evaluate_update(
        &mut self,
        op: UpdateOp,
        prefix: bool,
        argument: &Expr,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        let place = self.resolve_place(argument, location)?;
        let old = self.read_place(&place, location)?.to_number();
        let new = match op {
            UpdateOp::Increment => old + 1.0,
            UpdateOp::Decrement => old - 1.0,
        };
        self.write_place(place, Value::Number(new), location)?;
        Ok(Value::Number(if prefix { new } else { old }))
    }
}

#[cfg(test)]
mod tests {
    use crate::interpreter::{ExecutionLimits, Interpreter, RuntimeError};
    use crate::memory::Value;
    use crate::parser::parse_program;

    fn eval(body: &str) -> Result<Value, RuntimeError> {
        let source = format!("export default function f() {{\n{}\n}}", body);
        let mut interp = Interpreter::new(ExecutionLimits::default());
        interp.load(parse_program(&source).unwrap())?;
        interp.call_default_export(Vec::new())
    }

    #[test]
    fn test_compound_assignment() {
        assert_eq!(eval("let s = 'a'; s += 1; s += 'b'; return s;").unwrap(), Value::string("a1b"));
        assert_eq!(eval("let n = 10; n -= 3; n *= 2; n %= 5; return n;").unwrap(), Value::Number(4.0));
    }

    #[test]
    fn test_member_assignment_evaluates_key_once() {
        let source = "
let calls = 0;
const o = { k: 1 };
function key() { calls++; return 'k'; }
o[key()] += 5;
return o.k * 10 + calls;";
        assert_eq!(eval(source).unwrap(), Value::Number(61.0));
    }

    #[test]
    fn test_update_results() {
        assert_eq!(eval("let i = 1; const a = i++; return a * 10 + i;").unwrap(), Value::Number(12.0));
        assert_eq!(eval("let i = 1; const a = --i; return a * 10 + i;").unwrap(), Value::Number(0.0));
        assert_eq!(eval("let s = '5'; s++; return s;").unwrap(), Value::Number(6.0));
    }

    #[test]
    fn test_assignment_to_undeclared_name() {
        let err = eval("ghost = 1;").unwrap_err();
        assert!(matches!(err, RuntimeError::ReferenceError { ref name, .. } if name == "ghost"));
    }
}
