//! Expression evaluation
//!
//! [`Interpreter::evaluate_expr`] is the single entry point. Operators with
//! more machinery live in `ops/`: member access, assignment and updates,
//! binary and unary operators.

use crate::codegen::print_expression;
use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::RuntimeError;
use crate::interpreter::ops::binary::binary_op;
use crate::memory::Value;
use crate::parser::ast::*;
use indexmap::IndexMap;

impl Interpreter {
    pub(crate) fn evaluate_expr(&mut self, expr: &Expr) -> Result<Value, RuntimeError> {
        match expr {
            Expr::Number(n, _) => Ok(Value::Number(*n)),
            Expr::String(s, _) => Ok(Value::string(s.as_str())),
            Expr::Bool(b, _) => Ok(Value::Bool(*b)),
            Expr::Null(_) => Ok(Value::Null),
            Expr::Identifier(name, origin) => self.lookup(name, self.location_of(origin)),

            Expr::Array { elements, .. } => {
                let values = self.evaluate_list(elements)?;
                Ok(Value::array(values))
            }

            Expr::Object { properties, origin } => self.evaluate_object(properties, origin),

            Expr::Function(function) => Ok(self.make_closure(function)),

            Expr::Unary {
                op,
                argument,
                origin,
            } => self.evaluate_unary(*op, argument, self.location_of(origin)),

            Expr::Update {
                op,
                prefix,
                argument,
                origin,
            } => self.evaluate_update(*op, *prefix, argument, self.location_of(origin)),

            Expr::Binary {
                op, left, right, ..
            } => {
                let left = self.evaluate_expr(left)?;
                let right = self.evaluate_expr(right)?;
                Ok(binary_op(*op, &left, &right))
            }

            Expr::Logical {
                op, left, right, ..
            } => {
                let left = self.evaluate_expr(left)?;
                let short_circuits = match op {
                    LogicalOp::And => !left.truthy(),
                    LogicalOp::Or => left.truthy(),
                };
                if short_circuits {
                    Ok(left)
                } else {
                    self.evaluate_expr(right)
                }
            }

            Expr::Assign {
                op,
                target,
                value,
                origin,
            } => self.evaluate_assignment(*op, target, value, self.location_of(origin)),

            Expr::Conditional {
                test,
                consequent,
                alternate,
                ..
            } => {
                if self.evaluate_expr(test)?.truthy() {
                    self.evaluate_expr(consequent)
                } else {
                    self.evaluate_expr(alternate)
                }
            }

            Expr::Call {
                callee,
                arguments,
                origin,
            } => self.evaluate_call(callee, arguments, self.location_of(origin)),

            Expr::Member {
                object,
                property,
                origin,
            } => {
                let location = self.location_of(origin);
                let object = self.evaluate_expr(object)?;
                let key = self.property_key(property)?;
                self.get_property(&object, &key, location)
            }

            Expr::Sequence { expressions, .. } => {
                let mut last = Value::Undefined;
                for expression in expressions {
                    last = self.evaluate_expr(expression)?;
                }
                Ok(last)
            }

            Expr::Spread { origin, .. } => Err(RuntimeError::Unsupported {
                message: "spread outside of a call, array or object literal".to_string(),
                location: self.location_of(origin),
            }),
        }
    }

    /// Evaluate call arguments or array elements, expanding spreads
    pub(crate) fn evaluate_list(&mut self, items: &[Expr]) -> Result<Vec<Value>, RuntimeError> {
        let mut values = Vec::with_capacity(items.len());
        for item in items {
            match item {
                Expr::Spread { argument, origin } => {
                    let location = self.location_of(origin);
                    let spread = self.evaluate_expr(argument)?;
                    values.extend(iterate(&spread, location)?);
                }
                other => values.push(self.evaluate_expr(other)?),
            }
        }
        Ok(values)
    }

    fn evaluate_object(
        &mut self,
        properties: &[Property],
        origin: &Origin,
    ) -> Result<Value, RuntimeError> {
        let mut map = IndexMap::with_capacity(properties.len());
        for property in properties {
            match property {
                Property::KeyValue { key, value, .. } => {
                    let value = self.evaluate_expr(value)?;
                    map.insert(key.clone(), value);
                }
                Property::Spread(source) => match self.evaluate_expr(source)? {
                    Value::Object(fields) => {
                        for (key, value) in fields.borrow().iter() {
                            map.insert(key.clone(), value.clone());
                        }
                    }
                    spread @ (Value::Array(_) | Value::String(_)) => {
                        let location = self.location_of(origin);
                        for (i, value) in iterate(&spread, location)?.into_iter().enumerate() {
                            map.insert(i.to_string(), value);
                        }
                    }
                    // Other values have no own enumerable properties
                    _ => {}
                },
            }
        }
        Ok(Value::object(map))
    }

    fn evaluate_call(
        &mut self,
        callee: &Expr,
        arguments: &[Expr],
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        let function = self.evaluate_expr(callee)?;
        if !function.is_callable() {
            return Err(RuntimeError::type_error(
                format!("{} is not a function", print_expression(callee)),
                location,
            ));
        }
        let args = self.evaluate_list(arguments)?;
        self.call_value(&function, args, location)
    }
}

/// The values produced by iterating `value` (spread, `for`-style consumers)
pub(crate) fn iterate(value: &Value, location: SourceLocation) -> Result<Vec<Value>, RuntimeError> {
    match value {
        Value::Array(elements) => Ok(elements.borrow().clone()),
        Value::String(s) => Ok(s.chars().map(|c| Value::string(c.to_string())).collect()),
        other => Err(RuntimeError::type_error(
            format!("{} is not iterable", other.to_js_string()),
            location,
        )),
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
    fn test_logical_short_circuit() {
        assert_eq!(eval("return 0 || 'x';").unwrap(), Value::string("x"));
        assert_eq!(eval("return null && missing();").unwrap(), Value::Null);
    }

    #[test]
    fn test_object_literal_and_spread() {
        let value = eval("const a = { x: 1, y: 2 }; const b = { ...a, y: 3 }; return b.x + b.y;").unwrap();
        assert_eq!(value, Value::Number(4.0));
    }

    #[test]
    fn test_sequence_and_conditional() {
        assert_eq!(eval("let a = 1; return (a++, a > 1 ? 'yes' : 'no');").unwrap(), Value::string("yes"));
    }

    #[test]
    fn test_calling_non_function() {
        let err = eval("const o = {}; return o.missing();").unwrap_err();
        assert_eq!(
            err,
            RuntimeError::TypeError {
                message: "o.missing is not a function".to_string(),
                location: err.location().copied().unwrap_or_default(),
            }
        );
    }

    #[test]
    fn test_spreading_non_iterable() {
        let err = eval("return [...5];").unwrap_err();
        assert!(matches!(err, RuntimeError::TypeError { ref message, .. } if message == "5 is not iterable"));
    }
}
