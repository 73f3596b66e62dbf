//! Binary operators on runtime values
//!
//! Operands are already evaluated; `&&` and `||` short-circuit and are
//! handled by the expression evaluator instead.

use crate::memory::Value;
use crate::parser::ast::BinOp;
use std::cmp::Ordering;

pub(crate) fn binary_op(op: BinOp, left: &Value, right: &Value) -> Value {
    match op {
        BinOp::Add => add(left, right),
        BinOp::Sub => Value::Number(left.to_number() - right.to_number()),
        BinOp::Mul => Value::Number(left.to_number() * right.to_number()),
        BinOp::Div => Value::Number(left.to_number() / right.to_number()),
        // f64 `%` truncates like JavaScript's, keeping the dividend's sign
        BinOp::Mod => Value::Number(left.to_number() % right.to_number()),
        BinOp::Lt => Value::Bool(compare(left, right) == Some(Ordering::Less)),
        BinOp::Le => Value::Bool(matches!(
            compare(left, right),
            Some(Ordering::Less | Ordering::Equal)
        )),
        BinOp::Gt => Value::Bool(compare(left, right) == Some(Ordering::Greater)),
        BinOp::Ge => Value::Bool(matches!(
            compare(left, right),
            Some(Ordering::Greater | Ordering::Equal)
        )),
        BinOp::Eq => Value::Bool(left.loose_equals(right)),
        BinOp::Ne => Value::Bool(!left.loose_equals(right)),
        BinOp::StrictEq => Value::Bool(left.strict_equals(right)),
        BinOp::StrictNe => Value::Bool(!left.strict_equals(right)),
    }
}

/// Arrays, objects and functions become their string form; primitives stay
fn to_primitive(value: &Value) -> Value {
    match value {
        Value::Array(_) | Value::Object(_) | Value::Function(_) | Value::Native(_) => {
            Value::string(value.to_js_string())
        }
        other => other.clone(),
    }
}

/// `+`: concatenation as soon as either side is a string
fn add(left: &Value, right: &Value) -> Value {
    let left = to_primitive(left);
    let right = to_primitive(right);
    match (&left, &right) {
        (Value::String(a), b) => Value::string(format!("{}{}", a, b.to_js_string())),
        (a, Value::String(b)) => Value::string(format!("{}{}", a.to_js_string(), b)),
        (a, b) => Value::Number(a.to_number() + b.to_number()),
    }
}

/// Relational comparison; `None` when either side is NaN
fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    let left = to_primitive(left);
    let right = to_primitive(right);
    match (&left, &right) {
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (a, b) => a.to_number().partial_cmp(&b.to_number()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(n: f64) -> Value {
        Value::Number(n)
    }

    #[test]
    fn test_addition_and_concatenation() {
        assert_eq!(binary_op(BinOp::Add, &num(1.0), &num(2.0)), num(3.0));
        assert_eq!(
            binary_op(BinOp::Add, &Value::string("a"), &num(1.0)),
            Value::string("a1")
        );
        assert_eq!(
            binary_op(BinOp::Add, &Value::array(vec![num(1.0), num(2.0)]), &num(3.0)),
            Value::string("1,23")
        );
        assert_eq!(binary_op(BinOp::Add, &Value::Null, &num(1.0)), num(1.0));
    }

    #[test]
    fn test_arithmetic_edge_cases() {
        assert_eq!(binary_op(BinOp::Mod, &num(-7.0), &num(3.0)), num(-1.0));
        assert_eq!(binary_op(BinOp::Div, &num(1.0), &num(0.0)), num(f64::INFINITY));
        let nan = binary_op(BinOp::Sub, &Value::string("x"), &num(1.0));
        assert!(nan.as_number().is_some_and(f64::is_nan));
    }

    #[test]
    fn test_comparisons() {
        assert_eq!(binary_op(BinOp::Lt, &Value::string("10"), &Value::string("9")), Value::Bool(true));
        assert_eq!(binary_op(BinOp::Lt, &Value::string("10"), &num(9.0)), Value::Bool(false));
        assert_eq!(binary_op(BinOp::Ge, &num(f64::NAN), &num(1.0)), Value::Bool(false));
        assert_eq!(binary_op(BinOp::Le, &num(2.0), &num(2.0)), Value::Bool(true));
    }

    #[test]
    fn test_equality_operators() {
        assert_eq!(binary_op(BinOp::Eq, &Value::string("2"), &num(2.0)), Value::Bool(true));
        assert_eq!(binary_op(BinOp::StrictEq, &Value::string("2"), &num(2.0)), Value::Bool(false));
        assert_eq!(binary_op(BinOp::StrictNe, &Value::Undefined, &Value::Null), Value::Bool(true));
    }
}
