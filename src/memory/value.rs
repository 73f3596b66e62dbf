//! Runtime value representation
//!
//! This module defines the [`Value`] enum, which represents every runtime
//! value of the JavaScript subset executed by the interpreter.
//!
//! # Value Types
//!
//! - [`Value::Undefined`] / [`Value::Null`]: the two empty values
//! - [`Value::Bool`], [`Value::Number`] (always `f64`), [`Value::String`]
//! - [`Value::Array`]: shared, mutable list
//! - [`Value::Object`]: shared, mutable map that keeps insertion order
//! - [`Value::Function`]: a closure over the environment it was created in
//! - [`Value::Native`]: a built-in, optionally bound to a receiver
//!
//! # Reference Semantics
//!
//! Arrays and objects are `Rc<RefCell<..>>`: cloning a [`Value`] clones the
//! handle, not the contents, so mutations are visible through every alias.
//! This is what lets a recorded step observe later changes to an object it
//! captured.

use super::env::Environment;
use crate::codegen::format_number;
use crate::parser::ast::Function;
use indexmap::IndexMap;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

pub type ArrayRef = Rc<RefCell<Vec<Value>>>;
pub type ObjectRef = Rc<RefCell<IndexMap<String, Value>>>;

/// Runtime values in the interpreter
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(Rc<str>),
    Array(ArrayRef),
    Object(ObjectRef),
    Function(Rc<Closure>),
    Native(NativeFunction),
}

/// A user function together with its defining environment
pub struct Closure {
    pub function: Rc<Function>,
    pub env: Environment,
}

impl Closure {
    pub fn name(&self) -> &str {
        self.function.name.as_deref().unwrap_or("")
    }
}

impl fmt::Debug for Closure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Closure({})", self.name())
    }
}

/// A built-in function. Methods carry the value they were read from.
#[derive(Debug, Clone)]
pub struct NativeFunction {
    pub name: &'static str,
    pub receiver: Option<Box<Value>>,
}

impl NativeFunction {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            receiver: None,
        }
    }

    pub fn method(name: &'static str, receiver: Value) -> Self {
        Self {
            name,
            receiver: Some(Box::new(receiver)),
        }
    }
}

impl Value {
    pub fn string(s: impl Into<Rc<str>>) -> Self {
        Value::String(s.into())
    }

    pub fn array(elements: Vec<Value>) -> Self {
        Value::Array(Rc::new(RefCell::new(elements)))
    }

    pub fn object(properties: IndexMap<String, Value>) -> Self {
        Value::Object(Rc::new(RefCell::new(properties)))
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Undefined | Value::Null)
    }

    pub fn is_callable(&self) -> bool {
        matches!(self, Value::Function(_) | Value::Native(_))
    }

    /// Get the number, returns None if not a Number
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// JavaScript truthiness
    pub fn truthy(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) => !s.is_empty(),
            Value::Array(_) | Value::Object(_) | Value::Function(_) | Value::Native(_) => true,
        }
    }

    /// Result of the `typeof` operator
    pub fn type_of(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null | Value::Array(_) | Value::Object(_) => "object",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Function(_) | Value::Native(_) => "function",
        }
    }

    /// Numeric conversion (`Number(v)`, unary `+`)
    pub fn to_number(&self) -> f64 {
        match self {
            Value::Undefined => f64::NAN,
            Value::Null => 0.0,
            Value::Bool(b) => f64::from(u8::from(*b)),
            Value::Number(n) => *n,
            Value::String(s) => string_to_number(s),
            Value::Array(_) | Value::Object(_) => string_to_number(&self.to_js_string()),
            Value::Function(_) | Value::Native(_) => f64::NAN,
        }
    }

    /// String conversion (`String(v)`, `+` with a string operand)
    pub fn to_js_string(&self) -> String {
        let mut seen = Vec::new();
        self.to_js_string_guarded(&mut seen)
    }

    fn to_js_string_guarded(&self, seen: &mut Vec<*const ()>) -> String {
        match self {
            Value::Undefined => "undefined".to_string(),
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => format_number(*n),
            Value::String(s) => s.to_string(),
            Value::Array(elements) => {
                let id = Rc::as_ptr(elements) as *const ();
                // A cyclic element joins as the empty string
                if seen.contains(&id) {
                    return String::new();
                }
                seen.push(id);
                let parts: Vec<String> = elements
                    .borrow()
                    .iter()
                    .map(|v| {
                        if v.is_nullish() {
                            String::new()
                        } else {
                            v.to_js_string_guarded(seen)
                        }
                    })
                    .collect();
                seen.pop();
                parts.join(",")
            }
            Value::Object(_) => "[object Object]".to_string(),
            Value::Function(closure) => format!("function {}() {{ [code] }}", closure.name()),
            Value::Native(native) => format!("function {}() {{ [native code] }}", native.name),
        }
    }

    /// `===`: identity for arrays, objects and functions
    pub fn strict_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b),
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Native(a), Value::Native(b)) => {
                a.name == b.name
                    && match (&a.receiver, &b.receiver) {
                        (Some(x), Some(y)) => x.strict_equals(y),
                        (None, None) => true,
                        _ => false,
                    }
            }
            _ => false,
        }
    }

    /// `==` with the usual coercions between primitives
    pub fn loose_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (a, b) if a.is_nullish() && b.is_nullish() => true,
            (a, b) if a.is_nullish() || b.is_nullish() => false,
            (Value::Number(_), Value::String(_))
            | (Value::String(_), Value::Number(_))
            | (Value::Bool(_), _)
            | (_, Value::Bool(_)) => {
                if matches!(self, Value::Bool(_)) {
                    Value::Number(self.to_number()).loose_equals(other)
                } else if matches!(other, Value::Bool(_)) {
                    self.loose_equals(&Value::Number(other.to_number()))
                } else {
                    self.to_number() == other.to_number()
                }
            }
            (Value::Array(_) | Value::Object(_), Value::Number(_) | Value::String(_)) => {
                Value::string(self.to_js_string()).loose_equals(other)
            }
            (Value::Number(_) | Value::String(_), Value::Array(_) | Value::Object(_)) => {
                self.loose_equals(&Value::string(other.to_js_string()))
            }
            _ => self.strict_equals(other),
        }
    }

    /// How `console.log` shows a value: strings bare at the top level and
    /// quoted inside containers
    pub fn display(&self) -> String {
        let mut seen = Vec::new();
        self.inspect(&mut seen, true)
    }

    fn inspect(&self, seen: &mut Vec<*const ()>, top: bool) -> String {
        match self {
            Value::String(s) if top => s.to_string(),
            Value::String(s) => format!("'{}'", s),
            Value::Array(elements) => {
                let id = Rc::as_ptr(elements) as *const ();
                if seen.contains(&id) {
                    return "[Circular]".to_string();
                }
                seen.push(id);
                let parts: Vec<String> = elements
                    .borrow()
                    .iter()
                    .map(|v| v.inspect(seen, false))
                    .collect();
                seen.pop();
                if parts.is_empty() {
                    "[]".to_string()
                } else {
                    format!("[ {} ]", parts.join(", "))
                }
            }
            Value::Object(properties) => {
                let id = Rc::as_ptr(properties) as *const ();
                if seen.contains(&id) {
                    return "[Circular]".to_string();
                }
                seen.push(id);
                let parts: Vec<String> = properties
                    .borrow()
                    .iter()
                    .map(|(k, v)| format!("{}: {}", k, v.inspect(seen, false)))
                    .collect();
                seen.pop();
                if parts.is_empty() {
                    "{}".to_string()
                } else {
                    format!("{{ {} }}", parts.join(", "))
                }
            }
            Value::Function(closure) => format!("[Function: {}]", closure.name()),
            Value::Native(native) => format!("[Function: {}]", native.name),
            other => other.to_js_string(),
        }
    }
}

/// `Number("...")`: whitespace-trimmed decimal or hex, empty is 0
pub fn string_to_number(s: &str) -> f64 {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    if let Some(hex) = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        return u64::from_str_radix(hex, 16)
            .map(|n| n as f64)
            .unwrap_or(f64::NAN);
    }
    match trimmed {
        "Infinity" | "+Infinity" => f64::INFINITY,
        "-Infinity" => f64::NEG_INFINITY,
        // Rust accepts spellings like "inf" and "nan" that JavaScript does not
        _ if trimmed.chars().any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E') => {
            f64::NAN
        }
        _ => trimmed.parse::<f64>().unwrap_or(f64::NAN),
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.strict_equals(other)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truthiness() {
        assert!(!Value::Undefined.truthy());
        assert!(!Value::Number(0.0).truthy());
        assert!(!Value::Number(f64::NAN).truthy());
        assert!(!Value::string("").truthy());
        assert!(Value::string("0").truthy());
        assert!(Value::array(Vec::new()).truthy());
    }

    #[test]
    fn test_type_of() {
        assert_eq!(Value::Null.type_of(), "object");
        assert_eq!(Value::Native(NativeFunction::new("parseInt")).type_of(), "function");
        assert_eq!(Value::Undefined.type_of(), "undefined");
    }

    #[test]
    fn test_string_conversion() {
        let nested = Value::array(vec![Value::Number(1.0), Value::Null, Value::string("x")]);
        assert_eq!(nested.to_js_string(), "1,,x");
        assert_eq!(Value::Number(2.5).to_js_string(), "2.5");
        assert_eq!(Value::object(IndexMap::new()).to_js_string(), "[object Object]");
    }

    #[test]
    fn test_number_conversion() {
        assert_eq!(Value::string(" 42 ").to_number(), 42.0);
        assert_eq!(Value::string("").to_number(), 0.0);
        assert_eq!(Value::string("0x1f").to_number(), 31.0);
        assert!(Value::string("inf").to_number().is_nan());
        assert!(Value::string("12px").to_number().is_nan());
        assert_eq!(Value::Bool(true).to_number(), 1.0);
    }

    #[test]
    fn test_equality() {
        let a = Value::array(Vec::new());
        assert!(a.strict_equals(&a.clone()));
        assert!(!a.strict_equals(&Value::array(Vec::new())));
        assert!(Value::Null.loose_equals(&Value::Undefined));
        assert!(!Value::Null.strict_equals(&Value::Undefined));
        assert!(Value::string("1").loose_equals(&Value::Number(1.0)));
        assert!(Value::Bool(true).loose_equals(&Value::Number(1.0)));
        assert!(!Value::Number(f64::NAN).strict_equals(&Value::Number(f64::NAN)));
    }

    #[test]
    fn test_display_cycles() {
        let list = Value::array(vec![Value::string("a")]);
        if let Value::Array(elements) = &list {
            elements.borrow_mut().push(list.clone());
        }
        assert_eq!(list.display(), "[ 'a', [Circular] ]");
        assert_eq!(list.to_js_string(), "a,");
    }
}
