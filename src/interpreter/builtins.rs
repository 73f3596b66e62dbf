//! Built-in function implementations
//!
//! This module provides the globals that user code can call without
//! defining them, and the methods of arrays and strings.
//!
//! # Supported Built-ins
//!
//! - `Math`: `floor ceil round trunc sign abs max min sqrt pow`, `PI`, `E`
//! - `console.log(...)`: captured into the interpreter's [`Console`](super::console::Console)
//! - `parseInt`, `isNaN`, `String`, `Number`, `Boolean`
//! - `Array.isArray`, `Object.keys`, `Object.values`
//! - globals `undefined`, `NaN`, `Infinity`
//!
//! Array methods: `push pop shift unshift indexOf includes slice join concat
//! reverse sort map filter forEach reduce find some every`.
//! String methods: `charAt indexOf includes slice split toUpperCase
//! toLowerCase trim startsWith endsWith`.
//!
//! # Implementation Notes
//!
//! - Built-ins are [`NativeFunction`]s dispatched by name in
//!   [`Interpreter::call_native`]
//! - Methods carry their receiver, so `const p = a.push; p(1)` still pushes to `a`
//! - `Math.random` is left out so that traces are reproducible

use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::RuntimeError;
use crate::memory::value::ArrayRef;
use crate::memory::{Environment, NativeFunction, Value};
use crate::parser::ast::SourceLocation;
use indexmap::IndexMap;
use std::cmp::Ordering;

const MATH_FUNCTIONS: &[&str] = &[
    "Math.floor",
    "Math.ceil",
    "Math.round",
    "Math.trunc",
    "Math.sign",
    "Math.abs",
    "Math.max",
    "Math.min",
    "Math.sqrt",
    "Math.pow",
];

const ARRAY_METHODS: &[&str] = &[
    "push", "pop", "shift", "unshift", "indexOf", "includes", "slice", "join", "concat",
    "reverse", "sort", "map", "filter", "forEach", "reduce", "find", "some", "every",
];

const STRING_METHODS: &[&str] = &[
    "charAt",
    "indexOf",
    "includes",
    "slice",
    "split",
    "toUpperCase",
    "toLowerCase",
    "trim",
    "startsWith",
    "endsWith",
];

/// The method name as stored in a [`NativeFunction`], if arrays have it
pub(crate) fn array_method(key: &str) -> Option<&'static str> {
    ARRAY_METHODS.iter().copied().find(|m| *m == key)
}

pub(crate) fn string_method(key: &str) -> Option<&'static str> {
    STRING_METHODS.iter().copied().find(|m| *m == key)
}

/// Object whose properties are the given natives, keyed by the part after the dot
fn namespace(functions: &[&'static str]) -> IndexMap<String, Value> {
    functions
        .iter()
        .map(|&full| {
            let key = full.rsplit('.').next().unwrap_or(full);
            (key.to_string(), Value::Native(NativeFunction::new(full)))
        })
        .collect()
}

/// Declare every global in the module scope
pub(crate) fn install_globals(env: &Environment) {
    env.declare("undefined", Value::Undefined, true);
    env.declare("NaN", Value::Number(f64::NAN), true);
    env.declare("Infinity", Value::Number(f64::INFINITY), true);

    let mut math = namespace(MATH_FUNCTIONS);
    math.insert("PI".to_string(), Value::Number(std::f64::consts::PI));
    math.insert("E".to_string(), Value::Number(std::f64::consts::E));
    env.declare("Math", Value::object(math), true);

    env.declare("console", Value::object(namespace(&["console.log"])), true);
    env.declare("Array", Value::object(namespace(&["Array.isArray"])), true);
    env.declare(
        "Object",
        Value::object(namespace(&["Object.keys", "Object.values"])),
        true,
    );

    for name in ["parseInt", "isNaN", "String", "Number", "Boolean"] {
        env.declare(name, Value::Native(NativeFunction::new(name)), true);
    }
}

/// JavaScript `ToIntegerOrInfinity`
fn to_integer(value: &Value) -> f64 {
    let n = value.to_number();
    if n.is_nan() {
        0.0
    } else {
        n.trunc()
    }
}

/// Resolve `slice(start, end)` arguments against a length
fn slice_bounds(len: usize, start: &Value, end: &Value) -> (usize, usize) {
    let resolve = |value: &Value, default: usize| -> usize {
        if value.is_undefined() {
            return default;
        }
        let n = to_integer(value);
        if n < 0.0 {
            (len as f64 + n).max(0.0) as usize
        } else {
            n.min(len as f64) as usize
        }
    };
    let start = resolve(start, 0);
    let end = resolve(end, len);
    (start, end.max(start))
}

/// `parseInt(text, radix)`
fn parse_int(text: &str, radix: &Value) -> f64 {
    let mut rest = text.trim_start();
    let mut sign = 1.0;
    if let Some(stripped) = rest.strip_prefix('-') {
        sign = -1.0;
        rest = stripped;
    } else if let Some(stripped) = rest.strip_prefix('+') {
        rest = stripped;
    }

    let radix = to_integer(radix);
    if !(0.0..=36.0).contains(&radix) {
        return f64::NAN;
    }
    let mut radix = radix as u32;
    if radix == 0 || radix == 16 {
        if let Some(stripped) = rest.strip_prefix("0x").or_else(|| rest.strip_prefix("0X")) {
            rest = stripped;
            radix = 16;
        }
    }
    if radix == 0 {
        radix = 10;
    }
    if !(2..=36).contains(&radix) {
        return f64::NAN;
    }

    let mut result: Option<f64> = None;
    for c in rest.chars() {
        match c.to_digit(radix) {
            Some(d) => result = Some(result.unwrap_or(0.0) * f64::from(radix) + f64::from(d)),
            None => break,
        }
    }
    result.map_or(f64::NAN, |n| sign * n)
}

/// Default `sort` order: by string form, `undefined` last
fn default_order(a: &Value, b: &Value) -> Ordering {
    match (a.is_undefined(), b.is_undefined()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.to_js_string().cmp(&b.to_js_string()),
    }
}

fn string_method_call(name: &str, s: &str, args: &[Value]) -> Option<Value> {
    let arg = |i: usize| args.get(i).cloned().unwrap_or_default();
    let chars: Vec<char> = s.chars().collect();
    let value = match name {
        "charAt" => {
            let index = to_integer(&arg(0));
            let c = if index < 0.0 {
                None
            } else {
                chars.get(index as usize)
            };
            Value::string(c.map(|c| c.to_string()).unwrap_or_default())
        }
        "indexOf" => {
            let needle = arg(0).to_js_string();
            let position = s.find(needle.as_str()).map(|byte| s[..byte].chars().count());
            Value::Number(position.map_or(-1.0, |p| p as f64))
        }
        "includes" => Value::Bool(s.contains(arg(0).to_js_string().as_str())),
        "startsWith" => Value::Bool(s.starts_with(arg(0).to_js_string().as_str())),
        "endsWith" => Value::Bool(s.ends_with(arg(0).to_js_string().as_str())),
        "slice" => {
            let (start, end) = slice_bounds(chars.len(), &arg(0), &arg(1));
            Value::string(chars[start..end].iter().collect::<String>())
        }
        "split" => {
            let separator = arg(0);
            let parts: Vec<Value> = if separator.is_undefined() {
                vec![Value::string(s)]
            } else {
                let separator = separator.to_js_string();
                if separator.is_empty() {
                    chars.iter().map(|c| Value::string(c.to_string())).collect()
                } else {
                    s.split(separator.as_str()).map(Value::string).collect()
                }
            };
            Value::array(parts)
        }
        "toUpperCase" => Value::string(s.to_uppercase()),
        "toLowerCase" => Value::string(s.to_lowercase()),
        "trim" => Value::string(s.trim()),
        _ => return None,
    };
    Some(value)
}

impl Interpreter {
    pub(crate) fn call_native(
        &mut self,
        native: &NativeFunction,
        args: Vec<Value>,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        tracing::trace!(name = native.name, argc = args.len(), "native call");

        if let Some(receiver) = &native.receiver {
            return match receiver.as_ref() {
                Value::Array(elements) => self.call_array_method(native.name, elements, args, location),
                Value::String(s) => string_method_call(native.name, s, &args).ok_or_else(|| {
                    RuntimeError::Unsupported {
                        message: format!("string method '{}'", native.name),
                        location,
                    }
                }),
                other => Err(RuntimeError::type_error(
                    format!("{} has no method '{}'", other.type_of(), native.name),
                    location,
                )),
            };
        }

        let arg = |i: usize| args.get(i).cloned().unwrap_or_default();
        let number = |i: usize| arg(i).to_number();

        let value = match native.name {
            "console.log" => {
                let text: Vec<String> = args.iter().map(Value::display).collect();
                self.console.log(&text.join(" "), location);
                Value::Undefined
            }

            "Math.floor" => Value::Number(number(0).floor()),
            "Math.ceil" => Value::Number(number(0).ceil()),
            // Halves round towards +Infinity
            "Math.round" => Value::Number((number(0) + 0.5).floor()),
            "Math.trunc" => Value::Number(number(0).trunc()),
            "Math.sign" => {
                let n = number(0);
                Value::Number(if n.is_nan() || n == 0.0 { n } else { n.signum() })
            }
            "Math.abs" => Value::Number(number(0).abs()),
            "Math.sqrt" => Value::Number(number(0).sqrt()),
            "Math.pow" => Value::Number(number(0).powf(number(1))),
            "Math.max" | "Math.min" => {
                let is_max = native.name == "Math.max";
                let mut result = if is_max {
                    f64::NEG_INFINITY
                } else {
                    f64::INFINITY
                };
                for value in &args {
                    let n = value.to_number();
                    if n.is_nan() {
                        result = f64::NAN;
                        break;
                    }
                    result = if is_max { result.max(n) } else { result.min(n) };
                }
                Value::Number(result)
            }

            "parseInt" => Value::Number(parse_int(&arg(0).to_js_string(), &arg(1))),
            "isNaN" => Value::Bool(number(0).is_nan()),
            "String" if args.is_empty() => Value::string(""),
            "String" => Value::string(arg(0).to_js_string()),
            "Number" if args.is_empty() => Value::Number(0.0),
            "Number" => Value::Number(number(0)),
            "Boolean" => Value::Bool(arg(0).truthy()),

            "Array.isArray" => Value::Bool(matches!(arg(0), Value::Array(_))),

            "Object.keys" | "Object.values" => {
                let keys = native.name == "Object.keys";
                let entries: Vec<(String, Value)> = match arg(0) {
                    Value::Object(properties) => properties
                        .borrow()
                        .iter()
                        .map(|(k, v)| (k.clone(), v.clone()))
                        .collect(),
                    Value::Array(elements) => elements
                        .borrow()
                        .iter()
                        .enumerate()
                        .map(|(i, v)| (i.to_string(), v.clone()))
                        .collect(),
                    value @ (Value::Undefined | Value::Null) => {
                        return Err(RuntimeError::type_error(
                            format!("Cannot convert {} to object", value.to_js_string()),
                            location,
                        ))
                    }
                    _ => Vec::new(),
                };
                Value::array(
                    entries
                        .into_iter()
                        .map(|(k, v)| if keys { Value::string(k) } else { v })
                        .collect(),
                )
            }

            other => {
                return Err(RuntimeError::Unsupported {
                    message: format!("built-in '{}'", other),
                    location,
                })
            }
        };
        Ok(value)
    }

    fn require_callback(&self, callback: &Value, method: &str, location: SourceLocation) -> Result<(), RuntimeError> {
        if callback.is_callable() {
            Ok(())
        } else {
            Err(RuntimeError::type_error(
                format!("{} is not a function (in Array.prototype.{})", callback.to_js_string(), method),
                location,
            ))
        }
    }

    fn call_array_method(
        &mut self,
        name: &str,
        elements: &ArrayRef,
        args: Vec<Value>,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        let arg = |i: usize| args.get(i).cloned().unwrap_or_default();
        let this = || Value::Array(ArrayRef::clone(elements));

        let value = match name {
            "push" => {
                let mut elements = elements.borrow_mut();
                elements.extend(args);
                Value::Number(elements.len() as f64)
            }
            "pop" => elements.borrow_mut().pop().unwrap_or_default(),
            "shift" => {
                let mut elements = elements.borrow_mut();
                if elements.is_empty() {
                    Value::Undefined
                } else {
                    elements.remove(0)
                }
            }
            "unshift" => {
                let mut elements = elements.borrow_mut();
                for (i, value) in args.into_iter().enumerate() {
                    elements.insert(i, value);
                }
                Value::Number(elements.len() as f64)
            }
            "indexOf" => {
                let needle = arg(0);
                let position = elements.borrow().iter().position(|v| v.strict_equals(&needle));
                Value::Number(position.map_or(-1.0, |p| p as f64))
            }
            "includes" => {
                let needle = arg(0);
                let needle_nan = needle.as_number().is_some_and(f64::is_nan);
                let found = elements.borrow().iter().any(|v| {
                    v.strict_equals(&needle) || (needle_nan && v.as_number().is_some_and(f64::is_nan))
                });
                Value::Bool(found)
            }
            "slice" => {
                let elements = elements.borrow();
                let (start, end) = slice_bounds(elements.len(), &arg(0), &arg(1));
                Value::array(elements[start..end].to_vec())
            }
            "join" => {
                let separator = arg(0);
                let separator = if separator.is_undefined() {
                    ",".to_string()
                } else {
                    separator.to_js_string()
                };
                let parts: Vec<String> = elements
                    .borrow()
                    .iter()
                    .map(|v| if v.is_nullish() { String::new() } else { v.to_js_string() })
                    .collect();
                Value::string(parts.join(&separator))
            }
            "concat" => {
                let mut out = elements.borrow().clone();
                for value in args {
                    match value {
                        Value::Array(other) => out.extend(other.borrow().iter().cloned()),
                        other => out.push(other),
                    }
                }
                Value::array(out)
            }
            "reverse" => {
                elements.borrow_mut().reverse();
                this()
            }
            "sort" => {
                let comparator = arg(0);
                if !comparator.is_undefined() {
                    self.require_callback(&comparator, name, location)?;
                }
                let mut items = elements.borrow().clone();
                // Insertion sort: stable, and the comparator may fail or call back in
                for i in 1..items.len() {
                    let mut j = i;
                    while j > 0 {
                        let order = if comparator.is_undefined() {
                            default_order(&items[j - 1], &items[j])
                        } else {
                            let result = self.call_value(
                                &comparator,
                                vec![items[j - 1].clone(), items[j].clone()],
                                location,
                            )?;
                            result.to_number().partial_cmp(&0.0).unwrap_or(Ordering::Equal)
                        };
                        if order != Ordering::Greater {
                            break;
                        }
                        items.swap(j - 1, j);
                        j -= 1;
                    }
                }
                *elements.borrow_mut() = items;
                this()
            }
            "map" | "filter" | "forEach" | "find" | "some" | "every" => {
                let callback = arg(0);
                self.require_callback(&callback, name, location)?;
                let items = elements.borrow().clone();
                let mut mapped = Vec::new();
                for (i, item) in items.into_iter().enumerate() {
                    let result = self.call_value(
                        &callback,
                        vec![item.clone(), Value::Number(i as f64), this()],
                        location,
                    )?;
                    match name {
                        "map" => mapped.push(result),
                        "filter" if result.truthy() => mapped.push(item),
                        "find" if result.truthy() => return Ok(item),
                        "some" if result.truthy() => return Ok(Value::Bool(true)),
                        "every" if !result.truthy() => return Ok(Value::Bool(false)),
                        _ => {}
                    }
                }
                match name {
                    "map" | "filter" => Value::array(mapped),
                    "some" => Value::Bool(false),
                    "every" => Value::Bool(true),
                    _ => Value::Undefined,
                }
            }
            "reduce" => {
                let callback = arg(0);
                self.require_callback(&callback, name, location)?;
                let items = elements.borrow().clone();
                let mut items = items.into_iter().enumerate();
                let mut accumulator = if args.len() >= 2 {
                    arg(1)
                } else {
                    match items.next() {
                        Some((_, first)) => first,
                        None => {
                            return Err(RuntimeError::type_error(
                                "Reduce of empty array with no initial value",
                                location,
                            ))
                        }
                    }
                };
                for (i, item) in items {
                    accumulator = self.call_value(
                        &callback,
                        vec![accumulator, item, Value::Number(i as f64), this()],
                        location,
                    )?;
                }
                accumulator
            }
            other => {
                return Err(RuntimeError::Unsupported {
                    message: format!("array method '{}'", other),
                    location,
                })
            }
        };
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::ExecutionLimits;
    use crate::parser::parse_program;

    fn eval_with_console(body: &str) -> (Result<Value, RuntimeError>, Vec<String>) {
        let source = format!("export default function f() {{\n{}\n}}", body);
        let mut interp = Interpreter::new(ExecutionLimits::default());
        let result = interp
            .load(parse_program(&source).unwrap())
            .and_then(|_| interp.call_default_export(Vec::new()));
        (result, interp.console().output())
    }

    fn eval(body: &str) -> Value {
        eval_with_console(body).0.unwrap()
    }

    #[test]
    fn test_math() {
        assert_eq!(eval("return Math.floor(2.7) + Math.ceil(0.1) + Math.abs(-3);"), Value::Number(6.0));
        assert_eq!(eval("return Math.round(-2.5);"), Value::Number(-2.0));
        assert_eq!(eval("return Math.max(1, 5, 3) - Math.min(4, 2);"), Value::Number(3.0));
        assert_eq!(eval("return Math.max();"), Value::Number(f64::NEG_INFINITY));
        assert_eq!(eval("return Math.pow(2, 10) + Math.sqrt(16);"), Value::Number(1028.0));
    }

    #[test]
    fn test_parse_int() {
        assert_eq!(parse_int("  42px", &Value::Undefined), 42.0);
        assert_eq!(parse_int("-0x1A", &Value::Undefined), -26.0);
        assert_eq!(parse_int("101", &Value::Number(2.0)), 5.0);
        assert!(parse_int("abc", &Value::Undefined).is_nan());
    }

    #[test]
    fn test_parse_int_radix_out_of_range() {
        assert!(parse_int("10", &Value::Number(-1.0)).is_nan());
        assert!(parse_int("10", &Value::Number(1.0)).is_nan());
        assert!(parse_int("10", &Value::Number(37.0)).is_nan());
        assert_eq!(parse_int("z", &Value::Number(36.0)), 35.0);
    }

    #[test]
    fn test_console_log_is_captured() {
        let (result, output) = eval_with_console("console.log('sum', 1 + 2, [1, 'a'], { k: null });");
        assert_eq!(result, Ok(Value::Undefined));
        assert_eq!(output, vec!["sum 3 [ 1, 'a' ] { k: null }"]);
    }

    #[test]
    fn test_array_mutators() {
        assert_eq!(
            eval("const a = [2, 3]; a.push(4); a.unshift(1); a.shift(); a.pop(); return a.join();"),
            Value::string("2,3")
        );
        assert_eq!(eval("return [3, 1, 2].reverse().join('');"), Value::string("213"));
        assert_eq!(eval("return [10, 9, 1].sort().join(' ');"), Value::string("1 10 9"));
        assert_eq!(
            eval("return [10, 9, 1].sort((a, b) => a - b).join(' ');"),
            Value::string("1 9 10")
        );
    }

    #[test]
    fn test_array_queries() {
        assert_eq!(eval("return [1, 2, 3].indexOf(3);"), Value::Number(2.0));
        assert_eq!(eval("return [NaN].includes(NaN);"), Value::Bool(true));
        assert_eq!(eval("return [1, 2, 3, 4].slice(1, -1).length;"), Value::Number(2.0));
        assert_eq!(eval("return [1].concat([2, 3], 4).length;"), Value::Number(4.0));
    }

    #[test]
    fn test_higher_order_methods() {
        assert_eq!(
            eval("return [1, 2, 3, 4].filter(x => x % 2 === 0).map(x => x * 10).join();"),
            Value::string("20,40")
        );
        assert_eq!(eval("return [1, 2, 3].reduce((acc, x) => acc + x, 10);"), Value::Number(16.0));
        assert_eq!(eval("return [5, 6].find(x => x > 5);"), Value::Number(6.0));
        assert_eq!(eval("let n = 0; [1, 2].forEach(x => { n += x; }); return n;"), Value::Number(3.0));
        assert_eq!(eval("return [1, 2].every(x => x > 0) && ![1, 2].some(x => x > 5);"), Value::Bool(true));
    }

    #[test]
    fn test_reduce_empty_without_initial_value() {
        let (result, _) = eval_with_console("return [].reduce((a, b) => a + b);");
        assert!(matches!(result, Err(RuntimeError::TypeError { .. })));
    }

    #[test]
    fn test_string_methods() {
        assert_eq!(eval("return 'Hello'.toUpperCase() + 'Hello'.charAt(1);"), Value::string("HELLOe"));
        assert_eq!(eval("return 'a,b,c'.split(',').length;"), Value::Number(3.0));
        assert_eq!(eval("return 'abcdef'.slice(-3) + 'abc'.indexOf('c');"), Value::string("def2"));
        assert_eq!(eval("return '  x '.trim().length;"), Value::Number(1.0));
    }

    #[test]
    fn test_conversions_and_reflection() {
        assert_eq!(eval("return String(12) + Number('3');"), Value::string("123"));
        assert_eq!(eval("return Array.isArray([]) && !Array.isArray({});"), Value::Bool(true));
        assert_eq!(eval("return Object.keys({ a: 1, b: 2 }).join('');"), Value::string("ab"));
        assert_eq!(eval("return isNaN('x');"), Value::Bool(true));
    }

    #[test]
    fn test_bound_method_keeps_receiver() {
        assert_eq!(eval("const a = []; const push = a.push; push(1); return a.length;"), Value::Number(1.0));
    }
}
