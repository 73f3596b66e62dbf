//! Property reads and writes (`o.name`, `o[expr]`)
//!
//! Array and string methods are not stored anywhere: reading one yields a
//! native function bound to the value it was read from.

use crate::interpreter::builtins::{array_method, string_method};
use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::RuntimeError;
use crate::memory::{NativeFunction, Value};
use crate::parser::ast::{MemberProperty, SourceLocation};

/// Writes past the end of an array may not open a larger gap than this
const MAX_ARRAY_GAP: usize = 1 << 20;

/// Canonical array index: `"0"`, `"17"`, but not `"01"` or `"-1"`
fn array_index(key: &str) -> Option<usize> {
    if key.is_empty() || (key.len() > 1 && key.starts_with('0')) {
        return None;
    }
    if !key.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    key.parse().ok()
}

impl Interpreter {
    /// Property name of `.name` or `[expr]`
    pub(crate) fn property_key(&mut self, property: &MemberProperty) -> Result<String, RuntimeError> {
        match property {
            MemberProperty::Named(name) => Ok(name.clone()),
            MemberProperty::Computed(expr) => Ok(self.evaluate_expr(expr)?.to_js_string()),
        }
    }

    pub(crate) fn get_property(
        &self,
        object: &Value,
        key: &str,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        match object {
            Value::Undefined | Value::Null => Err(RuntimeError::type_error(
                format!(
                    "Cannot read properties of {} (reading '{}')",
                    object.to_js_string(),
                    key
                ),
                location,
            )),
            Value::Array(elements) => {
                if key == "length" {
                    return Ok(Value::Number(elements.borrow().len() as f64));
                }
                if let Some(index) = array_index(key) {
                    return Ok(elements.borrow().get(index).cloned().unwrap_or_default());
                }
                Ok(array_method(key)
                    .map(|name| Value::Native(NativeFunction::method(name, object.clone())))
                    .unwrap_or_default())
            }
            Value::String(s) => {
                if key == "length" {
                    return Ok(Value::Number(s.chars().count() as f64));
                }
                if let Some(index) = array_index(key) {
                    return Ok(s
                        .chars()
                        .nth(index)
                        .map(|c| Value::string(c.to_string()))
                        .unwrap_or_default());
                }
                Ok(string_method(key)
                    .map(|name| Value::Native(NativeFunction::method(name, object.clone())))
                    .unwrap_or_default())
            }
            Value::Object(properties) => Ok(properties.borrow().get(key).cloned().unwrap_or_default()),
            Value::Function(closure) if key == "name" => Ok(Value::string(closure.name())),
            Value::Native(native) if key == "name" => Ok(Value::string(native.name)),
            Value::Bool(_) | Value::Number(_) | Value::Function(_) | Value::Native(_) => {
                Ok(Value::Undefined)
            }
        }
    }

    pub(crate) fn set_property(
        &mut self,
        object: &Value,
        key: &str,
        value: Value,
        location: SourceLocation,
    ) -> Result<(), RuntimeError> {
        match object {
            Value::Object(properties) => {
                properties.borrow_mut().insert(key.to_string(), value);
                Ok(())
            }
            Value::Array(elements) => {
                let mut elements = elements.borrow_mut();
                if key == "length" {
                    let n = value.to_number();
                    if n < 0.0 || n.fract() != 0.0 || n as usize > elements.len() + MAX_ARRAY_GAP {
                        return Err(RuntimeError::type_error("Invalid array length", location));
                    }
                    elements.resize(n as usize, Value::Undefined);
                    return Ok(());
                }
                match array_index(key) {
                    Some(index) if index < elements.len() => {
                        elements[index] = value;
                        Ok(())
                    }
                    Some(index) if index <= elements.len() + MAX_ARRAY_GAP => {
                        elements.resize(index, Value::Undefined);
                        elements.push(value);
                        Ok(())
                    }
                    Some(_) => Err(RuntimeError::Unsupported {
                        message: "sparse arrays".to_string(),
                        location,
                    }),
                    None => Err(RuntimeError::Unsupported {
                        message: format!("named property '{}' on an array", key),
                        location,
                    }),
                }
            }
            Value::Undefined | Value::Null => Err(RuntimeError::type_error(
                format!(
                    "Cannot set properties of {} (setting '{}')",
                    object.to_js_string(),
                    key
                ),
                location,
            )),
            other => Err(RuntimeError::type_error(
                format!(
                    "Cannot create property '{}' on {} '{}'",
                    key,
                    other.type_of(),
                    other.to_js_string()
                ),
                location,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::ExecutionLimits;
    use crate::parser::parse_program;

    fn eval(body: &str) -> Result<Value, RuntimeError> {
        let source = format!("export default function f() {{\n{}\n}}", body);
        let mut interp = Interpreter::new(ExecutionLimits::default());
        interp.load(parse_program(&source).unwrap())?;
        interp.call_default_export(Vec::new())
    }

    #[test]
    fn test_array_index() {
        assert_eq!(array_index("0"), Some(0));
        assert_eq!(array_index("12"), Some(12));
        assert_eq!(array_index("01"), None);
        assert_eq!(array_index("-1"), None);
        assert_eq!(array_index("1.5"), None);
    }

    #[test]
    fn test_array_reads_and_writes() {
        assert_eq!(eval("const a = [1, 2]; a[3] = 4; return a.length;").unwrap(), Value::Number(4.0));
        assert_eq!(eval("const a = [1, 2]; return a[2];").unwrap(), Value::Undefined);
        assert_eq!(eval("const a = [1, 2, 3]; a.length = 1; return a.join('-');").unwrap(), Value::string("1"));
    }

    #[test]
    fn test_string_indexing() {
        assert_eq!(eval("return 'abc'[1] + 'abc'.length;").unwrap(), Value::string("b3"));
    }

    #[test]
    fn test_reading_from_undefined() {
        let err = eval("const o = {};\nreturn o.a.b;").unwrap_err();
        assert_eq!(
            err,
            RuntimeError::TypeError {
                message: "Cannot read properties of undefined (reading 'b')".to_string(),
                location: SourceLocation::new(3, 8),
            }
        );
    }

    #[test]
    fn test_objects_share_references() {
        assert_eq!(
            eval("const a = { n: 1 }; const b = a; b.n = 2; return a.n;").unwrap(),
            Value::Number(2.0)
        );
    }
}
