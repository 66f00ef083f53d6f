//! Method calls: `receiver.method(args)`
//!
//! A text receiver gets the Arduino `String` methods, a library object the
//! methods of its class (see `libraries`), and a struct field holding a
//! function reference is called through.
//!
//! `setCharAt`, `trim`, `toLowerCase`, `toUpperCase` and `replace` modify
//! the receiver in place when it is a variable, and also yield the new text.
//! Positions are byte offsets, like the Arduino `String` buffer.

use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::{RuntimeError, RuntimeResult};
use crate::interpreter::libraries;
use crate::memory::pointer::Place;
use crate::memory::value::Value;
use crate::tree::ast::AstNode;

/// `String` methods and accepted argument count range
const STRING_METHODS: &[(&str, usize, usize)] = &[
    ("length", 0, 0),
    ("charAt", 1, 1),
    ("setCharAt", 2, 2),
    ("substring", 1, 2),
    ("indexOf", 1, 2),
    ("lastIndexOf", 1, 2),
    ("startsWith", 1, 1),
    ("endsWith", 1, 1),
    ("equals", 1, 1),
    ("toLowerCase", 0, 0),
    ("toUpperCase", 0, 0),
    ("toInt", 0, 0),
    ("toFloat", 0, 0),
    ("trim", 0, 0),
    ("replace", 2, 2),
];

fn index_arg(value: &Value) -> RuntimeResult<i64> {
    value
        .as_i64()
        .ok_or_else(|| RuntimeError::type_error("index", value.type_name()))
}

fn find_from(hay: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if from > hay.len() {
        return None;
    }
    if needle.is_empty() {
        return Some(from);
    }
    hay[from..]
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|i| i + from)
}

/// Last match starting at or before `upto`
fn rfind_upto(hay: &[u8], needle: &[u8], upto: usize) -> Option<usize> {
    if needle.len() > hay.len() {
        return None;
    }
    let last = (hay.len() - needle.len()).min(upto);
    (0..=last).rev().find(|&i| &hay[i..i + needle.len()] == needle)
}

fn position(found: Option<usize>) -> Value {
    Value::Int(found.map_or(-1, |i| i as i32))
}

/// `atol`: optional whitespace and sign, then digits; 0 when there are none
fn leading_int(text: &str) -> i32 {
    let trimmed = text.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let magnitude = digits
        .bytes()
        .take_while(|b| b.is_ascii_digit())
        .fold(0i64, |n, b| n.saturating_mul(10).saturating_add((b - b'0') as i64));
    (if negative { -magnitude } else { magnitude }) as i32
}

/// `atof`: the longest numeric prefix, 0.0 when there is none
fn leading_float(text: &str) -> f64 {
    let trimmed = text.trim_start();
    let numeric = trimmed
        .char_indices()
        .take_while(|(_, c)| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'))
        .last()
        .map_or(0, |(i, c)| i + c.len_utf8());
    (1..=numeric)
        .rev()
        .find_map(|end| trimmed[..end].parse::<f64>().ok())
        .unwrap_or(0.0)
}

impl Interpreter {
    pub(crate) fn call_method(
        &mut self,
        object: &AstNode,
        method: &str,
        args: &[AstNode],
    ) -> RuntimeResult<Value> {
        // Resolve once so the receiver's side effects happen once
        let (place, receiver) = if object.is_lvalue() {
            let place = self.resolve_place(object)?;
            let value = self.scopes.read_place(&place)?;
            (Some(place), value)
        } else {
            (None, self.evaluate_expr(object)?)
        };

        match receiver {
            Value::Str(text) => self.call_string_method(place, text, method, args),
            Value::Struct(instance) => {
                if let Some(class) = libraries::library_class(&instance.name) {
                    return self.call_library_method(class, method, args);
                }
                match instance.field(method) {
                    Some(Value::Function(name)) => {
                        let name = name.clone();
                        self.execute_function_call(&name, args)
                    }
                    Some(other) => Err(RuntimeError::type_error("function", other.type_name())),
                    None => Err(RuntimeError::MissingStructField {
                        struct_name: instance.name.clone(),
                        field_name: method.to_string(),
                    }),
                }
            }
            other => Err(RuntimeError::type_error("String or object", other.type_name())),
        }
    }

    fn call_string_method(
        &mut self,
        place: Option<Place>,
        text: String,
        method: &str,
        args: &[AstNode],
    ) -> RuntimeResult<Value> {
        let function = format!("String.{}", method);
        let (min, max) = STRING_METHODS
            .iter()
            .find(|(name, _, _)| *name == method)
            .map(|(_, min, max)| (*min, *max))
            .ok_or_else(|| RuntimeError::UnknownFunction {
                name: function.clone(),
            })?;
        if args.len() < min || args.len() > max {
            return Err(RuntimeError::ArgumentCountMismatch {
                function,
                expected: if args.len() < min { min } else { max },
                got: args.len(),
            });
        }

        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(self.evaluate_expr(arg)?);
        }
        tracing::trace!(method = method, "String method");

        let bytes = text.as_bytes();
        let result = match method {
            "length" => Value::UInt(bytes.len() as u32),

            "charAt" => {
                let i = index_arg(&values[0])?;
                let code = usize::try_from(i).ok().and_then(|i| bytes.get(i));
                Value::Int(code.map_or(0, |&b| b as i8 as i32))
            }

            "setCharAt" => {
                let i = index_arg(&values[0])?;
                let code = index_arg(&values[1])?;
                let mut updated = bytes.to_vec();
                // Out of range writes are ignored
                if let Some(slot) = usize::try_from(i).ok().and_then(|i| updated.get_mut(i)) {
                    *slot = code as u8;
                }
                let updated = String::from_utf8(updated).map_err(|_| {
                    RuntimeError::type_error("ASCII character for String", code.to_string())
                })?;
                self.update_text(place, updated)?;
                Value::Void
            }

            "substring" => {
                let clamp = |v: &Value| -> RuntimeResult<usize> {
                    Ok(index_arg(v)?.clamp(0, bytes.len() as i64) as usize)
                };
                let mut from = clamp(&values[0])?;
                let mut to = match values.get(1) {
                    Some(v) => clamp(v)?,
                    None => bytes.len(),
                };
                if from > to {
                    std::mem::swap(&mut from, &mut to);
                }
                Value::Str(String::from_utf8_lossy(&bytes[from..to]).into_owned())
            }

            "indexOf" | "lastIndexOf" => {
                let needle = self.pattern_arg(&values[0])?;
                let start = match values.get(1) {
                    Some(v) => Some(index_arg(v)?),
                    None => None,
                };
                if method == "indexOf" {
                    let from = start.unwrap_or(0).max(0) as usize;
                    position(find_from(bytes, needle.as_bytes(), from))
                } else {
                    match start {
                        Some(s) if s < 0 => Value::Int(-1),
                        Some(s) => position(rfind_upto(bytes, needle.as_bytes(), s as usize)),
                        None => position(rfind_upto(bytes, needle.as_bytes(), bytes.len())),
                    }
                }
            }

            "startsWith" => Value::Bool(text.starts_with(&self.pattern_arg(&values[0])?)),
            "endsWith" => Value::Bool(text.ends_with(&self.pattern_arg(&values[0])?)),
            "equals" => Value::Bool(text == self.pattern_arg(&values[0])?),

            "toInt" => Value::Int(leading_int(&text)),
            "toFloat" => Value::Float(leading_float(&text)),

            "toLowerCase" => self.update_text(place, text.to_ascii_lowercase())?,
            "toUpperCase" => self.update_text(place, text.to_ascii_uppercase())?,
            "trim" => {
                let trimmed = text.trim_matches(|c: char| c.is_ascii_whitespace()).to_string();
                self.update_text(place, trimmed)?
            }

            "replace" => {
                let find = self.pattern_arg(&values[0])?;
                let with = self.pattern_arg(&values[1])?;
                let replaced = if find.is_empty() {
                    text.clone()
                } else {
                    text.replace(&find, &with)
                };
                self.update_text(place, replaced)?
            }

            _ => {
                return Err(RuntimeError::UnknownFunction { name: function });
            }
        };
        Ok(result)
    }

    /// Text argument: a `String`, a `char[]`, or one character code
    fn pattern_arg(&self, value: &Value) -> RuntimeResult<String> {
        if let Some(text) = self.text_value(value) {
            return Ok(text);
        }
        match value {
            Value::Int(_) | Value::UInt(_) => {
                let code = index_arg(value)? as u8;
                Ok(String::from_utf8_lossy(&[code]).into_owned())
            }
            other => Err(RuntimeError::type_error("String or char", other.type_name())),
        }
    }

    /// Store modified text back into the receiver, when it has storage
    fn update_text(&mut self, place: Option<Place>, text: String) -> RuntimeResult<Value> {
        match place {
            Some(place) => self.store(&place, Value::Str(text)),
            None => Ok(Value::Str(text)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_helpers() {
        assert_eq!(find_from(b"hello", b"l", 0), Some(2));
        assert_eq!(find_from(b"hello", b"l", 3), Some(3));
        assert_eq!(find_from(b"hello", b"z", 0), None);
        assert_eq!(find_from(b"hi", b"", 1), Some(1));
        assert_eq!(rfind_upto(b"hello", b"l", 5), Some(3));
        assert_eq!(rfind_upto(b"hello", b"l", 2), Some(2));
        assert_eq!(rfind_upto(b"hello", b"l", 1), None);
        assert_eq!(rfind_upto(b"hi", b"high", 4), None);
    }

    #[test]
    fn test_numeric_prefixes() {
        assert_eq!(leading_int("  42abc"), 42);
        assert_eq!(leading_int("-17"), -17);
        assert_eq!(leading_int("abc"), 0);
        assert_eq!(leading_float("3.5V"), 3.5);
        assert_eq!(leading_float("-2e2x"), -200.0);
        assert_eq!(leading_float("1e"), 1.0);
        assert_eq!(leading_float("volts"), 0.0);
    }
}
