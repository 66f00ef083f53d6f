//! Runtime value representation
//!
//! This module defines the [`Value`] enum, which represents every runtime value
//! a sketch can produce. Values are tagged; exactly one variant is active.
//!
//! # Value Types
//!
//! - [`Value::Void`]: absent value (uninitialized struct fields, `void` calls, failed evaluation)
//! - [`Value::Int`]: 32-bit signed integer, also used for `char`, `int8_t`, `int16_t`
//! - [`Value::UInt`]: 32-bit unsigned integer, also used for `byte`, `uint16_t`
//! - [`Value::Float`]: 64-bit float for `float` and `double`
//! - [`Value::Bool`]: boolean
//! - [`Value::Str`]: text (Arduino `String`, string literals)
//! - [`Value::Array`]: ordered sequence; multi-dimensional arrays nest. A
//!   `char[]` is a sequence of character codes ending in a terminator
//! - [`Value::Struct`]: named aggregate with ordered fields
//! - [`Value::Pointer`]: reference descriptor, see [`super::pointer`]
//! - [`Value::Function`]: reference to a user function by name
//!
//! # Width conversion
//!
//! [`Value::coerce_to`] converts a value into the storage kind of a declared
//! base type, wrapping integers to the declared width.

use super::pointer::Pointer;
use crate::tree::types::BaseType;
use std::fmt;

/// Runtime values in the interpreter
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Void,
    Int(i32),
    UInt(u32),
    Float(f64),
    Bool(bool),
    Str(String),
    Array(Vec<Value>),
    Struct(StructValue),
    Pointer(Pointer),
    Function(String),
}

/// Struct instance: type name plus fields in declaration order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StructValue {
    pub name: String,
    pub fields: Vec<(String, Value)>,
}

impl StructValue {
    pub fn new(name: impl Into<String>) -> Self {
        StructValue {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn field_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.fields
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }
}

impl Value {
    pub fn is_void(&self) -> bool {
        matches!(self, Value::Void)
    }

    /// Integer view of a scalar. Floats truncate toward zero, booleans are 0/1.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n as i64),
            Value::UInt(n) => Some(*n as i64),
            Value::Bool(b) => Some(*b as i64),
            Value::Float(f) => Some(f.trunc() as i64),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            other => other.as_i64().map(|n| n as f64),
        }
    }

    /// C truthiness. `None` for values that have no truth value.
    pub fn truthy(&self) -> Option<bool> {
        match self {
            Value::Int(n) => Some(*n != 0),
            Value::UInt(n) => Some(*n != 0),
            Value::Float(f) => Some(*f != 0.0),
            Value::Bool(b) => Some(*b),
            Value::Pointer(p) => Some(!p.is_null()),
            Value::Str(_) | Value::Array(_) | Value::Function(_) => Some(true),
            Value::Void | Value::Struct(_) => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Void => "void",
            Value::Int(_) => "int",
            Value::UInt(_) => "unsigned",
            Value::Float(_) => "float",
            Value::Bool(_) => "bool",
            Value::Str(_) => "String",
            Value::Array(_) => "array",
            Value::Struct(_) => "struct",
            Value::Pointer(_) => "pointer",
            Value::Function(_) => "function",
        }
    }

    /// Convert into the storage kind of `base`, wrapping integers to the
    /// declared width. Aggregates, pointers and text pass through unchanged
    /// unless the target is `String` or `bool`.
    pub fn coerce_to(self, base: &BaseType) -> Value {
        match base {
            BaseType::Bool => match self.truthy() {
                Some(b) => Value::Bool(b),
                None => self,
            },
            BaseType::String => match self {
                Value::Str(_) | Value::Void => self,
                Value::Array(items) => match c_text(&items) {
                    Some(text) => Value::Str(text),
                    None => Value::Str(Value::Array(items).to_string()),
                },
                other => Value::Str(other.to_string()),
            },
            BaseType::Float | BaseType::Double => match self.as_f64() {
                Some(f) => Value::Float(f),
                None => self,
            },
            base if base.is_integer() => match self.as_i64() {
                Some(n) => wrap_integer(n, base),
                None => self,
            },
            _ => self,
        }
    }
}

/// Text held in a sequence of character codes, up to the first terminator.
/// `None` when an element is not an integer.
pub fn c_text(items: &[Value]) -> Option<String> {
    let mut bytes = Vec::with_capacity(items.len());
    for item in items {
        let code = match item {
            Value::Int(_) | Value::UInt(_) => item.as_i64()?,
            _ => return None,
        };
        if code == 0 {
            break;
        }
        bytes.push(code as u8);
    }
    Some(String::from_utf8_lossy(&bytes).into_owned())
}

fn wrap_integer(n: i64, base: &BaseType) -> Value {
    match base {
        BaseType::Int8 => Value::Int(n as i8 as i32),
        BaseType::UInt8 => Value::UInt(n as u8 as u32),
        BaseType::Int16 => Value::Int(n as i16 as i32),
        BaseType::UInt16 => Value::UInt(n as u16 as u32),
        BaseType::UInt32 => Value::UInt(n as u32),
        _ => Value::Int(n as i32),
    }
}

/// Text rendering used by `Serial.print` and `String` concatenation
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Void => Ok(()),
            Value::Int(n) => write!(f, "{}", n),
            Value::UInt(n) => write!(f, "{}", n),
            Value::Float(x) => write!(f, "{:.2}", x),
            Value::Bool(b) => write!(f, "{}", *b as i32),
            Value::Str(s) => write!(f, "{}", s),
            Value::Array(items) => {
                write!(f, "{{")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "}}")
            }
            Value::Struct(s) => {
                write!(f, "{} {{", s.name)?;
                for (i, (name, value)) in s.fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", name, value)?;
                }
                write!(f, "}}")
            }
            Value::Pointer(p) => write!(f, "{}", p),
            Value::Function(name) => write!(f, "{}", name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_codes_read_as_text() {
        let codes = vec![Value::Int(104), Value::Int(105), Value::Int(0), Value::Int(33)];
        assert_eq!(c_text(&codes), Some("hi".to_string()));
        assert_eq!(
            Value::Array(codes).coerce_to(&BaseType::String),
            Value::Str("hi".to_string())
        );
        assert_eq!(c_text(&[Value::Float(1.0)]), None);
    }

    #[test]
    fn test_coerce_wraps_to_width() {
        assert_eq!(Value::Int(256).coerce_to(&BaseType::UInt8), Value::UInt(0));
        assert_eq!(Value::Int(-1).coerce_to(&BaseType::UInt8), Value::UInt(255));
        assert_eq!(Value::Int(65536).coerce_to(&BaseType::UInt16), Value::UInt(0));
        assert_eq!(
            Value::Int(-1).coerce_to(&BaseType::UInt32),
            Value::UInt(u32::MAX)
        );
        assert_eq!(Value::Int(128).coerce_to(&BaseType::Int8), Value::Int(-128));
        assert_eq!(
            Value::UInt(u32::MAX).coerce_to(&BaseType::Int32),
            Value::Int(-1)
        );
    }

    #[test]
    fn test_coerce_float_and_bool() {
        assert_eq!(Value::Float(3.9).coerce_to(&BaseType::Int32), Value::Int(3));
        assert_eq!(Value::Int(2).coerce_to(&BaseType::Float), Value::Float(2.0));
        assert_eq!(Value::Int(7).coerce_to(&BaseType::Bool), Value::Bool(true));
        assert_eq!(
            Value::Int(42).coerce_to(&BaseType::String),
            Value::Str("42".to_string())
        );
    }

    #[test]
    fn test_struct_field_lookup() {
        let mut s = StructValue::new("Point");
        s.fields.push(("x".to_string(), Value::Void));
        s.fields.push(("y".to_string(), Value::Int(2)));
        assert_eq!(s.field("y"), Some(&Value::Int(2)));
        *s.field_mut("x").unwrap() = Value::Int(1);
        assert_eq!(s.field("x"), Some(&Value::Int(1)));
        assert!(s.field("z").is_none());
    }
}
