//! Memory model for the sketch interpreter
//!
//! This module provides the core storage abstractions:
//! - [`value`]: runtime value representation
//! - [`scope`]: global scope, call frames and block scopes
//! - [`pointer`]: address-free pointers and resolved places
//! - [`registry`]: struct and typedef definitions
//!
//! # Type Sizes
//!
//! `sizeof` uses fixed, platform-independent sizes:
//! - `bool`, `char`, `byte`, `int8_t`, `uint8_t`: 1 byte
//! - `int16_t`, `uint16_t`, `word`: 2 bytes
//! - `int`, `long`, `unsigned`, `float`: 4 bytes
//! - `double`: 8 bytes
//! - pointer: 4 bytes (regardless of pointee type)
//! - `struct`: sum of field sizes (no padding or alignment)
//!
//! Values without a declared type are sized by their runtime kind instead,
//! see [`sizeof_value`].

pub mod pointer;
pub mod registry;
pub mod scope;
pub mod value;

use crate::tree::types::{ArrayDim, BaseType, TypeSpec};
use registry::TypeRegistry;
use value::Value;

pub const POINTER_SIZE: usize = 4;

/// Calculate the size of a declared type in bytes
pub fn sizeof_type(t: &TypeSpec, registry: &TypeRegistry) -> usize {
    let t = registry.resolve(t);

    let element_size = if t.pointer_depth > 0 {
        POINTER_SIZE
    } else {
        match &t.base {
            BaseType::Void => 0,
            BaseType::Bool | BaseType::Int8 | BaseType::UInt8 => 1,
            BaseType::Int16 | BaseType::UInt16 => 2,
            BaseType::Int32 | BaseType::UInt32 | BaseType::Float => 4,
            BaseType::Double => 8,
            // Arduino String object: buffer pointer, capacity, length
            BaseType::String => 6,
            BaseType::Struct(name) => registry
                .struct_def(name)
                .map(|def| {
                    def.fields
                        .iter()
                        .map(|f| sizeof_type(&f.field_type, registry))
                        .sum()
                })
                .unwrap_or(0),
            BaseType::Named(_) | BaseType::Auto => 4,
        }
    };

    t.array_dims.iter().fold(element_size, |size, dim| match dim {
        ArrayDim::Fixed(n) => size * n,
        ArrayDim::Named(_) | ArrayDim::Unsized => 0,
    })
}

/// Size of a runtime value, for `sizeof(expr)` on untyped expressions
pub fn sizeof_value(value: &Value) -> usize {
    match value {
        Value::Void => 0,
        Value::Bool(_) => 1,
        Value::Int(_) | Value::UInt(_) => 4,
        Value::Float(_) => 8,
        Value::Str(s) => s.len() + 1, // Terminator
        Value::Array(items) => items.iter().map(sizeof_value).sum(),
        Value::Struct(s) => s.fields.iter().map(|(_, v)| sizeof_value(v)).sum(),
        Value::Pointer(_) | Value::Function(_) => POINTER_SIZE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::ast::{Field, StructDef};

    #[test]
    fn test_primitive_sizes() {
        let registry = TypeRegistry::new();
        let size = |text: &str| sizeof_type(&TypeSpec::parse(text), &registry);
        assert_eq!(size("char"), 1);
        assert_eq!(size("byte"), 1);
        assert_eq!(size("uint16_t"), 2);
        assert_eq!(size("int"), 4);
        assert_eq!(size("unsigned long"), 4);
        assert_eq!(size("double"), 8);
        assert_eq!(size("char*"), POINTER_SIZE);
        assert_eq!(size("int[2][3]"), 24);
    }

    #[test]
    fn test_struct_size_is_field_sum() {
        let mut registry = TypeRegistry::new();
        registry.define_struct(StructDef {
            name: "Reading".to_string(),
            fields: vec![
                Field {
                    name: "pin".to_string(),
                    field_type: TypeSpec::parse("byte"),
                },
                Field {
                    name: "value".to_string(),
                    field_type: TypeSpec::parse("int"),
                },
            ],
        });
        assert_eq!(sizeof_type(&TypeSpec::parse("struct Reading"), &registry), 5);
    }

    #[test]
    fn test_value_sizes() {
        assert_eq!(sizeof_value(&Value::Str("abc".to_string())), 4);
        assert_eq!(
            sizeof_value(&Value::Array(vec![Value::Int(1), Value::Int(2)])),
            8
        );
        assert_eq!(sizeof_value(&Value::Void), 0);
    }
}
