//! Wire encoding of runtime values
//!
//! | Value              | JSON                                                          |
//! |--------------------|---------------------------------------------------------------|
//! | absent             | `null`                                                        |
//! | int/unsigned/float | number                                                        |
//! | bool               | `true` / `false`                                              |
//! | text               | string                                                        |
//! | sequence           | array (nested for multi-dimensional arrays)                   |
//! | struct             | `{"struct": name, "fields": {field: value, ...}}`, field order kept |
//! | pointer            | `{"pointer": {"target", "path", "offset", "id"}}`, or `{"pointer": null}` |
//! | function reference | `{"function": name}`                                          |

use crate::memory::pointer::{PathStep, Pointer};
use crate::memory::value::Value;
use serde::ser::{SerializeMap, SerializeSeq, Serializer};
use serde::Serialize;

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Void => serializer.serialize_none(),
            Value::Int(n) => serializer.serialize_i32(*n),
            Value::UInt(n) => serializer.serialize_u32(*n),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Str(s) => serializer.serialize_str(s),
            Value::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Struct(s) => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("struct", &s.name)?;
                map.serialize_entry("fields", &OrderedFields(&s.fields))?;
                map.end()
            }
            Value::Pointer(p) => {
                let mut map = serializer.serialize_map(Some(1))?;
                if p.is_null() {
                    map.serialize_entry("pointer", &None::<()>)?;
                } else {
                    map.serialize_entry("pointer", &PointerFields(p))?;
                }
                map.end()
            }
            Value::Function(name) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("function", name)?;
                map.end()
            }
        }
    }
}

struct OrderedFields<'a>(&'a [(String, Value)]);

impl Serialize for OrderedFields<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

struct PointerFields<'a>(&'a Pointer);

impl Serialize for PointerFields<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let p = self.0;
        let mut map = serializer.serialize_map(Some(4))?;
        map.serialize_entry("target", &p.target)?;
        map.serialize_entry("path", &p.path)?;
        map.serialize_entry("offset", &p.offset)?;
        map.serialize_entry("id", &p.id)?;
        map.end()
    }
}

/// Indices as numbers, field names as strings
impl Serialize for PathStep {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PathStep::Index(i) => serializer.serialize_u64(*i as u64),
            PathStep::Field(f) => serializer.serialize_str(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::pointer::Place;
    use crate::memory::scope::ScopeId;
    use crate::memory::value::StructValue;
    use serde_json::json;

    fn wire(value: &Value) -> serde_json::Value {
        serde_json::to_value(value).unwrap()
    }

    #[test]
    fn test_scalars() {
        assert_eq!(wire(&Value::Void), json!(null));
        assert_eq!(wire(&Value::Int(-3)), json!(-3));
        assert_eq!(wire(&Value::UInt(u32::MAX)), json!(4294967295u64));
        assert_eq!(wire(&Value::Bool(true)), json!(true));
        assert_eq!(wire(&Value::Str("hi".to_string())), json!("hi"));
    }

    #[test]
    fn test_nested_arrays_keep_shape() {
        let m = Value::Array(vec![
            Value::Array(vec![Value::Int(1), Value::Int(2)]),
            Value::Array(vec![Value::Int(3), Value::Int(4)]),
        ]);
        assert_eq!(wire(&m), json!([[1, 2], [3, 4]]));
    }

    #[test]
    fn test_struct_field_order_is_kept() {
        let mut s = StructValue::new("Point");
        s.fields.push(("y".to_string(), Value::Int(2)));
        s.fields.push(("x".to_string(), Value::Void));
        let text = serde_json::to_string(&Value::Struct(s)).unwrap();
        assert_eq!(text, r#"{"struct":"Point","fields":{"y":2,"x":null}}"#);
    }

    #[test]
    fn test_pointer_encoding() {
        let place = Place::new(ScopeId(2), "grid")
            .child(PathStep::Index(1))
            .child(PathStep::Index(2));
        let p = Pointer::from_place(&place, 7);
        assert_eq!(
            wire(&Value::Pointer(p)),
            json!({"pointer": {"target": "grid", "path": [1], "offset": 2, "id": 7}})
        );
        assert_eq!(
            wire(&Value::Pointer(Pointer::null())),
            json!({"pointer": null})
        );
        assert_eq!(
            wire(&Value::Function("blink".to_string())),
            json!({"function": "blink"})
        );
    }
}
