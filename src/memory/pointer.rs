//! Pointers without addresses
//!
//! A [`Pointer`] names its target instead of holding an address: the target
//! variable, the scope that owns it, an optional field/index path into the
//! variable's value, and an element offset. Dereferencing resolves the
//! descriptor through the [`ScopeManager`] on every access, so a pointer whose
//! scope has been popped resolves to nothing and is reported as a dangling
//! dereference instead of reading stale storage.
//!
//! # Resolution
//!
//! ```text
//! (target, scope, path, offset)
//!   → variable `target` in `scope`
//!   → walk `path` through struct fields / array elements
//!   → array or text at that point: element `offset`
//!     anything else:               offset must be 0
//! ```
//!
//! [`Place`] is the resolved form: a variable plus a full path. Assignments
//! and reads of lvalues go through places; `&place` turns one back into a
//! pointer.

use super::scope::{ScopeId, ScopeManager};
use super::value::Value;
use crate::interpreter::errors::{RuntimeError, RuntimeResult};
use std::fmt;

/// One step from a variable's value into a nested element
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathStep {
    Index(usize),
    Field(String),
}

/// A resolved storage location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Place {
    pub scope: ScopeId,
    pub name: String,
    pub path: Vec<PathStep>,
}

impl Place {
    pub fn new(scope: ScopeId, name: impl Into<String>) -> Self {
        Place {
            scope,
            name: name.into(),
            path: Vec::new(),
        }
    }

    pub fn child(&self, step: PathStep) -> Place {
        let mut place = self.clone();
        place.path.push(step);
        place
    }

    /// Source-like rendering used in `VAR_SET` records, e.g. `m[1][2]`, `p.x`
    pub fn render(&self) -> String {
        let mut out = self.name.clone();
        push_path(&mut out, &self.path);
        out
    }
}

fn push_path(out: &mut String, path: &[PathStep]) {
    for step in path {
        match step {
            PathStep::Index(i) => out.push_str(&format!("[{}]", i)),
            PathStep::Field(f) => {
                out.push('.');
                out.push_str(f);
            }
        }
    }
}

/// Hands out pointer identities
#[derive(Debug, Clone)]
pub struct PointerIds {
    next: u64,
}

impl Default for PointerIds {
    fn default() -> Self {
        PointerIds { next: 1 }
    }
}

impl PointerIds {
    pub fn next_id(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }
}

/// Reference descriptor: (target, owning scope, path prefix, offset)
#[derive(Debug, Clone)]
pub struct Pointer {
    pub target: String,
    pub scope: ScopeId,
    pub path: Vec<PathStep>,
    pub offset: i32,
    pub id: u64,
}

/// Pointers compare by what they reference; `id` is identity for tracing only
impl PartialEq for Pointer {
    fn eq(&self, other: &Self) -> bool {
        self.same_object(other) && self.offset == other.offset
    }
}

impl Pointer {
    pub fn null() -> Self {
        Pointer {
            target: String::new(),
            scope: ScopeId::default(),
            path: Vec::new(),
            offset: 0,
            id: 0,
        }
    }

    pub fn is_null(&self) -> bool {
        self.target.is_empty()
    }

    /// `&place`: a trailing index becomes the offset so arithmetic can move
    /// across the enclosing array.
    pub fn from_place(place: &Place, id: u64) -> Self {
        let mut path = place.path.clone();
        let offset = match path.last() {
            Some(PathStep::Index(i)) => {
                let i = *i as i32;
                path.pop();
                i
            }
            _ => 0,
        };
        Pointer {
            target: place.name.clone(),
            scope: place.scope,
            path,
            offset,
            id,
        }
    }

    /// Pointer to the first element of the array (or text) stored at `place`
    pub fn element_of(place: &Place, id: u64) -> Self {
        Pointer {
            target: place.name.clone(),
            scope: place.scope,
            path: place.path.clone(),
            offset: 0,
            id,
        }
    }

    /// Same target, moved by `n` elements, without taking a new identity
    pub(crate) fn offset_by(&self, n: i64) -> Pointer {
        Pointer {
            offset: (self.offset as i64).wrapping_add(n) as i32,
            ..self.clone()
        }
    }

    /// Whether both pointers reference the same variable and sub-object
    pub fn same_object(&self, other: &Pointer) -> bool {
        self.target == other.target && self.scope == other.scope && self.path == other.path
    }

    /// `p + n`, returning a fresh pointer
    pub fn add(&self, n: i32, ids: &mut PointerIds) -> Pointer {
        Pointer {
            offset: self.offset.wrapping_add(n),
            id: ids.next_id(),
            ..self.clone()
        }
    }

    /// `p - n`, returning a fresh pointer
    pub fn subtract(&self, n: i32, ids: &mut PointerIds) -> Pointer {
        self.add(n.wrapping_neg(), ids)
    }

    /// Resolve to a concrete place, checking liveness and bounds
    pub fn resolve(&self, scopes: &ScopeManager) -> RuntimeResult<Place> {
        if self.is_null() {
            return Err(RuntimeError::NullDereference);
        }
        let var = scopes
            .variable_in(self.scope, &self.target)
            .ok_or_else(|| RuntimeError::DanglingPointer {
                target: self.target.clone(),
            })?;

        let base = value_at(&var.value, &self.path)?;
        let mut place = Place {
            scope: self.scope,
            name: self.target.clone(),
            path: self.path.clone(),
        };

        let len = match base {
            Value::Array(items) => Some(items.len()),
            // Text keeps its terminator addressable
            Value::Str(s) => Some(s.len() + 1),
            _ => None,
        };
        match len {
            Some(len) => {
                if self.offset < 0 || self.offset as usize >= len {
                    return Err(RuntimeError::OutOfBounds {
                        index: self.offset as i64,
                        size: len,
                    });
                }
                place.path.push(PathStep::Index(self.offset as usize));
            }
            None if self.offset != 0 => {
                return Err(RuntimeError::OutOfBounds {
                    index: self.offset as i64,
                    size: 1,
                })
            }
            None => {}
        }
        Ok(place)
    }

    /// `*p`
    pub fn get(&self, scopes: &ScopeManager) -> RuntimeResult<Value> {
        let place = self.resolve(scopes)?;
        scopes.read_place(&place)
    }

    /// `*p = value`; returns the place written so callers can trace it
    pub fn set(&self, scopes: &mut ScopeManager, value: Value) -> RuntimeResult<Place> {
        let place = self.resolve(scopes)?;
        scopes.write_place(&place, value)?;
        Ok(place)
    }
}

impl fmt::Display for Pointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            return write!(f, "NULL");
        }
        let mut out = format!("&{}", self.target);
        push_path(&mut out, &self.path);
        if self.offset != 0 {
            out.push_str(&format!("+{}", self.offset));
        }
        write!(f, "{}", out)
    }
}

fn step_into<'a>(value: &'a Value, step: &PathStep) -> RuntimeResult<&'a Value> {
    match (value, step) {
        (Value::Array(items), PathStep::Index(i)) => {
            items.get(*i).ok_or(RuntimeError::OutOfBounds {
                index: *i as i64,
                size: items.len(),
            })
        }
        (Value::Struct(s), PathStep::Field(f)) => {
            s.field(f).ok_or_else(|| RuntimeError::MissingStructField {
                struct_name: s.name.clone(),
                field_name: f.clone(),
            })
        }
        (other, PathStep::Index(_)) => Err(RuntimeError::type_error("array", other.type_name())),
        (other, PathStep::Field(_)) => Err(RuntimeError::type_error("struct", other.type_name())),
    }
}

fn step_into_mut<'a>(value: &'a mut Value, step: &PathStep) -> RuntimeResult<&'a mut Value> {
    match (value, step) {
        (Value::Array(items), PathStep::Index(i)) => {
            let size = items.len();
            items.get_mut(*i).ok_or(RuntimeError::OutOfBounds {
                index: *i as i64,
                size,
            })
        }
        (Value::Struct(s), PathStep::Field(f)) => {
            let struct_name = s.name.clone();
            s.field_mut(f).ok_or_else(|| RuntimeError::MissingStructField {
                struct_name,
                field_name: f.clone(),
            })
        }
        (other, PathStep::Index(_)) => Err(RuntimeError::type_error("array", other.type_name())),
        (other, PathStep::Field(_)) => Err(RuntimeError::type_error("struct", other.type_name())),
    }
}

pub(crate) fn value_at<'a>(mut value: &'a Value, path: &[PathStep]) -> RuntimeResult<&'a Value> {
    for step in path {
        value = step_into(value, step)?;
    }
    Ok(value)
}

fn value_at_mut<'a>(mut value: &'a mut Value, path: &[PathStep]) -> RuntimeResult<&'a mut Value> {
    for step in path {
        value = step_into_mut(value, step)?;
    }
    Ok(value)
}

/// Read through a path. Indexing text yields the character code, with the
/// position one past the end reading as the terminator.
pub(crate) fn read_path(root: &Value, path: &[PathStep]) -> RuntimeResult<Value> {
    if let Some((PathStep::Index(i), parent)) = path.split_last() {
        if let Value::Str(s) = value_at(root, parent)? {
            return char_at(s, *i);
        }
    }
    value_at(root, path).cloned()
}

pub(crate) fn write_path(root: &mut Value, path: &[PathStep], value: Value) -> RuntimeResult<()> {
    match path.split_last() {
        Some((PathStep::Index(i), parent)) => match value_at_mut(root, parent)? {
            Value::Str(s) => set_char(s, *i, &value),
            container => {
                *step_into_mut(container, &PathStep::Index(*i))? = value;
                Ok(())
            }
        },
        _ => {
            *value_at_mut(root, path)? = value;
            Ok(())
        }
    }
}

fn char_at(s: &str, index: usize) -> RuntimeResult<Value> {
    let bytes = s.as_bytes();
    match index.cmp(&bytes.len()) {
        std::cmp::Ordering::Less => Ok(Value::Int(bytes[index] as i8 as i32)),
        std::cmp::Ordering::Equal => Ok(Value::Int(0)),
        std::cmp::Ordering::Greater => Err(RuntimeError::OutOfBounds {
            index: index as i64,
            size: bytes.len() + 1,
        }),
    }
}

/// Character write into a `String`. A NUL truncates; bytes that would leave
/// the text invalid UTF-8 are rejected without touching it.
fn set_char(s: &mut String, index: usize, value: &Value) -> RuntimeResult<()> {
    let code = value
        .as_i64()
        .ok_or_else(|| RuntimeError::type_error("char", value.type_name()))?;
    let mut bytes = s.as_bytes().to_vec();
    match index.cmp(&bytes.len()) {
        std::cmp::Ordering::Less if code == 0 => bytes.truncate(index),
        std::cmp::Ordering::Less => bytes[index] = code as u8,
        std::cmp::Ordering::Equal if code != 0 => bytes.push(code as u8),
        std::cmp::Ordering::Equal => {}
        std::cmp::Ordering::Greater => {
            return Err(RuntimeError::OutOfBounds {
                index: index as i64,
                size: bytes.len() + 1,
            });
        }
    }
    *s = String::from_utf8(bytes)
        .map_err(|_| RuntimeError::type_error("ASCII character for String", code.to_string()))?;
    Ok(())
}
