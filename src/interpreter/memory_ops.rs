//! Places, stores and array decay
//!
//! This module resolves lvalue expressions to [`Place`]s and writes through
//! them:
//!
//! - Variables, array elements, struct fields, `p->field` and `*p`
//! - Indexing through pointers (`p[i]` is `*(p + i)`)
//! - Store-time conversion to the declared type of the target
//! - Decay of arrays (and text, in pointer contexts) to element pointers
//!
//! # Declared types of places
//!
//! The type of a place is derived by walking its path from the variable's
//! declared type: an index drops one array dimension (or one level of
//! indirection), a field looks up the struct definition. Stores convert the
//! value to that type, so `byte b[2]; b[0] = 300;` stores 44.

use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::{RuntimeError, RuntimeResult};
use crate::memory::pointer::{PathStep, Place, Pointer};
use crate::memory::value::{c_text, Value};
use crate::tree::ast::{AstNode, UnOp};
use crate::tree::types::{BaseType, TypeSpec};

impl Interpreter {
    /// Resolve an lvalue expression to the storage it denotes
    pub(crate) fn resolve_place(&mut self, expr: &AstNode) -> RuntimeResult<Place> {
        match expr {
            AstNode::Variable(name) => {
                let scope =
                    self.scopes
                        .scope_of(name)
                        .ok_or_else(|| RuntimeError::UndefinedVariable {
                            name: name.clone(),
                        })?;
                Ok(Place::new(scope, name.clone()))
            }

            AstNode::ArrayAccess { array, index } => {
                if array.is_lvalue() {
                    let base = self.resolve_place(array)?;
                    let idx = self.evaluate_index(index)?;
                    self.element_place(base, idx)
                } else {
                    let target = self.evaluate_decayed(array)?;
                    let idx = self.evaluate_index(index)?;
                    match target {
                        Value::Pointer(p) => p.offset_by(idx).resolve(&self.scopes),
                        other => Err(RuntimeError::NotAssignable {
                            what: format!("element of {}", other.type_name()),
                        }),
                    }
                }
            }

            AstNode::MemberAccess { object, member } => {
                if !object.is_lvalue() {
                    return Err(RuntimeError::NotAssignable {
                        what: format!("member '{}' of {}", member, object.kind_name()),
                    });
                }
                let base = self.resolve_place(object)?;
                self.member_place(base, member)
            }

            AstNode::PointerMemberAccess { object, member } => {
                let pointer = match self.evaluate_expr(object)? {
                    Value::Pointer(p) => p,
                    other => return Err(RuntimeError::type_error("pointer", other.type_name())),
                };
                let base = pointer.resolve(&self.scopes)?;
                self.member_place(base, member)
            }

            AstNode::UnaryOp {
                op: UnOp::Deref,
                operand,
            } => match self.evaluate_decayed(operand)? {
                Value::Pointer(p) => p.resolve(&self.scopes),
                other => Err(RuntimeError::type_error("pointer", other.type_name())),
            },

            other => Err(RuntimeError::NotAssignable {
                what: other.kind_name().to_string(),
            }),
        }
    }

    /// `base[idx]`: element of an array or text, or through a stored pointer
    pub(crate) fn element_place(&mut self, base: Place, idx: i64) -> RuntimeResult<Place> {
        let len = match self.scopes.place_value(&base)? {
            Value::Pointer(p) => {
                let p = p.clone();
                return p.offset_by(idx).resolve(&self.scopes);
            }
            Value::Array(items) => items.len(),
            Value::Str(s) => s.len() + 1,
            other => return Err(RuntimeError::type_error("array or pointer", other.type_name())),
        };
        if idx < 0 || idx as usize >= len {
            return Err(RuntimeError::OutOfBounds {
                index: idx,
                size: len,
            });
        }
        Ok(base.child(PathStep::Index(idx as usize)))
    }

    pub(crate) fn member_place(&self, base: Place, member: &str) -> RuntimeResult<Place> {
        match self.scopes.place_value(&base)? {
            Value::Struct(s) if s.field(member).is_some() => {
                Ok(base.child(PathStep::Field(member.to_string())))
            }
            Value::Struct(s) => Err(RuntimeError::MissingStructField {
                struct_name: s.name.clone(),
                field_name: member.to_string(),
            }),
            other => Err(RuntimeError::type_error("struct", other.type_name())),
        }
    }

    pub(crate) fn evaluate_index(&mut self, index: &AstNode) -> RuntimeResult<i64> {
        let value = self.evaluate_expr(index)?;
        value
            .as_i64()
            .ok_or_else(|| RuntimeError::type_error("integer index", value.type_name()))
    }

    /// Declared type of the storage behind a place
    pub(crate) fn place_type(&self, place: &Place) -> RuntimeResult<TypeSpec> {
        let mut ty = self.types.resolve(self.scopes.place_variable_type(place)?);
        for step in &place.path {
            ty = match step {
                PathStep::Index(_) => ty.element_type(),
                PathStep::Field(field) => match &ty.base {
                    BaseType::Struct(name) if ty.is_struct() => self.types.field_type(name, field)?,
                    _ => TypeSpec::new(BaseType::Auto),
                },
            };
            ty = self.types.resolve(&ty);
        }
        Ok(ty)
    }

    /// Write `value` to `place`, converted to the place's declared type.
    /// Emits `VAR_SET` and returns the stored value.
    pub(crate) fn store(&mut self, place: &Place, value: Value) -> RuntimeResult<Value> {
        let ty = self.place_type(place)?;
        let value = self.convert_for_store(value, &ty);
        self.scopes.write_place(place, value.clone())?;
        self.emit_var_set(place.render(), &value);
        Ok(value)
    }

    /// Evaluate in a pointer context: arrays and text decay to a pointer to
    /// their first element.
    pub(crate) fn evaluate_decayed(&mut self, expr: &AstNode) -> RuntimeResult<Value> {
        self.evaluate_with_decay(expr, true)
    }

    /// Evaluate an arithmetic operand: arrays decay, text stays text so that
    /// `String` concatenation keeps working.
    pub(crate) fn evaluate_operand(&mut self, expr: &AstNode) -> RuntimeResult<Value> {
        self.evaluate_with_decay(expr, false)
    }

    fn evaluate_with_decay(&mut self, expr: &AstNode, decay_text: bool) -> RuntimeResult<Value> {
        if !expr.is_lvalue() {
            return self.evaluate_expr(expr);
        }
        if let AstNode::Variable(name) = expr {
            if self.scopes.lookup(name).is_none() {
                return self.evaluate_expr(expr);
            }
        }

        let place = self.resolve_place(expr)?;
        let decays = match self.scopes.place_value(&place) {
            Ok(Value::Array(_)) => true,
            Ok(Value::Str(_)) => decay_text,
            _ => false,
        };
        if decays {
            let id = self.pointer_ids.next_id();
            return Ok(Value::Pointer(Pointer::element_of(&place, id)));
        }
        self.scopes.read_place(&place)
    }

    /// Text a value stands for: a `String`, a `char[]`, or a pointer into
    /// either, read from the pointed-to character onward
    pub(crate) fn text_value(&self, value: &Value) -> Option<String> {
        match value {
            Value::Str(s) => Some(s.clone()),
            Value::Array(items) => c_text(items),
            Value::Pointer(p) if !p.is_null() => {
                let place = p.resolve(&self.scopes).ok()?;
                let Some((PathStep::Index(start), parent)) = place.path.split_last() else {
                    return None;
                };
                let container = Place {
                    path: parent.to_vec(),
                    ..place.clone()
                };
                match self.scopes.place_value(&container).ok()? {
                    Value::Array(items) => c_text(items.get(*start..)?),
                    Value::Str(s) => s.get(*start..).map(str::to_string),
                    _ => None,
                }
            }
            _ => None,
        }
    }
}
