use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::{RuntimeError, RuntimeResult};
use crate::memory::value::Value;
use crate::tree::ast::AstNode;

fn check_index(index: i64, size: usize) -> RuntimeResult<usize> {
    if index < 0 || index as usize >= size {
        return Err(RuntimeError::OutOfBounds { index, size });
    }
    Ok(index as usize)
}

impl Interpreter {
    /// `array[index]` as an rvalue
    pub(crate) fn evaluate_array_access(
        &mut self,
        array: &AstNode,
        index: &AstNode,
    ) -> RuntimeResult<Value> {
        if array.is_lvalue() {
            let base = self.resolve_place(array)?;
            let idx = self.evaluate_index(index)?;
            let place = self.element_place(base, idx)?;
            return self.scopes.read_place(&place);
        }

        // Temporaries: call results, literals, pointer arithmetic
        let target = self.evaluate_decayed(array)?;
        let idx = self.evaluate_index(index)?;
        match target {
            Value::Array(mut items) => {
                let i = check_index(idx, items.len())?;
                Ok(items.swap_remove(i))
            }
            Value::Str(s) => {
                let i = check_index(idx, s.len() + 1)?;
                Ok(Value::Int(s.as_bytes().get(i).map_or(0, |&b| b as i8 as i32)))
            }
            Value::Pointer(p) => p.offset_by(idx).get(&self.scopes),
            other => Err(RuntimeError::type_error("array or pointer", other.type_name())),
        }
    }

    /// `object.member` as an rvalue
    pub(crate) fn evaluate_member_access(
        &mut self,
        object: &AstNode,
        member: &str,
    ) -> RuntimeResult<Value> {
        if object.is_lvalue() {
            let base = self.resolve_place(object)?;
            let place = self.member_place(base, member)?;
            return self.scopes.read_place(&place);
        }

        match self.evaluate_expr(object)? {
            Value::Struct(s) => {
                s.field(member)
                    .cloned()
                    .ok_or_else(|| RuntimeError::MissingStructField {
                        struct_name: s.name.clone(),
                        field_name: member.to_string(),
                    })
            }
            other => Err(RuntimeError::type_error("struct", other.type_name())),
        }
    }

    /// `object->member` as an rvalue
    pub(crate) fn evaluate_pointer_member(
        &mut self,
        object: &AstNode,
        member: &str,
    ) -> RuntimeResult<Value> {
        let pointer = match self.evaluate_expr(object)? {
            Value::Pointer(p) => p,
            other => return Err(RuntimeError::type_error("pointer", other.type_name())),
        };
        let base = pointer.resolve(&self.scopes)?;
        let place = self.member_place(base, member)?;
        self.scopes.read_place(&place)
    }
}
