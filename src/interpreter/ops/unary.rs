use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::{RuntimeError, RuntimeResult};
use crate::memory::pointer::Pointer;
use crate::memory::value::Value;
use crate::tree::ast::{AstNode, BinOp, UnOp};

impl Interpreter {
    pub(crate) fn evaluate_unary(&mut self, op: UnOp, operand: &AstNode) -> RuntimeResult<Value> {
        match op {
            UnOp::Neg => match self.evaluate_operand(operand)? {
                Value::Int(n) => Ok(Value::Int(n.wrapping_neg())),
                Value::UInt(n) => Ok(Value::UInt(n.wrapping_neg())),
                Value::Float(f) => Ok(Value::Float(-f)),
                Value::Bool(b) => Ok(Value::Int(-(b as i32))),
                other => Err(RuntimeError::type_error("number", other.type_name())),
            },

            UnOp::Plus => match self.evaluate_operand(operand)? {
                Value::Bool(b) => Ok(Value::Int(b as i32)),
                v @ (Value::Int(_) | Value::UInt(_) | Value::Float(_)) => Ok(v),
                other => Err(RuntimeError::type_error("number", other.type_name())),
            },

            UnOp::Not => {
                let value = self.evaluate_operand(operand)?;
                match value.truthy() {
                    Some(b) => Ok(Value::Bool(!b)),
                    None => Err(RuntimeError::type_error("scalar", value.type_name())),
                }
            }

            UnOp::BitNot => match self.evaluate_operand(operand)? {
                Value::Int(n) => Ok(Value::Int(!n)),
                Value::UInt(n) => Ok(Value::UInt(!n)),
                Value::Bool(b) => Ok(Value::Int(!(b as i32))),
                other => Err(RuntimeError::type_error("integer", other.type_name())),
            },

            UnOp::Deref => match self.evaluate_decayed(operand)? {
                Value::Pointer(p) => p.get(&self.scopes),
                // `(*fp)(x)` calls through a function reference
                Value::Function(name) => Ok(Value::Function(name)),
                other => Err(RuntimeError::type_error("pointer", other.type_name())),
            },

            UnOp::AddrOf => self.address_of(operand),

            UnOp::PreInc | UnOp::PreDec | UnOp::PostInc | UnOp::PostDec => {
                self.step_in_place(op, operand)
            }
        }
    }

    fn address_of(&mut self, operand: &AstNode) -> RuntimeResult<Value> {
        if let AstNode::Variable(name) = operand {
            if self.scopes.lookup(name).is_none() && self.functions.contains_key(name) {
                return Ok(Value::Function(name.clone()));
            }
        }
        let place = self.resolve_place(operand)?;
        let id = self.pointer_ids.next_id();
        Ok(Value::Pointer(Pointer::from_place(&place, id)))
    }

    /// `++x`, `--x`, `x++`, `x--`
    ///
    /// The new value is narrowed to the declared type by `store`, so unsigned
    /// and narrow variables wrap at their own width.
    fn step_in_place(&mut self, op: UnOp, operand: &AstNode) -> RuntimeResult<Value> {
        let place = self.resolve_place(operand)?;
        let old = self.scopes.read_place(&place)?;
        let increment = matches!(op, UnOp::PreInc | UnOp::PostInc);

        let new = match &old {
            Value::Pointer(p) if increment => Value::Pointer(p.add(1, &mut self.pointer_ids)),
            Value::Pointer(p) => Value::Pointer(p.subtract(1, &mut self.pointer_ids)),
            _ => {
                let step = if increment { BinOp::Add } else { BinOp::Sub };
                self.binary_arith(step, old.clone(), Value::Int(1))?
            }
        };

        let stored = self.store(&place, new)?;
        match op {
            UnOp::PreInc | UnOp::PreDec => Ok(stored),
            _ => Ok(old),
        }
    }
}
