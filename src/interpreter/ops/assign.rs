use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::RuntimeResult;
use crate::memory::value::Value;
use crate::tree::ast::{AstNode, BinOp};

impl Interpreter {
    /// `lhs = rhs`, yielding the stored (converted) value
    pub(crate) fn evaluate_assignment(&mut self, lhs: &AstNode, rhs: &AstNode) -> RuntimeResult<Value> {
        let place = self.resolve_place(lhs)?;
        let target_type = self.place_type(&place)?;
        let value = if target_type.is_pointer() {
            self.evaluate_decayed(rhs)?
        } else {
            self.evaluate_expr(rhs)?
        };
        self.store(&place, value)
    }

    /// `lhs op= rhs`. The target is resolved once.
    pub(crate) fn evaluate_compound_assignment(
        &mut self,
        lhs: &AstNode,
        op: BinOp,
        rhs: &AstNode,
    ) -> RuntimeResult<Value> {
        let place = self.resolve_place(lhs)?;
        let old = self.scopes.read_place(&place)?;
        let operand = self.evaluate_operand(rhs)?;
        let new = self.binary_arith(op, old, operand)?;
        self.store(&place, new)
    }
}
