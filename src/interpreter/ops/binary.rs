use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::{RuntimeError, RuntimeResult};
use crate::memory::pointer::Pointer;
use crate::memory::value::Value;
use crate::tree::ast::{AstNode, BinOp};
use std::cmp::Ordering;

/// Outcome of a comparison operator, or `None` for non-comparisons
#[inline]
fn compare(op: BinOp, ordering: Option<Ordering>) -> Option<bool> {
    let ordering = ordering?;
    let result = match op {
        BinOp::Eq => ordering == Ordering::Equal,
        BinOp::Ne => ordering != Ordering::Equal,
        BinOp::Lt => ordering == Ordering::Less,
        BinOp::Le => ordering != Ordering::Greater,
        BinOp::Gt => ordering == Ordering::Greater,
        BinOp::Ge => ordering != Ordering::Less,
        _ => return None,
    };
    Some(result)
}

fn is_comparison(op: BinOp) -> bool {
    matches!(
        op,
        BinOp::Eq | BinOp::Ne | BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge
    )
}

fn operands_error(op: BinOp, left: &Value, right: &Value) -> RuntimeError {
    RuntimeError::type_error(
        &format!("operands for '{}'", op.symbol()),
        format!("{} and {}", left.type_name(), right.type_name()),
    )
}

fn division_by_zero(op: BinOp) -> RuntimeError {
    let operation = if op == BinOp::Mod { "Modulo" } else { "Division" };
    RuntimeError::DivisionByZero {
        operation: operation.to_string(),
    }
}

fn truth(value: &Value) -> RuntimeResult<bool> {
    value
        .truthy()
        .ok_or_else(|| RuntimeError::type_error("scalar operand", value.type_name()))
}

impl Interpreter {
    pub(crate) fn evaluate_binary(
        &mut self,
        op: BinOp,
        left: &AstNode,
        right: &AstNode,
    ) -> RuntimeResult<Value> {
        match op {
            BinOp::And | BinOp::Or => {
                let l = truth(&self.evaluate_operand(left)?)?;
                // Short-circuit
                if (op == BinOp::And && !l) || (op == BinOp::Or && l) {
                    return Ok(Value::Bool(l));
                }
                let r = truth(&self.evaluate_operand(right)?)?;
                Ok(Value::Bool(r))
            }
            _ => {
                let l = self.evaluate_operand(left)?;
                let r = self.evaluate_operand(right)?;
                self.binary_arith(op, l, r)
            }
        }
    }

    /// Apply a non-logical binary operator to two evaluated operands.
    ///
    /// Integer arithmetic wraps at 32 bits; the result is unsigned when
    /// either operand is. Stores narrow the result to the declared width.
    pub(crate) fn binary_arith(&mut self, op: BinOp, left: Value, right: Value) -> RuntimeResult<Value> {
        if left.is_void() || right.is_void() {
            return Err(operands_error(op, &left, &right));
        }

        // `String` concatenation reads `char[]` operands as text
        let concatenates = op == BinOp::Add
            && (matches!(left, Value::Str(_)) || matches!(right, Value::Str(_)));
        if concatenates {
            let text = |v: &Value| self.text_value(v).unwrap_or_else(|| v.to_string());
            return Ok(Value::Str(text(&left) + &text(&right)));
        }

        match (&left, &right) {
            (Value::Pointer(p), Value::Pointer(q)) => return self.pointer_pair(op, p, q),
            (Value::Pointer(p), other) => return self.pointer_scalar(op, p, other, false),
            (other, Value::Pointer(p)) => return self.pointer_scalar(op, p, other, true),
            _ => {}
        }

        match (&left, &right) {
            (Value::Str(a), Value::Str(b)) if is_comparison(op) => {
                return Ok(Value::Bool(compare(op, Some(a.cmp(b))).unwrap_or(false)));
            }
            (Value::Str(_), _) | (_, Value::Str(_)) => {
                return Err(operands_error(op, &left, &right));
            }
            _ => {}
        }

        if matches!(left, Value::Float(_)) || matches!(right, Value::Float(_)) {
            return float_arith(op, &left, &right);
        }

        let (Some(a), Some(b)) = (left.as_i64(), right.as_i64()) else {
            return Err(operands_error(op, &left, &right));
        };
        if matches!(left, Value::UInt(_)) || matches!(right, Value::UInt(_)) {
            unsigned_arith(op, a as u32, b as u32)
        } else {
            signed_arith(op, a as i32, b as i32)
        }
    }

    fn pointer_pair(&mut self, op: BinOp, p: &Pointer, q: &Pointer) -> RuntimeResult<Value> {
        match op {
            BinOp::Eq => Ok(Value::Bool(p == q)),
            BinOp::Ne => Ok(Value::Bool(p != q)),
            BinOp::Sub if p.same_object(q) => Ok(Value::Int(p.offset.wrapping_sub(q.offset))),
            _ if is_comparison(op) && p.same_object(q) => Ok(Value::Bool(
                compare(op, Some(p.offset.cmp(&q.offset))).unwrap_or(false),
            )),
            _ => Err(RuntimeError::type_error(
                &format!("pointers into the same object for '{}'", op.symbol()),
                format!("{} and {}", p, q),
            )),
        }
    }

    /// `p + n`, `n + p`, `p - n`, and comparisons against the null constant
    fn pointer_scalar(
        &mut self,
        op: BinOp,
        p: &Pointer,
        other: &Value,
        pointer_on_right: bool,
    ) -> RuntimeResult<Value> {
        let n = match other {
            Value::Int(_) | Value::UInt(_) | Value::Bool(_) => other.as_i64().unwrap_or(0),
            _ => {
                return Err(RuntimeError::type_error(
                    "integer offset",
                    other.type_name(),
                ))
            }
        };
        match op {
            BinOp::Add => Ok(Value::Pointer(p.add(n as i32, &mut self.pointer_ids))),
            BinOp::Sub if !pointer_on_right => {
                Ok(Value::Pointer(p.subtract(n as i32, &mut self.pointer_ids)))
            }
            BinOp::Eq => Ok(Value::Bool(n == 0 && p.is_null())),
            BinOp::Ne => Ok(Value::Bool(!(n == 0 && p.is_null()))),
            _ => Err(RuntimeError::type_error(
                &format!("pointer operands for '{}'", op.symbol()),
                other.type_name(),
            )),
        }
    }
}

fn float_arith(op: BinOp, left: &Value, right: &Value) -> RuntimeResult<Value> {
    let (Some(a), Some(b)) = (left.as_f64(), right.as_f64()) else {
        return Err(operands_error(op, left, right));
    };
    if let Some(result) = compare(op, a.partial_cmp(&b)) {
        return Ok(Value::Bool(result));
    }
    let value = match op {
        BinOp::Add => a + b,
        BinOp::Sub => a - b,
        BinOp::Mul => a * b,
        BinOp::Div | BinOp::Mod if b == 0.0 => return Err(division_by_zero(op)),
        BinOp::Div => a / b,
        BinOp::Mod => a % b,
        // NaN operands compare false
        _ if is_comparison(op) => return Ok(Value::Bool(op == BinOp::Ne)),
        _ => return Err(operands_error(op, left, right)),
    };
    Ok(Value::Float(value))
}

fn signed_arith(op: BinOp, a: i32, b: i32) -> RuntimeResult<Value> {
    if let Some(result) = compare(op, Some(a.cmp(&b))) {
        return Ok(Value::Bool(result));
    }
    let value = match op {
        BinOp::Add => a.wrapping_add(b),
        BinOp::Sub => a.wrapping_sub(b),
        BinOp::Mul => a.wrapping_mul(b),
        BinOp::Div | BinOp::Mod if b == 0 => return Err(division_by_zero(op)),
        BinOp::Div => a.wrapping_div(b),
        BinOp::Mod => a.wrapping_rem(b),
        BinOp::BitAnd => a & b,
        BinOp::BitOr => a | b,
        BinOp::BitXor => a ^ b,
        BinOp::BitShl => a.wrapping_shl(b as u32),
        BinOp::BitShr => a.wrapping_shr(b as u32),
        _ => {
            return Err(RuntimeError::type_error(
                "arithmetic operator",
                op.symbol(),
            ))
        }
    };
    Ok(Value::Int(value))
}

fn unsigned_arith(op: BinOp, a: u32, b: u32) -> RuntimeResult<Value> {
    if let Some(result) = compare(op, Some(a.cmp(&b))) {
        return Ok(Value::Bool(result));
    }
    let value = match op {
        BinOp::Add => a.wrapping_add(b),
        BinOp::Sub => a.wrapping_sub(b),
        BinOp::Mul => a.wrapping_mul(b),
        BinOp::Div | BinOp::Mod if b == 0 => return Err(division_by_zero(op)),
        BinOp::Div => a / b,
        BinOp::Mod => a % b,
        BinOp::BitAnd => a & b,
        BinOp::BitOr => a | b,
        BinOp::BitXor => a ^ b,
        BinOp::BitShl => a.wrapping_shl(b),
        BinOp::BitShr => a.wrapping_shr(b),
        _ => {
            return Err(RuntimeError::type_error(
                "arithmetic operator",
                op.symbol(),
            ))
        }
    };
    Ok(Value::UInt(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signed_wraps() {
        assert_eq!(
            signed_arith(BinOp::Add, i32::MAX, 1),
            Ok(Value::Int(i32::MIN))
        );
        assert_eq!(signed_arith(BinOp::Div, -7, 2), Ok(Value::Int(-3)));
        assert_eq!(signed_arith(BinOp::Mod, -7, 2), Ok(Value::Int(-1)));
        assert_eq!(signed_arith(BinOp::Lt, -1, 0), Ok(Value::Bool(true)));
    }

    #[test]
    fn test_unsigned_wraps() {
        assert_eq!(unsigned_arith(BinOp::Sub, 0, 1), Ok(Value::UInt(u32::MAX)));
        assert_eq!(unsigned_arith(BinOp::BitShl, 1, 31), Ok(Value::UInt(1 << 31)));
    }

    #[test]
    fn test_division_by_zero_is_reported() {
        assert!(matches!(
            signed_arith(BinOp::Mod, 1, 0),
            Err(RuntimeError::DivisionByZero { .. })
        ));
        assert!(matches!(
            float_arith(BinOp::Div, &Value::Float(1.0), &Value::Int(0)),
            Err(RuntimeError::DivisionByZero { .. })
        ));
    }

    #[test]
    fn test_float_promotion() {
        assert_eq!(
            float_arith(BinOp::Mul, &Value::Int(3), &Value::Float(0.5)),
            Ok(Value::Float(1.5))
        );
        assert_eq!(
            float_arith(BinOp::Ge, &Value::Float(2.0), &Value::Int(2)),
            Ok(Value::Bool(true))
        );
    }
}
