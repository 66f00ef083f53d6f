//! Expression evaluation implementation
//!
//! This module dispatches every expression node to its evaluator:
//!
//! - Literals and identifiers (variables, built-in constants, function names)
//! - Binary, unary, assignment and compound-assignment operators (see [`super::ops`])
//! - Ternary and comma expressions
//! - Function calls (user functions, built-ins, calls through a function reference)
//! - Array subscripting and struct member access
//! - Type casts and `sizeof`
//!
//! Every evaluator returns `Result<Value, RuntimeError>`; errors propagate
//! with `?` up to the statement that consumes the expression, which reports
//! them once.

use crate::interpreter::builtins;
use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::{RuntimeError, RuntimeResult};
use crate::interpreter::libraries;
use crate::memory::value::{StructValue, Value};
use crate::memory::{sizeof_type, sizeof_value};
use crate::tree::ast::*;
use crate::tree::types::BaseType;

impl Interpreter {
    /// Evaluate an expression and return its value
    pub(crate) fn evaluate_expr(&mut self, expr: &AstNode) -> RuntimeResult<Value> {
        match expr {
            AstNode::IntLiteral(n) => Ok(Value::Int(*n)),
            AstNode::UIntLiteral(n) => Ok(Value::UInt(*n)),
            AstNode::FloatLiteral(f) => Ok(Value::Float(*f)),
            AstNode::BoolLiteral(b) => Ok(Value::Bool(*b)),
            AstNode::StringLiteral(s) => Ok(Value::Str(s.clone())),

            AstNode::Variable(name) => self.evaluate_variable(name),

            AstNode::BinaryOp { op, left, right } => self.evaluate_binary(*op, left, right),

            AstNode::UnaryOp { op, operand } => self.evaluate_unary(*op, operand),

            AstNode::Assignment { lhs, rhs } => self.evaluate_assignment(lhs, rhs),

            AstNode::CompoundAssignment { lhs, op, rhs } => {
                self.evaluate_compound_assignment(lhs, *op, rhs)
            }

            AstNode::TernaryOp {
                condition,
                true_expr,
                false_expr,
            } => {
                let cond = self.evaluate_expr(condition)?;
                match cond.truthy() {
                    Some(true) => self.evaluate_expr(true_expr),
                    Some(false) => self.evaluate_expr(false_expr),
                    None => Err(RuntimeError::type_error("scalar condition", cond.type_name())),
                }
            }

            AstNode::Comma(exprs) => {
                let mut last = Value::Void;
                for e in exprs {
                    last = self.evaluate_expr(e)?;
                }
                Ok(last)
            }

            AstNode::FunctionCall { callee, args } => self.evaluate_call(callee, args),

            AstNode::ArrayAccess { array, index } => self.evaluate_array_access(array, index),

            AstNode::MemberAccess { object, member } => self.evaluate_member_access(object, member),

            AstNode::PointerMemberAccess { object, member } => {
                self.evaluate_pointer_member(object, member)
            }

            AstNode::Cast { target_type, expr } => {
                let value = if target_type.pointer_depth > 0 {
                    self.evaluate_decayed(expr)?
                } else {
                    self.evaluate_expr(expr)?
                };
                self.cast_value(value, target_type)
            }

            AstNode::SizeofType(ty) => {
                let ty = self.resolve_declared_type(ty)?;
                Ok(Value::Int(sizeof_type(&ty, &self.types) as i32))
            }

            AstNode::SizeofExpr(inner) => self.evaluate_sizeof(inner),

            AstNode::InitializerList(items) => self.evaluate_brace_list(items),

            AstNode::DesignatedInit { .. } => Err(RuntimeError::type_error(
                "expression",
                "designated initializer outside braces",
            )),

            AstNode::FunctionDef(_)
            | AstNode::StructDef(_)
            | AstNode::Typedef { .. }
            | AstNode::VarDecl { .. }
            | AstNode::ExpressionStatement(_)
            | AstNode::Block(_)
            | AstNode::If { .. }
            | AstNode::While { .. }
            | AstNode::DoWhile { .. }
            | AstNode::For { .. }
            | AstNode::Switch { .. }
            | AstNode::Return(_)
            | AstNode::Break
            | AstNode::Continue
            | AstNode::Empty => Err(RuntimeError::MalformedTree {
                message: format!("{} used as an expression", expr.kind_name()),
            }),
        }
    }

    /// Locals and globals first, then built-in constants, then function names
    fn evaluate_variable(&mut self, name: &str) -> RuntimeResult<Value> {
        if let Some(var) = self.scopes.lookup(name) {
            return Ok(var.value.clone());
        }
        if let Some(value) = builtins::constant(name) {
            return Ok(value);
        }
        if self.functions.contains_key(name) {
            return Ok(Value::Function(name.to_string()));
        }
        Err(RuntimeError::UndefinedVariable {
            name: name.to_string(),
        })
    }

    /// `sizeof(expr)`: declared size when the operand names storage,
    /// otherwise the size of the evaluated value
    fn evaluate_sizeof(&mut self, inner: &AstNode) -> RuntimeResult<Value> {
        if inner.is_lvalue() {
            if let Ok(place) = self.resolve_place(inner) {
                if let Ok(ty) = self.place_type(&place) {
                    if ty.base != BaseType::Auto {
                        return Ok(Value::Int(sizeof_type(&ty, &self.types) as i32));
                    }
                }
            }
        }
        let value = self.evaluate_expr(inner)?;
        Ok(Value::Int(sizeof_value(&value) as i32))
    }

    /// Braces outside a declaration: `{.f = v, ..}` builds an anonymous
    /// struct, anything else a sequence.
    fn evaluate_brace_list(&mut self, items: &[AstNode]) -> RuntimeResult<Value> {
        let designated =
            !items.is_empty() && items.iter().all(|i| matches!(i, AstNode::DesignatedInit { .. }));
        if designated {
            let mut instance = StructValue::new("");
            for item in items {
                if let AstNode::DesignatedInit { field, value } = item {
                    let value = self.evaluate_expr(value)?;
                    instance.fields.push((field.clone(), value));
                }
            }
            return Ok(Value::Struct(instance));
        }

        let mut values = Vec::with_capacity(items.len());
        for item in items {
            values.push(self.evaluate_expr(item)?);
        }
        Ok(Value::Array(values))
    }

    fn evaluate_call(&mut self, callee: &AstNode, args: &[AstNode]) -> RuntimeResult<Value> {
        match callee {
            AstNode::Variable(name) => self.execute_function_call(name, args),
            AstNode::MemberAccess { object, member } => {
                // `Serial.println(..)`: the object is not a variable
                if let AstNode::Variable(object) = object.as_ref() {
                    if self.scopes.lookup(object).is_none() {
                        return self.execute_function_call(&format!("{}.{}", object, member), args);
                    }
                }
                self.call_method(object, member, args)
            }
            _ => self.call_through(callee, args),
        }
    }

    /// Call whatever function reference `callee` evaluates to
    fn call_through(&mut self, callee: &AstNode, args: &[AstNode]) -> RuntimeResult<Value> {
        match self.evaluate_expr(callee)? {
            Value::Function(name) => self.execute_function_call(&name, args),
            other => Err(RuntimeError::type_error("function", other.type_name())),
        }
    }

    /// Resolution order: user functions, built-ins, a variable holding a
    /// function reference, then library constructors.
    pub(crate) fn execute_function_call(&mut self, name: &str, args: &[AstNode]) -> RuntimeResult<Value> {
        if let Some(def) = self.functions.get(name).cloned() {
            return self.call_user_function(def, args);
        }
        if builtins::is_builtin(name) {
            return self.call_builtin(name, args);
        }
        let target = match self.scopes.lookup(name).map(|var| &var.value) {
            Some(Value::Function(target)) => Some(target.clone()),
            _ => None,
        };
        if let Some(def) = target.and_then(|t| self.functions.get(&t).cloned()) {
            return self.call_user_function(def, args);
        }
        if let Some(class) = libraries::library_class(name) {
            return self.construct_library_object(class, args);
        }
        Err(RuntimeError::UnknownFunction {
            name: name.to_string(),
        })
    }
}
