//! Statement execution implementation
//!
//! This module handles the execution of sketch statements:
//!
//! - Variable declarations and initializers (including statics)
//! - Expression statements, blocks and `if`/`else`
//! - Function calls into user-defined functions
//!
//! Loops live in [`super::loops`]; `switch`, `return`, `break` and
//! `continue` in [`super::jumps`].
//!
//! # Control Flow
//!
//! Every statement returns a [`ControlSignal`]. Compound statements stop at
//! the first non-normal signal and hand it to their caller unchanged.
//!
//! # Errors
//!
//! Recoverable errors raised while evaluating a statement's expression are
//! reported here, once, through [`Interpreter::recover`]; the expression then
//! counts as absent and the statement carries on.

use crate::command::{Branch, CommandKind};
use crate::interpreter::engine::{ControlSignal, Interpreter};
use crate::interpreter::errors::{RuntimeError, RuntimeResult};
use crate::memory::scope::Variable;
use crate::memory::value::Value;
use crate::tree::ast::*;
use crate::tree::types::{ArrayDim, TypeSpec};
use std::rc::Rc;

impl Interpreter {
    pub(crate) fn execute_statement(&mut self, stmt: &AstNode) -> RuntimeResult<ControlSignal> {
        self.tick()?;

        match stmt {
            AstNode::VarDecl { declarators } => {
                self.execute_var_decl(declarators)?;
                Ok(ControlSignal::Normal)
            }

            AstNode::ExpressionStatement(expr) => {
                let result = self.evaluate_expr(expr);
                self.recover(result)?;
                Ok(ControlSignal::Normal)
            }

            AstNode::Block(stmts) => self.execute_block(stmts),

            AstNode::If {
                condition,
                then_branch,
                else_branch,
            } => self.execute_if(condition, then_branch, else_branch.as_deref()),

            AstNode::While { condition, body } => self.execute_while(condition, body),

            AstNode::DoWhile { body, condition } => self.execute_do_while(body, condition),

            AstNode::For {
                init,
                condition,
                increment,
                body,
            } => self.execute_for(
                init.as_deref(),
                condition.as_deref(),
                increment.as_deref(),
                body,
            ),

            AstNode::Switch { expr, cases } => self.execute_switch(expr, cases),

            AstNode::Return(expr) => self.execute_return(expr.as_deref()),

            AstNode::Break => Ok(self.execute_break()),

            AstNode::Continue => Ok(self.execute_continue()),

            AstNode::Empty => Ok(ControlSignal::Normal),

            AstNode::FunctionDef(_) | AstNode::StructDef(_) | AstNode::Typedef { .. } => {
                self.register_definition(stmt);
                Ok(ControlSignal::Normal)
            }

            expr => {
                let result = self.evaluate_expr(expr);
                self.recover(result)?;
                Ok(ControlSignal::Normal)
            }
        }
    }

    /// Run statements in the current scope until one signals
    pub(crate) fn execute_statements(&mut self, stmts: &[AstNode]) -> RuntimeResult<ControlSignal> {
        for stmt in stmts {
            let signal = self.execute_statement(stmt)?;
            if signal != ControlSignal::Normal {
                return Ok(signal);
            }
        }
        Ok(ControlSignal::Normal)
    }

    pub(crate) fn execute_block(&mut self, stmts: &[AstNode]) -> RuntimeResult<ControlSignal> {
        self.scopes.push_scope();
        let result = self.execute_statements(stmts);
        self.scopes.pop_scope();
        result
    }

    pub(crate) fn execute_if(
        &mut self,
        condition: &AstNode,
        then_branch: &AstNode,
        else_branch: Option<&AstNode>,
    ) -> RuntimeResult<ControlSignal> {
        let (value, taken) = self.evaluate_condition(condition)?;
        let branch = if taken { Branch::Then } else { Branch::Else };
        self.commands.emit(
            CommandKind::IfStatement {
                condition: value.clone(),
                branch,
            },
            format!("if ({}) -> {:?}", value, branch),
        );

        if taken {
            self.execute_statement(then_branch)
        } else if let Some(else_stmt) = else_branch {
            self.execute_statement(else_stmt)
        } else {
            Ok(ControlSignal::Normal)
        }
    }

    /// Evaluate a condition, reporting failures. Absent counts as false.
    pub(crate) fn evaluate_condition(&mut self, condition: &AstNode) -> RuntimeResult<(Value, bool)> {
        let result = self.evaluate_expr(condition);
        let value = self.recover(result)?;
        let taken = match value.truthy() {
            Some(b) => b,
            None if value.is_void() => false,
            None => {
                self.report(&RuntimeError::type_error("scalar condition", value.type_name()));
                false
            }
        };
        Ok((value, taken))
    }

    pub(crate) fn execute_var_decl(&mut self, declarators: &[Declarator]) -> RuntimeResult<()> {
        for decl in declarators {
            let result = self.declare_variable(decl);
            self.recover(result)?;
        }
        Ok(())
    }

    fn declare_variable(&mut self, decl: &Declarator) -> RuntimeResult<()> {
        let mut ty = self.resolve_declared_type(&decl.var_type)?;

        // `extern int x;` refers to storage declared elsewhere
        if ty.is_extern && decl.init.is_none() && self.scopes.lookup(&decl.name).is_some() {
            return Ok(());
        }

        let is_local_static = ty.is_static && self.scopes.depth() > 0;
        // Later executions of a static declaration only rebind the name
        if is_local_static && self.scopes.bind_static(decl.id, &decl.name)? {
            return Ok(());
        }

        let value = match &decl.init {
            Some(init) => match self.initial_value(init, &ty) {
                Ok(value) => value,
                Err(err) if err.is_fatal() => return Err(err),
                Err(err) => {
                    self.report(&err);
                    self.default_value(&ty)
                }
            },
            None => self.default_value(&ty),
        };

        // `int a[] = {..}` takes its length from the initializer
        if let Some(ArrayDim::Unsized) = ty.array_dims.first() {
            let len = match &value {
                Value::Array(items) => items.len(),
                _ => 0,
            };
            ty.array_dims[0] = ArrayDim::Fixed(len);
        }

        let var = Variable::new(value.clone(), ty);
        if is_local_static {
            self.scopes.declare_static(decl.id, &decl.name, var)?;
        } else {
            self.scopes.declare(&decl.name, var)?;
        }
        self.emit_var_set(decl.name.clone(), &value);
        Ok(())
    }

    /// Value of an initializer for a declaration of type `ty`
    pub(crate) fn initial_value(&mut self, init: &AstNode, ty: &TypeSpec) -> RuntimeResult<Value> {
        if let AstNode::InitializerList(items) = init {
            return self.build_aggregate(items, ty);
        }
        let value = if ty.pointer_depth > 0 && !ty.is_array() {
            self.evaluate_decayed(init)?
        } else {
            self.evaluate_expr(init)?
        };
        if ty.is_char_array() {
            if let Value::Str(text) = &value {
                return Ok(self.char_array_from_text(text, ty));
            }
        }
        Ok(self.convert_for_store(value, ty))
    }

    /// Call a user function with unevaluated arguments
    pub(crate) fn call_user_function(
        &mut self,
        def: Rc<FunctionDef>,
        args: &[AstNode],
    ) -> RuntimeResult<Value> {
        if args.len() != def.params.len() {
            return Err(RuntimeError::ArgumentCountMismatch {
                function: def.name.clone(),
                expected: def.params.len(),
                got: args.len(),
            });
        }

        let mut values = Vec::with_capacity(args.len());
        for (param, arg) in def.params.iter().zip(args) {
            let param_type = param.param_type.decay_parameter();
            let value = if param_type.pointer_depth > 0 {
                self.evaluate_decayed(arg)?
            } else {
                self.evaluate_expr(arg)?
            };
            values.push(value);
        }

        if self.scopes.depth() >= self.options.max_call_depth {
            return Err(RuntimeError::CallDepthExceeded {
                function: def.name.clone(),
                limit: self.options.max_call_depth,
            });
        }

        let rendered: Vec<String> = values.iter().map(|v| v.to_string()).collect();
        self.commands.emit(
            CommandKind::FunctionCall {
                function: def.name.clone(),
                arguments: values.clone(),
            },
            format!("{}({})", def.name, rendered.join(", ")),
        );

        self.invoke(&def, values)
    }

    /// Push a frame, bind parameters, run the body and pop the frame on
    /// every exit path.
    #[tracing::instrument(level = "debug", skip_all, fields(function = %def.name))]
    pub(crate) fn invoke(&mut self, def: &FunctionDef, args: Vec<Value>) -> RuntimeResult<Value> {
        self.scopes.push_frame();
        let result = self.run_function_body(def, args);
        self.scopes.pop_frame();
        let returned = result?;

        let return_type = self.types.resolve(&def.return_type);
        if return_type.base == crate::tree::types::BaseType::Void && return_type.pointer_depth == 0
        {
            return Ok(Value::Void);
        }
        if returned.is_void() {
            return Ok(returned);
        }
        Ok(self.convert_for_store(returned, &return_type))
    }

    fn run_function_body(&mut self, def: &FunctionDef, args: Vec<Value>) -> RuntimeResult<Value> {
        for (param, value) in def.params.iter().zip(args) {
            let ty = self.resolve_declared_type(&param.param_type.decay_parameter())?;
            let value = self.convert_for_store(value, &ty);
            self.scopes.declare(&param.name, Variable::new(value, ty))?;
        }

        match self.execute_statements(&def.body)? {
            ControlSignal::Return(value) => Ok(value),
            _ => Ok(Value::Void),
        }
    }
}
