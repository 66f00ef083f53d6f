//! Jump statements (`return`, `break`, `continue`) and `switch`.
//!
//! Jumps become [`ControlSignal`]s that unwind to the enclosing function or
//! loop. A `switch` records every label it compares before running any body,
//! then falls through from the matched label until a `break`.

use crate::command::CommandKind;
use crate::interpreter::engine::{ControlSignal, Interpreter};
use crate::interpreter::errors::RuntimeResult;
use crate::memory::value::Value;
use crate::tree::ast::{AstNode, CaseNode};

impl Interpreter {
    pub(crate) fn execute_return(&mut self, expr: Option<&AstNode>) -> RuntimeResult<ControlSignal> {
        let value = match expr {
            Some(ret_expr) => {
                let result = self.evaluate_expr(ret_expr);
                self.recover(result)?
            }
            None => Value::Void,
        };
        Ok(ControlSignal::Return(value))
    }

    pub(crate) fn execute_break(&mut self) -> ControlSignal {
        self.commands.emit(CommandKind::BreakStatement, "break");
        ControlSignal::Break
    }

    pub(crate) fn execute_continue(&mut self) -> ControlSignal {
        self.commands.emit(CommandKind::ContinueStatement, "continue");
        ControlSignal::Continue
    }

    /// Every label is evaluated and recorded in source order before any body
    /// runs; execution then falls through from the first match (or
    /// `default`) until `break`.
    pub(crate) fn execute_switch(
        &mut self,
        expr: &AstNode,
        cases: &[CaseNode],
    ) -> RuntimeResult<ControlSignal> {
        let result = self.evaluate_expr(expr);
        let switch_val = self.recover(result)?;
        self.commands.emit(
            CommandKind::SwitchStatement {
                discriminant: switch_val.clone(),
            },
            format!("switch ({})", switch_val),
        );

        let mut match_index: Option<usize> = None;
        let mut default_index: Option<usize> = None;
        let mut labels: Vec<Option<Value>> = Vec::with_capacity(cases.len());

        for (i, case) in cases.iter().enumerate() {
            match case {
                CaseNode::Case { value, .. } => {
                    let result = self.evaluate_expr(value);
                    let case_val = self.recover(result)?;
                    if match_index.is_none() && self.values_equal(&switch_val, &case_val) {
                        match_index = Some(i);
                    }
                    labels.push(Some(case_val));
                }
                CaseNode::Default { .. } => {
                    default_index = Some(i);
                    labels.push(None);
                }
            }
        }

        let start_index = match_index.or(default_index);

        for (i, label) in labels.into_iter().enumerate() {
            let matched = start_index == Some(i);
            let (value, message) = match label {
                Some(v) => {
                    let message = format!("case {}: {}", v, if matched { "matched" } else { "skipped" });
                    (v, message)
                }
                None => (
                    Value::Str("default".to_string()),
                    format!("default: {}", if matched { "matched" } else { "skipped" }),
                ),
            };
            self.commands
                .emit(CommandKind::SwitchCase { value, matched }, message);
        }

        let Some(start) = start_index else {
            return Ok(ControlSignal::Normal);
        };

        self.scopes.push_scope();
        let result = self.run_cases(&cases[start..]);
        self.scopes.pop_scope();
        result
    }

    fn run_cases(&mut self, cases: &[CaseNode]) -> RuntimeResult<ControlSignal> {
        for case in cases {
            let statements = match case {
                CaseNode::Case { statements, .. } => statements,
                CaseNode::Default { statements } => statements,
            };
            match self.execute_statements(statements)? {
                ControlSignal::Normal => {}
                ControlSignal::Break => return Ok(ControlSignal::Normal),
                // continue and return belong to an enclosing construct
                signal => return Ok(signal),
            }
        }
        Ok(ControlSignal::Normal)
    }

    pub(crate) fn values_equal(&self, a: &Value, b: &Value) -> bool {
        match (a, b) {
            (Value::Void, _) | (_, Value::Void) => false,
            (Value::Float(_), _) | (_, Value::Float(_)) => a.as_f64() == b.as_f64(),
            _ => match (a.as_i64(), b.as_i64()) {
                (Some(x), Some(y)) => x == y,
                _ => a == b,
            },
        }
    }
}
