//! Loop statement execution (`while`, `do-while`, `for`).
//!
//! Adds `impl Interpreter` methods for the three loop forms. `break` and
//! `continue` are folded into [`LoopBodyResult`] so the loop driver can react
//! without inspecting signals directly; `return` escapes as
//! [`LoopBodyResult::Exit`] and unwinds the loop immediately.
//!
//! # Iteration cap
//!
//! Every loop counts its iterations against `max_iterations`. The check runs
//! after the condition passes and before the body: a loop with cap `n` runs
//! its body `n` times, and the next passing condition emits
//! `LOOP_LIMIT_REACHED` and ends the run.

use crate::command::{CommandKind, LoopPhase};
use crate::interpreter::engine::{ControlSignal, Interpreter};
use crate::interpreter::errors::{RuntimeError, RuntimeResult};
use crate::tree::ast::AstNode;

/// Result returned by [`Interpreter::execute_loop_body`] to signal how the body ended.
pub(crate) enum LoopBodyResult {
    /// Body completed normally or via `continue`; the loop should iterate again.
    Continue,
    /// `break` was encountered; the loop should exit cleanly.
    Break,
    /// `return` was triggered; unwind and hand the signal to the caller.
    Exit(ControlSignal),
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum LoopKind {
    While,
    DoWhile,
    For,
}

impl LoopKind {
    fn name(self) -> &'static str {
        match self {
            LoopKind::While => "while",
            LoopKind::DoWhile => "do-while",
            LoopKind::For => "for",
        }
    }

    fn record(self, phase: LoopPhase, iteration: u32) -> CommandKind {
        match self {
            LoopKind::While => CommandKind::WhileLoop { phase, iteration },
            LoopKind::DoWhile => CommandKind::DoWhileLoop { phase, iteration },
            LoopKind::For => CommandKind::ForLoop { phase, iteration },
        }
    }
}

impl Interpreter {
    /// Executes one loop body.
    pub(crate) fn execute_loop_body(&mut self, body: &AstNode) -> RuntimeResult<LoopBodyResult> {
        Ok(match self.execute_statement(body)? {
            ControlSignal::Normal | ControlSignal::Continue => LoopBodyResult::Continue,
            ControlSignal::Break => LoopBodyResult::Break,
            signal @ ControlSignal::Return(_) => LoopBodyResult::Exit(signal),
        })
    }

    fn emit_loop(&mut self, kind: LoopKind, phase: LoopPhase, iteration: u32) {
        let message = match phase {
            LoopPhase::Start => format!("{} loop started", kind.name()),
            LoopPhase::Iteration => format!("{} loop iteration {}", kind.name(), iteration),
            LoopPhase::End => format!("{} loop ended after {} iterations", kind.name(), iteration),
        };
        self.commands.emit(kind.record(phase, iteration), message);
    }

    /// Count the next iteration, or stop the run at the cap
    fn begin_iteration(&mut self, kind: LoopKind, iterations: &mut u32) -> RuntimeResult<()> {
        let limit = self.options.max_iterations;
        if *iterations >= limit {
            tracing::debug!(construct = kind.name(), limit, "iteration cap reached");
            self.commands.emit(
                CommandKind::LoopLimitReached {
                    phase: kind.name().to_string(),
                    iterations: *iterations,
                },
                format!("{} loop reached its limit of {} iterations", kind.name(), limit),
            );
            return Err(RuntimeError::IterationLimit {
                construct: kind.name().to_string(),
                limit,
            });
        }
        *iterations += 1;
        self.emit_loop(kind, LoopPhase::Iteration, *iterations);
        Ok(())
    }

    /// Executes a `while (condition) body` loop.
    pub(crate) fn execute_while(
        &mut self,
        condition: &AstNode,
        body: &AstNode,
    ) -> RuntimeResult<ControlSignal> {
        let kind = LoopKind::While;
        self.emit_loop(kind, LoopPhase::Start, 0);
        let mut iterations = 0;
        loop {
            let (_, keep_going) = self.evaluate_condition(condition)?;
            if !keep_going {
                break;
            }
            self.begin_iteration(kind, &mut iterations)?;
            match self.execute_loop_body(body)? {
                LoopBodyResult::Exit(signal) => return Ok(signal),
                LoopBodyResult::Break => break,
                LoopBodyResult::Continue => continue,
            }
        }
        self.emit_loop(kind, LoopPhase::End, iterations);
        Ok(ControlSignal::Normal)
    }

    /// Executes a `do body while (condition)` loop.
    ///
    /// The body always runs at least once; the condition is checked after each
    /// iteration.
    pub(crate) fn execute_do_while(
        &mut self,
        body: &AstNode,
        condition: &AstNode,
    ) -> RuntimeResult<ControlSignal> {
        let kind = LoopKind::DoWhile;
        self.emit_loop(kind, LoopPhase::Start, 0);
        let mut iterations = 0;
        loop {
            self.begin_iteration(kind, &mut iterations)?;
            match self.execute_loop_body(body)? {
                LoopBodyResult::Exit(signal) => return Ok(signal),
                LoopBodyResult::Break => break,
                LoopBodyResult::Continue => {}
            }
            let (_, keep_going) = self.evaluate_condition(condition)?;
            if !keep_going {
                break;
            }
        }
        self.emit_loop(kind, LoopPhase::End, iterations);
        Ok(ControlSignal::Normal)
    }

    /// Executes a `for (init; condition; increment) body` loop.
    ///
    /// `init`, `condition`, and `increment` are all optional; a missing
    /// condition is always true. The initializer gets its own scope that is
    /// exited when the loop ends.
    pub(crate) fn execute_for(
        &mut self,
        init: Option<&AstNode>,
        condition: Option<&AstNode>,
        increment: Option<&AstNode>,
        body: &AstNode,
    ) -> RuntimeResult<ControlSignal> {
        self.scopes.push_scope();
        let result = self.run_for(init, condition, increment, body);
        self.scopes.pop_scope();
        result
    }

    fn run_for(
        &mut self,
        init: Option<&AstNode>,
        condition: Option<&AstNode>,
        increment: Option<&AstNode>,
        body: &AstNode,
    ) -> RuntimeResult<ControlSignal> {
        let kind = LoopKind::For;
        if let Some(init_stmt) = init {
            self.execute_statement(init_stmt)?;
        }

        self.emit_loop(kind, LoopPhase::Start, 0);
        let mut iterations = 0;
        loop {
            if let Some(cond) = condition {
                let (_, keep_going) = self.evaluate_condition(cond)?;
                if !keep_going {
                    break;
                }
            }
            self.begin_iteration(kind, &mut iterations)?;
            match self.execute_loop_body(body)? {
                LoopBodyResult::Exit(signal) => return Ok(signal),
                LoopBodyResult::Break => break,
                LoopBodyResult::Continue => {}
            }
            if let Some(inc) = increment {
                let result = self.evaluate_expr(inc);
                self.recover(result)?;
            }
        }
        self.emit_loop(kind, LoopPhase::End, iterations);
        Ok(ControlSignal::Normal)
    }
}
