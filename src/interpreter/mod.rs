//! Sketch interpreter execution engine
//!
//! This module provides the core execution logic:
//! - [`engine`]: the [`Interpreter`] and its `setup`/`loop` scheduler
//! - [`errors`]: runtime error types and the reported error taxonomy
//! - [`options`]: host configuration (loop cycles, caps, budgets)
//! - [`provider`]: host data sources for pin reads and clocks
//!
//! # Execution Model
//!
//! The interpreter walks the lowered tree and executes statements one at a
//! time. Every observable side effect (assignments, calls, branches, loop
//! progress, delays, errors) is appended to the interpreter's
//! [`CommandStream`](crate::command::CommandStream).
//!
//! Statement execution lives in `statements`, `loops` and `jumps`;
//! expression evaluation in `expressions` and `ops`; lvalues, stores and
//! array decay in `memory_ops`; declared-type handling in `type_system`;
//! Arduino calls in `builtins`; `String` and object methods in `methods`;
//! device library classes in `libraries`.

mod builtins;
pub mod constants;
pub mod engine;
pub mod errors;
mod expressions;
mod jumps;
mod libraries;
mod loops;
mod memory_ops;
mod methods;
mod ops;
pub mod options;
pub mod provider;
mod statements;
mod type_system;

pub use engine::Interpreter;
pub use errors::{ErrorKind, RuntimeError, RuntimeResult};
pub use options::InterpreterOptions;
pub use provider::{DataProvider, DeterministicProvider, FixedProvider};
