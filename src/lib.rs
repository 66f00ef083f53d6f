//! # Introduction
//!
//! ardtrace executes Arduino sketches that have already been parsed into a
//! node tree and records every observable side effect as an ordered,
//! deterministic command stream instead of touching hardware. Two
//! independently built interpreters can then be compared stream against
//! stream.
//!
//! ## Execution pipeline
//!
//! ```text
//! JSON → RawNode → lowering → AST → Interpreter → CommandStream → JSON lines
//! ```
//!
//! 1. [`tree`]: the generic node tree accepted from front ends and its
//!    lowering into a typed AST.
//! 2. [`interpreter`]: runs global initializers, `setup` once and `loop` for
//!    a configured number of cycles.
//! 3. [`memory`]: the storage model: tagged [`memory::value::Value`]s held in
//!    scopes, address-free [`memory::pointer::Pointer`]s, and the struct and
//!    typedef registry.
//! 4. [`command`]: the command records and their JSON encoding.
//!
//! ## Example
//!
//! ```no_run
//! use ardtrace::{Interpreter, InterpreterOptions};
//!
//! let tree = std::fs::read_to_string("sketch.json").unwrap();
//! let mut interp = Interpreter::from_json(&tree, InterpreterOptions::default());
//! let status = interp.run();
//! println!("{}", interp.commands().to_json_lines().unwrap());
//! println!("{:?}", status);
//! ```
//!
//! ## Supported dialect
//!
//! Types: `bool`, `char`, `byte`, `int`, `long`, `unsigned` variants, the
//! fixed-width `intN_t`/`uintN_t` family, `float`, `double`, `String`,
//! structs, typedefs, pointers of any depth, multi-dimensional arrays.
//! Control flow: `if/else`, `while`, `do-while`, `for`, `switch/case`,
//! `break`, `continue`, `return`. Built-ins: pin I/O, clocks, `delay`,
//! `Serial`, and the Arduino math helpers.

pub mod command;
pub mod interpreter;
pub mod logging;
pub mod memory;
pub mod tree;

pub use command::{Command, CommandKind, CommandStream, ExitStatus};
pub use interpreter::{DataProvider, Interpreter, InterpreterOptions, RuntimeError};
pub use tree::{Program, RawNode};
