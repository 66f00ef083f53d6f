//! Program intake
//!
//! - [`raw`]: the generic node tree produced by the front end, deserializable from JSON
//! - [`lower`]: validation and lowering of that tree into the typed AST
//! - [`ast`]: the closed AST the interpreter executes
//! - [`types`]: declared-type strings parsed into [`types::TypeSpec`]

pub mod ast;
pub mod lower;
pub mod raw;
pub mod types;

pub use ast::Program;
pub use lower::lower_program;
pub use raw::{RawNode, TreeError};
