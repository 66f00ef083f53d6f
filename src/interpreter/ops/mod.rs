pub mod access;
pub mod assign;
pub mod binary;
pub mod structs;
pub mod unary;

// Everything here is `impl Interpreter`
