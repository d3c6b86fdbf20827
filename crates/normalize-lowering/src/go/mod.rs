//! Resolved Go input: syntax tree plus the types and objects the checker
//! attached to it.

pub mod ast;
pub mod types;

pub use ast::*;
pub use types::*;
