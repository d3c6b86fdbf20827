//! Statement, declaration and type lowering from resolved Go syntax trees
//! to Python syntax trees.
//!
//! The input is a Go tree that a checker has already resolved: every
//! identifier and expression can be asked for its type and object through a
//! [`TypeOracle`]. The output is a Python-shaped [`ir::Module`] that
//! [`PythonWriter`] renders as source text.
//!
//! # Architecture
//!
//! ```text
//! go::File ─┐
//!           ├─> Compiler ──> DeclArtifact ──> ModuleBuilder ──> ir::Module ──> PythonWriter
//! TypeOracle┘      │
//!                  └─> ExprLowering (expression engine, hoisted statements)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use normalize_lowering::{Compiler, PythonWriter, TypeInfo, compile_files};
//!
//! let info: TypeInfo = front_end.check(&files)?;
//! let module = compile_files(Compiler::new(&info), &files)?;
//! let source = PythonWriter::emit(&module);
//! ```
//!
//! # Translation fidelity
//!
//! Goroutines, channels, labels and `goto` have no Python counterpart and
//! are dropped. Interface, function and map type declarations produce no
//! class. `fallthrough` leaves a `_TODO_fallthrough()` marker behind.

pub mod compiler;
pub mod config;
pub mod error;
pub mod expr;
pub mod go;
pub mod ir;
pub mod oracle;
pub mod output;
pub mod scope;

// Re-exports: lowering
pub use compiler::{Compiler, DeclArtifact, FuncDecl, ModuleBuilder, Origin, compile_files, zero_value};
pub use expr::{CaseKind, ExprCompiler, ExprLowering, Lowered};

// Re-exports: collaborators
pub use oracle::{FileSet, Position, TypeInfo, TypeOracle};
pub use scope::Scope;

// Re-exports: configuration and errors
pub use config::{ConfigError, LoweringConfig};
pub use error::{ErrorKind, LowerError, Result};

// Re-exports: output
#[cfg(feature = "write-python")]
pub use output::PythonWriter;
