//! Core compiler pipeline for the Vertex language.
//!
//! The pipeline translates Vertex source into Python 3:
//!
//!   source .vx
//!     -> lexer          (lazy token stream)
//!     -> parser         (AST)
//!     -> codegen_python (Python source text)
//!
//! Higher-level tools (the `vertexc` CLI, tests) should depend on this
//! crate rather than reimplementing the pipeline. The crate performs no
//! I/O.

// ---------------------------------------------------------------------
// Error handling and diagnostics
// ---------------------------------------------------------------------

pub mod span;
pub mod diagnostic;
pub mod error;

// ---------------------------------------------------------------------
// Front-end: lexing and parsing
// ---------------------------------------------------------------------

pub mod lexer;
pub mod parser;
pub mod ast;

// ---------------------------------------------------------------------
// Types and runtime support
// ---------------------------------------------------------------------

pub mod types;
pub mod builtins;

// ---------------------------------------------------------------------
// Back-end: code generation and compiler orchestration
// ---------------------------------------------------------------------

pub mod codegen_python;
pub mod compiler;

// ---------------------------------------------------------------------
// Public API re-exports
// ---------------------------------------------------------------------

pub use codegen_python::{GeneratorOptions, Symbol, generate};
pub use compiler::{CompilationArtifact, CompileOptions, check, compile, compile_with};
pub use error::{CodegenError, CoreError, LexError, ParseError};
pub use lexer::tokenize;
pub use parser::parse;
pub use span::Position;
