//! Core of the Potion compiler.
//!
//! Potion is a small scripting language that compiles to Erlang source.
//! The pipeline is:
//!
//!   source .potion
//!     -> lexer          (tokens)
//!     -> parser         (AST)
//!     -> evaluator + typecheck (constant folding, per-binding type tags)
//!     -> codegen_erlang (one `.erl` module as text)
//!
//! The crate does no I/O. The CLI and any other front end should depend
//! on it rather than reimplementing the pipeline.

// ---------------------------------------------------------------------
// Error handling
// ---------------------------------------------------------------------

pub mod error;

// ---------------------------------------------------------------------
// Front-end: lexing and parsing
// ---------------------------------------------------------------------

pub mod lexer;
pub mod parser;
pub mod ast;

// ---------------------------------------------------------------------
// Semantic layers: type tags, scopes, constant evaluation
// ---------------------------------------------------------------------

pub mod types;
pub mod scope;
pub mod typecheck;
pub mod evaluator;

// ---------------------------------------------------------------------
// Builtins and fixed name tables
// ---------------------------------------------------------------------

pub mod builtins;

// ---------------------------------------------------------------------
// Back-end: code generation and compiler orchestration
// ---------------------------------------------------------------------

pub mod codegen_erlang;
pub mod compiler;

// ---------------------------------------------------------------------
// Public API re-exports
// ---------------------------------------------------------------------

pub use compiler::{
    CompilationArtifact, CompileOptions, DEFAULT_MODULE_NAME, compile_erlang, compile_program,
    validate_module_name,
};
pub use error::CoreError;
pub use parser::parse_source;
