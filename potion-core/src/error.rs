use thiserror::Error;

use crate::types::ScopeKind;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    #[error("lex error at byte {position} (line {line}, column {column}): {message} '{found}'")]
    LexError {
        found: char,
        position: usize,
        line: usize,
        column: usize,
        message: String,
    },
    #[error("parse error at token {position}: expected {expected}, found {found}")]
    ParseError {
        expected: String,
        found: String,
        position: usize,
    },
    #[error("variable '{name}' is not declared")]
    UndeclaredVariable { name: String },
    #[error("function '{name}' is not defined")]
    UndefinedFunction { name: String },
    #[error("function '{name}' expects {expected} arguments but received {given}")]
    ArityError {
        name: String,
        expected: usize,
        given: usize,
    },
    #[error("unknown type ({scope}) in '{name}': {annotation}")]
    UnknownType {
        scope: ScopeKind,
        name: String,
        annotation: String,
    },
    #[error("could not infer type ({scope}) for '{name}' from value of kind {kind}")]
    UnknownInferredType {
        scope: ScopeKind,
        name: String,
        kind: &'static str,
    },
    #[error("type error ({scope}) in '{name}': expected {expected}, found {actual}")]
    TypeMismatch {
        scope: ScopeKind,
        name: String,
        expected: String,
        actual: String,
    },
    #[error("unsupported operation: {op}")]
    UnsupportedOperation { op: String },
    #[error("operator '{op}' cannot be applied to {left} and {right}")]
    OperandMismatch {
        op: String,
        left: &'static str,
        right: &'static str,
    },
    #[error("integer overflow during '{op}'")]
    IntegerOverflow { op: String },
    #[error("division by zero is not allowed")]
    DivisionByZero,
    #[error("{what} has no compile-time value")]
    NotConstant { what: String },
    #[error("evaluation of '{name}' exceeded the nesting limit of {limit} calls")]
    RecursionLimit { name: String, limit: usize },
    #[error("no {stage} handler for {kind}")]
    UnknownNodeKind { kind: &'static str, stage: &'static str },
    #[error("{found} is not a valid match pattern")]
    InvalidPattern { found: &'static str },
    #[error("{kind} is not allowed at the top level of a module")]
    TopLevelStatement { kind: &'static str },
    #[error("global '{name}' would be emitted as ?{macro_name}, which clashes with {other}")]
    MacroNameConflict {
        name: String,
        macro_name: String,
        other: String,
    },
    #[error("invalid module name '{name}'")]
    InvalidModuleName { name: String },
}
