//! Compile-time constant evaluation.
//!
//! The evaluator folds literals, names, the supported binary operators and
//! calls of user functions whose arguments fold. It is not an interpreter:
//! `if`, `print` and the message-passing forms report `NotConstant`
//! instead of running.

use core::fmt;
use std::cmp::Ordering;
use std::collections::HashMap;

use crate::ast::{Binding, BinaryOperator, Call, FunctionDef, Node};
use crate::builtins::find_builtin;
use crate::error::CoreError;
use crate::scope::{Entry, Scopes};
use crate::typecheck::check_binding;
use crate::types::{ScopeKind, TypeTag};

/// Nesting limit for compile-time calls.
pub const MAX_CALL_DEPTH: usize = 128;

/// A folded compile-time value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    /// Only produced by `/`, which folds as real division.
    Float(f64),
    Str(String),
    Bool(bool),
    None,
}

impl Value {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::Bool(_) => "bool",
            Value::None => "none",
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v:?}"),
            Value::Str(s) => write!(f, "\"{s}\""),
            Value::Bool(b) => write!(f, "{b}"),
            Value::None => f.write_str("none"),
        }
    }
}

/// Top-level functions by name. A later definition replaces an earlier
/// one with the same name.
#[derive(Debug, Default)]
pub struct FunctionTable<'a> {
    entries: HashMap<&'a str, &'a FunctionDef>,
}

impl<'a> FunctionTable<'a> {
    pub fn new() -> Self {
        FunctionTable {
            entries: HashMap::new(),
        }
    }

    pub fn insert(&mut self, def: &'a FunctionDef) {
        self.entries.insert(def.name.as_str(), def);
    }

    pub fn get(&self, name: &str) -> Option<&'a FunctionDef> {
        self.entries.get(name).copied()
    }

    /// True if `def` is the definition that won for its name.
    pub fn is_current(&self, def: &FunctionDef) -> bool {
        self.get(&def.name)
            .is_some_and(|current| core::ptr::eq(current, def))
    }
}

pub struct Evaluator<'a> {
    functions: &'a FunctionTable<'a>,
    depth: usize,
}

impl<'a> Evaluator<'a> {
    pub fn new(functions: &'a FunctionTable<'a>) -> Self {
        Evaluator {
            functions,
            depth: 0,
        }
    }

    pub fn evaluate(&mut self, node: &Node, scopes: &mut Scopes) -> Result<Value, CoreError> {
        match node {
            Node::LiteralInt(value) => Ok(Value::Int(*value)),
            Node::LiteralString(value) => Ok(Value::Str(value.clone())),
            Node::LiteralBool(value) => Ok(Value::Bool(*value)),
            Node::NoneLiteral => Ok(Value::None),
            Node::Identifier(name) => match scopes.resolve(name) {
                Some(Entry {
                    value: Some(value), ..
                }) => Ok(value.clone()),
                Some(_) => Err(CoreError::NotConstant {
                    what: format!("variable '{name}'"),
                }),
                None => Err(CoreError::UndeclaredVariable { name: name.clone() }),
            },
            Node::BinaryOp { op, left, right } => {
                let left = self.evaluate(left, scopes)?;
                let right = self.evaluate(right, scopes)?;
                apply_binary(*op, left, right)
            }
            Node::FunctionCall(call) => self.call(call, scopes),
            Node::IfExpr { .. }
            | Node::Print(_)
            | Node::MapLiteral(_)
            | Node::SendExpr { .. }
            | Node::SpawnExpr(_)
            | Node::MatchExpr { .. }
            | Node::ReceiveBlock { .. } => Err(CoreError::NotConstant {
                what: node.kind_name().to_string(),
            }),
            Node::ValBinding(_)
            | Node::VarBinding(_)
            | Node::FunctionDef(_)
            | Node::ReturnStmt(_) => Err(CoreError::UnknownNodeKind {
                kind: node.kind_name(),
                stage: "evaluation",
            }),
        }
    }

    /// Fold a binding's value, type check it and bind it in the
    /// innermost frame.
    pub fn bind(
        &mut self,
        scope: ScopeKind,
        binding: &Binding,
        scopes: &mut Scopes,
    ) -> Result<Entry, CoreError> {
        let folded = self.evaluate(&binding.value, scopes);
        let entry = check_binding(scope, binding, folded)?;
        scopes.define(&binding.name, entry.clone());
        Ok(entry)
    }

    fn call(&mut self, call: &Call, scopes: &mut Scopes) -> Result<Value, CoreError> {
        let Some(def) = self.functions.get(&call.name) else {
            return match find_builtin(&call.name) {
                Some(builtin) => {
                    expect_arity(&call.name, call.args.len(), builtin.arity)?;
                    Err(CoreError::NotConstant {
                        what: format!("builtin '{}'", builtin.name),
                    })
                }
                None => Err(CoreError::UndefinedFunction {
                    name: call.name.clone(),
                }),
            };
        };
        expect_arity(&def.name, call.args.len(), def.params.len())?;
        if self.depth >= MAX_CALL_DEPTH {
            return Err(CoreError::RecursionLimit {
                name: def.name.clone(),
                limit: MAX_CALL_DEPTH,
            });
        }

        let args = call
            .args
            .iter()
            .map(|arg| self.evaluate(arg, scopes))
            .collect::<Result<Vec<_>, _>>()?;

        let suspended = scopes.enter_call(&def.name);
        for (param, value) in def.params.iter().zip(args) {
            let tag = TypeTag::infer(&value);
            scopes.define(param, Entry::known(value, tag));
        }
        self.depth += 1;
        let result = self.run_body(def, scopes);
        self.depth -= 1;
        scopes.leave_call(suspended);
        result
    }

    /// Run a function body for its result: bindings are executed,
    /// the first `return` yields, other statements before the last one
    /// are skipped, and the last one is folded as the result.
    fn run_body(&mut self, def: &FunctionDef, scopes: &mut Scopes) -> Result<Value, CoreError> {
        let Some((last, init)) = def.body.split_last() else {
            return Err(CoreError::NotConstant {
                what: format!("empty body of '{}'", def.name),
            });
        };
        for statement in init {
            match statement {
                Node::ReturnStmt(value) => return self.evaluate(value, scopes),
                Node::ValBinding(binding) | Node::VarBinding(binding) => {
                    self.bind(ScopeKind::Local, binding, scopes)?;
                }
                _ => {}
            }
        }
        match last {
            Node::ReturnStmt(value) => self.evaluate(value, scopes),
            Node::ValBinding(binding) | Node::VarBinding(binding) => self
                .bind(ScopeKind::Local, binding, scopes)?
                .value
                .ok_or_else(|| CoreError::NotConstant {
                    what: format!("variable '{}'", binding.name),
                }),
            other => self.evaluate(other, scopes),
        }
    }
}

pub fn expect_arity(name: &str, given: usize, expected: usize) -> Result<(), CoreError> {
    if given == expected {
        return Ok(());
    }
    Err(CoreError::ArityError {
        name: name.to_string(),
        expected,
        given,
    })
}

fn apply_binary(op: BinaryOperator, left: Value, right: Value) -> Result<Value, CoreError> {
    use BinaryOperator::*;

    match op {
        Add => match (left, right) {
            (Value::Str(l), Value::Str(r)) => Ok(Value::Str(l + &r)),
            (l, r) => arithmetic(op, l, r, i64::checked_add, |a, b| a + b),
        },
        Sub => arithmetic(op, left, right, i64::checked_sub, |a, b| a - b),
        Mul => arithmetic(op, left, right, i64::checked_mul, |a, b| a * b),
        Div => {
            let (Some(l), Some(r)) = (left.as_f64(), right.as_f64()) else {
                return Err(mismatch(op, &left, &right));
            };
            if r == 0.0 {
                return Err(CoreError::DivisionByZero);
            }
            Ok(Value::Float(l / r))
        }
        Eq => Ok(Value::Bool(values_equal(&left, &right))),
        NotEq => Ok(Value::Bool(!values_equal(&left, &right))),
        Less => compare(op, &left, &right, Ordering::is_lt),
        Greater => compare(op, &left, &right, Ordering::is_gt),
        LessEq | GreaterEq => Err(CoreError::UnsupportedOperation {
            op: op.symbol().to_string(),
        }),
    }
}

fn arithmetic(
    op: BinaryOperator,
    left: Value,
    right: Value,
    int_op: impl FnOnce(i64, i64) -> Option<i64>,
    float_op: impl FnOnce(f64, f64) -> f64,
) -> Result<Value, CoreError> {
    match (&left, &right) {
        (Value::Int(l), Value::Int(r)) => int_op(*l, *r).map(Value::Int).ok_or_else(|| {
            CoreError::IntegerOverflow {
                op: op.symbol().to_string(),
            }
        }),
        _ => match (left.as_f64(), right.as_f64()) {
            (Some(l), Some(r)) => Ok(Value::Float(float_op(l, r))),
            _ => Err(mismatch(op, &left, &right)),
        },
    }
}

fn compare(
    op: BinaryOperator,
    left: &Value,
    right: &Value,
    predicate: impl FnOnce(Ordering) -> bool,
) -> Result<Value, CoreError> {
    let ordering = match (left, right) {
        (Value::Int(l), Value::Int(r)) => Some(l.cmp(r)),
        (Value::Str(l), Value::Str(r)) => Some(l.cmp(r)),
        _ => match (left.as_f64(), right.as_f64()) {
            (Some(l), Some(r)) => l.partial_cmp(&r),
            _ => return Err(mismatch(op, left, right)),
        },
    };
    Ok(Value::Bool(ordering.is_some_and(predicate)))
}

fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Int(l), Value::Int(r)) => l == r,
        (Value::Int(_) | Value::Float(_), Value::Int(_) | Value::Float(_)) => {
            left.as_f64() == right.as_f64()
        }
        _ => left == right,
    }
}

fn mismatch(op: BinaryOperator, left: &Value, right: &Value) -> CoreError {
    CoreError::OperandMismatch {
        op: op.symbol().to_string(),
        left: left.kind_name(),
        right: right.kind_name(),
    }
}
