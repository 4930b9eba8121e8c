//! Per-binding type checking.
//!
//! Checking is shallow: a binding's folded value is compared against its
//! annotation (or gives the binding its tag when there is none), and the
//! result is recorded for that one name. Nothing is propagated further.

use crate::ast::Binding;
use crate::error::CoreError;
use crate::evaluator::Value;
use crate::scope::Entry;
use crate::types::{ScopeKind, TypeTag};

/// Check one binding given the outcome of folding its value.
///
/// A local binding whose value only exists at runtime is accepted; its
/// annotation, if any, must still name a known tag. Every other
/// evaluation failure is returned unchanged.
pub fn check_binding(
    scope: ScopeKind,
    binding: &Binding,
    folded: Result<Value, CoreError>,
) -> Result<Entry, CoreError> {
    match folded {
        Ok(value) => {
            let tag = match &binding.annotation {
                Some(annotation) => {
                    let expected = declared_tag(scope, binding, annotation)?;
                    let actual = TypeTag::infer(&value);
                    if actual != Some(expected) {
                        return Err(CoreError::TypeMismatch {
                            scope,
                            name: binding.name.clone(),
                            expected: expected.to_string(),
                            actual: actual
                                .map_or_else(|| value.kind_name().to_string(), |t| t.to_string()),
                        });
                    }
                    expected
                }
                None => TypeTag::infer(&value).ok_or_else(|| CoreError::UnknownInferredType {
                    scope,
                    name: binding.name.clone(),
                    kind: value.kind_name(),
                })?,
            };
            Ok(Entry::known(value, Some(tag)))
        }
        Err(CoreError::NotConstant { .. }) if scope == ScopeKind::Local => {
            let tag = binding
                .annotation
                .as_deref()
                .map(|annotation| declared_tag(scope, binding, annotation))
                .transpose()?;
            Ok(Entry::runtime(tag))
        }
        Err(err) => Err(err),
    }
}

fn declared_tag(scope: ScopeKind, binding: &Binding, annotation: &str) -> Result<TypeTag, CoreError> {
    TypeTag::from_annotation(annotation).ok_or_else(|| CoreError::UnknownType {
        scope,
        name: binding.name.clone(),
        annotation: annotation.to_string(),
    })
}
