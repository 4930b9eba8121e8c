//! Type tags for Potion bindings.
//!
//! Potion has no static type system. A binding may carry a declared tag
//! (`val x: int = ...`) and otherwise gets the tag of its folded value.
//! The set of tags is closed; both lookup directions go through the
//! constant tables below, which are never mutated after startup.

use core::fmt;

use crate::evaluator::Value;

/// Primitive type markers understood by the checker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Int,
    Str,
    Bool,
}

/// Annotation name -> tag.
pub const TYPE_TAGS: &[(&str, TypeTag)] = &[
    ("int", TypeTag::Int),
    ("str", TypeTag::Str),
    ("bool", TypeTag::Bool),
];

impl TypeTag {
    /// Resolve a source annotation such as `int`.
    pub fn from_annotation(name: &str) -> Option<TypeTag> {
        TYPE_TAGS
            .iter()
            .find(|(annotation, _)| *annotation == name)
            .map(|(_, tag)| *tag)
    }

    /// The tag of a folded value, if its kind has one.
    ///
    /// Floats (produced by real division) and `none` have no entry.
    pub fn infer(value: &Value) -> Option<TypeTag> {
        match value {
            Value::Int(_) => Some(TypeTag::Int),
            Value::Str(_) => Some(TypeTag::Str),
            Value::Bool(_) => Some(TypeTag::Bool),
            Value::Float(_) | Value::None => None,
        }
    }

    pub fn name(self) -> &'static str {
        TYPE_TAGS
            .iter()
            .find(|(_, tag)| *tag == self)
            .map(|(name, _)| *name)
            .unwrap_or("unknown")
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Where a binding is checked; shows up in type diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Global,
    Local,
}

impl fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScopeKind::Global => f.write_str("global"),
            ScopeKind::Local => f.write_str("local"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_known_annotations() {
        assert_eq!(TypeTag::from_annotation("int"), Some(TypeTag::Int));
        assert_eq!(TypeTag::from_annotation("str"), Some(TypeTag::Str));
        assert_eq!(TypeTag::from_annotation("bool"), Some(TypeTag::Bool));
        assert_eq!(TypeTag::from_annotation("float"), None);
    }

    #[test]
    fn infers_tags_from_values() {
        assert_eq!(TypeTag::infer(&Value::Int(1)), Some(TypeTag::Int));
        assert_eq!(TypeTag::infer(&Value::Str("a".into())), Some(TypeTag::Str));
        assert_eq!(TypeTag::infer(&Value::Bool(false)), Some(TypeTag::Bool));
        assert_eq!(TypeTag::infer(&Value::Float(3.5)), None);
        assert_eq!(TypeTag::infer(&Value::None), None);
    }

    #[test]
    fn tag_names_round_trip_through_table() {
        for (name, tag) in TYPE_TAGS {
            assert_eq!(tag.to_string(), *name);
        }
    }
}
