//! Built-in functions and fixed name tables.
//!
//! Everything here is a constant table: read-only, shared by every
//! compilation, and searched linearly because the tables are tiny.

/// Kind of builtin, used by the generator to decide how to lower a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinKind {
    /// Writes a term to standard output with `io:format/2`.
    Print,

    /// The pid of the running process, `self()`.
    SelfPid,
}

/// Metadata about a single builtin symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuiltinDescriptor {
    /// Name at the Potion level.
    pub name: &'static str,

    pub arity: usize,

    /// Kind tag used by the generator.
    pub kind: BuiltinKind,
}

/// The complete list of builtins known to the core.
///
/// User functions with the same name take precedence.
pub const BUILTINS: &[BuiltinDescriptor] = &[
    BuiltinDescriptor {
        name: "print",
        arity: 1,
        kind: BuiltinKind::Print,
    },
    BuiltinDescriptor {
        name: "self",
        arity: 0,
        kind: BuiltinKind::SelfPid,
    },
];

pub fn find_builtin(name: &str) -> Option<&'static BuiltinDescriptor> {
    BUILTINS.iter().find(|builtin| builtin.name == name)
}

/// Potion words with a fixed Erlang spelling.
pub const RESERVED_WORDS: &[(&str, &str)] = &[
    ("true", "true"),
    ("false", "false"),
    ("none", "undefined"),
];

pub fn reserved_word(word: &str) -> Option<&'static str> {
    RESERVED_WORDS
        .iter()
        .find(|(potion, _)| *potion == word)
        .map(|(_, erlang)| *erlang)
}

/// Erlang reserved words; an atom spelled like one must be quoted.
pub const ERLANG_KEYWORDS: &[&str] = &[
    "after", "and", "andalso", "band", "begin", "bnot", "bor", "bsl", "bsr", "bxor", "case",
    "catch", "cond", "div", "else", "end", "fun", "if", "let", "maybe", "not", "of", "or",
    "orelse", "receive", "rem", "try", "when", "xor",
];

pub fn is_erlang_keyword(word: &str) -> bool {
    ERLANG_KEYWORDS.contains(&word)
}

/// Macros the Erlang preprocessor defines itself; `-define` may not
/// redefine them.
pub const ERLANG_PREDEFINED_MACROS: &[&str] = &[
    "MODULE",
    "MODULE_STRING",
    "FILE",
    "LINE",
    "MACHINE",
    "FUNCTION_NAME",
    "FUNCTION_ARITY",
    "OTP_RELEASE",
    "FEATURE_AVAILABLE",
    "FEATURE_ENABLED",
];

pub fn is_predefined_macro(name: &str) -> bool {
    ERLANG_PREDEFINED_MACROS.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_builtins_by_name() {
        assert_eq!(find_builtin("print").map(|b| b.kind), Some(BuiltinKind::Print));
        assert_eq!(find_builtin("self").map(|b| b.arity), Some(0));
        assert!(find_builtin("spawn").is_none());
    }

    #[test]
    fn maps_reserved_words() {
        assert_eq!(reserved_word("none"), Some("undefined"));
        assert_eq!(reserved_word("true"), Some("true"));
        assert_eq!(reserved_word("nil"), None);
    }

    #[test]
    fn recognises_erlang_keywords() {
        assert!(is_erlang_keyword("receive"));
        assert!(is_erlang_keyword("end"));
        assert!(!is_erlang_keyword("main"));
    }

    #[test]
    fn recognises_predefined_macros() {
        assert!(is_predefined_macro("LINE"));
        assert!(is_predefined_macro("MODULE_STRING"));
        assert!(!is_predefined_macro("line"));
        assert!(!is_predefined_macro("TOTAL"));
    }
}
