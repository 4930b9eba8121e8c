//! Erlang backend for Potion.
//!
//! Lowers a parsed `Program` to the text of one Erlang module. Constant
//! folding and per-binding type checks run alongside emission through
//! the `Evaluator`, so text is only returned from a fully checked walk.
//!
//! Naming: a name bound in a function, call or branch frame is a local
//! and renders capitalised (`total` -> `Total`); a name bound in the
//! global frame is a module macro (`total` -> `?TOTAL`). Locality is
//! decided against the scope stack at the moment the name is emitted.

use crate::ast::{Binding, BinaryOperator, Call, FunctionDef, MatchClause, Node, Program};
use crate::builtins::{
    BuiltinKind, find_builtin, is_erlang_keyword, is_predefined_macro, reserved_word,
};
use crate::error::CoreError;
use crate::evaluator::{Evaluator, FunctionTable, Value, expect_arity};
use crate::scope::{Entry, FrameKind, Scopes};
use crate::types::{ScopeKind, TypeTag};

const INDENT: &str = "    ";

/// One entry of the `-export` attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Export {
    pub name: String,
    pub arity: usize,
}

/// Outcome of checking one binding, in the order bindings were checked.
#[derive(Debug, Clone, PartialEq)]
pub struct BindingReport {
    pub scope: ScopeKind,
    /// Enclosing function for local bindings.
    pub function: Option<String>,
    pub name: String,
    pub tag: Option<TypeTag>,
    /// Folded value; `None` when the value only exists at runtime.
    pub value: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ErlangModule {
    pub source: String,
    pub exports: Vec<Export>,
    pub bindings: Vec<BindingReport>,
}

/// Generate the Erlang module for `program`.
///
/// Top-level functions are collected first, so globals may call
/// functions defined later in the file. Globals are then folded in
/// source order, and finally every function body is emitted.
pub fn generate(program: &Program, module_name: &str) -> Result<ErlangModule, CoreError> {
    let mut functions = FunctionTable::new();
    for statement in &program.statements {
        if let Node::FunctionDef(def) = statement {
            functions.insert(def);
        }
    }

    let mut scopes = Scopes::new();
    let mut generator = Generator {
        evaluator: Evaluator::new(&functions),
        functions: &functions,
        bindings: Vec::new(),
    };

    let mut globals: Vec<(&str, Value)> = Vec::new();
    for statement in &program.statements {
        match statement {
            Node::FunctionDef(_) => {}
            Node::ValBinding(binding) | Node::VarBinding(binding) => {
                check_macro_name(&binding.name, globals.iter().map(|(name, _)| *name))?;
                let entry = generator.bind(ScopeKind::Global, binding, &mut scopes)?;
                let value = entry.value.ok_or_else(|| CoreError::NotConstant {
                    what: format!("global '{}'", binding.name),
                })?;
                match globals.iter_mut().find(|(name, _)| *name == binding.name) {
                    Some(slot) => slot.1 = value,
                    None => globals.push((binding.name.as_str(), value)),
                }
            }
            other => {
                return Err(CoreError::TopLevelStatement {
                    kind: other.kind_name(),
                });
            }
        }
    }

    let defs: Vec<&FunctionDef> = program
        .statements
        .iter()
        .filter_map(|statement| match statement {
            Node::FunctionDef(def) if functions.is_current(def) => Some(def),
            _ => None,
        })
        .collect();

    let mut blocks = Vec::with_capacity(defs.len());
    for def in &defs {
        blocks.push(generator.function(def, &mut scopes)?);
    }

    let exports: Vec<Export> = defs
        .iter()
        .map(|def| Export {
            name: def.name.clone(),
            arity: def.params.len(),
        })
        .collect();

    let mut lines = vec![
        format!("-module({module_name})."),
        format!(
            "-export([{}]).",
            exports
                .iter()
                .map(|export| format!("{}/{}", atom(&export.name), export.arity))
                .collect::<Vec<_>>()
                .join(", ")
        ),
    ];
    if !globals.is_empty() {
        lines.push(String::new());
        for (name, value) in &globals {
            lines.push(format!("-define({}, {}).", macro_name(name), erlang_literal(value)));
        }
    }
    for block in blocks {
        lines.push(String::new());
        lines.push(block);
    }

    let mut source = lines.join("\n");
    source.push('\n');

    Ok(ErlangModule {
        source,
        exports,
        bindings: generator.bindings,
    })
}

struct Generator<'a> {
    evaluator: Evaluator<'a>,
    functions: &'a FunctionTable<'a>,
    bindings: Vec<BindingReport>,
}

impl<'a> Generator<'a> {
    fn bind(
        &mut self,
        scope: ScopeKind,
        binding: &Binding,
        scopes: &mut Scopes,
    ) -> Result<Entry, CoreError> {
        let entry = self.evaluator.bind(scope, binding, scopes)?;
        self.bindings.push(BindingReport {
            scope,
            function: scopes.current_function().map(str::to_string),
            name: binding.name.clone(),
            tag: entry.tag,
            value: entry.value.clone(),
        });
        Ok(entry)
    }

    fn function(&mut self, def: &FunctionDef, scopes: &mut Scopes) -> Result<String, CoreError> {
        scopes.enter_function(&def.name);
        for param in &def.params {
            scopes.define(param, Entry::runtime(None));
        }
        let text = self.function_text(def, scopes);
        scopes.leave();
        text
    }

    fn function_text(&mut self, def: &FunctionDef, scopes: &mut Scopes) -> Result<String, CoreError> {
        let params = def
            .params
            .iter()
            .map(|param| format_variable(scopes, param))
            .collect::<Result<Vec<_>, _>>()?;
        let body = self.sequence(&def.body, 1, scopes)?;
        Ok(format!(
            "{}({}) ->\n{body}.",
            atom(&def.name),
            params.join(", ")
        ))
    }

    /// Statements at indentation `depth`, comma separated. The last one is
    /// the value of the sequence; an empty sequence is `ok`.
    fn sequence(
        &mut self,
        statements: &[Node],
        depth: usize,
        scopes: &mut Scopes,
    ) -> Result<String, CoreError> {
        let pad = INDENT.repeat(depth);
        if statements.is_empty() {
            return Ok(format!("{pad}ok"));
        }
        let mut lines = Vec::with_capacity(statements.len());
        for statement in statements {
            lines.push(format!("{pad}{}", self.emit(statement, depth, scopes)?));
        }
        Ok(lines.join(",\n"))
    }

    /// A sequence in its own block frame.
    fn arm(
        &mut self,
        statements: &[Node],
        depth: usize,
        scopes: &mut Scopes,
    ) -> Result<String, CoreError> {
        scopes.enter(FrameKind::Block);
        let text = self.sequence(statements, depth, scopes);
        scopes.leave();
        text
    }

    /// Emit one node whose text starts on a line indented by `depth`.
    fn emit(&mut self, node: &Node, depth: usize, scopes: &mut Scopes) -> Result<String, CoreError> {
        match node {
            Node::LiteralInt(value) => Ok(value.to_string()),
            Node::LiteralString(value) => Ok(erlang_string(value)),
            Node::LiteralBool(value) => Ok(erlang_literal(&Value::Bool(*value))),
            Node::NoneLiteral => Ok(erlang_literal(&Value::None)),
            Node::Identifier(name) => format_variable(scopes, name),
            Node::BinaryOp { op, left, right } => {
                let left = self.emit(left, depth, scopes)?;
                let right = self.emit(right, depth, scopes)?;
                Ok(format!("({left} {} {right})", erlang_operator(*op)))
            }
            Node::FunctionCall(call) => self.call(call, depth, scopes),
            Node::Print(value) => {
                let value = self.emit(value, depth, scopes)?;
                Ok(print_call(&value))
            }
            Node::ValBinding(binding) | Node::VarBinding(binding) => {
                let value = self.emit(&binding.value, depth, scopes)?;
                self.bind(ScopeKind::Local, binding, scopes)?;
                Ok(format!("{} = {value}", format_variable(scopes, &binding.name)?))
            }
            Node::ReturnStmt(value) => self.emit(value, depth, scopes),
            Node::IfExpr {
                condition,
                then_body,
                else_body,
            } => {
                let condition = self.emit(condition, depth, scopes)?;
                let then_text = self.arm(then_body, depth + 2, scopes)?;
                let else_text = self.arm(else_body.as_deref().unwrap_or_default(), depth + 2, scopes)?;
                let inner = INDENT.repeat(depth + 1);
                let outer = INDENT.repeat(depth);
                Ok(format!(
                    "case {condition} of\n{inner}true ->\n{then_text};\n{inner}_ ->\n{else_text}\n{outer}end"
                ))
            }
            Node::MapLiteral(entries) => {
                let mut fields = Vec::with_capacity(entries.len());
                for (key, value) in entries {
                    fields.push(format!("{} => {}", atom(key), self.emit(value, depth, scopes)?));
                }
                Ok(format!("#{{{}}}", fields.join(", ")))
            }
            Node::SendExpr { target, message } => {
                let target = self.emit(target, depth, scopes)?;
                let message = self.emit(message, depth, scopes)?;
                Ok(format!("({target} ! {message})"))
            }
            Node::SpawnExpr(call) => {
                let call = self.call(call, depth, scopes)?;
                Ok(format!("spawn(fun() -> {call} end)"))
            }
            Node::MatchExpr { value, clauses } => self.match_expr(value, clauses, depth, scopes),
            Node::ReceiveBlock { binding, body } => {
                scopes.enter(FrameKind::Block);
                scopes.define(binding, Entry::runtime(None));
                let text = self.receive_text(binding, body, depth, scopes);
                scopes.leave();
                text
            }
            Node::FunctionDef(_) => Err(CoreError::UnknownNodeKind {
                kind: node.kind_name(),
                stage: "generation",
            }),
        }
    }

    fn call(&mut self, call: &Call, depth: usize, scopes: &mut Scopes) -> Result<String, CoreError> {
        let args = call
            .args
            .iter()
            .map(|arg| self.emit(arg, depth, scopes))
            .collect::<Result<Vec<_>, _>>()?;

        if let Some(def) = self.functions.get(&call.name) {
            expect_arity(&def.name, args.len(), def.params.len())?;
            return Ok(format!("{}({})", atom(&call.name), args.join(", ")));
        }
        let builtin = find_builtin(&call.name).ok_or_else(|| CoreError::UndefinedFunction {
            name: call.name.clone(),
        })?;
        expect_arity(builtin.name, args.len(), builtin.arity)?;
        Ok(match builtin.kind {
            BuiltinKind::Print => print_call(&args.join(", ")),
            BuiltinKind::SelfPid => "self()".to_string(),
        })
    }

    fn match_expr(
        &mut self,
        value: &Node,
        clauses: &[MatchClause],
        depth: usize,
        scopes: &mut Scopes,
    ) -> Result<String, CoreError> {
        if clauses.is_empty() {
            return Err(CoreError::InvalidPattern {
                found: "an empty match",
            });
        }
        let subject = self.emit(value, depth, scopes)?;
        let mut arms = Vec::with_capacity(clauses.len());
        for clause in clauses {
            scopes.enter(FrameKind::Block);
            let arm = self.clause(clause, depth, scopes);
            scopes.leave();
            arms.push(arm?);
        }
        Ok(format!(
            "case {subject} of\n{}\n{}end",
            arms.join(";\n"),
            INDENT.repeat(depth)
        ))
    }

    fn clause(
        &mut self,
        clause: &MatchClause,
        depth: usize,
        scopes: &mut Scopes,
    ) -> Result<String, CoreError> {
        let pattern = pattern(&clause.pattern, scopes)?;
        let body = self.sequence(&clause.body, depth + 2, scopes)?;
        Ok(format!("{}{pattern} ->\n{body}", INDENT.repeat(depth + 1)))
    }

    fn receive_text(
        &mut self,
        binding: &str,
        body: &[Node],
        depth: usize,
        scopes: &mut Scopes,
    ) -> Result<String, CoreError> {
        let variable = format_variable(scopes, binding)?;
        let body = self.sequence(body, depth + 2, scopes)?;
        Ok(format!(
            "receive\n{}{variable} ->\n{body}\n{}end",
            INDENT.repeat(depth + 1),
            INDENT.repeat(depth)
        ))
    }
}

/// Render a `match` pattern. Unbound names become fresh locals of the
/// clause; bound ones match against their current value.
fn pattern(node: &Node, scopes: &mut Scopes) -> Result<String, CoreError> {
    match node {
        Node::LiteralInt(value) => Ok(value.to_string()),
        Node::LiteralString(value) => Ok(erlang_string(value)),
        Node::LiteralBool(value) => Ok(erlang_literal(&Value::Bool(*value))),
        Node::NoneLiteral => Ok(erlang_literal(&Value::None)),
        Node::Identifier(name) if name == "_" => Ok("_".to_string()),
        Node::Identifier(name) => {
            if scopes.resolve(name).is_none() {
                scopes.define(name, Entry::runtime(None));
            }
            format_variable(scopes, name)
        }
        Node::MapLiteral(entries) => {
            let mut fields = Vec::with_capacity(entries.len());
            for (key, value) in entries {
                fields.push(format!("{} := {}", atom(key), pattern(value, scopes)?));
            }
            Ok(format!("#{{{}}}", fields.join(", ")))
        }
        other => Err(CoreError::InvalidPattern {
            found: other.kind_name(),
        }),
    }
}

/// Render a folded value as an Erlang term.
pub fn erlang_literal(value: &Value) -> String {
    match value {
        Value::Int(v) => v.to_string(),
        Value::Float(v) => format!("{v:?}"),
        Value::Str(s) => erlang_string(s),
        Value::Bool(true) => reserved("true").to_string(),
        Value::Bool(false) => reserved("false").to_string(),
        Value::None => reserved("none").to_string(),
    }
}

/// Quote `text` as an Erlang string. Potion strings have no escapes, so
/// every backslash and quote is literal text.
pub fn erlang_string(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('"');
    for c in text.chars() {
        if matches!(c, '\\' | '"') {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

fn reserved(word: &'static str) -> &'static str {
    reserved_word(word).unwrap_or(word)
}

/// Render a variable reference according to the frame that binds it.
pub fn format_variable(scopes: &Scopes, name: &str) -> Result<String, CoreError> {
    match scopes.resolve_with_kind(name) {
        Some((FrameKind::Global, _)) => Ok(format!("?{}", macro_name(name))),
        Some(_) => Ok(local_variable(name)),
        None => Err(CoreError::UndeclaredVariable {
            name: name.to_string(),
        }),
    }
}

fn macro_name(name: &str) -> String {
    name.to_uppercase()
}

/// A global's macro must not shadow a predefined macro, nor share its
/// spelling with a differently named global.
fn check_macro_name<'g>(
    name: &str,
    mut earlier: impl Iterator<Item = &'g str>,
) -> Result<(), CoreError> {
    let spelling = macro_name(name);
    let other = if is_predefined_macro(&spelling) {
        "a predefined Erlang macro".to_string()
    } else if let Some(other) = earlier.find(|other| *other != name && macro_name(other) == spelling) {
        format!("global '{other}'")
    } else {
        return Ok(());
    };
    Err(CoreError::MacroNameConflict {
        name: name.to_string(),
        macro_name: spelling,
        other,
    })
}

fn local_variable(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// True if `name` reads as an atom without quotes.
pub fn is_plain_atom(name: &str) -> bool {
    name.starts_with(|c: char| c.is_ascii_lowercase())
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !is_erlang_keyword(name)
}

/// An Erlang atom for `name`, quoted when it would not read as one.
pub fn atom(name: &str) -> String {
    if is_plain_atom(name) {
        name.to_string()
    } else {
        format!("'{name}'")
    }
}

fn erlang_operator(op: BinaryOperator) -> &'static str {
    match op {
        BinaryOperator::Div => "div",
        BinaryOperator::NotEq => "/=",
        BinaryOperator::LessEq => "=<",
        other => other.symbol(),
    }
}

fn print_call(value: &str) -> String {
    format!("io:format(\"~p~n\", [{value}])")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_source;

    fn generate_source(source: &str) -> Result<ErlangModule, CoreError> {
        let program = parse_source(source).expect("parse");
        generate(&program, "demo")
    }

    fn erlang(source: &str) -> String {
        generate_source(source).expect("generate").source
    }

    #[test]
    fn emits_header_macros_and_function() {
        assert_eq!(
            erlang("val x = 5\nfn f() { return x }"),
            "-module(demo).\n\
             -export([f/0]).\n\
             \n\
             -define(X, 5).\n\
             \n\
             f() ->\n    ?X.\n"
        );
    }

    #[test]
    fn module_without_globals_or_functions() {
        assert_eq!(erlang(""), "-module(demo).\n-export([]).\n");
    }

    #[test]
    fn empty_body_is_ok() {
        assert!(erlang("fn vazio() { }").contains("vazio() ->\n    ok."));
    }

    #[test]
    fn parameters_are_locals_and_set_the_arity() {
        let module = generate_source("fn add(a, b) { return a + b }").unwrap();
        assert_eq!(
            module.exports,
            vec![Export {
                name: "add".to_string(),
                arity: 2,
            }]
        );
        assert!(module.source.contains("-export([add/2])."));
        assert!(module.source.contains("add(A, B) ->\n    (A + B)."));
    }

    #[test]
    fn separates_statements_and_ends_with_result() {
        let text = erlang("val base: int = 10\nfn somar() { val a: int = base + 5\nval b = a * 2\nreturn b + 3 }");
        assert!(text.contains(
            "somar() ->\n    A = (?BASE + 5),\n    B = (A * 2),\n    (B + 3)."
        ));
    }

    #[test]
    fn division_lowers_to_integer_division() {
        let text = erlang("fn half(n) { return n / 2 }");
        assert!(text.contains("(N div 2)"));
    }

    #[test]
    fn comparison_operators_use_erlang_spelling() {
        let text = erlang(
            "fn cmp(a, b) { val c = a == b\nval d = a != b\nval e = a <= b\nval f = a >= b\nreturn a < b }",
        );
        assert!(text.contains("C = (A == B)"));
        assert!(text.contains("D = (A /= B)"));
        assert!(text.contains("E = (A =< B)"));
        assert!(text.contains("F = (A >= B)"));
        assert!(text.contains("(A < B)."));
    }

    #[test]
    fn lowers_if_else_to_case() {
        let text = erlang(
            "val valor = 0\nfn verificar() { if valor > 0 { print(\"maior\") } else { print(\"menor\") } }",
        );
        assert!(text.contains(
            "verificar() ->\n\
             \x20   case (?VALOR > 0) of\n\
             \x20       true ->\n\
             \x20           io:format(\"~p~n\", [\"maior\"]);\n\
             \x20       _ ->\n\
             \x20           io:format(\"~p~n\", [\"menor\"])\n\
             \x20   end."
        ));
    }

    #[test]
    fn if_without_else_falls_back_to_ok() {
        let text = erlang("fn f(x) { if x == true { return 1 } }");
        assert!(text.contains("        _ ->\n            ok\n    end."));
    }

    #[test]
    fn branch_bindings_stay_in_their_arm() {
        let err = generate_source("fn f(x) { if x > 1 { val y = 2 }\nreturn y }").unwrap_err();
        assert_eq!(err, CoreError::UndeclaredVariable { name: "y".into() });
    }

    #[test]
    fn function_locals_do_not_leak_into_later_functions() {
        let err = generate_source("fn a() { val t = 1\nreturn t }\nfn b() { return t }").unwrap_err();
        assert_eq!(err, CoreError::UndeclaredVariable { name: "t".into() });
    }

    #[test]
    fn locality_is_decided_when_the_name_is_emitted() {
        let text = erlang("val x = 1\nfn f() { val y = x + 1\nval x = 5\nreturn x + y }");
        assert!(text.contains("Y = (?X + 1)"));
        assert!(text.contains("X = 5"));
        assert!(text.contains("(X + Y)."));
    }

    #[test]
    fn reports_undeclared_variable_at_emission() {
        let err = generate_source("fn f() { return ghost }").unwrap_err();
        assert_eq!(err.to_string(), "variable 'ghost' is not declared");
    }

    #[test]
    fn records_folded_and_runtime_bindings() {
        let module = generate_source("val g = \"hi\"\nfn f(n) { val m: int = n + 1\nval k = 2\nreturn m }").unwrap();
        assert_eq!(
            module.bindings,
            vec![
                BindingReport {
                    scope: ScopeKind::Global,
                    function: None,
                    name: "g".into(),
                    tag: Some(TypeTag::Str),
                    value: Some(Value::Str("hi".into())),
                },
                BindingReport {
                    scope: ScopeKind::Local,
                    function: Some("f".into()),
                    name: "m".into(),
                    tag: Some(TypeTag::Int),
                    value: None,
                },
                BindingReport {
                    scope: ScopeKind::Local,
                    function: Some("f".into()),
                    name: "k".into(),
                    tag: Some(TypeTag::Int),
                    value: Some(Value::Int(2)),
                },
            ]
        );
    }

    #[test]
    fn local_type_mismatch_names_local_scope() {
        let err = generate_source("fn f() { val s: str = 1 + 2 }").unwrap_err();
        assert_eq!(
            err,
            CoreError::TypeMismatch {
                scope: ScopeKind::Local,
                name: "s".into(),
                expected: "str".into(),
                actual: "int".into(),
            }
        );
    }

    #[test]
    fn globals_fold_calls_to_later_functions() {
        let text = erlang("val answer = twice(21)\nfn twice(n) { return n * 2 }");
        assert!(text.contains("-define(ANSWER, 42)."));
    }

    #[test]
    fn global_redefinition_keeps_one_macro() {
        let text = erlang("val x = 1\nval x = 2\nvar y = true");
        assert_eq!(text.matches("-define(X").count(), 1);
        assert!(text.contains("-define(X, 2)."));
        assert!(text.contains("-define(Y, true)."));
    }

    #[test]
    fn function_redefinition_is_last_wins() {
        let module =
            generate_source("fn f() { return 1 }\nfn g() { return f(2) }\nfn f(a) { return a }").unwrap();
        assert!(module.source.contains("-export([g/0, f/1])."));
        assert!(module.source.contains("g() ->\n    f(2)."));
        assert!(module.source.contains("f(A) ->\n    A."));
        assert!(!module.source.contains("f() ->"));
    }

    #[test]
    fn call_sites_are_arity_checked() {
        let err = generate_source("fn add(a, b) { return a + b }\nfn main() { return add(1) }").unwrap_err();
        assert_eq!(
            err,
            CoreError::ArityError {
                name: "add".into(),
                expected: 2,
                given: 1,
            }
        );
        let err = generate_source("fn main() { return missing(1) }").unwrap_err();
        assert_eq!(err, CoreError::UndefinedFunction { name: "missing".into() });
    }

    #[test]
    fn lowers_message_passing_forms() {
        let text = erlang(
            "fn worker(n) { receive msg { match msg { {kind: k, from: pid} => send(pid, {reply: k}), _ => print(none) } } }\n\
             fn main() { val pid = sp worker(1)\nsend(pid, {kind: \"ping\", from: self()}) }",
        );
        assert!(text.contains(
            "worker(N) ->\n\
             \x20   receive\n\
             \x20       Msg ->\n\
             \x20           case Msg of\n\
             \x20               #{kind := K, from := Pid} ->\n\
             \x20                   (Pid ! #{reply => K});\n\
             \x20               _ ->\n\
             \x20                   io:format(\"~p~n\", [undefined])\n\
             \x20           end\n\
             \x20   end."
        ));
        assert!(text.contains("Pid = spawn(fun() -> worker(1) end),"));
        assert!(text.contains("(Pid ! #{kind => \"ping\", from => self()})."));
    }

    #[test]
    fn match_patterns_reuse_bound_names() {
        let text = erlang("val stop = \"stop\"\nfn f(m, n) { match m { stop => 0, n => 1, other => other } }");
        assert!(text.contains("?STOP ->"));
        assert!(text.contains("N ->"));
        assert!(text.contains("Other ->\n            Other"));
    }

    #[test]
    fn rejects_non_pattern_clauses() {
        let err = generate_source("fn f(m) { match m { m + 1 => 0 } }").unwrap_err();
        assert_eq!(err, CoreError::InvalidPattern { found: "binary operation" });
    }

    #[test]
    fn rejects_nested_functions_and_top_level_statements() {
        let err = generate_source("fn outer() { fn inner() { } }").unwrap_err();
        assert!(matches!(err, CoreError::UnknownNodeKind { kind: "function definition", .. }));

        let err = generate_source("print(1)").unwrap_err();
        assert_eq!(err, CoreError::TopLevelStatement { kind: "print call" });
    }

    #[test]
    fn quotes_atoms_that_are_not_plain() {
        assert_eq!(atom("main"), "main");
        assert_eq!(atom("receive"), "'receive'");
        assert_eq!(atom("Upper"), "'Upper'");
        assert_eq!(atom("_hidden"), "'_hidden'");
        let text = erlang("fn end() { return 1 }");
        assert!(text.contains("-export(['end'/0])."));
        assert!(text.contains("'end'() ->"));
    }

    #[test]
    fn strings_keep_backslashes_literal() {
        let text = erlang("val s = \"C:\\\"\nval t = \"a\\nb\"\nfn f(m) { match m { \"x\\\" => s, _ => \"\\\" } }");
        assert!(text.contains("-define(S, \"C:\\\\\")."));
        assert!(text.contains("-define(T, \"a\\\\nb\")."));
        assert!(text.contains("\"x\\\\\" ->"));
        assert!(text.contains("            \"\\\\\"\n"));
        assert_eq!(erlang_string("say \"hi\""), "\"say \\\"hi\\\"\"");
    }

    #[test]
    fn rejects_globals_named_like_predefined_macros() {
        for name in ["line", "module", "function_name"] {
            let err = generate_source(&format!("val {name} = 3\nfn f() {{ return {name} }}")).unwrap_err();
            assert_eq!(
                err,
                CoreError::MacroNameConflict {
                    name: name.into(),
                    macro_name: name.to_uppercase(),
                    other: "a predefined Erlang macro".into(),
                }
            );
        }
    }

    #[test]
    fn rejects_globals_that_share_a_macro() {
        let err = generate_source("val ab = 1\nval aB = 2").unwrap_err();
        assert_eq!(
            err,
            CoreError::MacroNameConflict {
                name: "aB".into(),
                macro_name: "AB".into(),
                other: "global 'ab'".into(),
            }
        );
        assert_eq!(
            err.to_string(),
            "global 'aB' would be emitted as ?AB, which clashes with global 'ab'"
        );
        assert!(generate_source("val ab = 1\nval ab = 2").is_ok());
    }

    #[test]
    fn renders_folded_values_as_terms() {
        assert_eq!(erlang_literal(&Value::Int(-3)), "-3");
        assert_eq!(erlang_literal(&Value::Float(3.5)), "3.5");
        assert_eq!(erlang_literal(&Value::Str("s".into())), "\"s\"");
        assert_eq!(erlang_literal(&Value::Bool(false)), "false");
        assert_eq!(erlang_literal(&Value::None), "undefined");
    }
}
