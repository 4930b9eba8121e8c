use crate::ast::Program;
use crate::codegen_erlang::{self, BindingReport, Export};
use crate::error::CoreError;
use crate::parser::parse_source;

pub const DEFAULT_MODULE_NAME: &str = "module_name";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    /// Name used in the `-module` attribute. Must be a plain Erlang atom.
    pub module_name: String,
}

impl Default for CompileOptions {
    fn default() -> Self {
        CompileOptions {
            module_name: DEFAULT_MODULE_NAME.to_string(),
        }
    }
}

impl CompileOptions {
    pub fn with_module_name(module_name: impl Into<String>) -> Self {
        CompileOptions {
            module_name: module_name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompilationArtifact {
    pub erlang: String,
    pub module_name: String,
    pub exports: Vec<Export>,
    pub bindings: Vec<BindingReport>,
}

/// Compile Potion source text to the text of one Erlang module.
pub fn compile_erlang(
    source: &str,
    options: &CompileOptions,
) -> Result<CompilationArtifact, CoreError> {
    validate_module_name(&options.module_name)?;
    let program = parse_source(source)?;
    compile_program(&program, options)
}

/// Compile an already parsed program.
pub fn compile_program(
    program: &Program,
    options: &CompileOptions,
) -> Result<CompilationArtifact, CoreError> {
    validate_module_name(&options.module_name)?;
    let module = codegen_erlang::generate(program, &options.module_name)?;
    Ok(CompilationArtifact {
        erlang: module.source,
        module_name: options.module_name.clone(),
        exports: module.exports,
        bindings: module.bindings,
    })
}

/// Module names are emitted unquoted, so they must read as a plain atom
/// that can also name the `.erl` file.
pub fn validate_module_name(name: &str) -> Result<(), CoreError> {
    if codegen_erlang::is_plain_atom(name) {
        Ok(())
    } else {
        Err(CoreError::InvalidModuleName {
            name: name.to_string(),
        })
    }
}
