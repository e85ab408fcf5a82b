//! Runtime script compilation.
//!
//! Scripts are [rhai](https://rhai.rs) source files. [`ScriptCompiler`]
//! reads a file, parses and compiles it into an in-memory [`rhai::AST`] and
//! invokes a named function on it. A script "type" is a zero-argument
//! function returning the instance (usually an object map); when it exists
//! the method is called with `this` bound to that instance.
//!
//! ```rhai
//! fn Greeter() { #{ greeting: "hello" } }
//! fn greet(name) { log_info(this.greeting + ", " + name); name.len() }
//! ```
//!
//! Nothing is cached: every call recompiles the file.

use std::{
    fmt,
    path::{Path, PathBuf},
};

use anyhow::anyhow;
use rhai::{AST, CallFnOptions, Dynamic, Engine, ParseError, ParseErrorType, Scope};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    /// A lenient-mode problem (e.g. an undeclared variable) that the
    /// compiler is configured to reject.
    WarningAsError,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => f.write_str("error"),
            Self::WarningAsError => f.write_str("warning-as-error"),
        }
    }
}

/// One compiler message, formatted like `path:line:col: severity: message`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub path: PathBuf,
    pub severity: Severity,
    pub message: String,
    pub line: Option<usize>,
    pub column: Option<usize>,
}

impl Diagnostic {
    fn from_parse_error(path: &Path, err: &ParseError) -> Self {
        let severity = match err.err_type() {
            ParseErrorType::VariableUndefined(_) => Severity::WarningAsError,
            _ => Severity::Error,
        };
        let position = err.position();
        Self {
            path: path.to_path_buf(),
            severity,
            message: err.err_type().to_string(),
            line: position.line(),
            column: position.position(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())?;
        if let Some(line) = self.line {
            write!(f, ":{line}")?;
            if let Some(column) = self.column {
                write!(f, ":{column}")?;
            }
        }
        write!(f, ": {}: {}", self.severity, self.message)
    }
}

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("Cannot read script {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Script {} failed to compile ({} diagnostics)", path.display(), diagnostics.len())]
    Diagnostics {
        path: PathBuf,
        diagnostics: Vec<Diagnostic>,
    },
}

/// Compiles script files against a fixed host API.
pub struct ScriptCompiler {
    engine: Engine,
}

impl ScriptCompiler {
    pub fn new() -> Self {
        let mut engine = Engine::new();
        engine.set_strict_variables(true);
        engine
            .register_fn("log_info", |msg: &str| log::info!(target: "script", "{msg}"))
            .register_fn("log_warn", |msg: &str| log::warn!(target: "script", "{msg}"))
            .register_fn("log_error", |msg: &str| log::error!(target: "script", "{msg}"));
        engine.on_print(|msg| log::info!(target: "script", "{msg}"));
        Self { engine }
    }

    /// Access to the engine for registering extra host functions.
    pub fn engine_mut(&mut self) -> &mut Engine {
        &mut self.engine
    }

    /// The default type name for a script: its file stem.
    pub fn default_type_name(path: impl AsRef<Path>) -> Option<String> {
        path.as_ref()
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
    }

    /// Read and compile `path` into an in-memory program.
    pub fn compile(&self, path: impl AsRef<Path>) -> Result<CompiledScript<'_>, CompileError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| CompileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.compile_source(path, &source)
    }

    /// Compile `source`; `path` is only used for diagnostics.
    pub fn compile_source(
        &self,
        path: impl AsRef<Path>,
        source: &str,
    ) -> Result<CompiledScript<'_>, CompileError> {
        let path = path.as_ref();
        match self.engine.compile(source) {
            Ok(ast) => {
                log::debug!("Compiled script {}", path.display());
                Ok(CompiledScript {
                    engine: &self.engine,
                    ast,
                    path: path.to_path_buf(),
                })
            }
            Err(err) => Err(CompileError::Diagnostics {
                path: path.to_path_buf(),
                diagnostics: vec![Diagnostic::from_parse_error(path, &err)],
            }),
        }
    }

    /// Compile `path` and invoke `method` once with `args`.
    ///
    /// Compile failures print their diagnostics and return `Ok(None)`
    /// without invoking anything. Read failures and invocation failures
    /// (unknown method, wrong arity, runtime errors) are returned as errors.
    pub fn compile_and_invoke(
        &self,
        path: impl AsRef<Path>,
        method: &str,
        type_name: Option<&str>,
        args: Vec<Dynamic>,
    ) -> anyhow::Result<Option<Dynamic>> {
        match self.compile(path) {
            Ok(script) => script.invoke(type_name, method, args).map(Some),
            Err(CompileError::Diagnostics { diagnostics, .. }) => {
                for diagnostic in &diagnostics {
                    eprintln!("{diagnostic}");
                    log::error!("{diagnostic}");
                }
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }
}

impl Default for ScriptCompiler {
    fn default() -> Self {
        Self::new()
    }
}

/// A compiled script bound to the engine that compiled it.
pub struct CompiledScript<'e> {
    engine: &'e Engine,
    ast: AST,
    path: PathBuf,
}

impl CompiledScript<'_> {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Names of the functions the script defines.
    pub fn functions(&self) -> Vec<String> {
        self.ast
            .iter_functions()
            .map(|f| f.name.to_string())
            .collect()
    }

    fn has_constructor(&self, type_name: &str) -> bool {
        self.ast
            .iter_functions()
            .any(|f| f.name == type_name && f.params.is_empty())
    }

    /// Invoke `method`. When `type_name` names a zero-argument function, it
    /// is called first to construct the instance `this` is bound to.
    pub fn invoke(
        &self,
        type_name: Option<&str>,
        method: &str,
        args: Vec<Dynamic>,
    ) -> anyhow::Result<Dynamic> {
        let mut scope = Scope::new();
        match type_name.filter(|name| self.has_constructor(name)) {
            Some(type_name) => {
                let mut instance = self.call(
                    CallFnOptions::new().eval_ast(false),
                    &mut scope,
                    type_name,
                    Vec::new(),
                )?;
                log::debug!("Constructed {type_name} from {}", self.path.display());
                self.call(
                    CallFnOptions::new()
                        .eval_ast(false)
                        .bind_this_ptr(&mut instance),
                    &mut scope,
                    method,
                    args,
                )
            }
            None => self.call(CallFnOptions::new().eval_ast(false), &mut scope, method, args),
        }
    }

    fn call(
        &self,
        options: CallFnOptions<'_>,
        scope: &mut Scope<'_>,
        name: &str,
        args: Vec<Dynamic>,
    ) -> anyhow::Result<Dynamic> {
        // Top level statements are not run; only the named function executes.
        self.engine
            .call_fn_with_options::<Dynamic>(options, scope, &self.ast, name, args)
            .map_err(|e| anyhow!("{}: calling {name} failed: {e}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostic_formats_like_a_compiler() {
        let diagnostic = Diagnostic {
            path: PathBuf::from("scripts/Greeter.rhai"),
            severity: Severity::Error,
            message: "Expecting ')'".to_string(),
            line: Some(3),
            column: Some(14),
        };
        assert_eq!(
            diagnostic.to_string(),
            "scripts/Greeter.rhai:3:14: error: Expecting ')'"
        );
    }

    #[test]
    fn diagnostic_without_position() {
        let diagnostic = Diagnostic {
            path: PathBuf::from("a.rhai"),
            severity: Severity::WarningAsError,
            message: "Variable not found: x".to_string(),
            line: None,
            column: None,
        };
        assert_eq!(
            diagnostic.to_string(),
            "a.rhai: warning-as-error: Variable not found: x"
        );
    }

    #[test]
    fn undeclared_variable_is_a_promoted_warning() {
        let compiler = ScriptCompiler::new();
        let Err(CompileError::Diagnostics { diagnostics, .. }) =
            compiler.compile_source("inline.rhai", "let a = 1; a + b")
        else {
            panic!("strict variables should reject `b`");
        };
        assert_eq!(diagnostics[0].severity, Severity::WarningAsError);
        assert_eq!(diagnostics[0].line, Some(1));
    }

    #[test]
    fn syntax_error_is_an_error() {
        let compiler = ScriptCompiler::new();
        let Err(CompileError::Diagnostics { diagnostics, .. }) =
            compiler.compile_source("inline.rhai", "fn broken( { 1 }")
        else {
            panic!("unbalanced parenthesis should not compile");
        };
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].severity, Severity::Error);
    }

    #[test]
    fn default_type_name_is_file_stem() {
        assert_eq!(
            ScriptCompiler::default_type_name("assets/scripts/Greeter.rhai").as_deref(),
            Some("Greeter")
        );
    }

    #[test]
    fn lists_defined_functions() {
        let compiler = ScriptCompiler::new();
        let script = compiler
            .compile_source("inline.rhai", "fn a() { 1 } fn b(x) { x }")
            .unwrap();
        let mut functions = script.functions();
        functions.sort();
        assert_eq!(functions, vec!["a", "b"]);
    }
}
