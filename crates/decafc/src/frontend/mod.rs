//! Decaf frontend
//!
//! Runs the phases in order:
//! 1. Lexing source code into tokens
//! 2. Parsing tokens into an AST
//! 3. Building symbol tables
//! 4. Semantic analysis

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod sema;

use tracing::debug;

use crate::common::{CompileError, CompileResult, DiagnosticReporter};

use ast::Program;
use lexer::Lexer;
use parser::Parser;
use sema::{ErrorList, SymbolTableBuilder, SymbolTables};

/// Configuration options passed to the frontend
#[derive(Debug, Clone, Default)]
pub struct FrontendConfig {
    pub dump_tokens: bool,
    pub dump_ast: bool,
    pub dump_symbols: bool,
}

/// Compilation context providing access to diagnostics and file info
pub struct CompileContext<'a> {
    pub filename: String,
    pub file_id: usize,
    pub reporter: &'a DiagnosticReporter,
}

impl<'a> CompileContext<'a> {
    pub fn new(filename: String, file_id: usize, reporter: &'a DiagnosticReporter) -> Self {
        Self { filename, file_id, reporter }
    }
}

/// Result of checking one source file
#[derive(Debug)]
pub struct CheckOutput {
    /// Program with every expression annotated with its inferred type
    pub program: Program,
    pub symbols: SymbolTables,
    pub errors: ErrorList,
}

/// Decaf language frontend
pub struct DecafFrontend;

impl DecafFrontend {
    pub fn new() -> Self {
        Self
    }

    /// Parse, build scopes and analyze `source`.
    ///
    /// Lexer and parser errors are reported through `ctx` and returned as
    /// `Err`; semantic errors are collected in [`CheckOutput::errors`].
    pub fn check(
        &self,
        source: &str,
        ctx: &CompileContext,
        config: &FrontendConfig,
    ) -> CompileResult<CheckOutput> {
        // Phase 1: Lexing (optional token dump)
        if config.dump_tokens {
            match self.dump_tokens(source) {
                Ok(dump) => {
                    eprintln!("=== Decaf Tokens ===");
                    eprint!("{}", dump);
                    eprintln!("=== End Tokens ===\n");
                }
                Err(e) => return Err(fail(ctx, e)),
            }
        }

        // Phase 2: Parsing
        debug!(file = %ctx.filename, "parsing");
        let mut program = match Parser::new(source).and_then(|mut p| p.parse()) {
            Ok(program) => program,
            Err(e) => return Err(fail(ctx, e)),
        };

        if config.dump_ast {
            eprintln!("=== Decaf AST ===");
            eprintln!("{}", self.dump_ast(&program));
            eprintln!("=== End AST ===\n");
        }

        // Phase 3: Scope construction
        debug!(file = %ctx.filename, "building symbol tables");
        let symbols = SymbolTableBuilder::new().build(&mut program);

        if config.dump_symbols {
            eprintln!("=== Symbol Tables ===");
            eprint!("{}", symbols);
            eprintln!("=== End Symbol Tables ===\n");
        }

        // Phase 4: Semantic analysis
        debug!(file = %ctx.filename, "analyzing");
        let errors = sema::analyze(Some(&program), &symbols);

        Ok(CheckOutput { program, symbols, errors })
    }

    /// Dump tokens for debugging
    pub fn dump_tokens(&self, source: &str) -> CompileResult<String> {
        let tokens = Lexer::new(source).tokenize_all()?;
        let mut output = String::new();
        for token in &tokens {
            output.push_str(&format!("{:?}\n", token));
        }
        Ok(output)
    }

    /// Dump AST for debugging
    pub fn dump_ast(&self, program: &Program) -> String {
        format!("{:#?}", program)
    }
}

/// Report a fatal frontend error and hand it back
fn fail(ctx: &CompileContext, error: CompileError) -> CompileError {
    debug!(file = %ctx.filename, span = ?error.span(), "frontend failed");
    ctx.reporter.report_error(ctx.file_id, &error);
    error
}

impl Default for DecafFrontend {
    fn default() -> Self {
        Self::new()
    }
}
