//! Check driver: source file in, rendered diagnostics out

use std::fs;
use std::path::Path;

use codespan_reporting::term::termcolor::ColorChoice;
use tracing::info;

use crate::common::{CompileError, CompileResult, DiagnosticReporter};
use crate::frontend::sema::ErrorList;
use crate::frontend::{CompileContext, DecafFrontend, FrontendConfig};

/// How diagnostics are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputStyle {
    /// Source snippets with labels on stderr
    #[default]
    Rich,
    /// One message per line on stdout
    Plain,
}

/// Driver configuration
#[derive(Debug, Clone)]
pub struct CheckConfig {
    pub frontend: FrontendConfig,
    pub style: OutputStyle,
    pub color: ColorChoice,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            frontend: FrontendConfig::default(),
            style: OutputStyle::default(),
            color: ColorChoice::Auto,
        }
    }
}

/// Outcome of checking one file
#[derive(Debug)]
pub struct CheckSummary {
    pub filename: String,
    pub errors: ErrorList,
}

impl CheckSummary {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Runs the frontend and renders its diagnostics
pub struct Driver {
    frontend: DecafFrontend,
    config: CheckConfig,
}

impl Driver {
    pub fn new(config: CheckConfig) -> Self {
        Self {
            frontend: DecafFrontend::new(),
            config,
        }
    }

    /// Check the file at `path`
    pub fn check_file(&self, path: &Path) -> CompileResult<CheckSummary> {
        let source = fs::read_to_string(path)?;
        self.check_source(&path.display().to_string(), &source)
    }

    /// Check in-memory source, printing every semantic error
    pub fn check_source(&self, filename: &str, source: &str) -> CompileResult<CheckSummary> {
        let mut reporter = DiagnosticReporter::with_color_choice(self.config.color);
        let file_id = reporter.add_file(filename, source);
        let ctx = CompileContext::new(filename.to_string(), file_id, &reporter);

        let output = self.frontend.check(source, &ctx, &self.config.frontend)?;

        for diagnostic in &output.errors {
            match self.config.style {
                OutputStyle::Plain => println!("{}", diagnostic),
                OutputStyle::Rich => reporter.report_error(
                    file_id,
                    &CompileError::semantic(diagnostic.message.clone(), diagnostic.span),
                ),
            }
        }

        info!(file = filename, errors = output.errors.len(), "check finished");
        Ok(CheckSummary {
            filename: filename.to_string(),
            errors: output.errors,
        })
    }
}

impl Default for Driver {
    fn default() -> Self {
        Self::new(CheckConfig::default())
    }
}
