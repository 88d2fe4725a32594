//! Decaf static analyzer
//!
//! Checks programs written in Decaf, a small imperative teaching language,
//! and reports every semantic error it finds in one pass.
//!
//! ## Architecture
//!
//! - **Common** (`common/`): Shared infrastructure (errors, spans, reporting)
//! - **Frontend** (`frontend/`): Lexer, parser, AST, scope construction and
//!   the semantic analysis pass (`frontend::sema`)
//! - **Driver** (`driver/`): File-level checking and diagnostic rendering

pub mod common;
pub mod driver;
pub mod frontend;

// Re-exports for convenience
pub use common::{CompileError, CompileResult, DiagnosticReporter, Span};
pub use driver::{CheckConfig, CheckSummary, Driver, OutputStyle};
pub use frontend::sema::{analyze, Diagnostic, ErrorList};
pub use frontend::{CheckOutput, CompileContext, DecafFrontend, FrontendConfig};
