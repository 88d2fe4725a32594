//! Semantic analysis module
//!
//! Scope construction followed by a single checking pass.

mod analyzer;
mod builder;
mod diagnostics;
mod scope;
pub mod visitor;

pub use analyzer::{analyze, AnalysisVisitor};
pub use builder::{SymbolTableBuilder, BUILTINS};
pub use diagnostics::{Diagnostic, ErrorList};
pub use scope::{Duplicate, Scope, ScopeId, Symbol, SymbolKind, SymbolTables};
pub use visitor::Visitor;
