//! Abstract Syntax Tree definitions

mod types;
mod expr;
mod stmt;
mod decl;

pub use types::*;
pub use expr::*;
pub use stmt::*;
pub use decl::*;
