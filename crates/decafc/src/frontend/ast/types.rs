//! Type representations in the AST

use std::fmt;

/// Decaf value type
///
/// `Unknown` is only ever produced by analysis, for expressions whose type
/// could not be established; it never appears in a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecafType {
    Int,
    Bool,
    Str,
    Void,
    Unknown,
}

impl DecafType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecafType::Int => "int",
            DecafType::Bool => "bool",
            DecafType::Str => "str",
            DecafType::Void => "void",
            DecafType::Unknown => "unknown",
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self, DecafType::Void)
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, DecafType::Unknown)
    }
}

impl fmt::Display for DecafType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
