//! Declaration AST nodes

use super::{Block, DecafType};
use crate::common::Span;
use crate::frontend::sema::ScopeId;

/// A complete Decaf program
#[derive(Debug, Clone)]
pub struct Program {
    pub variables: Vec<VarDecl>,
    pub functions: Vec<FuncDecl>,
    pub span: Span,
    pub line: usize,
    /// Global scope (filled in by the symbol table builder)
    pub scope: Option<ScopeId>,
}

impl Program {
    pub fn new(variables: Vec<VarDecl>, functions: Vec<FuncDecl>, span: Span) -> Self {
        Self {
            variables,
            functions,
            span,
            line: 1,
            scope: None,
        }
    }
}

/// Variable declaration: int x; or int a[10];
#[derive(Debug, Clone)]
pub struct VarDecl {
    pub name: String,
    pub ty: DecafType,
    pub array_length: Option<usize>,
    pub span: Span,
    pub line: usize,
}

impl VarDecl {
    pub fn new(name: String, ty: DecafType, span: Span, line: usize) -> Self {
        Self {
            name,
            ty,
            array_length: None,
            span,
            line,
        }
    }

    pub fn with_array_length(mut self, length: usize) -> Self {
        self.array_length = Some(length);
        self
    }
}

/// Function definition
#[derive(Debug, Clone)]
pub struct FuncDecl {
    pub name: String,
    pub return_type: DecafType,
    pub params: Vec<Param>,
    pub body: Block,
    pub span: Span,
    pub line: usize,
    /// Scope holding the parameters (filled in by the symbol table builder)
    pub scope: Option<ScopeId>,
}

impl FuncDecl {
    pub fn new(
        name: String,
        return_type: DecafType,
        params: Vec<Param>,
        body: Block,
        span: Span,
        line: usize,
    ) -> Self {
        Self {
            name,
            return_type,
            params,
            body,
            span,
            line,
            scope: None,
        }
    }

    pub fn param_types(&self) -> Vec<DecafType> {
        self.params.iter().map(|p| p.ty).collect()
    }
}

/// Function parameter
#[derive(Debug, Clone)]
pub struct Param {
    pub name: String,
    pub ty: DecafType,
    pub span: Span,
    pub line: usize,
}

impl Param {
    pub fn new(name: String, ty: DecafType, span: Span, line: usize) -> Self {
        Self { name, ty, span, line }
    }
}
