//! Statement AST nodes

use super::{Expr, VarDecl};
use crate::common::Span;
use crate::frontend::sema::ScopeId;

/// Statement node
#[derive(Debug, Clone)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
    pub line: usize,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span, line: usize) -> Self {
        Self { kind, span, line }
    }
}

/// Statement kinds
#[derive(Debug, Clone)]
pub enum StmtKind {
    /// Assignment: loc = expr;
    /// `target` is always an `ExprKind::Location`
    Assign { target: Expr, value: Expr },

    /// Call statement: foo(x);
    /// Always wraps an `ExprKind::Call`
    Call(Expr),

    /// If statement: if (cond) { ... } [else { ... }]
    Conditional {
        condition: Expr,
        then_block: Block,
        else_block: Option<Block>,
    },

    /// While loop: while (cond) { ... }
    While { condition: Expr, body: Block },

    /// Return statement: return [expr];
    Return(Option<Expr>),

    /// Break statement
    Break,

    /// Continue statement
    Continue,

    /// Nested block: { ... }
    Block(Block),
}

/// Block: local variable declarations followed by statements
#[derive(Debug, Clone)]
pub struct Block {
    pub variables: Vec<VarDecl>,
    pub statements: Vec<Stmt>,
    pub span: Span,
    pub line: usize,
    /// Scope holding the block's locals (filled in by the symbol table builder)
    pub scope: Option<ScopeId>,
}

impl Block {
    pub fn new(variables: Vec<VarDecl>, statements: Vec<Stmt>, span: Span, line: usize) -> Self {
        Self {
            variables,
            statements,
            span,
            line,
            scope: None,
        }
    }
}
