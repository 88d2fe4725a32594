//! Expression AST nodes

use std::cell::OnceCell;

use super::DecafType;
use crate::common::Span;

/// Expression node
#[derive(Debug, Clone)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
    pub line: usize,
    /// Type of this expression (filled in during semantic analysis)
    pub ty: OnceCell<DecafType>,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span, line: usize) -> Self {
        Self {
            kind,
            span,
            line,
            ty: OnceCell::new(),
        }
    }

    /// Inferred type, if analysis has visited this node
    pub fn inferred_type(&self) -> Option<DecafType> {
        self.ty.get().copied()
    }

    /// Record the inferred type. Returns `false` if a type was already set;
    /// the existing type is kept.
    pub fn set_inferred_type(&self, ty: DecafType) -> bool {
        self.ty.set(ty).is_ok()
    }

    /// Name of the referenced variable if this is a location
    pub fn location_name(&self) -> Option<&str> {
        match &self.kind {
            ExprKind::Location { name, .. } => Some(name),
            _ => None,
        }
    }
}

/// Expression kinds
#[derive(Debug, Clone)]
pub enum ExprKind {
    /// Literal: 42, 0x2A, true, "hello"
    Literal(Literal),

    /// Variable reference, optionally indexed: x, a[i]
    Location {
        name: String,
        index: Option<Box<Expr>>,
    },

    /// Binary operation: a + b, x < y
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// Unary operation: -x, !flag
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },

    /// Function call: foo(a, b)
    Call {
        name: String,
        args: Vec<Expr>,
    },
}

/// Literal values
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i64),
    Bool(bool),
    Str(String),
}

impl Literal {
    pub fn ty(&self) -> DecafType {
        match self {
            Literal::Int(_) => DecafType::Int,
            Literal::Bool(_) => DecafType::Bool,
            Literal::Str(_) => DecafType::Str,
        }
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    // Logical
    Or,
    And,

    // Equality
    Eq,
    Ne,

    // Relational
    Lt,
    Le,
    Ge,
    Gt,

    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl BinaryOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOp::Or => "||",
            BinaryOp::And => "&&",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Ge => ">=",
            BinaryOp::Gt => ">",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
        }
    }

    pub fn is_equality(&self) -> bool {
        matches!(self, BinaryOp::Eq | BinaryOp::Ne)
    }

    pub fn is_logical(&self) -> bool {
        matches!(self, BinaryOp::Or | BinaryOp::And)
    }

    pub fn is_relational(&self) -> bool {
        matches!(self, BinaryOp::Lt | BinaryOp::Le | BinaryOp::Ge | BinaryOp::Gt)
    }

    /// Type both operands must have; `None` for equality, which only
    /// requires the operands to agree
    pub fn operand_type(&self) -> Option<DecafType> {
        if self.is_equality() {
            None
        } else if self.is_logical() {
            Some(DecafType::Bool)
        } else {
            Some(DecafType::Int)
        }
    }

    pub fn result_type(&self) -> DecafType {
        if self.is_equality() || self.is_logical() || self.is_relational() {
            DecafType::Bool
        } else {
            DecafType::Int
        }
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg, // -x
    Not, // !x
}

impl UnaryOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Not => "!",
        }
    }

    /// Operand and result type
    pub fn ty(&self) -> DecafType {
        match self {
            UnaryOp::Neg => DecafType::Int,
            UnaryOp::Not => DecafType::Bool,
        }
    }
}
