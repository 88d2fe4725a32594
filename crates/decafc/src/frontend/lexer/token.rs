//! Token definitions for the Decaf lexer

use crate::common::Span;
use logos::Logos;

/// Token with source location
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// All token kinds in Decaf
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\n\r\f]+")] // Skip whitespace
#[logos(skip r"//[^\n]*")]     // Skip line comments
pub enum TokenKind {
    // === Keywords ===
    #[token("bool")]
    Bool,
    #[token("break")]
    Break,
    #[token("continue")]
    Continue,
    #[token("def")]
    Def,
    #[token("else")]
    Else,
    #[token("false")]
    False,
    #[token("if")]
    If,
    #[token("int")]
    Int,
    #[token("return")]
    Return,
    #[token("true")]
    True,
    #[token("void")]
    Void,
    #[token("while")]
    While,

    // === Identifiers ===
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Identifier(String),

    // === Literals ===
    #[regex(r"0[xX][0-9a-fA-F]+", |lex| lex.slice().to_string())]
    HexLiteral(String),

    #[regex(r"[0-9]+", |lex| lex.slice().to_string())]
    DecLiteral(String),

    // String literal, quotes included
    #[regex(r#""([^"\\\n]|\\.)*""#, |lex| lex.slice().to_string())]
    StringLiteral(String),

    // === Operators ===
    // Arithmetic
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,

    // Comparison
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,

    // Logical
    #[token("&&")]
    AmpAmp,
    #[token("||")]
    PipePipe,
    #[token("!")]
    Bang,

    // Assignment
    #[token("=")]
    Eq,

    // Punctuation
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(";")]
    Semi,
    #[token(",")]
    Comma,

    // Special
    Eof,
}

impl TokenKind {
    /// Check if this token is a type keyword
    pub fn is_type(&self) -> bool {
        matches!(self, TokenKind::Int | TokenKind::Bool | TokenKind::Void)
    }

    /// Get the precedence of binary operators (higher = tighter binding)
    pub fn binary_precedence(&self) -> Option<u8> {
        match self {
            TokenKind::PipePipe => Some(1),
            TokenKind::AmpAmp => Some(2),
            TokenKind::EqEq | TokenKind::NotEq => Some(3),
            TokenKind::Lt | TokenKind::Gt | TokenKind::LtEq | TokenKind::GtEq => Some(4),
            TokenKind::Plus | TokenKind::Minus => Some(5),
            TokenKind::Star | TokenKind::Slash | TokenKind::Percent => Some(6),
            _ => None,
        }
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenKind::Identifier(s) => write!(f, "identifier '{}'", s),
            TokenKind::DecLiteral(s) => write!(f, "integer '{}'", s),
            TokenKind::HexLiteral(s) => write!(f, "hex '{}'", s),
            TokenKind::StringLiteral(s) => write!(f, "string {}", s),
            TokenKind::Bool => write!(f, "'bool'"),
            TokenKind::Break => write!(f, "'break'"),
            TokenKind::Continue => write!(f, "'continue'"),
            TokenKind::Def => write!(f, "'def'"),
            TokenKind::Else => write!(f, "'else'"),
            TokenKind::False => write!(f, "'false'"),
            TokenKind::If => write!(f, "'if'"),
            TokenKind::Int => write!(f, "'int'"),
            TokenKind::Return => write!(f, "'return'"),
            TokenKind::True => write!(f, "'true'"),
            TokenKind::Void => write!(f, "'void'"),
            TokenKind::While => write!(f, "'while'"),
            TokenKind::Plus => write!(f, "'+'"),
            TokenKind::Minus => write!(f, "'-'"),
            TokenKind::Star => write!(f, "'*'"),
            TokenKind::Slash => write!(f, "'/'"),
            TokenKind::Percent => write!(f, "'%'"),
            TokenKind::EqEq => write!(f, "'=='"),
            TokenKind::NotEq => write!(f, "'!='"),
            TokenKind::Lt => write!(f, "'<'"),
            TokenKind::Gt => write!(f, "'>'"),
            TokenKind::LtEq => write!(f, "'<='"),
            TokenKind::GtEq => write!(f, "'>='"),
            TokenKind::AmpAmp => write!(f, "'&&'"),
            TokenKind::PipePipe => write!(f, "'||'"),
            TokenKind::Bang => write!(f, "'!'"),
            TokenKind::Eq => write!(f, "'='"),
            TokenKind::LParen => write!(f, "'('"),
            TokenKind::RParen => write!(f, "')'"),
            TokenKind::LBracket => write!(f, "'['"),
            TokenKind::RBracket => write!(f, "']'"),
            TokenKind::LBrace => write!(f, "'{{'"),
            TokenKind::RBrace => write!(f, "'}}'"),
            TokenKind::Semi => write!(f, "';'"),
            TokenKind::Comma => write!(f, "','"),
            TokenKind::Eof => write!(f, "end of file"),
        }
    }
}
