//! Lexer implementation using logos

use super::token::{Token, TokenKind};
use crate::common::{CompileError, CompileResult, Span};
use logos::Logos;

/// Lexer for Decaf source code
pub struct Lexer<'a> {
    inner: logos::Lexer<'a, TokenKind>,
    peeked: Option<Token>,
    at_eof: bool,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given source code
    pub fn new(source: &'a str) -> Self {
        Self {
            inner: TokenKind::lexer(source),
            peeked: None,
            at_eof: false,
        }
    }

    /// Get the next token
    pub fn next_token(&mut self) -> CompileResult<Token> {
        if let Some(token) = self.peeked.take() {
            return Ok(token);
        }

        if self.at_eof {
            let len = self.inner.source().len();
            return Ok(Token::new(TokenKind::Eof, Span::new(len, len)));
        }

        match self.inner.next() {
            Some(Ok(kind)) => Ok(Token::new(kind, self.inner.span().into())),
            Some(Err(())) => Err(CompileError::lexer(
                format!("unexpected character '{}'", self.inner.slice()),
                self.inner.span().into(),
            )),
            None => {
                self.at_eof = true;
                let len = self.inner.source().len();
                Ok(Token::new(TokenKind::Eof, Span::new(len, len)))
            }
        }
    }

    /// Peek at the next token without consuming it
    pub fn peek(&mut self) -> CompileResult<&Token> {
        if self.peeked.is_none() {
            self.peeked = Some(self.next_token()?);
        }
        Ok(self.peeked.get_or_insert_with(|| Token::new(TokenKind::Eof, Span::default())))
    }

    /// Tokenize the entire source and return all tokens
    pub fn tokenize_all(mut self) -> CompileResult<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let is_eof = matches!(token.kind, TokenKind::Eof);
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        Ok(tokens)
    }

    /// Get the source being lexed
    pub fn source(&self) -> &'a str {
        self.inner.source()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords() {
        let source = "int bool void def if else while return break continue true false";
        let kinds: Vec<TokenKind> = Lexer::new(source)
            .tokenize_all()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect();

        assert_eq!(
            kinds,
            vec![
                TokenKind::Int,
                TokenKind::Bool,
                TokenKind::Void,
                TokenKind::Def,
                TokenKind::If,
                TokenKind::Else,
                TokenKind::While,
                TokenKind::Return,
                TokenKind::Break,
                TokenKind::Continue,
                TokenKind::True,
                TokenKind::False,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_identifiers() {
        let source = "foo bar_baz _test test123 integer";
        let mut lexer = Lexer::new(source);

        for expected in ["foo", "bar_baz", "_test", "test123", "integer"] {
            assert!(matches!(
                lexer.next_token().unwrap().kind,
                TokenKind::Identifier(s) if s == expected
            ));
        }
    }

    #[test]
    fn test_integer_literals() {
        let source = "42 0x1F 0";
        let mut lexer = Lexer::new(source);

        assert!(matches!(
            lexer.next_token().unwrap().kind,
            TokenKind::DecLiteral(s) if s == "42"
        ));
        assert!(matches!(
            lexer.next_token().unwrap().kind,
            TokenKind::HexLiteral(s) if s == "0x1F"
        ));
        assert!(matches!(
            lexer.next_token().unwrap().kind,
            TokenKind::DecLiteral(s) if s == "0"
        ));
    }

    #[test]
    fn test_operators() {
        let source = "+ - * / % == != < > <= >= && || ! =";
        let mut lexer = Lexer::new(source);

        assert!(matches!(lexer.next_token().unwrap().kind, TokenKind::Plus));
        assert!(matches!(lexer.next_token().unwrap().kind, TokenKind::Minus));
        assert!(matches!(lexer.next_token().unwrap().kind, TokenKind::Star));
        assert!(matches!(lexer.next_token().unwrap().kind, TokenKind::Slash));
        assert!(matches!(lexer.next_token().unwrap().kind, TokenKind::Percent));
        assert!(matches!(lexer.next_token().unwrap().kind, TokenKind::EqEq));
        assert!(matches!(lexer.next_token().unwrap().kind, TokenKind::NotEq));
        assert!(matches!(lexer.next_token().unwrap().kind, TokenKind::Lt));
        assert!(matches!(lexer.next_token().unwrap().kind, TokenKind::Gt));
        assert!(matches!(lexer.next_token().unwrap().kind, TokenKind::LtEq));
        assert!(matches!(lexer.next_token().unwrap().kind, TokenKind::GtEq));
        assert!(matches!(lexer.next_token().unwrap().kind, TokenKind::AmpAmp));
        assert!(matches!(lexer.next_token().unwrap().kind, TokenKind::PipePipe));
        assert!(matches!(lexer.next_token().unwrap().kind, TokenKind::Bang));
        assert!(matches!(lexer.next_token().unwrap().kind, TokenKind::Eq));
    }

    #[test]
    fn test_string_literal() {
        let source = r#""hello world" "tab\t""#;
        let mut lexer = Lexer::new(source);

        assert!(matches!(
            lexer.next_token().unwrap().kind,
            TokenKind::StringLiteral(s) if s == "\"hello world\""
        ));
        assert!(matches!(
            lexer.next_token().unwrap().kind,
            TokenKind::StringLiteral(s) if s == "\"tab\\t\""
        ));
    }

    #[test]
    fn test_comments() {
        let source = "int // line comment\nx";
        let mut lexer = Lexer::new(source);

        assert!(matches!(lexer.next_token().unwrap().kind, TokenKind::Int));
        assert!(matches!(
            lexer.next_token().unwrap().kind,
            TokenKind::Identifier(s) if s == "x"
        ));
        assert!(matches!(lexer.next_token().unwrap().kind, TokenKind::Eof));
    }

    #[test]
    fn test_peek_does_not_consume() {
        let mut lexer = Lexer::new("foo (");
        assert!(matches!(lexer.peek().unwrap().kind, TokenKind::Identifier(_)));
        assert!(matches!(lexer.next_token().unwrap().kind, TokenKind::Identifier(_)));
        assert!(matches!(lexer.next_token().unwrap().kind, TokenKind::LParen));
    }

    #[test]
    fn test_unexpected_character() {
        let mut lexer = Lexer::new("int @");
        assert!(lexer.next_token().is_ok());
        let err = lexer.next_token().unwrap_err();
        assert!(matches!(err, CompileError::Lexer { span, .. } if span == Span::new(4, 5)));
    }

    #[test]
    fn test_simple_function() {
        let source = "int main() { return 0; }";
        let tokens = Lexer::new(source).tokenize_all().unwrap();

        assert!(matches!(tokens[0].kind, TokenKind::Int));
        assert!(matches!(&tokens[1].kind, TokenKind::Identifier(s) if s == "main"));
        assert!(matches!(tokens[2].kind, TokenKind::LParen));
        assert!(matches!(tokens[3].kind, TokenKind::RParen));
        assert!(matches!(tokens[4].kind, TokenKind::LBrace));
        assert!(matches!(tokens[5].kind, TokenKind::Return));
        assert!(matches!(&tokens[6].kind, TokenKind::DecLiteral(s) if s == "0"));
        assert!(matches!(tokens[7].kind, TokenKind::Semi));
        assert!(matches!(tokens[8].kind, TokenKind::RBrace));
        assert!(matches!(tokens[9].kind, TokenKind::Eof));
        assert_eq!(tokens[1].span, Span::new(4, 8));
    }
}
