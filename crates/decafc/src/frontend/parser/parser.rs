//! Recursive descent parser for Decaf

use crate::frontend::ast::*;
use crate::common::{CompileError, CompileResult, LineIndex, Span};
use crate::frontend::lexer::{Lexer, Token, TokenKind};

/// Recursive descent parser for Decaf
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
    lines: LineIndex,
}

impl<'a> Parser<'a> {
    /// Create a new parser for the given source
    pub fn new(source: &'a str) -> CompileResult<Self> {
        let mut lexer = Lexer::new(source);
        let current = lexer.next_token()?;
        Ok(Self {
            lexer,
            current,
            lines: LineIndex::new(source),
        })
    }

    /// Parse a complete program
    pub fn parse(&mut self) -> CompileResult<Program> {
        let mut variables = Vec::new();
        let mut functions = Vec::new();

        while !self.at_end() {
            match self.parse_top_level()? {
                TopLevel::Variable(var) => variables.push(var),
                TopLevel::Function(func) => functions.push(func),
            }
        }

        let end = self.lexer.source().len();
        Ok(Program::new(variables, functions, Span::new(0, end)))
    }

    // =========================================================================
    // Helper methods
    // =========================================================================

    fn at_end(&self) -> bool {
        matches!(self.current.kind, TokenKind::Eof)
    }

    fn advance(&mut self) -> CompileResult<Token> {
        let prev = std::mem::replace(&mut self.current, self.lexer.next_token()?);
        Ok(prev)
    }

    fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(&self.current.kind) == std::mem::discriminant(kind)
    }

    fn match_token(&mut self, kind: &TokenKind) -> CompileResult<bool> {
        if self.check(kind) {
            self.advance()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn expect(&mut self, kind: TokenKind) -> CompileResult<Token> {
        if self.check(&kind) {
            self.advance()
        } else {
            Err(self.unexpected(&kind.to_string()))
        }
    }

    fn unexpected(&self, expected: &str) -> CompileError {
        CompileError::parser(
            format!("expected {}, found {}", expected, self.current.kind),
            self.current.span,
        )
    }

    fn line(&self, span: Span) -> usize {
        self.lines.line_of(span.start)
    }

    fn expect_identifier(&mut self) -> CompileResult<(String, Span)> {
        let token = self.advance()?;
        match token.kind {
            TokenKind::Identifier(name) => Ok((name, token.span)),
            other => Err(CompileError::parser(
                format!("expected identifier, found {}", other),
                token.span,
            )),
        }
    }

    fn parse_type(&mut self) -> CompileResult<(DecafType, Span)> {
        let ty = match self.current.kind {
            TokenKind::Int => DecafType::Int,
            TokenKind::Bool => DecafType::Bool,
            TokenKind::Void => DecafType::Void,
            _ => return Err(self.unexpected("type")),
        };
        let token = self.advance()?;
        Ok((ty, token.span))
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    fn parse_top_level(&mut self) -> CompileResult<TopLevel> {
        let start_span = self.current.span;
        self.match_token(&TokenKind::Def)?;

        let (ty, _) = self.parse_type()?;
        let (name, _) = self.expect_identifier()?;

        if self.check(&TokenKind::LParen) {
            let func = self.parse_function_rest(name, ty, start_span)?;
            Ok(TopLevel::Function(func))
        } else {
            let var = self.parse_var_rest(name, ty, start_span)?;
            Ok(TopLevel::Variable(var))
        }
    }

    fn parse_var_decl(&mut self) -> CompileResult<VarDecl> {
        let (ty, start_span) = self.parse_type()?;
        let (name, _) = self.expect_identifier()?;
        self.parse_var_rest(name, ty, start_span)
    }

    /// Optional array length and the terminating ';'
    fn parse_var_rest(&mut self, name: String, ty: DecafType, start_span: Span) -> CompileResult<VarDecl> {
        let mut length = None;
        if self.match_token(&TokenKind::LBracket)? {
            let token = self.advance()?;
            length = Some(match token.kind {
                TokenKind::DecLiteral(text) => text.parse::<usize>().map_err(|_| {
                    CompileError::parser(format!("invalid array length '{}'", text), token.span)
                })?,
                other => {
                    return Err(CompileError::parser(
                        format!("expected array length, found {}", other),
                        token.span,
                    ))
                }
            });
            self.expect(TokenKind::RBracket)?;
        }
        let end = self.expect(TokenKind::Semi)?;
        let span = start_span.merge(end.span);

        let var = VarDecl::new(name, ty, span, self.line(span));
        Ok(match length {
            Some(len) => var.with_array_length(len),
            None => var,
        })
    }

    fn parse_function_rest(&mut self, name: String, return_type: DecafType, start_span: Span) -> CompileResult<FuncDecl> {
        self.expect(TokenKind::LParen)?;
        let mut params = Vec::new();
        if !self.check(&TokenKind::RParen) {
            loop {
                let (ty, ty_span) = self.parse_type()?;
                let (param_name, name_span) = self.expect_identifier()?;
                let span = ty_span.merge(name_span);
                params.push(Param::new(param_name, ty, span, self.line(span)));
                if !self.match_token(&TokenKind::Comma)? {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen)?;

        let body = self.parse_block()?;
        let span = start_span.merge(body.span);
        Ok(FuncDecl::new(name, return_type, params, body, span, self.line(start_span)))
    }

    // =========================================================================
    // Statements
    // =========================================================================

    fn parse_block(&mut self) -> CompileResult<Block> {
        let open = self.expect(TokenKind::LBrace)?;

        let mut variables = Vec::new();
        while self.current.kind.is_type() {
            variables.push(self.parse_var_decl()?);
        }

        let mut statements = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            statements.push(self.parse_stmt()?);
        }

        let close = self.expect(TokenKind::RBrace)?;
        let span = open.span.merge(close.span);
        Ok(Block::new(variables, statements, span, self.line(span)))
    }

    fn parse_stmt(&mut self) -> CompileResult<Stmt> {
        let start_span = self.current.span;

        let kind = match &self.current.kind {
            TokenKind::If => {
                self.advance()?;
                self.expect(TokenKind::LParen)?;
                let condition = self.parse_expr()?;
                self.expect(TokenKind::RParen)?;
                let then_block = self.parse_block()?;
                let else_block = if self.match_token(&TokenKind::Else)? {
                    Some(self.parse_block()?)
                } else {
                    None
                };
                let end = else_block.as_ref().map_or(then_block.span, |b| b.span);
                let span = start_span.merge(end);
                return Ok(Stmt::new(
                    StmtKind::Conditional { condition, then_block, else_block },
                    span,
                    self.line(span),
                ));
            }
            TokenKind::While => {
                self.advance()?;
                self.expect(TokenKind::LParen)?;
                let condition = self.parse_expr()?;
                self.expect(TokenKind::RParen)?;
                let body = self.parse_block()?;
                let span = start_span.merge(body.span);
                return Ok(Stmt::new(StmtKind::While { condition, body }, span, self.line(span)));
            }
            TokenKind::LBrace => {
                let block = self.parse_block()?;
                let span = block.span;
                return Ok(Stmt::new(StmtKind::Block(block), span, self.line(span)));
            }
            TokenKind::Return => {
                self.advance()?;
                let value = if self.check(&TokenKind::Semi) {
                    None
                } else {
                    Some(self.parse_expr()?)
                };
                StmtKind::Return(value)
            }
            TokenKind::Break => {
                self.advance()?;
                StmtKind::Break
            }
            TokenKind::Continue => {
                self.advance()?;
                StmtKind::Continue
            }
            TokenKind::Identifier(_) => {
                if matches!(self.lexer.peek()?.kind, TokenKind::LParen) {
                    StmtKind::Call(self.parse_call_or_location()?)
                } else {
                    let target = self.parse_call_or_location()?;
                    self.expect(TokenKind::Eq)?;
                    let value = self.parse_expr()?;
                    StmtKind::Assign { target, value }
                }
            }
            _ => return Err(self.unexpected("statement")),
        };

        let end = self.expect(TokenKind::Semi)?;
        let span = start_span.merge(end.span);
        Ok(Stmt::new(kind, span, self.line(span)))
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    fn parse_expr(&mut self) -> CompileResult<Expr> {
        self.parse_binary(1)
    }

    /// Precedence climbing; all binary operators are left-associative
    fn parse_binary(&mut self, min_prec: u8) -> CompileResult<Expr> {
        let mut left = self.parse_unary()?;

        while let Some(prec) = self.current.kind.binary_precedence() {
            if prec < min_prec {
                break;
            }
            let op_token = self.advance()?;
            let op = binary_op(&op_token.kind);
            let right = self.parse_binary(prec + 1)?;
            let span = left.span.merge(right.span);
            left = Expr::new(
                ExprKind::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                span,
                self.line(span),
            );
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> CompileResult<Expr> {
        let op = match self.current.kind {
            TokenKind::Minus => Some(UnaryOp::Neg),
            TokenKind::Bang => Some(UnaryOp::Not),
            _ => None,
        };

        if let Some(op) = op {
            let op_token = self.advance()?;
            let operand = self.parse_unary()?;
            let span = op_token.span.merge(operand.span);
            return Ok(Expr::new(
                ExprKind::Unary { op, operand: Box::new(operand) },
                span,
                self.line(span),
            ));
        }

        self.parse_primary()
    }

    fn parse_primary(&mut self) -> CompileResult<Expr> {
        let span = self.current.span;
        let literal = match &self.current.kind {
            TokenKind::LParen => {
                self.advance()?;
                let expr = self.parse_expr()?;
                self.expect(TokenKind::RParen)?;
                return Ok(expr);
            }
            TokenKind::Identifier(_) => return self.parse_call_or_location(),
            TokenKind::DecLiteral(text) => Literal::Int(text.parse::<i64>().map_err(|_| {
                CompileError::parser(format!("integer literal '{}' out of range", text), span)
            })?),
            TokenKind::HexLiteral(text) => Literal::Int(i64::from_str_radix(&text[2..], 16).map_err(|_| {
                CompileError::parser(format!("integer literal '{}' out of range", text), span)
            })?),
            TokenKind::StringLiteral(text) => Literal::Str(unescape(text, span)?),
            TokenKind::True => Literal::Bool(true),
            TokenKind::False => Literal::Bool(false),
            _ => return Err(self.unexpected("expression")),
        };
        self.advance()?;
        Ok(Expr::new(ExprKind::Literal(literal), span, self.line(span)))
    }

    /// `name`, `name[index]` or `name(args)`
    fn parse_call_or_location(&mut self) -> CompileResult<Expr> {
        let (name, name_span) = self.expect_identifier()?;

        if self.match_token(&TokenKind::LParen)? {
            let mut args = Vec::new();
            if !self.check(&TokenKind::RParen) {
                loop {
                    args.push(self.parse_expr()?);
                    if !self.match_token(&TokenKind::Comma)? {
                        break;
                    }
                }
            }
            let close = self.expect(TokenKind::RParen)?;
            let span = name_span.merge(close.span);
            return Ok(Expr::new(ExprKind::Call { name, args }, span, self.line(span)));
        }

        let mut index = None;
        let mut span = name_span;
        if self.match_token(&TokenKind::LBracket)? {
            index = Some(Box::new(self.parse_expr()?));
            let close = self.expect(TokenKind::RBracket)?;
            span = span.merge(close.span);
        }
        Ok(Expr::new(ExprKind::Location { name, index }, span, self.line(span)))
    }
}

enum TopLevel {
    Variable(VarDecl),
    Function(FuncDecl),
}

fn binary_op(kind: &TokenKind) -> BinaryOp {
    match kind {
        TokenKind::PipePipe => BinaryOp::Or,
        TokenKind::AmpAmp => BinaryOp::And,
        TokenKind::EqEq => BinaryOp::Eq,
        TokenKind::NotEq => BinaryOp::Ne,
        TokenKind::Lt => BinaryOp::Lt,
        TokenKind::LtEq => BinaryOp::Le,
        TokenKind::GtEq => BinaryOp::Ge,
        TokenKind::Gt => BinaryOp::Gt,
        TokenKind::Plus => BinaryOp::Add,
        TokenKind::Minus => BinaryOp::Sub,
        TokenKind::Star => BinaryOp::Mul,
        TokenKind::Slash => BinaryOp::Div,
        TokenKind::Percent => BinaryOp::Mod,
        // binary_precedence() only admits the tokens above
        _ => unreachable!("not a binary operator: {:?}", kind),
    }
}

/// Strip the quotes from a string literal and resolve escapes
fn unescape(text: &str, span: Span) -> CompileResult<String> {
    let inner = &text[1..text.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('\\') => out.push('\\'),
            Some('"') => out.push('"'),
            Some(other) => {
                return Err(CompileError::parser(
                    format!("invalid escape sequence '\\{}'", other),
                    span,
                ))
            }
            None => return Err(CompileError::parser("unterminated escape sequence", span)),
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Program {
        Parser::new(source).unwrap().parse().unwrap()
    }

    fn main_body(program: &Program) -> &Block {
        &program.functions.iter().find(|f| f.name == "main").expect("main").body
    }

    #[test]
    fn test_parse_simple_function() {
        let program = parse("int main() { return 0; }");

        assert_eq!(program.functions.len(), 1);
        let f = &program.functions[0];
        assert_eq!(f.name, "main");
        assert_eq!(f.return_type, DecafType::Int);
        assert!(f.params.is_empty());
        assert!(matches!(f.body.statements[0].kind, StmtKind::Return(Some(_))));
    }

    #[test]
    fn test_parse_def_keyword_is_optional() {
        let program = parse("def int main() { }\nint helper(int a, bool b) { }");
        assert_eq!(program.functions.len(), 2);
        let helper = &program.functions[1];
        assert_eq!(helper.param_types(), vec![DecafType::Int, DecafType::Bool]);
        assert_eq!(helper.line, 2);
    }

    #[test]
    fn test_parse_global_variables() {
        let program = parse("int x;\nbool flags[10];");

        assert_eq!(program.variables.len(), 2);
        assert_eq!(program.variables[0].name, "x");
        assert_eq!(program.variables[0].array_length, None);
        assert_eq!(program.variables[1].array_length, Some(10));
        assert_eq!(program.variables[1].line, 2);
    }

    #[test]
    fn test_parse_block_locals() {
        let program = parse("int main() { int a; bool b; a = 1; }");
        let body = main_body(&program);
        assert_eq!(body.variables.len(), 2);
        assert_eq!(body.statements.len(), 1);
    }

    #[test]
    fn test_parse_precedence() {
        let program = parse("int main() { x = 1 + 2 * 3; }");
        let body = main_body(&program);

        let StmtKind::Assign { target, value } = &body.statements[0].kind else {
            panic!("expected assignment");
        };
        assert_eq!(target.location_name(), Some("x"));
        let ExprKind::Binary { op, right, .. } = &value.kind else {
            panic!("expected binary expression");
        };
        assert_eq!(*op, BinaryOp::Add);
        assert!(matches!(right.kind, ExprKind::Binary { op: BinaryOp::Mul, .. }));
    }

    #[test]
    fn test_parse_left_associative() {
        let program = parse("int main() { x = 8 - 4 - 2; }");
        let StmtKind::Assign { value, .. } = &main_body(&program).statements[0].kind else {
            panic!("expected assignment");
        };
        let ExprKind::Binary { left, .. } = &value.kind else {
            panic!("expected binary expression");
        };
        assert!(matches!(left.kind, ExprKind::Binary { op: BinaryOp::Sub, .. }));
    }

    #[test]
    fn test_parse_control_flow() {
        let source = "int main() {\n  while (true) {\n    if (x < 1) { break; } else { continue; }\n  }\n}";
        let program = parse(source);
        let body = main_body(&program);

        let StmtKind::While { body: loop_body, .. } = &body.statements[0].kind else {
            panic!("expected while loop");
        };
        assert_eq!(body.statements[0].line, 2);
        let stmt = &loop_body.statements[0];
        assert_eq!(stmt.line, 3);
        assert!(matches!(
            &stmt.kind,
            StmtKind::Conditional { else_block: Some(_), .. }
        ));
    }

    #[test]
    fn test_parse_calls_and_indexing() {
        let program = parse("int main() { print_str(\"hi\\n\"); a[i + 1] = f(1, true); }");
        let body = main_body(&program);

        let StmtKind::Call(call) = &body.statements[0].kind else {
            panic!("expected call statement");
        };
        let ExprKind::Call { name, args } = &call.kind else {
            panic!("expected call expression");
        };
        assert_eq!(name, "print_str");
        assert!(matches!(&args[0].kind, ExprKind::Literal(Literal::Str(s)) if s == "hi\n"));

        let StmtKind::Assign { target, value } = &body.statements[1].kind else {
            panic!("expected assignment");
        };
        assert!(matches!(&target.kind, ExprKind::Location { index: Some(_), .. }));
        assert!(matches!(&value.kind, ExprKind::Call { args, .. } if args.len() == 2));
    }

    #[test]
    fn test_parse_hex_and_unary() {
        let program = parse("int main() { x = -0x10; y = !false; }");
        let body = main_body(&program);
        let StmtKind::Assign { value, .. } = &body.statements[0].kind else {
            panic!("expected assignment");
        };
        let ExprKind::Unary { op, operand } = &value.kind else {
            panic!("expected unary expression");
        };
        assert_eq!(*op, UnaryOp::Neg);
        assert!(matches!(operand.kind, ExprKind::Literal(Literal::Int(16))));
    }

    #[test]
    fn test_parse_empty_program() {
        let program = parse("");
        assert!(program.variables.is_empty());
        assert!(program.functions.is_empty());
        assert_eq!(program.line, 1);
    }

    #[test]
    fn test_parse_error_missing_semicolon() {
        let err = Parser::new("int x").unwrap().parse().unwrap_err();
        assert!(matches!(err, CompileError::Parser { .. }));
        assert!(err.to_string().contains("expected ';'"));
    }

    #[test]
    fn test_parse_error_statement_before_declaration_order() {
        // locals must precede statements in a block
        let err = Parser::new("int main() { x = 1; int y; }").unwrap().parse().unwrap_err();
        assert!(matches!(err, CompileError::Parser { .. }));
    }
}
