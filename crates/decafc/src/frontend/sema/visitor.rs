//! Depth-first AST traversal with pre- and post-order hooks
//!
//! Every hook has an empty default body, so a visitor only implements the
//! node kinds it cares about. The `walk_*` functions match exhaustively on
//! the node enums and visit children in source order:
//!
//! - program: global variables, then functions
//! - function: parameters, then body
//! - block: local variables, then statements
//! - conditional: condition, then-block, else-block
//! - while: condition, body
//! - assignment: target, value
//!
//! Hooks only get shared references; attributes are written through the
//! write-once cells on the nodes.

use crate::frontend::ast::*;

#[allow(unused_variables)]
pub trait Visitor {
    fn pre_program(&mut self, program: &Program) {}
    fn post_program(&mut self, program: &Program) {}

    fn pre_funcdecl(&mut self, func: &FuncDecl) {}
    fn post_funcdecl(&mut self, func: &FuncDecl) {}

    fn pre_param(&mut self, param: &Param) {}
    fn post_param(&mut self, param: &Param) {}

    fn pre_vardecl(&mut self, var: &VarDecl) {}
    fn post_vardecl(&mut self, var: &VarDecl) {}

    fn pre_block(&mut self, block: &Block) {}
    fn post_block(&mut self, block: &Block) {}

    fn pre_assignment(&mut self, stmt: &Stmt, target: &Expr, value: &Expr) {}
    fn post_assignment(&mut self, stmt: &Stmt, target: &Expr, value: &Expr) {}

    fn pre_conditional(&mut self, stmt: &Stmt, condition: &Expr, then_block: &Block, else_block: Option<&Block>) {}
    fn post_conditional(&mut self, stmt: &Stmt, condition: &Expr, then_block: &Block, else_block: Option<&Block>) {}

    fn pre_while(&mut self, stmt: &Stmt, condition: &Expr, body: &Block) {}
    fn post_while(&mut self, stmt: &Stmt, condition: &Expr, body: &Block) {}

    fn pre_return(&mut self, stmt: &Stmt, value: Option<&Expr>) {}
    fn post_return(&mut self, stmt: &Stmt, value: Option<&Expr>) {}

    fn pre_break(&mut self, stmt: &Stmt) {}
    fn post_break(&mut self, stmt: &Stmt) {}

    fn pre_continue(&mut self, stmt: &Stmt) {}
    fn post_continue(&mut self, stmt: &Stmt) {}

    fn pre_literal(&mut self, expr: &Expr, literal: &Literal) {}
    fn post_literal(&mut self, expr: &Expr, literal: &Literal) {}

    fn pre_location(&mut self, expr: &Expr, name: &str, index: Option<&Expr>) {}
    fn post_location(&mut self, expr: &Expr, name: &str, index: Option<&Expr>) {}

    fn pre_binary(&mut self, expr: &Expr, op: BinaryOp, left: &Expr, right: &Expr) {}
    fn post_binary(&mut self, expr: &Expr, op: BinaryOp, left: &Expr, right: &Expr) {}

    fn pre_unary(&mut self, expr: &Expr, op: UnaryOp, operand: &Expr) {}
    fn post_unary(&mut self, expr: &Expr, op: UnaryOp, operand: &Expr) {}

    fn pre_call(&mut self, expr: &Expr, name: &str, args: &[Expr]) {}
    fn post_call(&mut self, expr: &Expr, name: &str, args: &[Expr]) {}
}

/// Walk a whole program; an absent tree is an empty program
pub fn traverse<V: Visitor + ?Sized>(visitor: &mut V, program: Option<&Program>) {
    if let Some(program) = program {
        walk_program(visitor, program);
    }
}

pub fn walk_program<V: Visitor + ?Sized>(visitor: &mut V, program: &Program) {
    visitor.pre_program(program);
    for var in &program.variables {
        walk_vardecl(visitor, var);
    }
    for func in &program.functions {
        walk_funcdecl(visitor, func);
    }
    visitor.post_program(program);
}

pub fn walk_funcdecl<V: Visitor + ?Sized>(visitor: &mut V, func: &FuncDecl) {
    visitor.pre_funcdecl(func);
    for param in &func.params {
        visitor.pre_param(param);
        visitor.post_param(param);
    }
    walk_block(visitor, &func.body);
    visitor.post_funcdecl(func);
}

pub fn walk_vardecl<V: Visitor + ?Sized>(visitor: &mut V, var: &VarDecl) {
    visitor.pre_vardecl(var);
    visitor.post_vardecl(var);
}

pub fn walk_block<V: Visitor + ?Sized>(visitor: &mut V, block: &Block) {
    visitor.pre_block(block);
    for var in &block.variables {
        walk_vardecl(visitor, var);
    }
    for stmt in &block.statements {
        walk_stmt(visitor, stmt);
    }
    visitor.post_block(block);
}

pub fn walk_stmt<V: Visitor + ?Sized>(visitor: &mut V, stmt: &Stmt) {
    match &stmt.kind {
        StmtKind::Assign { target, value } => {
            visitor.pre_assignment(stmt, target, value);
            walk_expr(visitor, target);
            walk_expr(visitor, value);
            visitor.post_assignment(stmt, target, value);
        }
        StmtKind::Call(call) => walk_expr(visitor, call),
        StmtKind::Conditional { condition, then_block, else_block } => {
            let else_block = else_block.as_ref();
            visitor.pre_conditional(stmt, condition, then_block, else_block);
            walk_expr(visitor, condition);
            walk_block(visitor, then_block);
            if let Some(else_block) = else_block {
                walk_block(visitor, else_block);
            }
            visitor.post_conditional(stmt, condition, then_block, else_block);
        }
        StmtKind::While { condition, body } => {
            visitor.pre_while(stmt, condition, body);
            walk_expr(visitor, condition);
            walk_block(visitor, body);
            visitor.post_while(stmt, condition, body);
        }
        StmtKind::Return(value) => {
            let value = value.as_ref();
            visitor.pre_return(stmt, value);
            if let Some(value) = value {
                walk_expr(visitor, value);
            }
            visitor.post_return(stmt, value);
        }
        StmtKind::Break => {
            visitor.pre_break(stmt);
            visitor.post_break(stmt);
        }
        StmtKind::Continue => {
            visitor.pre_continue(stmt);
            visitor.post_continue(stmt);
        }
        StmtKind::Block(block) => walk_block(visitor, block),
    }
}

pub fn walk_expr<V: Visitor + ?Sized>(visitor: &mut V, expr: &Expr) {
    match &expr.kind {
        ExprKind::Literal(literal) => {
            visitor.pre_literal(expr, literal);
            visitor.post_literal(expr, literal);
        }
        ExprKind::Location { name, index } => {
            let index = index.as_deref();
            visitor.pre_location(expr, name, index);
            if let Some(index) = index {
                walk_expr(visitor, index);
            }
            visitor.post_location(expr, name, index);
        }
        ExprKind::Binary { op, left, right } => {
            visitor.pre_binary(expr, *op, left, right);
            walk_expr(visitor, left);
            walk_expr(visitor, right);
            visitor.post_binary(expr, *op, left, right);
        }
        ExprKind::Unary { op, operand } => {
            visitor.pre_unary(expr, *op, operand);
            walk_expr(visitor, operand);
            visitor.post_unary(expr, *op, operand);
        }
        ExprKind::Call { name, args } => {
            visitor.pre_call(expr, name, args);
            for arg in args {
                walk_expr(visitor, arg);
            }
            visitor.post_call(expr, name, args);
        }
    }
}
