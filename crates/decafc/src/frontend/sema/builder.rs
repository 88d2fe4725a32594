//! Scope construction
//!
//! Builds the [`SymbolTables`] for a program and records on every
//! scope-bearing node (program, function, block) the scope it opens. The
//! analyzer only reads the result.

use tracing::{debug, trace};

use super::scope::{ScopeId, Symbol, SymbolKind, SymbolTables};
use crate::common::Span;
use crate::frontend::ast::*;

/// Functions every program can call without declaring them
pub const BUILTINS: &[(&str, DecafType)] = &[
    ("print_int", DecafType::Int),
    ("print_bool", DecafType::Bool),
    ("print_str", DecafType::Str),
];

/// Walks a program once and populates its symbol tables
pub struct SymbolTableBuilder {
    tables: SymbolTables,
}

impl SymbolTableBuilder {
    pub fn new() -> Self {
        Self {
            tables: SymbolTables::new(),
        }
    }

    pub fn build(mut self, program: &mut Program) -> SymbolTables {
        let global = self.tables.push_scope(None, program.line);
        program.scope = Some(global);

        for (name, param) in BUILTINS {
            let symbol = Symbol::new(
                *name,
                SymbolKind::Function { params: vec![*param] },
                DecafType::Void,
                0,
            );
            self.define(global, symbol, Span::default());
        }

        for var in &program.variables {
            self.define_var(global, var);
        }

        // All functions are visible before any body is walked so that calls
        // may refer to functions defined later in the file
        for func in &program.functions {
            let symbol = Symbol::new(
                func.name.clone(),
                SymbolKind::Function { params: func.param_types() },
                func.return_type,
                func.line,
            );
            self.define(global, symbol, func.span);
        }

        for func in &mut program.functions {
            self.build_function(global, func);
        }

        debug!(scopes = self.tables.len(), "symbol tables built");
        self.tables
    }

    fn build_function(&mut self, parent: ScopeId, func: &mut FuncDecl) {
        let scope = self.tables.push_scope(Some(parent), func.line);
        func.scope = Some(scope);
        trace!(function = %func.name, scope = scope.index(), "entering function scope");

        for param in &func.params {
            let symbol = Symbol::new(param.name.clone(), SymbolKind::Scalar, param.ty, param.line);
            self.define(scope, symbol, param.span);
        }

        self.build_block(scope, &mut func.body);
    }

    fn build_block(&mut self, parent: ScopeId, block: &mut Block) {
        let scope = self.tables.push_scope(Some(parent), block.line);
        block.scope = Some(scope);

        for var in &block.variables {
            self.define_var(scope, var);
        }

        for stmt in &mut block.statements {
            self.build_stmt(scope, stmt);
        }
    }

    fn build_stmt(&mut self, scope: ScopeId, stmt: &mut Stmt) {
        match &mut stmt.kind {
            StmtKind::Conditional { then_block, else_block, .. } => {
                self.build_block(scope, then_block);
                if let Some(else_block) = else_block {
                    self.build_block(scope, else_block);
                }
            }
            StmtKind::While { body, .. } => self.build_block(scope, body),
            StmtKind::Block(block) => self.build_block(scope, block),
            StmtKind::Assign { .. }
            | StmtKind::Call(_)
            | StmtKind::Return(_)
            | StmtKind::Break
            | StmtKind::Continue => {}
        }
    }

    fn define_var(&mut self, scope: ScopeId, var: &VarDecl) {
        let kind = match var.array_length {
            Some(length) => SymbolKind::Array { length },
            None => SymbolKind::Scalar,
        };
        let symbol = Symbol::new(var.name.clone(), kind, var.ty, var.line);
        self.define(scope, symbol, var.span);
    }

    fn define(&mut self, scope: ScopeId, symbol: Symbol, span: Span) {
        if let Err(e) = self.tables.define(scope, symbol, span) {
            trace!(scope = scope.index(), "{}", e);
        }
    }
}

impl Default for SymbolTableBuilder {
    fn default() -> Self {
        Self::new()
    }
}
