//! Symbol table and scope management

use crate::common::Span;
use crate::frontend::ast::DecafType;
use std::collections::HashMap;
use std::fmt;

/// Handle to a scope inside [`SymbolTables`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(usize);

impl ScopeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A symbol in the symbol table
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    /// Declared type; the return type for functions
    pub ty: DecafType,
    /// Nesting depth of the declaring scope, 0 for globals
    pub level: usize,
    pub line: usize,
}

impl Symbol {
    pub fn new(name: impl Into<String>, kind: SymbolKind, ty: DecafType, line: usize) -> Self {
        Self {
            name: name.into(),
            kind,
            ty,
            level: 0,
            line,
        }
    }

    /// Parameter types if this symbol is a function
    pub fn params(&self) -> Option<&[DecafType]> {
        match &self.kind {
            SymbolKind::Function { params } => Some(params),
            _ => None,
        }
    }
}

/// Kind of symbol
#[derive(Debug, Clone, PartialEq)]
pub enum SymbolKind {
    Scalar,
    Array { length: usize },
    Function { params: Vec<DecafType> },
}

/// Second declaration of a name already defined in the same scope
#[derive(Debug, Clone, PartialEq)]
pub struct Duplicate {
    pub name: String,
    pub line: usize,
    pub span: Span,
}

/// A scope containing symbols
#[derive(Debug)]
pub struct Scope {
    symbols: Vec<Symbol>,
    by_name: HashMap<String, usize>,
    duplicates: Vec<Duplicate>,
    parent: Option<ScopeId>,
    level: usize,
    /// Line of the construct that opened this scope
    line: usize,
}

impl Scope {
    fn new(parent: Option<ScopeId>, level: usize, line: usize) -> Self {
        Self {
            symbols: Vec::new(),
            by_name: HashMap::new(),
            duplicates: Vec::new(),
            parent,
            level,
            line,
        }
    }

    pub fn define(&mut self, mut symbol: Symbol) -> Result<(), String> {
        if self.by_name.contains_key(&symbol.name) {
            return Err(format!("symbol '{}' already defined in this scope", symbol.name));
        }
        symbol.level = self.level;
        self.by_name.insert(symbol.name.clone(), self.symbols.len());
        self.symbols.push(symbol);
        Ok(())
    }

    pub fn lookup_local(&self, name: &str) -> Option<&Symbol> {
        self.by_name.get(name).map(|&i| &self.symbols[i])
    }

    /// Symbols in declaration order
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn duplicates(&self) -> &[Duplicate] {
        &self.duplicates
    }

    pub fn parent(&self) -> Option<ScopeId> {
        self.parent
    }

    pub fn level(&self) -> usize {
        self.level
    }

    pub fn line(&self) -> usize {
        self.line
    }
}

/// All scopes of a program, linked child-to-parent
#[derive(Debug, Default)]
pub struct SymbolTables {
    scopes: Vec<Scope>,
}

impl SymbolTables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new scope nested inside `parent`
    pub fn push_scope(&mut self, parent: Option<ScopeId>, line: usize) -> ScopeId {
        let level = parent.map_or(0, |p| self.scope(p).level + 1);
        let id = ScopeId(self.scopes.len());
        self.scopes.push(Scope::new(parent, level, line));
        id
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.0]
    }

    /// Define `symbol` in `scope`; a name clash is recorded as a duplicate
    /// and the first declaration is kept
    pub fn define(&mut self, scope: ScopeId, symbol: Symbol, span: Span) -> Result<(), String> {
        let target = &mut self.scopes[scope.0];
        let name = symbol.name.clone();
        let line = symbol.line;
        target.define(symbol).inspect_err(|_| {
            target.duplicates.push(Duplicate { name, line, span });
        })
    }

    /// Search `scope` and then each enclosing scope for `name`
    pub fn lookup(&self, scope: ScopeId, name: &str) -> Option<&Symbol> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let scope = self.scope(id);
            if let Some(sym) = scope.lookup_local(name) {
                return Some(sym);
            }
            current = scope.parent;
        }
        None
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ScopeId, &Scope)> {
        self.scopes.iter().enumerate().map(|(i, s)| (ScopeId(i), s))
    }
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SymbolKind::Scalar => write!(f, "scalar"),
            SymbolKind::Array { length } => write!(f, "array[{}]", length),
            SymbolKind::Function { params } => {
                let params: Vec<&str> = params.iter().map(DecafType::as_str).collect();
                write!(f, "function({})", params.join(", "))
            }
        }
    }
}

impl fmt::Display for SymbolTables {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (id, scope) in self.iter() {
            let indent = "  ".repeat(scope.level());
            match scope.parent() {
                Some(parent) => writeln!(
                    f,
                    "{}scope {} (line {}, parent {}):",
                    indent, id.0, scope.line(), parent.0
                )?,
                None => writeln!(f, "{}scope {} (line {}):", indent, id.0, scope.line())?,
            }
            for sym in scope.symbols() {
                writeln!(f, "{}  {} : {} {}", indent, sym.name, sym.ty, sym.kind)?;
            }
        }
        Ok(())
    }
}
