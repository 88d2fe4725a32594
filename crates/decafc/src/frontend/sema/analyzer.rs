//! Semantic analyzer - type checking and validation
//!
//! A single post-order pass over a program whose scopes have already been
//! built. Every rule reports into an [`ErrorList`] and lets the walk
//! continue, and every expression is annotated with its inferred type.
//! Expressions whose type cannot be established get [`DecafType::Unknown`];
//! rules stay silent about unknown operands so a single mistake is reported
//! once.

use tracing::{debug, trace};

use super::diagnostics::ErrorList;
use super::scope::{ScopeId, Symbol, SymbolKind, SymbolTables};
use super::visitor::{self, Visitor};
use crate::common::Span;
use crate::frontend::ast::*;

/// Check `program` against the symbol tables built for it.
///
/// `None` is an empty program and yields no errors.
pub fn analyze(program: Option<&Program>, symbols: &SymbolTables) -> ErrorList {
    let Some(program) = program else {
        return ErrorList::new();
    };

    let mut analyzer = AnalysisVisitor::new(symbols);
    visitor::traverse(&mut analyzer, Some(program));
    let errors = analyzer.finish();
    debug!(errors = errors.len(), "semantic analysis finished");
    errors
}

/// State of the innermost function being analyzed
#[derive(Debug, Clone, Copy)]
struct FunctionContext {
    return_type: DecafType,
    loop_depth: usize,
}

/// The rule set, one hook per construct
pub struct AnalysisVisitor<'a> {
    symbols: &'a SymbolTables,
    errors: ErrorList,
    scopes: Vec<ScopeId>,
    functions: Vec<FunctionContext>,
}

impl<'a> AnalysisVisitor<'a> {
    pub fn new(symbols: &'a SymbolTables) -> Self {
        Self {
            symbols,
            errors: ErrorList::new(),
            scopes: Vec::new(),
            functions: Vec::new(),
        }
    }

    /// Hand the collected errors to the caller
    pub fn finish(self) -> ErrorList {
        self.errors
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn lookup(&self, name: &str) -> Option<&'a Symbol> {
        let scope = *self.scopes.last()?;
        self.symbols.lookup(scope, name)
    }

    /// Look `name` up from the innermost scope, reporting it if undefined
    fn resolve(&mut self, name: &str, line: usize, span: Span) -> Option<&'a Symbol> {
        let symbol = self.lookup(name);
        if symbol.is_none() {
            self.errors.report(line, span, format!("Symbol '{}' undefined on line {}", name, line));
        }
        symbol
    }

    fn enter_scope(&mut self, scope: Option<ScopeId>) {
        let Some(scope) = scope else { return };
        self.scopes.push(scope);

        let table = self.symbols.scope(scope);
        for dup in table.duplicates() {
            self.errors.report(
                dup.line,
                dup.span,
                format!("Duplicate symbols named '{}' in scope started on line {}", dup.name, table.line()),
            );
        }
    }

    fn exit_scope(&mut self, scope: Option<ScopeId>) {
        if scope.is_some() {
            self.scopes.pop();
        }
    }

    /// `break` and `continue` share one placement message
    fn check_in_loop(&mut self, stmt: &Stmt) {
        if !self.functions.last().is_some_and(|ctx| ctx.loop_depth > 0) {
            self.errors.report(
                stmt.line,
                stmt.span,
                format!("Break on line {} can not exist outside of a loop", stmt.line),
            );
        }
    }

    /// Report `found` if it is known and differs from `expected`
    fn expect_type(&mut self, expected: DecafType, found: DecafType, line: usize, span: Span) {
        if found.is_known() && found != expected {
            self.errors.report(
                line,
                span,
                format!("Type mismatch: {} expected but {} found on line {}", expected, found, line),
            );
        }
    }
}

/// Inferred type of an already-visited expression
fn type_of(expr: &Expr) -> DecafType {
    expr.inferred_type().unwrap_or(DecafType::Unknown)
}

fn annotate(expr: &Expr, ty: DecafType) {
    // A second run over an annotated tree computes the same type; the first
    // one stays
    let _ = expr.set_inferred_type(ty);
}

impl Visitor for AnalysisVisitor<'_> {
    fn pre_program(&mut self, program: &Program) {
        self.enter_scope(program.scope);
    }

    fn post_program(&mut self, program: &Program) {
        let line = program.line;
        let span = Span::new(program.span.start, program.span.start);
        match self.lookup("main") {
            None => {
                self.errors.report(line, span, format!("Main function undefined on line {}", line));
            }
            Some(main) => {
                let well_formed = main.ty == DecafType::Int
                    && main.params().is_some_and(<[DecafType]>::is_empty);
                if !well_formed {
                    self.errors.report(line, span, format!("Main function defined incorrect on line {}", line));
                }
            }
        }
        self.exit_scope(program.scope);
    }

    fn pre_funcdecl(&mut self, func: &FuncDecl) {
        self.enter_scope(func.scope);
        self.functions.push(FunctionContext {
            return_type: func.return_type,
            loop_depth: 0,
        });
    }

    fn post_funcdecl(&mut self, func: &FuncDecl) {
        self.functions.pop();
        self.exit_scope(func.scope);
    }

    fn post_param(&mut self, param: &Param) {
        if param.ty.is_void() {
            self.errors.report(
                param.line,
                param.span,
                format!("Void parameter '{}' on line {}", param.name, param.line),
            );
        }
    }

    fn post_vardecl(&mut self, var: &VarDecl) {
        if var.ty.is_void() {
            self.errors.report(
                var.line,
                var.span,
                format!("Void variable '{}' on line {}", var.name, var.line),
            );
        }
        if var.array_length == Some(0) {
            self.errors.report(
                var.line,
                var.span,
                format!("Array '{}' on line {} must have positive non-zero length", var.name, var.line),
            );
        }
    }

    fn pre_block(&mut self, block: &Block) {
        self.enter_scope(block.scope);
    }

    fn post_block(&mut self, block: &Block) {
        self.exit_scope(block.scope);
    }

    fn post_assignment(&mut self, stmt: &Stmt, target: &Expr, value: &Expr) {
        let target_ty = type_of(target);
        let value_ty = type_of(value);
        if target_ty.is_known() && value_ty.is_known() && target_ty != value_ty {
            let name = target.location_name().unwrap_or_default();
            self.errors.report(
                stmt.line,
                stmt.span,
                format!("Variable '{}' type mismatch on line {}", name, stmt.line),
            );
        }
    }

    fn post_conditional(&mut self, stmt: &Stmt, condition: &Expr, _then_block: &Block, _else_block: Option<&Block>) {
        check_condition(&mut self.errors, stmt, condition);
    }

    fn pre_while(&mut self, _stmt: &Stmt, _condition: &Expr, _body: &Block) {
        if let Some(ctx) = self.functions.last_mut() {
            ctx.loop_depth += 1;
        }
    }

    fn post_while(&mut self, stmt: &Stmt, condition: &Expr, _body: &Block) {
        if let Some(ctx) = self.functions.last_mut() {
            ctx.loop_depth -= 1;
        }
        check_condition(&mut self.errors, stmt, condition);
    }

    fn post_return(&mut self, stmt: &Stmt, value: Option<&Expr>) {
        let Some(ctx) = self.functions.last() else { return };
        let found = value.map_or(DecafType::Void, type_of);
        if found.is_known() && found != ctx.return_type {
            self.errors.report(
                stmt.line,
                stmt.span,
                format!("Return type on line {} does not match function return type", stmt.line),
            );
        }
    }

    fn post_break(&mut self, stmt: &Stmt) {
        self.check_in_loop(stmt);
    }

    fn post_continue(&mut self, stmt: &Stmt) {
        self.check_in_loop(stmt);
    }

    fn post_literal(&mut self, expr: &Expr, literal: &Literal) {
        annotate(expr, literal.ty());
    }

    fn post_location(&mut self, expr: &Expr, name: &str, index: Option<&Expr>) {
        let line = expr.line;
        let Some(symbol) = self.resolve(name, line, expr.span) else {
            annotate(expr, DecafType::Unknown);
            return;
        };

        let ty = match (&symbol.kind, index) {
            (SymbolKind::Scalar, None) => symbol.ty,
            (SymbolKind::Scalar, Some(_)) => {
                self.errors.report(
                    line,
                    expr.span,
                    format!("Scalar '{}' accessed with an index on line {}", name, line),
                );
                symbol.ty
            }
            (SymbolKind::Array { .. }, None) => {
                self.errors.report(
                    line,
                    expr.span,
                    format!("Array '{}' accesses without an index on line {}", name, line),
                );
                symbol.ty
            }
            (SymbolKind::Array { .. }, Some(index)) => {
                let index_ty = type_of(index);
                if index_ty.is_known() && index_ty != DecafType::Int {
                    self.errors.report(
                        line,
                        index.span,
                        format!("Array index must be an int on line {}", line),
                    );
                }
                symbol.ty
            }
            (SymbolKind::Function { .. }, _) => {
                self.errors.report(
                    line,
                    expr.span,
                    format!("Invalid use of function '{}' on line {}", name, line),
                );
                DecafType::Unknown
            }
        };
        annotate(expr, ty);
    }

    fn post_binary(&mut self, expr: &Expr, op: BinaryOp, left: &Expr, right: &Expr) {
        let (left_ty, right_ty) = (type_of(left), type_of(right));
        match op.operand_type() {
            Some(expected) => {
                self.expect_type(expected, left_ty, expr.line, left.span);
                self.expect_type(expected, right_ty, expr.line, right.span);
            }
            None => {
                let mut has_void = false;
                for (ty, span) in [(left_ty, left.span), (right_ty, right.span)] {
                    if ty.is_void() {
                        has_void = true;
                        self.errors.report(
                            expr.line,
                            span,
                            format!("Type mismatch: non-void expected but void found on line {}", expr.line),
                        );
                    }
                }
                if !has_void && left_ty.is_known() {
                    self.expect_type(left_ty, right_ty, expr.line, right.span);
                }
            }
        }
        trace!(op = op.as_str(), line = expr.line, "binary expression");
        annotate(expr, op.result_type());
    }

    fn post_unary(&mut self, expr: &Expr, op: UnaryOp, operand: &Expr) {
        trace!(op = op.as_str(), line = expr.line, "unary expression");
        self.expect_type(op.ty(), type_of(operand), expr.line, operand.span);
        annotate(expr, op.ty());
    }

    fn post_call(&mut self, expr: &Expr, name: &str, args: &[Expr]) {
        let line = expr.line;
        let Some(symbol) = self.resolve(name, line, expr.span) else {
            annotate(expr, DecafType::Unknown);
            return;
        };
        let Some(params) = symbol.params() else {
            self.errors.report(
                line,
                expr.span,
                format!("Invalid call to non-function '{}' on line {}", name, line),
            );
            annotate(expr, DecafType::Unknown);
            return;
        };

        if params.len() != args.len() {
            self.errors.report(
                line,
                expr.span,
                format!("Invalid number of function arguments on line {}", line),
            );
        } else {
            for (i, (param, arg)) in params.iter().zip(args).enumerate() {
                let arg_ty = type_of(arg);
                if arg_ty.is_known() && arg_ty != *param {
                    self.errors.report(
                        line,
                        arg.span,
                        format!(
                            "Type mismatch in parameter {} of call to '{}': expected {} but found {} on line {}",
                            i, name, param, arg_ty, line
                        ),
                    );
                }
            }
        }
        annotate(expr, symbol.ty);
    }
}

fn check_condition(errors: &mut ErrorList, stmt: &Stmt, condition: &Expr) {
    let ty = type_of(condition);
    if ty.is_known() && ty != DecafType::Bool {
        errors.report(
            stmt.line,
            condition.span,
            format!("Condition must be a boolean type on line {}", stmt.line),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::parser::Parser;
    use crate::frontend::sema::SymbolTableBuilder;
    use pretty_assertions::assert_eq;

    fn prepare(source: &str) -> (Program, SymbolTables) {
        let mut program = Parser::new(source).unwrap().parse().unwrap();
        let symbols = SymbolTableBuilder::new().build(&mut program);
        (program, symbols)
    }

    fn check(source: &str) -> Vec<String> {
        let (program, symbols) = prepare(source);
        analyze(Some(&program), &symbols)
            .messages()
            .map(str::to_string)
            .collect()
    }

    fn count(errors: &[String], needle: &str) -> usize {
        errors.iter().filter(|e| e.contains(needle)).count()
    }

    // --- entry point ---------------------------------------------------------

    #[test]
    fn test_empty_program_missing_main() {
        assert_eq!(check(""), vec!["Main function undefined on line 1"]);
    }

    #[test]
    fn test_missing_main_reports_once() {
        let errors = check("int x;\nint helper() { return 1; }");
        assert_eq!(count(&errors, "Main function undefined"), 1);
        assert_eq!(count(&errors, "Main function defined incorrect"), 0);
        assert_eq!(count(&errors, "Symbol 'main'"), 0);
    }

    #[test]
    fn test_valid_main() {
        assert!(check("int main() { return 0; }").is_empty());
    }

    #[test]
    fn test_main_wrong_return_type() {
        assert_eq!(
            check("bool main() { return true; }"),
            vec!["Main function defined incorrect on line 1"]
        );
    }

    #[test]
    fn test_main_with_parameters() {
        assert_eq!(
            check("int main(int argc) { return argc; }"),
            vec!["Main function defined incorrect on line 1"]
        );
    }

    #[test]
    fn test_main_as_variable() {
        assert_eq!(check("int main;"), vec!["Main function defined incorrect on line 1"]);
    }

    // --- declarations --------------------------------------------------------

    #[test]
    fn test_void_variables_in_source_order() {
        let source = "void a;\nint main() {\n  void b;\n  int c;\n  void d;\n  return 0;\n}";
        assert_eq!(
            check(source),
            vec![
                "Void variable 'a' on line 1",
                "Void variable 'b' on line 3",
                "Void variable 'd' on line 5",
            ]
        );
    }

    #[test]
    fn test_void_parameter() {
        let source = "int f(void p) { return 0; }\nint main() { return 0; }";
        assert_eq!(check(source), vec!["Void parameter 'p' on line 1"]);
    }

    #[test]
    fn test_zero_length_array() {
        let source = "int a[0];\nint main() { return 0; }";
        assert_eq!(check(source), vec!["Array 'a' on line 1 must have positive non-zero length"]);
    }

    #[test]
    fn test_duplicate_declarations() {
        let source = "int x;\nbool x;\nint main() {\n  int y;\n  int y;\n  return 0;\n}";
        assert_eq!(
            check(source),
            vec![
                "Duplicate symbols named 'x' in scope started on line 1",
                "Duplicate symbols named 'y' in scope started on line 3",
            ]
        );
    }

    // --- references ----------------------------------------------------------

    #[test]
    fn test_undefined_symbol_reported_once_at_its_line() {
        let source = "int main() {\n  int a;\n  a = b + 1;\n  return a;\n}";
        assert_eq!(check(source), vec!["Symbol 'b' undefined on line 3"]);
    }

    #[test]
    fn test_undefined_in_condition_does_not_cascade() {
        let source = "int main() {\n  if (missing) { }\n  return 0;\n}";
        assert_eq!(check(source), vec!["Symbol 'missing' undefined on line 2"]);
    }

    #[test]
    fn test_lookup_sees_enclosing_scopes() {
        let source = "int g;\nint main() {\n  int a;\n  while (true) { a = g; break; }\n  return a;\n}";
        assert!(check(source).is_empty());
    }

    #[test]
    fn test_block_local_not_visible_outside() {
        let source = "int main() {\n  { int inner; inner = 1; }\n  inner = 2;\n  return 0;\n}";
        assert_eq!(check(source), vec!["Symbol 'inner' undefined on line 3"]);
    }

    #[test]
    fn test_array_access_rules() {
        let source = "int a[4];\nint s;\nint main() {\n  a = 1;\n  s[0] = 1;\n  a[true] = 2;\n  a[1] = 3;\n  return main;\n}";
        assert_eq!(
            check(source),
            vec![
                "Array 'a' accesses without an index on line 4",
                "Scalar 's' accessed with an index on line 5",
                "Array index must be an int on line 6",
                "Invalid use of function 'main' on line 8",
            ]
        );
    }

    // --- typing --------------------------------------------------------------

    #[test]
    fn test_assignment_mismatch() {
        let source = "int main() {\n  int x;\n  x = true;\n  return 0;\n}";
        assert_eq!(check(source), vec!["Variable 'x' type mismatch on line 3"]);
    }

    #[test]
    fn test_assignment_generalized_to_expressions() {
        let source = "bool f() { return true; }\nint main() {\n  int x;\n  bool b;\n  x = 1 < 2;\n  x = f();\n  b = x == 3;\n  x = -x * 2;\n  return 0;\n}";
        assert_eq!(
            check(source),
            vec![
                "Variable 'x' type mismatch on line 5",
                "Variable 'x' type mismatch on line 6",
            ]
        );
    }

    #[test]
    fn test_matching_assignment_is_clean() {
        let source = "int main() {\n  int x;\n  bool b;\n  x = 4;\n  b = !false && true;\n  return x;\n}";
        assert!(check(source).is_empty());
    }

    #[test]
    fn test_condition_must_be_bool() {
        let source = "int main() {\n  if (1) { }\n  while (0 + 1) { }\n  if (1 < 2) { } else { }\n  return 0;\n}";
        assert_eq!(
            check(source),
            vec![
                "Condition must be a boolean type on line 2",
                "Condition must be a boolean type on line 3",
            ]
        );
    }

    #[test]
    fn test_return_type_mismatch() {
        let source = "int main() {\n  return true;\n}\nvoid f() {\n  return;\n}\nbool g() {\n  return;\n}";
        assert_eq!(
            check(source),
            vec![
                "Return type on line 2 does not match function return type",
                "Return type on line 8 does not match function return type",
            ]
        );
    }

    #[test]
    fn test_return_type_scoped_per_function() {
        let source = "bool f() { return true; }\nint main() { return 0; }\nvoid g() { return; }";
        assert!(check(source).is_empty());
    }

    #[test]
    fn test_operator_operand_types() {
        let source = "int main() {\n  int x;\n  x = 1 + true;\n  x = -false;\n  return 0;\n}";
        assert_eq!(
            check(source),
            vec![
                "Type mismatch: int expected but bool found on line 3",
                "Type mismatch: int expected but bool found on line 4",
            ]
        );
    }

    #[test]
    fn test_equality_requires_same_types() {
        let source = "int main() {\n  if (1 == true) { }\n  return 0;\n}";
        assert_eq!(check(source), vec!["Type mismatch: int expected but bool found on line 2"]);
    }

    #[test]
    fn test_call_checks() {
        let source = "int add(int a, int b) { return a + b; }\nint v;\nint main() {\n  v = add(1);\n  v = add(1, true);\n  v = v(2);\n  print_str(\"ok\");\n  print_int(\"no\");\n  return 0;\n}";
        assert_eq!(
            check(source),
            vec![
                "Invalid number of function arguments on line 4",
                "Type mismatch in parameter 1 of call to 'add': expected int but found bool on line 5",
                "Invalid call to non-function 'v' on line 6",
                "Type mismatch in parameter 0 of call to 'print_int': expected int but found str on line 8",
            ]
        );
    }

    #[test]
    fn test_equality_rejects_void_operands() {
        let source = "int main() {\n  bool b;\n  b = print_int(1) == print_int(2);\n  b = 1 != print_bool(true);\n  return 0;\n}";
        assert_eq!(
            check(source),
            vec![
                "Type mismatch: non-void expected but void found on line 3",
                "Type mismatch: non-void expected but void found on line 3",
                "Type mismatch: non-void expected but void found on line 4",
            ]
        );
    }

    #[test]
    fn test_call_to_undefined_function() {
        let source = "int main() {\n  foo(1);\n  return 0;\n}";
        assert_eq!(check(source), vec!["Symbol 'foo' undefined on line 2"]);
    }

    // --- control flow --------------------------------------------------------

    #[test]
    fn test_break_outside_loop() {
        let errors = check("int main() { break; }");
        assert_eq!(errors, vec!["Break on line 1 can not exist outside of a loop"]);
        assert_eq!(count(&errors, "type mismatch"), 0);
    }

    #[test]
    fn test_continue_outside_loop() {
        let source = "int main() {\n  if (true) { continue; }\n  return 0;\n}";
        assert_eq!(check(source), vec!["Break on line 2 can not exist outside of a loop"]);
        assert_eq!(check("int main() { continue; }"), vec!["Break on line 1 can not exist outside of a loop"]);
    }

    #[test]
    fn test_break_inside_nested_loop_constructs() {
        let source = "int main() {\n  while (true) {\n    if (true) { break; }\n    { continue; }\n  }\n  return 0;\n}";
        assert!(check(source).is_empty());
    }

    #[test]
    fn test_loop_depth_resets_after_loop() {
        let source = "int main() {\n  while (true) { break; }\n  break;\n  return 0;\n}";
        assert_eq!(check(source), vec!["Break on line 3 can not exist outside of a loop"]);
    }

    // --- whole-pass properties -----------------------------------------------

    #[test]
    fn test_errors_accumulate_across_rules() {
        let source = "void v;\nint f() {\n  break;\n  return true;\n}\nint main() {\n  int x;\n  x = y;\n  if (x) { }\n  return 0;\n}";
        assert_eq!(
            check(source),
            vec![
                "Void variable 'v' on line 1",
                "Break on line 3 can not exist outside of a loop",
                "Return type on line 4 does not match function return type",
                "Symbol 'y' undefined on line 8",
                "Condition must be a boolean type on line 9",
            ]
        );
    }

    #[test]
    fn test_expressions_are_annotated() {
        let (program, symbols) = prepare("int main() {\n  bool b;\n  b = 1 < 2;\n  return 0;\n}");
        assert!(analyze(Some(&program), &symbols).is_empty());

        let StmtKind::Assign { target, value } = &program.functions[0].body.statements[0].kind else {
            panic!("expected assignment");
        };
        assert_eq!(target.inferred_type(), Some(DecafType::Bool));
        assert_eq!(value.inferred_type(), Some(DecafType::Bool));
        let ExprKind::Binary { left, .. } = &value.kind else {
            panic!("expected binary expression");
        };
        assert_eq!(left.inferred_type(), Some(DecafType::Int));
    }

    #[test]
    fn test_analysis_is_idempotent() {
        let (program, symbols) = prepare("int main() {\n  int x;\n  x = true;\n  break;\n  return z;\n}");
        let first = analyze(Some(&program), &symbols);
        let second = analyze(Some(&program), &symbols);
        assert_eq!(first, second);
        assert_eq!(first.len(), 3);
    }

    #[test]
    fn test_absent_tree_yields_no_errors() {
        assert!(analyze(None, &SymbolTables::new()).is_empty());
    }
}
