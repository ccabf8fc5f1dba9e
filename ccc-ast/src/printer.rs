//! AST pretty printer. One node per line, children indented below their parent.

use crate::ast::{Block, Expr, ExprKind, FunctionDecl, Item, Program, Stmt, StmtKind};
use crate::visitor::{walk_expr, walk_stmt, Visitor};
use ccc_source::Location;
use std::fmt;

const INDENT: &str = "  ";

#[derive(Debug, Default)]
pub struct AstPrinter {
    out: String,
    depth: usize,
}

impl AstPrinter {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.out
    }

    fn line(&mut self, text: &str, loc: Location) {
        for _ in 0..self.depth {
            self.out.push_str(INDENT);
        }
        self.out.push_str(text);
        if loc != Location::default() {
            self.out.push_str(&format!(" {}", loc));
        }
        self.out.push('\n');
    }

    fn nested(&mut self, f: impl FnOnce(&mut Self)) {
        self.depth += 1;
        f(self);
        self.depth -= 1;
    }
}

fn signature(decl: &FunctionDecl) -> String {
    let params = decl
        .params
        .iter()
        .map(|param| format!("{} {}", param.ty, param.name))
        .collect::<Vec<_>>()
        .join(", ");
    format!("{} {}({})", decl.return_type, decl.name, params)
}

impl<'ast> Visitor<'ast> for AstPrinter {
    fn visit_item(&mut self, item: &'ast Item) {
        match item {
            Item::Declaration(decl) => {
                self.line(&format!("FunctionDecl {}", signature(decl)), decl.loc);
            }
            Item::Definition(def) => {
                self.line(&format!("FunctionDef {}", signature(&def.decl)), def.loc);
                self.nested(|this| this.visit_block(&def.body));
            }
        }
    }

    fn visit_block(&mut self, block: &'ast Block) {
        self.line("Block", block.loc);
        self.nested(|this| {
            for stmt in &block.stmts {
                this.visit_stmt(stmt);
            }
        });
    }

    fn visit_stmt(&mut self, stmt: &'ast Stmt) {
        let label = match &stmt.kind {
            StmtKind::Block(block) => {
                self.visit_block(block);
                return;
            }
            StmtKind::Declaration(decl) => format!("Declaration {} {}", decl.ty, decl.name),
            StmtKind::DeclAndAssign { decl, .. } => {
                format!("DeclAndAssign {} {}", decl.ty, decl.name)
            }
            StmtKind::Assignment { name, .. } => format!("Assignment {}", name),
            StmtKind::AugmentedAssignment { op, name, .. } => {
                format!("AugmentedAssignment {} {}", name, op)
            }
            StmtKind::If { .. } => "If".to_string(),
            StmtKind::For { .. } => "For".to_string(),
            StmtKind::While { .. } => "While".to_string(),
            StmtKind::Break => "Break".to_string(),
            StmtKind::Continue => "Continue".to_string(),
            StmtKind::Return(_) => "Return".to_string(),
            StmtKind::Expr(_) => "ExprStmt".to_string(),
        };
        self.line(&label, stmt.loc);
        self.nested(|this| walk_stmt(this, stmt));
    }

    fn visit_expr(&mut self, expr: &'ast Expr) {
        let mut label = match &expr.kind {
            ExprKind::Literal(literal) => format!("Literal {}", literal),
            ExprKind::Variable(name) => format!("Variable {}", name),
            ExprKind::Binary { op, .. } => format!("Binary {}", op),
            ExprKind::Logical { op, .. } => format!("Logical {}", op),
            ExprKind::Relational { op, .. } => format!("Relational {}", op),
            ExprKind::Unary { op, .. } => format!("Unary {}", op),
            ExprKind::Ternary { .. } => "Ternary".to_string(),
            ExprKind::Cast { target, .. } => format!("Cast {}", target),
            ExprKind::Call { callee, .. } => format!("Call {}", callee),
        };
        if let Some(ty) = expr.ty {
            label.push_str(&format!(" : {}", ty));
            if expr.is_constant {
                label.push_str(" const");
            }
        }
        self.line(&label, expr.loc);
        self.nested(|this| walk_expr(this, expr));
    }
}

/// Renders `program` as an indented tree.
pub fn print_program(program: &Program) -> String {
    let mut printer = AstPrinter::new();
    printer.visit_program(program);
    printer.into_string()
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&print_program(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Literal;
    use crate::builder::*;
    use crate::types::TypeName::*;

    #[test]
    fn prints_tree() {
        let program = program(vec![
            proto(Void, "putint", vec![param(Int, "n")]),
            func(
                Int,
                "main",
                vec![param(Int, "a")],
                vec![
                    decl_assign(Int, "x", add(int(1), var("a"))).at(2, 5),
                    if_(lt(var("x"), int(3)), vec![ret(var("x"))]),
                    ret(int(0)),
                ],
            )
            .at(1, 1),
        ]);

        insta::assert_snapshot!(print_program(&program), @r###"
        FunctionDecl void putint(int n)
        FunctionDef int main(int a) (1, 1)
          Block
            DeclAndAssign int x (2, 5)
              Binary +
                Literal 1
                Variable a
            If
              Relational <
                Variable x
                Literal 3
              Block
                Return
                  Variable x
            Return
              Literal 0
        "###);
    }

    #[test]
    fn prints_annotations() {
        let program = program(vec![func(
            Int,
            "main",
            vec![],
            vec![ret(Expr::literal(Literal::Int(7), Location::new(1, 21)))],
        )]);

        insta::assert_snapshot!(program.to_string(), @r###"
        FunctionDef int main()
          Block
            Return
              Literal 7 : int const (1, 21)
        "###);
    }
}
