//! Visitor pattern for AST nodes.

use crate::ast::{Block, Expr, ExprKind, FunctionDecl, Item, Program, Stmt, StmtKind};

pub trait Visitor<'ast>: Sized {
    fn visit_program(&mut self, program: &'ast Program) {
        walk_program(self, program);
    }
    fn visit_item(&mut self, item: &'ast Item) {
        walk_item(self, item);
    }
    fn visit_function_decl(&mut self, _decl: &'ast FunctionDecl) {}
    fn visit_block(&mut self, block: &'ast Block) {
        walk_block(self, block);
    }
    fn visit_stmt(&mut self, stmt: &'ast Stmt) {
        walk_stmt(self, stmt);
    }
    fn visit_expr(&mut self, expr: &'ast Expr) {
        walk_expr(self, expr);
    }
}

pub fn walk_program<'ast>(visitor: &mut impl Visitor<'ast>, program: &'ast Program) {
    for item in &program.items {
        visitor.visit_item(item);
    }
}

pub fn walk_item<'ast>(visitor: &mut impl Visitor<'ast>, item: &'ast Item) {
    match item {
        Item::Declaration(decl) => visitor.visit_function_decl(decl),
        Item::Definition(def) => {
            visitor.visit_function_decl(&def.decl);
            visitor.visit_block(&def.body);
        }
    }
}

pub fn walk_block<'ast>(visitor: &mut impl Visitor<'ast>, block: &'ast Block) {
    for stmt in &block.stmts {
        visitor.visit_stmt(stmt);
    }
}

pub fn walk_expr<'ast>(visitor: &mut impl Visitor<'ast>, expr: &'ast Expr) {
    match &expr.kind {
        ExprKind::Literal(_) => {}
        ExprKind::Variable(_) => {}
        ExprKind::Binary { op: _, lhs, rhs }
        | ExprKind::Logical { op: _, lhs, rhs }
        | ExprKind::Relational { op: _, lhs, rhs } => {
            visitor.visit_expr(lhs);
            visitor.visit_expr(rhs);
        }
        ExprKind::Unary { op: _, operand } => visitor.visit_expr(operand),
        ExprKind::Ternary {
            cond,
            then_expr,
            else_expr,
        } => {
            visitor.visit_expr(cond);
            visitor.visit_expr(then_expr);
            visitor.visit_expr(else_expr);
        }
        ExprKind::Cast { target: _, operand } => visitor.visit_expr(operand),
        ExprKind::Call { callee: _, args } => {
            for arg in args {
                visitor.visit_expr(arg);
            }
        }
    }
}

pub fn walk_stmt<'ast>(visitor: &mut impl Visitor<'ast>, stmt: &'ast Stmt) {
    match &stmt.kind {
        StmtKind::Declaration(_) => {}
        StmtKind::DeclAndAssign { decl: _, init } => visitor.visit_expr(init),
        StmtKind::Assignment { name: _, value } => visitor.visit_expr(value),
        StmtKind::AugmentedAssignment {
            op: _,
            name: _,
            value,
        } => visitor.visit_expr(value),
        StmtKind::Block(block) => visitor.visit_block(block),
        StmtKind::If { cond, body } | StmtKind::While { cond, body } => {
            visitor.visit_expr(cond);
            visitor.visit_stmt(body);
        }
        StmtKind::For {
            init,
            cond,
            update,
            body,
        } => {
            if let Some(init) = init {
                visitor.visit_stmt(init);
            }
            if let Some(cond) = cond {
                visitor.visit_expr(cond);
            }
            if let Some(update) = update {
                visitor.visit_stmt(update);
            }
            visitor.visit_stmt(body);
        }
        StmtKind::Break | StmtKind::Continue => {}
        StmtKind::Return(expr) => {
            if let Some(expr) = expr {
                visitor.visit_expr(expr);
            }
        }
        StmtKind::Expr(expr) => visitor.visit_expr(expr),
    }
}

/// Counts statement and expression nodes.
#[derive(Debug, Default)]
pub struct NodeCounter {
    pub stmts: usize,
    pub exprs: usize,
}

impl<'ast> Visitor<'ast> for NodeCounter {
    fn visit_stmt(&mut self, stmt: &'ast Stmt) {
        self.stmts += 1;
        walk_stmt(self, stmt);
    }

    fn visit_expr(&mut self, expr: &'ast Expr) {
        self.exprs += 1;
        walk_expr(self, expr);
    }
}

/// Returns the total number of statement and expression nodes in `program`.
pub fn count_nodes(program: &Program) -> usize {
    let mut counter = NodeCounter::default();
    counter.visit_program(program);
    counter.stmts + counter.exprs
}
