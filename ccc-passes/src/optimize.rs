//! Constant folding and dead branch elimination, iterated to a fixpoint.
//!
//! Expects a tree that passed semantic analysis: the rewrites rely on the expression annotations.

use crate::fold;
use ccc_ast::ast::{Block, Expr, ExprKind, FunctionDef, Item, Literal, Program, Stmt, StmtKind};
use ccc_ast::ops::BinaryOp;
use std::mem;
use tracing::{debug, trace, warn};

/// What the enclosing block should do with a statement after it was visited.
#[derive(Debug, Clone, PartialEq)]
pub enum Rewrite {
    Unchanged,
    /// Replace the statement with another one.
    Replace(Stmt),
    /// Delete the statement.
    Remove,
    /// Delete the statement and insert these statements at its position.
    Splice(Vec<Stmt>),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OptimizeStats {
    /// Number of sweeps run, including the final sweep that changed nothing.
    pub sweeps: usize,
    /// Total number of rewrites applied.
    pub rewrites: usize,
}

/// Fixpoint optimizer.
#[derive(Debug, Default)]
pub struct Optimizer {
    /// Rewrites applied during the current sweep.
    rewrites: usize,
}

impl Optimizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sweeps `program` until a sweep applies no rewrite.
    pub fn run(&mut self, program: &mut Program) -> OptimizeStats {
        let mut stats = OptimizeStats::default();
        loop {
            let rewrites = self.sweep(program);
            stats.sweeps += 1;
            stats.rewrites += rewrites;
            debug!(sweep = stats.sweeps, rewrites, "optimizer sweep done");
            if rewrites == 0 {
                break;
            }
        }
        stats
    }

    /// Runs a single sweep over every function body. Returns the number of rewrites applied.
    ///
    /// Each block applies at most one removal or splice per sweep.
    pub fn sweep(&mut self, program: &mut Program) -> usize {
        self.rewrites = 0;
        for item in &mut program.items {
            if let Item::Definition(FunctionDef { body, .. }) = item {
                self.optimize_block(body);
            }
        }
        self.rewrites
    }

    fn optimize_block(&mut self, block: &mut Block) {
        let mut pending = None;
        for (index, stmt) in block.stmts.iter_mut().enumerate() {
            match self.optimize_stmt(stmt) {
                Rewrite::Unchanged => {}
                Rewrite::Replace(new) => {
                    *stmt = new;
                    self.rewrites += 1;
                }
                edit => {
                    pending = Some((index, edit));
                    break;
                }
            }
        }

        if let Some((index, edit)) = pending {
            self.rewrites += 1;
            match edit {
                Rewrite::Splice(stmts) => {
                    block.stmts.splice(index..=index, stmts);
                }
                _ => {
                    block.stmts.remove(index);
                }
            }
        }
    }

    /// Optimizes a statement that is not directly inside a block, such as the body of a loop.
    /// A removed statement becomes an empty block and spliced statements are wrapped in a block.
    fn optimize_nested(&mut self, stmt: &mut Stmt) {
        let loc = stmt.loc;
        let new = match self.optimize_stmt(stmt) {
            Rewrite::Unchanged => return,
            Rewrite::Replace(new) => new,
            Rewrite::Remove => Stmt::empty_block(loc),
            Rewrite::Splice(stmts) => Stmt::new(StmtKind::Block(Block { stmts, loc }), loc),
        };
        *stmt = new;
        self.rewrites += 1;
    }

    fn optimize_stmt(&mut self, stmt: &mut Stmt) -> Rewrite {
        let loc = stmt.loc;
        match &mut stmt.kind {
            StmtKind::Declaration(_) | StmtKind::Break | StmtKind::Continue | StmtKind::Return(None) => {}
            StmtKind::DeclAndAssign { init: value, .. }
            | StmtKind::Assignment { value, .. }
            | StmtKind::AugmentedAssignment { value, .. }
            | StmtKind::Return(Some(value))
            | StmtKind::Expr(value) => self.rewrite_expr(value),
            StmtKind::Block(block) => self.optimize_block(block),
            StmtKind::If { cond, body } => {
                self.rewrite_expr(cond);
                match cond.as_literal() {
                    Some(Literal::Bool(true)) => {
                        trace!(%loc, "splicing body of if (true)");
                        let body = mem::replace(body, Box::new(Stmt::empty_block(loc)));
                        return Rewrite::Splice(body.into_stmts());
                    }
                    Some(Literal::Bool(false)) => {
                        trace!(%loc, "removing if (false)");
                        return Rewrite::Remove;
                    }
                    _ => self.optimize_nested(body),
                }
            }
            StmtKind::While { cond, body } => {
                self.rewrite_expr(cond);
                if cond.as_literal() == Some(Literal::Bool(false)) {
                    trace!(%loc, "removing while (false)");
                    return Rewrite::Remove;
                }
                self.optimize_nested(body);
            }
            StmtKind::For {
                init,
                cond,
                update,
                body,
            } => {
                if let Some(cond) = cond {
                    self.rewrite_expr(cond);
                    if cond.as_literal() == Some(Literal::Bool(false)) {
                        // Only the initializer still runs. Keep it in a block so its declarations stay scoped.
                        trace!(%loc, "removing for loop with a false condition");
                        let stmts = init.take().map(|init| vec![*init]).unwrap_or_default();
                        return Rewrite::Replace(Stmt::new(StmtKind::Block(Block { stmts, loc }), loc));
                    }
                }
                if let Some(init) = init {
                    self.optimize_nested(init);
                }
                if let Some(update) = update {
                    self.optimize_nested(update);
                }
                self.optimize_nested(body);
            }
        }
        Rewrite::Unchanged
    }

    /// Optimizes `expr` in place.
    fn rewrite_expr(&mut self, expr: &mut Expr) {
        if let Some(new) = self.optimize_expr(expr) {
            trace!(loc = %expr.loc, "folded expression");
            *expr = new;
            self.rewrites += 1;
        }
    }

    /// Optimizes the children of `expr` and returns a replacement for `expr` itself, if any.
    fn optimize_expr(&mut self, expr: &mut Expr) -> Option<Expr> {
        let loc = expr.loc;
        let ty = expr.ty;
        let folded = match &mut expr.kind {
            ExprKind::Literal(_) | ExprKind::Variable(_) => None,
            ExprKind::Call { args, .. } => {
                for arg in args {
                    self.rewrite_expr(arg);
                }
                None
            }
            ExprKind::Binary { op, lhs, rhs } => {
                self.rewrite_expr(lhs);
                self.rewrite_expr(rhs);
                let (lhs, rhs) = (lhs.as_literal()?, rhs.as_literal()?);
                let folded = fold::fold_binary(*op, lhs, rhs);
                if folded.is_none() && matches!(op, BinaryOp::Div | BinaryOp::Rem) {
                    warn!(%loc, "not folding `{} {} {}`: division by zero or overflow", lhs, op, rhs);
                }
                folded
            }
            ExprKind::Logical { op, lhs, rhs } => {
                self.rewrite_expr(lhs);
                self.rewrite_expr(rhs);
                Some(fold::fold_logical(*op, lhs.as_literal()?, rhs.as_literal()?))
            }
            ExprKind::Relational { op, lhs, rhs } => {
                self.rewrite_expr(lhs);
                self.rewrite_expr(rhs);
                fold::fold_relational(*op, lhs.as_literal()?, rhs.as_literal()?)
            }
            ExprKind::Unary { op, operand } => {
                self.rewrite_expr(operand);
                fold::fold_unary(*op, operand.as_literal()?)
            }
            ExprKind::Cast { target, operand } => {
                self.rewrite_expr(operand);
                if operand.ty == Some(*target) {
                    return Some(operand.take());
                }
                fold::fold_cast(*target, operand.as_literal()?)
            }
            ExprKind::Ternary {
                cond,
                then_expr,
                else_expr,
            } => {
                self.rewrite_expr(cond);
                self.rewrite_expr(then_expr);
                self.rewrite_expr(else_expr);
                return match cond.as_literal()? {
                    Literal::Bool(true) => Some(then_expr.take()),
                    Literal::Bool(false) => Some(else_expr.take()),
                    _ => None,
                };
            }
        };

        let literal = folded?;
        // Never change the type of a node.
        if ty.is_some() && ty != Some(literal.ty()) {
            return None;
        }
        Some(Expr::literal(literal, loc))
    }
}

/// Runs the optimizer on `program` until nothing changes.
pub fn optimize(program: &mut Program) -> OptimizeStats {
    Optimizer::new().run(program)
}
