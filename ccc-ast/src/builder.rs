//! Terse constructors for building trees by hand.
//!
//! Every node is created at `Location::default()`; use `.at(line, column)` to place it.
//!
//! # Example
//! ```
//! use ccc_ast::builder::*;
//! use ccc_ast::types::TypeName::Int;
//!
//! // int main() { return 1 + 2 * 3; }
//! let program = program(vec![func(
//!     Int,
//!     "main",
//!     vec![],
//!     vec![ret(add(int(1), mul(int(2), int(3))))],
//! )]);
//! assert_eq!(program.items.len(), 1);
//! ```

use crate::ast::*;
use crate::ops::{AugmentedAssignOp, BinaryOp, LogicalOp, RelationalOp, UnaryOp};
use crate::types::TypeName;
use ccc_source::Location;

impl Expr {
    /// Place the expression at `line`, `column`.
    pub fn at(mut self, line: u32, column: u32) -> Self {
        self.loc = Location::new(line, column);
        self
    }
}

impl Stmt {
    /// Place the statement at `line`, `column`. Declarations also move their inner location.
    pub fn at(mut self, line: u32, column: u32) -> Self {
        let loc = Location::new(line, column);
        self.loc = loc;
        match &mut self.kind {
            StmtKind::Declaration(decl) | StmtKind::DeclAndAssign { decl, .. } => decl.loc = loc,
            StmtKind::Block(block) => block.loc = loc,
            _ => {}
        }
        self
    }
}

impl Item {
    /// Place the function (and its signature) at `line`, `column`.
    pub fn at(mut self, line: u32, column: u32) -> Self {
        let loc = Location::new(line, column);
        match &mut self {
            Item::Declaration(decl) => decl.loc = loc,
            Item::Definition(def) => {
                def.loc = loc;
                def.decl.loc = loc;
            }
        }
        self
    }
}

fn expr(kind: ExprKind) -> Expr {
    Expr::new(kind, Location::default())
}

fn stmt(kind: StmtKind) -> Stmt {
    Stmt::new(kind, Location::default())
}

/* Expressions.Literals */

pub fn boolean(val: bool) -> Expr {
    expr(ExprKind::Literal(Literal::Bool(val)))
}

pub fn chr(val: i8) -> Expr {
    expr(ExprKind::Literal(Literal::Char(val)))
}

pub fn short(val: i16) -> Expr {
    expr(ExprKind::Literal(Literal::Short(val)))
}

pub fn int(val: i32) -> Expr {
    expr(ExprKind::Literal(Literal::Int(val)))
}

pub fn long(val: i64) -> Expr {
    expr(ExprKind::Literal(Literal::Long(val)))
}

pub fn float(val: f32) -> Expr {
    expr(ExprKind::Literal(Literal::Float(val)))
}

pub fn double(val: f64) -> Expr {
    expr(ExprKind::Literal(Literal::Double(val)))
}

/* Expressions */

pub fn var(name: &str) -> Expr {
    expr(ExprKind::Variable(name.to_string()))
}

pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Expr {
    expr(ExprKind::Binary {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    })
}

pub fn add(lhs: Expr, rhs: Expr) -> Expr {
    binary(BinaryOp::Add, lhs, rhs)
}

pub fn sub(lhs: Expr, rhs: Expr) -> Expr {
    binary(BinaryOp::Sub, lhs, rhs)
}

pub fn mul(lhs: Expr, rhs: Expr) -> Expr {
    binary(BinaryOp::Mul, lhs, rhs)
}

pub fn div(lhs: Expr, rhs: Expr) -> Expr {
    binary(BinaryOp::Div, lhs, rhs)
}

pub fn rem(lhs: Expr, rhs: Expr) -> Expr {
    binary(BinaryOp::Rem, lhs, rhs)
}

pub fn logical(op: LogicalOp, lhs: Expr, rhs: Expr) -> Expr {
    expr(ExprKind::Logical {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    })
}

pub fn and(lhs: Expr, rhs: Expr) -> Expr {
    logical(LogicalOp::And, lhs, rhs)
}

pub fn or(lhs: Expr, rhs: Expr) -> Expr {
    logical(LogicalOp::Or, lhs, rhs)
}

pub fn relational(op: RelationalOp, lhs: Expr, rhs: Expr) -> Expr {
    expr(ExprKind::Relational {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    })
}

pub fn eq(lhs: Expr, rhs: Expr) -> Expr {
    relational(RelationalOp::Eq, lhs, rhs)
}

pub fn ne(lhs: Expr, rhs: Expr) -> Expr {
    relational(RelationalOp::Ne, lhs, rhs)
}

pub fn lt(lhs: Expr, rhs: Expr) -> Expr {
    relational(RelationalOp::Lt, lhs, rhs)
}

pub fn gt(lhs: Expr, rhs: Expr) -> Expr {
    relational(RelationalOp::Gt, lhs, rhs)
}

pub fn le(lhs: Expr, rhs: Expr) -> Expr {
    relational(RelationalOp::Le, lhs, rhs)
}

pub fn ge(lhs: Expr, rhs: Expr) -> Expr {
    relational(RelationalOp::Ge, lhs, rhs)
}

pub fn neg(operand: Expr) -> Expr {
    expr(ExprKind::Unary {
        op: UnaryOp::Neg,
        operand: Box::new(operand),
    })
}

pub fn not(operand: Expr) -> Expr {
    expr(ExprKind::Unary {
        op: UnaryOp::Not,
        operand: Box::new(operand),
    })
}

pub fn ternary(cond: Expr, then_expr: Expr, else_expr: Expr) -> Expr {
    expr(ExprKind::Ternary {
        cond: Box::new(cond),
        then_expr: Box::new(then_expr),
        else_expr: Box::new(else_expr),
    })
}

pub fn cast(target: TypeName, operand: Expr) -> Expr {
    expr(ExprKind::Cast {
        target,
        operand: Box::new(operand),
    })
}

pub fn call(callee: &str, args: Vec<Expr>) -> Expr {
    expr(ExprKind::Call {
        callee: callee.to_string(),
        args,
    })
}

/* Statements */

/// A declaration without a location; used for parameters and `decl`.
pub fn param(ty: TypeName, name: &str) -> Declaration {
    Declaration {
        name: name.to_string(),
        ty,
        loc: Location::default(),
    }
}

pub fn decl(ty: TypeName, name: &str) -> Stmt {
    stmt(StmtKind::Declaration(param(ty, name)))
}

pub fn decl_assign(ty: TypeName, name: &str, init: Expr) -> Stmt {
    stmt(StmtKind::DeclAndAssign {
        decl: param(ty, name),
        init,
    })
}

pub fn assign(name: &str, value: Expr) -> Stmt {
    stmt(StmtKind::Assignment {
        name: name.to_string(),
        value,
    })
}

pub fn aug_assign(op: AugmentedAssignOp, name: &str, value: Expr) -> Stmt {
    stmt(StmtKind::AugmentedAssignment {
        op,
        name: name.to_string(),
        value,
    })
}

pub fn block(stmts: Vec<Stmt>) -> Stmt {
    stmt(StmtKind::Block(Block {
        stmts,
        loc: Location::default(),
    }))
}

/// `if (cond) { body }`
pub fn if_(cond: Expr, body: Vec<Stmt>) -> Stmt {
    stmt(StmtKind::If {
        cond,
        body: Box::new(block(body)),
    })
}

/// `while (cond) { body }`
pub fn while_(cond: Expr, body: Vec<Stmt>) -> Stmt {
    stmt(StmtKind::While {
        cond,
        body: Box::new(block(body)),
    })
}

/// `for (init; cond; update) { body }`
pub fn for_(init: Option<Stmt>, cond: Option<Expr>, update: Option<Stmt>, body: Vec<Stmt>) -> Stmt {
    stmt(StmtKind::For {
        init: init.map(Box::new),
        cond,
        update: update.map(Box::new),
        body: Box::new(block(body)),
    })
}

pub fn brk() -> Stmt {
    stmt(StmtKind::Break)
}

pub fn cont() -> Stmt {
    stmt(StmtKind::Continue)
}

pub fn ret(value: Expr) -> Stmt {
    stmt(StmtKind::Return(Some(value)))
}

pub fn ret_void() -> Stmt {
    stmt(StmtKind::Return(None))
}

pub fn expr_stmt(value: Expr) -> Stmt {
    stmt(StmtKind::Expr(value))
}

/* Items */

/// A function definition.
pub fn func(return_type: TypeName, name: &str, params: Vec<Declaration>, body: Vec<Stmt>) -> Item {
    Item::Definition(FunctionDef {
        decl: FunctionDecl {
            name: name.to_string(),
            return_type,
            params,
            loc: Location::default(),
        },
        body: Block {
            stmts: body,
            loc: Location::default(),
        },
        loc: Location::default(),
    })
}

/// A function prototype.
pub fn proto(return_type: TypeName, name: &str, params: Vec<Declaration>) -> Item {
    Item::Declaration(FunctionDecl {
        name: name.to_string(),
        return_type,
        params,
        loc: Location::default(),
    })
}

pub fn program(items: Vec<Item>) -> Program {
    Program { items }
}
