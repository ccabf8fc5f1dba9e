use crate::ops::{AugmentedAssignOp, BinaryOp, LogicalOp, RelationalOp, UnaryOp};
use crate::types::TypeName;
use ccc_source::Location;
use serde::{Deserialize, Serialize};
use std::{fmt, mem};

/// A literal value. The variant determines the literal's type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Literal {
    Bool(bool),
    Char(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
}

impl Literal {
    /// The intrinsic type of the literal.
    pub fn ty(&self) -> TypeName {
        match self {
            Literal::Bool(_) => TypeName::Bool,
            Literal::Char(_) => TypeName::Char,
            Literal::Short(_) => TypeName::Short,
            Literal::Int(_) => TypeName::Int,
            Literal::Long(_) => TypeName::Long,
            Literal::Float(_) => TypeName::Float,
            Literal::Double(_) => TypeName::Double,
        }
    }

    /// C truthiness: anything that does not compare equal to zero is true.
    pub fn is_truthy(&self) -> bool {
        match *self {
            Literal::Bool(val) => val,
            Literal::Char(val) => val != 0,
            Literal::Short(val) => val != 0,
            Literal::Int(val) => val != 0,
            Literal::Long(val) => val != 0,
            Literal::Float(val) => val != 0.0,
            Literal::Double(val) => val != 0.0,
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Bool(val) => write!(f, "{}", val),
            Literal::Char(val) => write!(f, "{}", val),
            Literal::Short(val) => write!(f, "{}", val),
            Literal::Int(val) => write!(f, "{}", val),
            Literal::Long(val) => write!(f, "{}", val),
            Literal::Float(val) => write!(f, "{:?}", val),
            Literal::Double(val) => write!(f, "{:?}", val),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExprKind {
    Literal(Literal),
    /// A reference to a variable (e.g. `foo`).
    Variable(String),
    /// An arithmetic expression (e.g. `1 + 1`).
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    /// `&&` and `||`.
    Logical {
        op: LogicalOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    /// A comparison (e.g. `a <= b`).
    Relational {
        op: RelationalOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    /// `cond ? then_expr : else_expr`
    Ternary {
        cond: Box<Expr>,
        then_expr: Box<Expr>,
        else_expr: Box<Expr>,
    },
    /// `(target) operand`
    Cast {
        target: TypeName,
        operand: Box<Expr>,
    },
    Call {
        callee: String,
        args: Vec<Expr>,
    },
}

/// An expression node.
///
/// `ty` and `is_constant` are written by semantic analysis. Before that `ty` is `None` and
/// `is_constant` carries no meaning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expr {
    pub kind: ExprKind,
    #[serde(default)]
    pub loc: Location,
    #[serde(default)]
    pub ty: Option<TypeName>,
    #[serde(default)]
    pub is_constant: bool,
}

impl Expr {
    /// Create an unchecked expression.
    pub fn new(kind: ExprKind, loc: Location) -> Self {
        Self {
            kind,
            loc,
            ty: None,
            is_constant: false,
        }
    }

    /// Create an already annotated literal expression.
    pub fn literal(literal: Literal, loc: Location) -> Self {
        Self {
            ty: Some(literal.ty()),
            is_constant: true,
            kind: ExprKind::Literal(literal),
            loc,
        }
    }

    /// Returns the literal value if this expression is a literal.
    pub fn as_literal(&self) -> Option<Literal> {
        match self.kind {
            ExprKind::Literal(literal) => Some(literal),
            _ => None,
        }
    }

    /// Moves the expression out, leaving a `false` literal in its place.
    /// Used when a node is replaced by one of its own children.
    pub fn take(&mut self) -> Expr {
        let loc = self.loc;
        mem::replace(self, Expr::literal(Literal::Bool(false), loc))
    }
}

/// A variable (or parameter) declaration: `int x`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Declaration {
    pub name: String,
    pub ty: TypeName,
    #[serde(default)]
    pub loc: Location,
}

/// An ordered sequence of statements. Opens a new scope.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    #[serde(default)]
    pub loc: Location,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StmtKind {
    Declaration(Declaration),
    /// `int x = init;`
    DeclAndAssign {
        decl: Declaration,
        init: Expr,
    },
    Assignment {
        name: String,
        value: Expr,
    },
    /// `x += value;` and friends.
    AugmentedAssignment {
        op: AugmentedAssignOp,
        name: String,
        value: Expr,
    },
    Block(Block),
    /// There is no `else` in this language.
    If {
        cond: Expr,
        body: Box<Stmt>,
    },
    For {
        init: Option<Box<Stmt>>,
        cond: Option<Expr>,
        update: Option<Box<Stmt>>,
        body: Box<Stmt>,
    },
    While {
        cond: Expr,
        body: Box<Stmt>,
    },
    Break,
    Continue,
    Return(Option<Expr>),
    /// An expression evaluated for its side effects.
    Expr(Expr),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stmt {
    pub kind: StmtKind,
    #[serde(default)]
    pub loc: Location,
}

impl Stmt {
    pub fn new(kind: StmtKind, loc: Location) -> Self {
        Self { kind, loc }
    }

    /// An empty block statement at `loc`.
    pub fn empty_block(loc: Location) -> Self {
        Self::new(
            StmtKind::Block(Block {
                stmts: Vec::new(),
                loc,
            }),
            loc,
        )
    }

    /// Unwraps a block statement into its statements. Any other statement becomes a list of one.
    pub fn into_stmts(self) -> Vec<Stmt> {
        match self.kind {
            StmtKind::Block(block) => block.stmts,
            _ => vec![self],
        }
    }
}

/// A function signature: `int f(int x, float y)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDecl {
    pub name: String,
    pub return_type: TypeName,
    pub params: Vec<Declaration>,
    #[serde(default)]
    pub loc: Location,
}

/// A function declaration together with its body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDef {
    pub decl: FunctionDecl,
    pub body: Block,
    #[serde(default)]
    pub loc: Location,
}

/// A top level item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Item {
    /// A prototype without a body.
    Declaration(FunctionDecl),
    Definition(FunctionDef),
}

impl Item {
    /// The function signature of the item.
    pub fn decl(&self) -> &FunctionDecl {
        match self {
            Item::Declaration(decl) => decl,
            Item::Definition(def) => &def.decl,
        }
    }
}

/// The root of the tree: one translation unit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub items: Vec<Item>,
}
