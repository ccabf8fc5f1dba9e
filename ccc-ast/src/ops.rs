//! Operator tags.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogicalOp {
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationalOp {
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
}

impl RelationalOp {
    /// `<`, `>`, `<=` and `>=`.
    pub fn is_ordering(self) -> bool {
        !matches!(self, RelationalOp::Eq | RelationalOp::Ne)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnaryOp {
    Neg,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AugmentedAssignOp {
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
}

impl AugmentedAssignOp {
    /// The arithmetic operator applied before storing back. `x += e` is `x = x + e`.
    pub fn binary_op(self) -> BinaryOp {
        match self {
            AugmentedAssignOp::AddAssign => BinaryOp::Add,
            AugmentedAssignOp::SubAssign => BinaryOp::Sub,
            AugmentedAssignOp::MulAssign => BinaryOp::Mul,
            AugmentedAssignOp::DivAssign => BinaryOp::Div,
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
        })
    }
}

impl fmt::Display for LogicalOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LogicalOp::And => "&&",
            LogicalOp::Or => "||",
        })
    }
}

impl fmt::Display for RelationalOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RelationalOp::Eq => "==",
            RelationalOp::Ne => "!=",
            RelationalOp::Lt => "<",
            RelationalOp::Gt => ">",
            RelationalOp::Le => "<=",
            RelationalOp::Ge => ">=",
        })
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UnaryOp::Neg => "-",
            UnaryOp::Not => "!",
        })
    }
}

impl fmt::Display for AugmentedAssignOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AugmentedAssignOp::AddAssign => "+=",
            AugmentedAssignOp::SubAssign => "-=",
            AugmentedAssignOp::MulAssign => "*=",
            AugmentedAssignOp::DivAssign => "/=",
        })
    }
}
