//! Compile time evaluation of operators over literals.
//!
//! Integer arithmetic wraps. Integer division and remainder only fold when the checked operation
//! succeeds, so a zero divisor (or `MIN / -1`) is left for run time.

use ccc_ast::ast::Literal;
use ccc_ast::ops::{BinaryOp, LogicalOp, RelationalOp, UnaryOp};
use ccc_ast::types::TypeName;
use num_traits::{CheckedDiv, CheckedRem, Float, NumCast, PrimInt, WrappingAdd, WrappingMul, WrappingSub};

/// Evaluates an integer operator. Returns `None` if the result is undefined.
pub fn fold_int<T>(op: BinaryOp, lhs: T, rhs: T) -> Option<T>
where
    T: PrimInt + WrappingAdd + WrappingSub + WrappingMul + CheckedDiv + CheckedRem,
{
    match op {
        BinaryOp::Add => Some(lhs.wrapping_add(&rhs)),
        BinaryOp::Sub => Some(lhs.wrapping_sub(&rhs)),
        BinaryOp::Mul => Some(lhs.wrapping_mul(&rhs)),
        BinaryOp::Div => CheckedDiv::checked_div(&lhs, &rhs),
        BinaryOp::Rem => CheckedRem::checked_rem(&lhs, &rhs),
    }
}

/// Evaluates a floating point operator with IEEE semantics.
pub fn fold_float<T: Float>(op: BinaryOp, lhs: T, rhs: T) -> T {
    match op {
        BinaryOp::Add => lhs + rhs,
        BinaryOp::Sub => lhs - rhs,
        BinaryOp::Mul => lhs * rhs,
        BinaryOp::Div => lhs / rhs,
        BinaryOp::Rem => lhs % rhs,
    }
}

pub fn compare<T: PartialOrd>(op: RelationalOp, lhs: T, rhs: T) -> bool {
    match op {
        RelationalOp::Eq => lhs == rhs,
        RelationalOp::Ne => lhs != rhs,
        RelationalOp::Lt => lhs < rhs,
        RelationalOp::Gt => lhs > rhs,
        RelationalOp::Le => lhs <= rhs,
        RelationalOp::Ge => lhs >= rhs,
    }
}

fn negate_int<T: PrimInt + WrappingSub>(val: T) -> T {
    T::zero().wrapping_sub(&val)
}

/// Folds `lhs op rhs`. Both literals must be of the same numeric type.
pub fn fold_binary(op: BinaryOp, lhs: Literal, rhs: Literal) -> Option<Literal> {
    match (lhs, rhs) {
        (Literal::Char(a), Literal::Char(b)) => fold_int(op, a, b).map(Literal::Char),
        (Literal::Short(a), Literal::Short(b)) => fold_int(op, a, b).map(Literal::Short),
        (Literal::Int(a), Literal::Int(b)) => fold_int(op, a, b).map(Literal::Int),
        (Literal::Long(a), Literal::Long(b)) => fold_int(op, a, b).map(Literal::Long),
        (Literal::Float(a), Literal::Float(b)) => Some(Literal::Float(fold_float(op, a, b))),
        (Literal::Double(a), Literal::Double(b)) => Some(Literal::Double(fold_float(op, a, b))),
        _ => None,
    }
}

/// Folds a comparison. Both literals must be of the same type.
pub fn fold_relational(op: RelationalOp, lhs: Literal, rhs: Literal) -> Option<Literal> {
    let result = match (lhs, rhs) {
        (Literal::Bool(a), Literal::Bool(b)) => compare(op, a, b),
        (Literal::Char(a), Literal::Char(b)) => compare(op, a, b),
        (Literal::Short(a), Literal::Short(b)) => compare(op, a, b),
        (Literal::Int(a), Literal::Int(b)) => compare(op, a, b),
        (Literal::Long(a), Literal::Long(b)) => compare(op, a, b),
        (Literal::Float(a), Literal::Float(b)) => compare(op, a, b),
        (Literal::Double(a), Literal::Double(b)) => compare(op, a, b),
        _ => return None,
    };
    Some(Literal::Bool(result))
}

/// `&&` and `||` over the truthiness of both operands.
pub fn fold_logical(op: LogicalOp, lhs: Literal, rhs: Literal) -> Literal {
    let (a, b) = (lhs.is_truthy(), rhs.is_truthy());
    Literal::Bool(match op {
        LogicalOp::And => a && b,
        LogicalOp::Or => a || b,
    })
}

pub fn fold_unary(op: UnaryOp, operand: Literal) -> Option<Literal> {
    match (op, operand) {
        (UnaryOp::Not, Literal::Bool(val)) => Some(Literal::Bool(!val)),
        (UnaryOp::Neg, Literal::Char(val)) => Some(Literal::Char(negate_int(val))),
        (UnaryOp::Neg, Literal::Short(val)) => Some(Literal::Short(negate_int(val))),
        (UnaryOp::Neg, Literal::Int(val)) => Some(Literal::Int(negate_int(val))),
        (UnaryOp::Neg, Literal::Long(val)) => Some(Literal::Long(negate_int(val))),
        (UnaryOp::Neg, Literal::Float(val)) => Some(Literal::Float(-val)),
        (UnaryOp::Neg, Literal::Double(val)) => Some(Literal::Double(-val)),
        _ => None,
    }
}

fn cast_literal<T: NumCast>(operand: Literal) -> Option<T> {
    match operand {
        Literal::Bool(_) => None,
        Literal::Char(val) => T::from(val),
        Literal::Short(val) => T::from(val),
        Literal::Int(val) => T::from(val),
        Literal::Long(val) => T::from(val),
        Literal::Float(val) => T::from(val),
        Literal::Double(val) => T::from(val),
    }
}

/// Converts `operand` to `target`. Floats are truncated toward zero.
/// Returns `None` when the value does not fit the target (e.g. a float out of `int` range).
pub fn fold_cast(target: TypeName, operand: Literal) -> Option<Literal> {
    match target {
        TypeName::Int => cast_literal(operand).map(Literal::Int),
        TypeName::Float => cast_literal(operand).map(Literal::Float),
        _ => None,
    }
}
