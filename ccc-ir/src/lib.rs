//! A small SSA intermediate representation.
//!
//! Functions are lists of basic blocks. Every block ends in exactly one [`Terminator`]. Local
//! variables live in typed stack slots declared at function level; everything else is an SSA value.

pub mod builder;
pub mod display;
pub mod module;
pub mod verify;

pub use builder::{BuildError, Builder};
pub use module::*;
pub use verify::{verify_module, VerifyError};

use std::fmt;

/// A scalar IR type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IrType {
    Void,
    I1,
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
}

impl IrType {
    pub fn is_int(self) -> bool {
        matches!(self, IrType::I1 | IrType::I8 | IrType::I16 | IrType::I32 | IrType::I64)
    }

    pub fn is_float(self) -> bool {
        matches!(self, IrType::F32 | IrType::F64)
    }

    /// The zero value of the type. `None` for `void`.
    pub fn zero(self) -> Option<Constant> {
        Some(match self {
            IrType::Void => return None,
            IrType::I1 => Constant::I1(false),
            IrType::I8 => Constant::I8(0),
            IrType::I16 => Constant::I16(0),
            IrType::I32 => Constant::I32(0),
            IrType::I64 => Constant::I64(0),
            IrType::F32 => Constant::F32(0.0),
            IrType::F64 => Constant::F64(0.0),
        })
    }
}

impl fmt::Display for IrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            IrType::Void => "void",
            IrType::I1 => "i1",
            IrType::I8 => "i8",
            IrType::I16 => "i16",
            IrType::I32 => "i32",
            IrType::I64 => "i64",
            IrType::F32 => "float",
            IrType::F64 => "double",
        })
    }
}

/// A typed constant. Also used by the interpreter as its runtime value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Constant {
    I1(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
}

impl Constant {
    pub fn ty(&self) -> IrType {
        match self {
            Constant::I1(_) => IrType::I1,
            Constant::I8(_) => IrType::I8,
            Constant::I16(_) => IrType::I16,
            Constant::I32(_) => IrType::I32,
            Constant::I64(_) => IrType::I64,
            Constant::F32(_) => IrType::F32,
            Constant::F64(_) => IrType::F64,
        }
    }
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constant::I1(val) => write!(f, "{}", val),
            Constant::I8(val) => write!(f, "{}", val),
            Constant::I16(val) => write!(f, "{}", val),
            Constant::I32(val) => write!(f, "{}", val),
            Constant::I64(val) => write!(f, "{}", val),
            Constant::F32(val) => write!(f, "{:?}", val),
            Constant::F64(val) => write!(f, "{:?}", val),
        }
    }
}

macro_rules! id_type {
    ($(#[$attr:meta])* $name:ident) => {
        $(#[$attr])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub usize);
    };
}

id_type!(
    /// Index of a function in its [`Module`].
    FuncId
);
id_type!(
    /// Index of a basic block in its [`Function`].
    BlockId
);
id_type!(
    /// Index of a stack slot in its [`Function`].
    SlotId
);
id_type!(
    /// Index of an instruction in its [`Function`].
    InstId
);

/// An operand.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Const(Constant),
    /// The result of an instruction.
    Inst(InstId),
    /// A function parameter, by position.
    Arg(usize),
}

impl From<Constant> for Value {
    fn from(constant: Constant) -> Self {
        Value::Const(constant)
    }
}
