//! The fixed set of scalar types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A scalar type. Every checked expression evaluates to exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeName {
    Void,
    Bool,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
}

impl TypeName {
    /// `char`, `short`, `int` and `long`.
    pub fn is_integer(self) -> bool {
        matches!(
            self,
            TypeName::Char | TypeName::Short | TypeName::Int | TypeName::Long
        )
    }

    /// `float` and `double`.
    pub fn is_floating(self) -> bool {
        matches!(self, TypeName::Float | TypeName::Double)
    }

    /// Types that support arithmetic.
    pub fn is_numeric(self) -> bool {
        self.is_integer() || self.is_floating()
    }

    /// The only targets a cast may name.
    pub fn is_cast_target(self) -> bool {
        matches!(self, TypeName::Int | TypeName::Float)
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TypeName::Void => "void",
            TypeName::Bool => "bool",
            TypeName::Char => "char",
            TypeName::Short => "short",
            TypeName::Int => "int",
            TypeName::Long => "long",
            TypeName::Float => "float",
            TypeName::Double => "double",
        };
        f.write_str(name)
    }
}
