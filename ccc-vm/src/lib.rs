//! Lowering of checked programs into IR, and an interpreter for that IR.

pub mod builtins;
pub mod codegen;
pub mod vm;
