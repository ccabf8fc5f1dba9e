//! Passes over the AST: semantic analysis and optimization.

pub mod fold;
pub mod functab;
pub mod optimize;
pub mod sema;
pub mod symtab;
