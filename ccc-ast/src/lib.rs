//! Abstract syntax tree for the `ccc` language.
//!
//! The tree is produced by an external front end and consumed by the passes in `ccc-passes`
//! and the code generator in `ccc-vm`.

pub mod ast;
pub mod builder;
pub mod ops;
pub mod printer;
pub mod types;
pub mod visitor;

pub use ccc_source::Location;
