//! Names are resolved and types are checked here, turning the AST into HIR.
//! Optimizations like constant expression evaluation and dead branch removal
//! are then made on the HIR before it reaches the backend.

pub mod analyzer;
pub mod error;
pub mod hir;
pub mod optimization;
pub mod primitive;
pub mod scope;
pub mod stdlib;
pub mod ty;
