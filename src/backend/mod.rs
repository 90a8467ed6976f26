//! The backend of the compiler turns HIR into text for a target. Only
//! JavaScript is supported; control structures map one to one, so the HIR is
//! walked directly without an intermediate lowering step.

pub mod targets;
