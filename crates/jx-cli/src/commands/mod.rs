//! Command implementations.

pub mod select;
