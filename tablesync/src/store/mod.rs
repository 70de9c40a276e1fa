//! Store abstraction over the source and destination tables.

pub mod base;
pub mod memory;
