//! Partition workers and the bounded pool that runs them.

pub mod policy;
pub mod pool;
pub mod range_copy;
