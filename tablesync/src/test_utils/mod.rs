//! Utilities for testing synchronization runs against in-memory stores.

pub mod data;
pub mod faulty;
