//! Parallel, range-partitioned synchronization of a source table into its
//! backup mirror.
//!
//! The engine divides the ordered id space of the source table into
//! near-equal partitions, runs one bounded-memory chunk pipeline per
//! partition under a bounded worker pool, retries chunk writes that hit
//! concurrent-modification conflicts, and finishes with a reconciliation pass
//! that deletes destination rows no longer present upstream.

pub mod error;
pub mod job;
mod macros;
pub mod metrics;
pub mod partition;
pub mod reconcile;
pub mod store;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
pub mod types;
pub mod workers;
