//! Telemetry setup for synchronization services.
//!
//! Provides tracing subscriber initialization for binaries and tests, and a
//! cached Prometheus recorder installer for the `metrics` macros used in the
//! core crate.

pub mod metrics;
pub mod tracing;
