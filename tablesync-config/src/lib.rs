//! Configuration types and loading for the table synchronization job.
//!
//! Shared configuration structs live in [`shared`]; [`load_config`] merges the
//! base configuration file, an environment-specific file, and `APP_`-prefixed
//! environment variable overrides.

mod environment;
mod load;
pub mod shared;

pub use environment::Environment;
pub use load::{Config, LoadConfigError, load_config};
