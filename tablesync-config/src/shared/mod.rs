//! Shared configuration types for synchronization jobs.

mod base;
mod batch;
mod retry;
mod sync;

pub use base::ValidationError;
pub use batch::BatchConfig;
pub use retry::RetryConfig;
pub use sync::SyncConfig;
