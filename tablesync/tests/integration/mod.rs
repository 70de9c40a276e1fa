#![cfg(feature = "test-utils")]

mod partitioner_test;
mod retry_test;
mod sync_test;
