//! Metric names and labels recorded by the synchronization engine.
//!
//! Counters and histograms are emitted through the `metrics` macros; install
//! a recorder (for example the Prometheus recorder from the telemetry crate)
//! to collect them.

/// Total number of source rows copied into the mirror table.
pub const SYNC_ROWS_COPIED_TOTAL: &str = "tablesync_rows_copied_total";

/// Total number of chunks committed to the mirror table.
pub const SYNC_CHUNKS_COMMITTED_TOTAL: &str = "tablesync_chunks_committed_total";

/// Time spent committing one chunk, including conflict retries.
pub const SYNC_CHUNK_COMMIT_DURATION_SECONDS: &str = "tablesync_chunk_commit_duration_seconds";

/// Rows copied by a single partition pipeline.
pub const SYNC_PARTITION_ROWS: &str = "tablesync_partition_rows";

/// Total number of orphaned mirror rows removed by reconciliation.
pub const SYNC_ORPHANS_DELETED_TOTAL: &str = "tablesync_orphans_deleted_total";

/// Label carrying the run identity.
pub const RUN_ID_LABEL: &str = "run_id";

/// Label distinguishing partitioned from whole-table pipelines.
pub const PARTITIONED_LABEL: &str = "partitioned";
