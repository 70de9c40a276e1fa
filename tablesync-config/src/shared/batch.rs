use serde::{Deserialize, Serialize};

use crate::shared::ValidationError;

/// Paging and chunking configuration for the chunk pipeline.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct BatchConfig {
    /// Number of source rows fetched per page when reading a key range.
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// Number of transformed rows accumulated before a single batched write.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
}

impl BatchConfig {
    /// Default number of rows read per page.
    pub const DEFAULT_PAGE_SIZE: usize = 500;

    /// Default number of rows committed per chunk.
    pub const DEFAULT_CHUNK_SIZE: usize = 1000;

    /// Validates batch configuration settings.
    ///
    /// Both page and chunk sizes must be non-zero, otherwise the pipeline
    /// could never make progress.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.page_size == 0 {
            return Err(ValidationError::InvalidFieldValue {
                field: "batch.page_size",
                constraint: "must be greater than 0",
            });
        }

        if self.chunk_size == 0 {
            return Err(ValidationError::InvalidFieldValue {
                field: "batch.chunk_size",
                constraint: "must be greater than 0",
            });
        }

        Ok(())
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            chunk_size: default_chunk_size(),
        }
    }
}

fn default_page_size() -> usize {
    BatchConfig::DEFAULT_PAGE_SIZE
}

fn default_chunk_size() -> usize {
    BatchConfig::DEFAULT_CHUNK_SIZE
}
