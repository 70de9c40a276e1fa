//! Range partitioning of the source key space.
//!
//! Divides the ordered id space of the source table into near-equal,
//! contiguous, non-overlapping key ranges by sampling boundary keys at a fixed
//! stride instead of counting rows exactly. Sampling costs O(grid) single-row
//! lookups and accepts partitions that are off by up to one stride.

use tracing::debug;

use crate::bail;
use crate::error::{ErrorKind, SyncResult};
use crate::store::base::Store;

/// A contiguous slice of the source key space, processed by one worker.
///
/// Ranges are half-open `[start, end)`; the final partition of a plan carries
/// `is_last` and includes its upper bound so the global maximum key is
/// processed exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRange {
    /// Inclusive lower bound.
    pub start: String,
    /// Upper bound; exclusive unless `is_last` is set.
    pub end: String,
    /// Whether this partition closes the plan and owns the global maximum.
    pub is_last: bool,
}

impl KeyRange {
    /// Returns whether `key` falls inside this range.
    pub fn contains(&self, key: &str) -> bool {
        if key < self.start.as_str() {
            return false;
        }

        if self.is_last {
            key <= self.end.as_str()
        } else {
            key < self.end.as_str()
        }
    }
}

impl std::fmt::Display for KeyRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let close = if self.is_last { ']' } else { ')' };
        write!(f, "[{}, {}{close}", self.start, self.end)
    }
}

/// Computes the partition plan for one synchronization run.
///
/// Samples boundary keys at ordinal offsets `unit, 2*unit, ...` where
/// `unit = total / grid_size`, falling back to the maximum key when an offset
/// runs past the end of the table. Produces at most `grid_size` partitions in
/// ascending order whose union covers `[min_key, max_key]` at planning time.
///
/// An empty table yields an empty plan. A table with fewer rows than grid
/// slots collapses to a single inclusive partition.
pub async fn plan_partitions<S: Store>(store: &S, grid_size: u16) -> SyncResult<Vec<KeyRange>> {
    if grid_size == 0 {
        bail!(
            ErrorKind::PartitionComputationFailed,
            "Grid size must be greater than zero"
        );
    }

    let total = store.count().await?;
    if total == 0 {
        debug!("source table is empty, planning zero partitions");
        return Ok(Vec::new());
    }

    let (Some(min_key), Some(max_key)) = (store.min_key().await?, store.max_key().await?) else {
        bail!(
            ErrorKind::PartitionComputationFailed,
            "Source reported rows but no min/max key"
        );
    };

    let unit = total / grid_size as u64;
    if unit == 0 || min_key == max_key {
        // Fewer rows than grid slots: a single inclusive partition covers everything.
        return Ok(vec![KeyRange {
            start: min_key,
            end: max_key,
            is_last: true,
        }]);
    }

    let mut partitions = Vec::with_capacity(grid_size as usize);
    let mut start = min_key;
    let mut offset = unit;

    while start < max_key {
        let sampled = if partitions.len() + 1 >= grid_size as usize {
            // Last allowed slot: close the plan at the global maximum instead
            // of sampling, so the plan never exceeds the requested grid size.
            max_key.clone()
        } else {
            store
                .key_at_offset(offset - 1)
                .await?
                .unwrap_or_else(|| max_key.clone())
        };

        // Sampled boundaries are strictly increasing for unique ordered keys;
        // clamp to the maximum if the store ever violates that.
        let end = if sampled <= start {
            max_key.clone()
        } else {
            sampled
        };
        let is_last = end == max_key;

        debug!(
            partition = partitions.len(),
            %start,
            %end,
            is_last,
            "planned partition"
        );

        partitions.push(KeyRange {
            start: start.clone(),
            end: end.clone(),
            is_last,
        });

        start = end;
        offset += unit;
    }

    Ok(partitions)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(start: &str, end: &str, is_last: bool) -> KeyRange {
        KeyRange {
            start: start.into(),
            end: end.into(),
            is_last,
        }
    }

    #[test]
    fn half_open_range_excludes_upper_bound() {
        let partition = range("a", "c", false);

        assert!(partition.contains("a"));
        assert!(partition.contains("b"));
        assert!(!partition.contains("c"));
    }

    #[test]
    fn last_range_includes_upper_bound() {
        let partition = range("c", "f", true);

        assert!(partition.contains("c"));
        assert!(partition.contains("f"));
        assert!(!partition.contains("b"));
    }

    #[test]
    fn boundary_key_belongs_to_exactly_one_partition() {
        let first = range("a", "c", false);
        let second = range("c", "f", true);

        assert!(!first.contains("c"));
        assert!(second.contains("c"));
    }
}
