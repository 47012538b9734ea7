//! Error types for snapshot ingestion.

use thiserror::Error;

/// Reasons a snapshot was rejected. A rejected snapshot leaves the timeline
/// exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IngestError {
    /// The ring buffer arrays are empty.
    #[error("snapshot has no samples")]
    EmptyBuffer,

    /// A field array does not match the length of the others.
    #[error("field `{field}` has {len} samples, expected {expected}")]
    Misaligned {
        field: &'static str,
        len: usize,
        expected: usize,
    },

    /// The snapshot was captured before the previous one.
    #[error("snapshot is {elapsed}s older than the previous one")]
    OutOfOrder { elapsed: i64 },

    /// Accepting the snapshot would mean filling an implausibly long gap.
    #[error("gap of {seconds}s since the previous snapshot is too large to backfill")]
    GapTooLarge { seconds: u64 },

    /// The snapshot repeats the previous one.
    #[error("snapshot repeats uptime {uptime} of the previous one")]
    Duplicate { uptime: u64 },
}
