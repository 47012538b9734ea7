//! Data source abstraction for receiving history snapshots.
//!
//! The engine only needs snapshots in capture order; where they come from is
//! up to the source. [`FileSource`] reads dumps saved to disk.

mod file;
mod snapshot;

pub use file::FileSource;
pub use snapshot::{HistorySnapshot, LabeledSnapshot};

use std::fmt::Debug;

/// Trait for receiving history snapshots from various sources.
///
/// # Example
///
/// ```
/// use dishwatch::{DataSource, FileSource};
///
/// let mut source = FileSource::new(["dumps/"]);
/// while let Some(labeled) = source.poll() {
///     println!("{}: uptime {}", labeled.label, labeled.snapshot.current);
/// }
/// ```
pub trait DataSource: Debug {
    /// Take the next snapshot, in capture order.
    ///
    /// Returns `None` once the source has nothing more to offer.
    fn poll(&mut self) -> Option<LabeledSnapshot>;

    /// Returns a human-readable description of the source.
    fn description(&self) -> &str;

    /// The most recent problem reading from the source, if any.
    fn error(&self) -> Option<&str>;
}
