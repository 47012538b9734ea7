//! Timeline reconstruction and outage analysis.
//!
//! This module turns raw history snapshots into one continuous per-second
//! timeline and analyzes it.
//!
//! ## Submodules
//!
//! - [`label`]: Parsing capture timestamps out of snapshot labels
//! - [`timeline`]: Merging ring-buffer snapshots into a gap-aware [`Timeline`]
//! - [`thresholds`]: The [`Thresholds`] that decide what counts as an outage
//! - [`classify`]: Per-second classification and throughput overrules
//! - [`analysis`]: The [`SpanAnalyzer`] pass producing the results bundle
//!
//! ## Data Flow
//!
//! ```text
//! HistorySnapshot (raw JSON)
//!        │
//!        ▼
//! TimelineReconstructor::ingest()
//!        │
//!        ▼
//! Timeline ──▶ SpanAnalyzer::run() (classify() per second)
//!                     │
//!                     ▼
//!              AnalysisResults
//! ```

pub mod analysis;
pub mod classify;
pub mod label;
pub mod thresholds;
pub mod timeline;

pub use analysis::SpanAnalyzer;
pub use classify::{classify, counts_as_outage, overrule, qualifies_as_outage, Overrule};
pub use thresholds::Thresholds;
pub use timeline::{Diagnostic, IngestReport, SegmentKind, Timeline, TimelineReconstructor};
