//! # dishwatch
//!
//! Outage analysis for satellite terminal telemetry.
//!
//! A terminal keeps its last few hours of per-second telemetry in a circular
//! history buffer. This crate merges any number of captures of that buffer
//! into one continuous timeline, classifies every second (connected, or one
//! of four outage types) and summarizes the result as connected spans, run
//! length histograms, outage adjacency and throughput overrule counts.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                           App                                │
//! │  ┌─────────┐    ┌────────────────────┐    ┌───────────────┐  │
//! │  │ source  │───▶│ TimelineReconstructor ──▶│ SpanAnalyzer  │  │
//! │  │ (input) │    │     (timeline)     │    │  (results)    │  │
//! │  └─────────┘    └────────────────────┘    └───────────────┘  │
//! │                          ▲                        ▲          │
//! │                          └──── Thresholds ────────┘          │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`source`]**: The [`DataSource`] trait and [`FileSource`], which reads
//!   saved history dumps
//! - **[`data`]**: Timeline reconstruction, classification and the analysis
//!   pass
//! - **[`app`]**: Engine state; owns the timeline and thresholds and caches
//!   the results until something changes
//! - **[`config`]**: [`Settings`] from a config file and the environment
//!
//! The plain data types (samples, categories, results) live in the
//! [`dishwatch_types`] crate so other tools can read exported results.
//!
//! ## Usage
//!
//! ```bash
//! # Analyze a directory of dumps named like 2021-03-14-120000.json
//! dishwatch dumps/
//!
//! # Treat 50% loss as an outage and export the results
//! dishwatch dumps/ --min-loss-ratio 0.5 --export results.json
//! ```
//!
//! ### As a library
//!
//! ```
//! use dishwatch::{App, HistorySnapshot, Thresholds};
//! use dishwatch_types::Sample;
//!
//! let mut app = App::new(Thresholds::default());
//! let snapshot = HistorySnapshot::filled(3600, 3600, Sample::default());
//! app.ingest(&snapshot, None).unwrap();
//!
//! let results = app.results();
//! assert_eq!(results.spans.len(), 1);
//! assert_eq!(results.spans[0].len(), 3600);
//! ```

pub mod app;
pub mod config;
pub mod data;
pub mod error;
pub mod source;

// Re-export main types for convenience
pub use app::{App, PollSummary, Staleness};
pub use config::Settings;
pub use data::{
    Diagnostic, IngestReport, SegmentKind, SpanAnalyzer, Thresholds, Timeline,
    TimelineReconstructor,
};
pub use error::IngestError;
pub use source::{DataSource, FileSource, HistorySnapshot, LabeledSnapshot};

pub use dishwatch_types::{AnalysisResults, Category, CategoryMap, Sample};
