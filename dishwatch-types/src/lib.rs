//! # dishwatch-types
//!
//! Core types for satellite terminal outage analysis. This crate defines the
//! schema that the dishwatch engine produces and that renderers (SVG plots,
//! terminal views, dashboards) consume.
//!
//! ## Design Goals
//!
//! - **Zero required dependencies**: Core types work without any serialization framework
//! - **Optional serialization**: Enable the `serde` feature as needed
//! - **Exhaustive categories**: Every per-category value lives in a [`CategoryMap`],
//!   so adding a category is a compile error everywhere it matters
//! - **Versioned schema**: Results carry a schema version for forward compatibility
//!
//! ## Features
//!
//! - `std` (default): Standard library support
//! - `serde`: JSON/MessagePack/etc. serialization via serde
//!
//! ## Example
//!
//! ```rust
//! use dishwatch_types::{bucket_index, Category, CategoryMap, SpanHistogram};
//!
//! let mut histogram = SpanHistogram::new();
//! histogram.record(Category::Obstructed, 12);
//! histogram.record(Category::Obstructed, 90);
//!
//! assert_eq!(histogram.runs(Category::Obstructed), 2);
//! assert_eq!(histogram.total_seconds(Category::Obstructed), 102);
//! assert_eq!(bucket_index(90), 60);
//!
//! let enabled: CategoryMap<bool> = CategoryMap::filled(true);
//! assert!(enabled[Category::Betadown]);
//! ```
//!
//! ## Schema Version
//!
//! The current schema version is **1**. The version is included in serialized
//! results to allow consumers to handle format evolution gracefully.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod analysis;
mod category;
mod sample;

pub use analysis::*;
pub use category::*;
pub use sample::*;

/// Current schema version.
///
/// Increment this when making breaking changes to the results format.
pub const SCHEMA_VERSION: u32 = 1;
