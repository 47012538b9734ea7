//! Analysis results - the bundle a span analysis pass hands to renderers.

use alloc::vec;
use alloc::vec::Vec;

use crate::{Category, CategoryMap, SCHEMA_VERSION};

/// Number of duration buckets: 59 one-second buckets (1s..59s) followed by
/// one-minute buckets, the last of which absorbs everything longer.
pub const HISTOGRAM_BUCKETS: usize = 120;

/// Bucket index for a duration in seconds.
///
/// `d - 1` below one minute, then `59 + d / 60`, capped at the last bucket.
/// A zero duration shares the first bucket.
pub fn bucket_index(seconds: u64) -> usize {
    let last = HISTOGRAM_BUCKETS - 1;
    if seconds < 60 {
        seconds.saturating_sub(1) as usize
    } else {
        let minutes = usize::try_from(seconds / 60).unwrap_or(usize::MAX);
        minutes.saturating_add(59).min(last)
    }
}

/// Smallest duration, in seconds, that lands in bucket `index`.
pub fn bucket_floor(index: usize) -> u64 {
    if index < 59 {
        index as u64 + 1
    } else {
        (index as u64 - 59) * 60
    }
}

/// A half-open range of seconds `[start, end)` of sustained connectivity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConnectedSpan {
    pub start: usize,
    pub end: usize,
}

impl ConnectedSpan {
    /// Length of the span in seconds.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Check if the span covers no seconds.
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Check if second `index` falls inside the span.
    pub fn contains(&self, index: usize) -> bool {
        index >= self.start && index < self.end
    }
}

/// One histogram bucket: how many runs landed here and their summed length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Bucket {
    pub count: u64,
    pub total_seconds: u64,
}

/// Run-length histogram per category, bucketed by [`bucket_index`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct SpanHistogram {
    buckets: CategoryMap<Vec<Bucket>>,
}

impl SpanHistogram {
    /// Create a histogram with every bucket empty.
    pub fn new() -> Self {
        Self {
            buckets: CategoryMap::from_fn(|_| vec![Bucket::default(); HISTOGRAM_BUCKETS]),
        }
    }

    /// Count one run of `category` lasting `seconds`.
    pub fn record(&mut self, category: Category, seconds: u64) {
        let bucket = &mut self.buckets[category][bucket_index(seconds)];
        bucket.count += 1;
        bucket.total_seconds += seconds;
    }

    /// The buckets for one category, in duration order.
    pub fn buckets(&self, category: Category) -> &[Bucket] {
        &self.buckets[category]
    }

    /// Number of runs recorded for a category.
    pub fn runs(&self, category: Category) -> u64 {
        self.buckets[category].iter().map(|b| b.count).sum()
    }

    /// Total seconds covered by the runs recorded for a category.
    pub fn total_seconds(&self, category: Category) -> u64 {
        self.buckets[category].iter().map(|b| b.total_seconds).sum()
    }

    /// Largest bucket count across all categories.
    ///
    /// Renderers scale bar heights against this.
    pub fn max_count(&self) -> u64 {
        self.buckets
            .iter()
            .flat_map(|(_, buckets)| buckets.iter().map(|b| b.count))
            .max()
            .unwrap_or(0)
    }
}

impl Default for SpanHistogram {
    fn default() -> Self {
        Self::new()
    }
}

/// How often a run of one category borders a run of another.
///
/// Pairs are symmetric: recording `(a, b)` also counts `(b, a)`, and each
/// side's total goes up by one.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AdjacencyMatrix {
    pub counts: CategoryMap<CategoryMap<u64>>,
    pub totals: CategoryMap<u64>,
}

impl AdjacencyMatrix {
    /// Create an empty matrix.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that a run of `a` borders a run of `b`. Ignored when `a == b`.
    pub fn record(&mut self, a: Category, b: Category) {
        if a == b {
            return;
        }
        self.counts[a][b] += 1;
        self.counts[b][a] += 1;
        self.totals[a] += 1;
        self.totals[b] += 1;
    }

    /// Number of times runs of `a` and `b` were adjacent.
    pub fn get(&self, a: Category, b: Category) -> u64 {
        self.counts[a][b]
    }

    /// Number of adjacencies involving `category`.
    pub fn total(&self, category: Category) -> u64 {
        self.totals[category]
    }
}

/// How far obstruction reclassification reached, bucketed like run lengths.
///
/// Backward and forward scans are kept apart; [`count_at`](Self::count_at)
/// and [`combined`](Self::combined) give the shared view.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReclassificationHistogram {
    pub backward: Vec<u64>,
    pub forward: Vec<u64>,
}

impl ReclassificationHistogram {
    /// Create an empty histogram.
    pub fn new() -> Self {
        Self {
            backward: vec![0; HISTOGRAM_BUCKETS],
            forward: vec![0; HISTOGRAM_BUCKETS],
        }
    }

    /// Record a backward scan that flipped `reach` seconds. Zero is ignored.
    pub fn record_backward(&mut self, reach: u64) {
        if reach > 0 {
            self.backward[bucket_index(reach)] += 1;
        }
    }

    /// Record a forward scan that flipped `reach` seconds. Zero is ignored.
    pub fn record_forward(&mut self, reach: u64) {
        if reach > 0 {
            self.forward[bucket_index(reach)] += 1;
        }
    }

    /// Backward events whose reach falls in the same bucket as `reach`.
    pub fn backward_at(&self, reach: u64) -> u64 {
        self.backward[bucket_index(reach)]
    }

    /// Forward events whose reach falls in the same bucket as `reach`.
    pub fn forward_at(&self, reach: u64) -> u64 {
        self.forward[bucket_index(reach)]
    }

    /// Events in either direction whose reach falls in the bucket of `reach`.
    pub fn count_at(&self, reach: u64) -> u64 {
        self.backward_at(reach) + self.forward_at(reach)
    }

    /// Both directions summed per bucket.
    pub fn combined(&self) -> Vec<u64> {
        self.backward.iter().zip(&self.forward).map(|(b, f)| b + f).collect()
    }

    /// Total number of reclassification events.
    pub fn events(&self) -> u64 {
        self.backward.iter().chain(&self.forward).sum()
    }
}

impl Default for ReclassificationHistogram {
    fn default() -> Self {
        Self::new()
    }
}

/// Seconds where ping loss alone met the outage threshold, split by whether
/// throughput evidence overruled it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OverruleCounts {
    /// Overruled by downlink throughput alone.
    pub down: u64,
    /// Overruled by uplink throughput alone.
    pub up: u64,
    /// Overruled by at least one of the two.
    pub either: u64,
    /// Counted as an outage.
    #[cfg_attr(feature = "serde", serde(rename = "not"))]
    pub not_overruled: u64,
}

impl OverruleCounts {
    /// Every second where ping loss alone qualified.
    pub fn loss_qualifying(&self) -> u64 {
        self.not_overruled + self.either
    }
}

/// Everything one analysis pass produces.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct AnalysisResults {
    /// Schema version for forward compatibility.
    pub version: u32,

    /// Number of seconds analyzed.
    pub timeline_len: usize,

    /// Spans of sustained connectivity, sorted by start.
    pub spans: Vec<ConnectedSpan>,

    /// Run lengths per category.
    pub histogram: SpanHistogram,

    /// Which categories border which.
    pub adjacency: AdjacencyMatrix,

    /// Reach of obstruction reclassification.
    pub reclassification: ReclassificationHistogram,

    /// Throughput overrules per outage category.
    pub overrules: CategoryMap<OverruleCounts>,

    /// Final category of every second, counted.
    pub seconds: CategoryMap<u64>,

    /// Seconds at or below the configured SNR ceiling.
    pub low_snr_seconds: u64,
}

impl AnalysisResults {
    /// Results for an empty timeline.
    pub fn empty() -> Self {
        Self {
            version: SCHEMA_VERSION,
            timeline_len: 0,
            spans: Vec::new(),
            histogram: SpanHistogram::new(),
            adjacency: AdjacencyMatrix::new(),
            reclassification: ReclassificationHistogram::new(),
            overrules: CategoryMap::default(),
            seconds: CategoryMap::default(),
            low_snr_seconds: 0,
        }
    }

    /// Seconds covered by connected spans.
    pub fn connected_span_seconds(&self) -> usize {
        self.spans.iter().map(ConnectedSpan::len).sum()
    }
}

impl Default for AnalysisResults {
    fn default() -> Self {
        Self::empty()
    }
}
