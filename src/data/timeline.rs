//! Timeline reconstruction from successive ring-buffer snapshots.
//!
//! Each snapshot holds only the most recent `capacity` seconds, and captures
//! may overlap, leave gaps, or straddle a reboot. The reconstructor appends
//! just the seconds it has not seen yet, so the timeline grows into one
//! contiguous per-second record. Seconds that are known to be lost become
//! [`Sample::unrecorded`] filler; index `i` is always second `i`.

use std::fmt;

use chrono::{NaiveDateTime, TimeDelta};
use tracing::{debug, warn};

use dishwatch_types::Sample;

use super::label::parse_label;
use crate::error::IngestError;
use crate::source::{HistorySnapshot, LabeledSnapshot};

/// Longest gap (seconds) that is filled with unrecorded samples. A larger
/// gap rejects the snapshot.
pub const MAX_BACKFILL_SECONDS: u64 = 30 * 24 * 60 * 60;

/// The reconstructed per-second record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Timeline {
    samples: Vec<Sample>,
    start: Option<NaiveDateTime>,
}

impl Timeline {
    /// Create an empty timeline.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Mutable access for the span analyzer, which writes
    /// `adjacent_obstructed`. The length cannot change through this.
    pub fn samples_mut(&mut self) -> &mut [Sample] {
        &mut self.samples
    }

    /// Wall-clock time of second 0, once a labeled snapshot has been seen.
    pub fn start(&self) -> Option<NaiveDateTime> {
        self.start
    }

    /// Wall-clock time of second `index`.
    pub fn timestamp_of(&self, index: usize) -> Option<NaiveDateTime> {
        let offset = TimeDelta::try_seconds(i64::try_from(index).ok()?)?;
        self.start?.checked_add_signed(offset)
    }

    /// Drop every sample and the start time.
    pub fn clear(&mut self) {
        self.samples.clear();
        self.start = None;
    }
}

/// How a snapshot related to the one before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    /// The first snapshot since the reconstructor was created or reset.
    First,
    /// Overlaps the previous capture; only new slots were appended.
    Continuation,
    /// Timestamps show the captures cannot overlap (reboot, or too much
    /// time passed); the gap was backfilled when it could be sized.
    Disjoint,
    /// Uptime advanced past the buffer capacity; the gap was backfilled.
    Overflow,
    /// Uptime went backwards with no timestamps to size the gap.
    Reset,
}

/// Something the caller should know about an accepted snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// No timestamp could be read from the label; uptime alone was used.
    UnparseableLabel { label: String },
    /// The device rebooted and the lost interval is unknown, so it was not
    /// backfilled.
    AmbiguousReset { previous_uptime: u64, uptime: u64 },
    /// Seconds known to be lost were filled with unrecorded samples.
    Backfilled { seconds: u64 },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnparseableLabel { label } => {
                write!(f, "no timestamp in label {:?}; using uptime only", label)
            }
            Diagnostic::AmbiguousReset {
                previous_uptime,
                uptime,
            } => write!(
                f,
                "uptime went from {} to {}; lost interval unknown and not backfilled",
                previous_uptime, uptime
            ),
            Diagnostic::Backfilled { seconds } => {
                write!(f, "backfilled {} unrecorded seconds", seconds)
            }
        }
    }
}

/// What one accepted snapshot did to the timeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestReport {
    pub kind: SegmentKind,
    /// Real samples appended.
    pub appended: usize,
    /// Unrecorded filler samples appended ahead of them.
    pub backfilled: usize,
    pub diagnostics: Vec<Diagnostic>,
}

/// Uptime and capture time of the last accepted snapshot.
#[derive(Debug, Clone, Copy)]
struct Previous {
    uptime: u64,
    timestamp: Option<NaiveDateTime>,
}

/// Decided before anything is written, so a rejection leaves no trace.
#[derive(Debug)]
struct Plan {
    kind: SegmentKind,
    backfill: u64,
    /// First uptime second to copy; copying runs up to (excluding) `current`.
    from: u64,
}

impl Plan {
    /// Treat the buffer as entirely new data: copy everything it still holds.
    fn fresh(kind: SegmentKind, backfill: u64, uptime: u64, capacity: u64) -> Self {
        Self {
            kind,
            backfill,
            from: uptime.saturating_sub(capacity),
        }
    }
}

/// Merges snapshots, in capture order, into one [`Timeline`].
#[derive(Debug, Default)]
pub struct TimelineReconstructor {
    timeline: Timeline,
    previous: Option<Previous>,
}

impl TimelineReconstructor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn timeline_mut(&mut self) -> &mut Timeline {
        &mut self.timeline
    }

    /// Forget everything reconstructed so far.
    pub fn reset(&mut self) {
        self.timeline.clear();
        self.previous = None;
    }

    /// Ingest a snapshot, reading its capture time from the label.
    ///
    /// An unparseable label is not an error: the snapshot is ingested with
    /// an unknown timestamp and the report carries a diagnostic.
    pub fn ingest_labeled(
        &mut self,
        labeled: &LabeledSnapshot,
    ) -> Result<IngestReport, IngestError> {
        let mut diagnostics = Vec::new();
        let timestamp = match parse_label(&labeled.label) {
            Ok(ts) => Some(ts),
            Err(e) => {
                warn!("{}", e);
                diagnostics.push(Diagnostic::UnparseableLabel {
                    label: labeled.label.clone(),
                });
                None
            }
        };

        let mut report = self.ingest(&labeled.snapshot, timestamp)?;
        diagnostics.append(&mut report.diagnostics);
        report.diagnostics = diagnostics;
        Ok(report)
    }

    /// Ingest a snapshot captured at `timestamp` (if known).
    ///
    /// Snapshots must arrive in capture order. Malformed, out-of-order and
    /// repeated snapshots are rejected and the timeline is left unchanged.
    pub fn ingest(
        &mut self,
        snapshot: &HistorySnapshot,
        timestamp: Option<NaiveDateTime>,
    ) -> Result<IngestReport, IngestError> {
        let capacity = snapshot.capacity()?;
        let uptime = snapshot.current;
        let plan = self.plan(uptime, capacity as u64, timestamp)?;
        if plan.backfill > MAX_BACKFILL_SECONDS {
            return Err(IngestError::GapTooLarge {
                seconds: plan.backfill,
            });
        }

        let mut diagnostics = Vec::new();
        if plan.kind == SegmentKind::Reset {
            if let Some(previous) = self.previous {
                warn!(
                    "Uptime went from {} to {} with no timestamps; gap not backfilled",
                    previous.uptime, uptime
                );
                diagnostics.push(Diagnostic::AmbiguousReset {
                    previous_uptime: previous.uptime,
                    uptime,
                });
            }
        }
        if plan.backfill > 0 {
            warn!("Backfilling {} lost seconds", plan.backfill);
            diagnostics.push(Diagnostic::Backfilled {
                seconds: plan.backfill,
            });
        }

        let backfilled = plan.backfill as usize;
        let appended = (uptime - plan.from) as usize;
        let slot = |k: u64| (k % capacity as u64) as usize;
        let samples = &mut self.timeline.samples;
        samples.reserve(backfilled + appended);
        samples.extend(std::iter::repeat(Sample::unrecorded()).take(backfilled));
        samples.extend((plan.from..uptime).map(|k| snapshot.sample_at(slot(k))));

        if self.timeline.start.is_none() {
            if let Some(ts) = timestamp {
                self.timeline.start = i64::try_from(self.timeline.len())
                    .ok()
                    .and_then(TimeDelta::try_seconds)
                    .and_then(|len| ts.checked_sub_signed(len));
            }
        }

        self.previous = Some(Previous { uptime, timestamp });

        debug!(
            "Ingested {:?} snapshot at uptime {}: {} new, {} backfilled, {} total",
            plan.kind,
            uptime,
            appended,
            backfilled,
            self.timeline.len()
        );

        Ok(IngestReport {
            kind: plan.kind,
            appended,
            backfilled,
            diagnostics,
        })
    }

    fn plan(
        &self,
        uptime: u64,
        capacity: u64,
        timestamp: Option<NaiveDateTime>,
    ) -> Result<Plan, IngestError> {
        let Some(previous) = self.previous else {
            return Ok(Plan::fresh(SegmentKind::First, 0, uptime, capacity));
        };

        let same_capture = match (previous.timestamp, timestamp) {
            (Some(then), Some(now)) => then == now,
            _ => true,
        };
        if uptime == previous.uptime && same_capture {
            return Err(IngestError::Duplicate { uptime });
        }

        if let (Some(then), Some(now)) = (previous.timestamp, timestamp) {
            let elapsed = now.signed_duration_since(then).num_seconds();
            if elapsed < 0 {
                return Err(IngestError::OutOfOrder { elapsed: -elapsed });
            }
            let elapsed = elapsed as u64;

            let rebooted = previous.uptime > uptime;
            if rebooted || elapsed >= uptime || elapsed >= capacity {
                // The new buffer covers the last min(uptime, capacity)
                // seconds. The gap is only sized when elapsed time exceeds both.
                let gap = if elapsed > uptime && elapsed > capacity {
                    (elapsed - uptime).max(elapsed - capacity)
                } else {
                    0
                };
                return Ok(Plan::fresh(SegmentKind::Disjoint, gap, uptime, capacity));
            }
            return Ok(continuation(previous.uptime, uptime, capacity));
        }

        if uptime < previous.uptime {
            return Ok(Plan::fresh(SegmentKind::Reset, 0, uptime, capacity));
        }
        Ok(continuation(previous.uptime, uptime, capacity))
    }
}

/// Copy only the slots written since `previous`; if more than a buffer's
/// worth was written, the excess is lost and gets backfilled.
fn continuation(previous: u64, uptime: u64, capacity: u64) -> Plan {
    let written = uptime - previous;
    if written > capacity {
        Plan::fresh(SegmentKind::Overflow, written - capacity, uptime, capacity)
    } else {
        Plan {
            kind: SegmentKind::Continuation,
            backfill: 0,
            from: previous,
        }
    }
}
