//! Engine state: the reconstructed timeline, the current thresholds and the
//! cached analysis results.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::data::{
    Diagnostic, IngestReport, SpanAnalyzer, Thresholds, Timeline, TimelineReconstructor,
};
use crate::error::IngestError;
use crate::source::{DataSource, HistorySnapshot, LabeledSnapshot};
use dishwatch_types::{AnalysisResults, Category};

/// Whether the cached results still describe the timeline and thresholds.
///
/// Every threshold or filter setter returns [`Staleness::Stale`], whether or
/// not the value actually moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Staleness {
    /// The next [`App::results`] call re-runs the analysis.
    Stale,
    /// The cached results are current.
    Fresh,
}

/// Outcome of draining a [`DataSource`].
#[derive(Debug, Default)]
pub struct PollSummary {
    /// Snapshots merged into the timeline.
    pub accepted: usize,
    /// Snapshots the reconstructor refused, by label.
    pub rejected: Vec<(String, IngestError)>,
    /// Diagnostics from accepted snapshots, by label.
    pub diagnostics: Vec<(String, Diagnostic)>,
}

/// Main engine state.
#[derive(Debug, Default)]
pub struct App {
    reconstructor: TimelineReconstructor,
    thresholds: Thresholds,
    stale: bool,
    results: Option<Arc<AnalysisResults>>,
}

#[derive(Serialize)]
struct Export<'a> {
    start: Option<NaiveDateTime>,
    results: &'a AnalysisResults,
}

impl App {
    /// Create an empty engine with the given thresholds.
    pub fn new(thresholds: Thresholds) -> Self {
        Self {
            reconstructor: TimelineReconstructor::new(),
            thresholds,
            stale: true,
            results: None,
        }
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    pub fn timeline(&self) -> &Timeline {
        self.reconstructor.timeline()
    }

    /// Current staleness of the cached results.
    pub fn staleness(&self) -> Staleness {
        if self.stale || self.results.is_none() {
            Staleness::Stale
        } else {
            Staleness::Fresh
        }
    }

    fn invalidate(&mut self) -> Staleness {
        self.stale = true;
        Staleness::Stale
    }

    /// Merge one snapshot captured at `timestamp` into the timeline.
    pub fn ingest(
        &mut self,
        snapshot: &HistorySnapshot,
        timestamp: Option<NaiveDateTime>,
    ) -> Result<IngestReport, IngestError> {
        let report = self.reconstructor.ingest(snapshot, timestamp)?;
        self.invalidate();
        Ok(report)
    }

    /// Merge one labeled snapshot, taking its capture time from the label.
    pub fn ingest_labeled(
        &mut self,
        labeled: &LabeledSnapshot,
    ) -> Result<IngestReport, IngestError> {
        let report = self.reconstructor.ingest_labeled(labeled)?;
        self.invalidate();
        Ok(report)
    }

    /// Ingest everything the source has to offer, in order.
    ///
    /// Rejected snapshots are logged and skipped; they never stop the drain.
    pub fn drain(&mut self, source: &mut dyn DataSource) -> PollSummary {
        let mut summary = PollSummary::default();
        while let Some(labeled) = source.poll() {
            match self.ingest_labeled(&labeled) {
                Ok(report) => {
                    debug!(
                        "{}: {:?}, {} appended, {} backfilled",
                        labeled.label, report.kind, report.appended, report.backfilled
                    );
                    summary.accepted += 1;
                    summary
                        .diagnostics
                        .extend(report.diagnostics.into_iter().map(|d| (labeled.label.clone(), d)));
                }
                Err(e) => {
                    warn!("Rejected {}: {}", labeled.label, e);
                    summary.rejected.push((labeled.label, e));
                }
            }
        }
        info!(
            "Ingested {} snapshots from {} ({} rejected), timeline is {} s",
            summary.accepted,
            source.description(),
            summary.rejected.len(),
            self.timeline().len()
        );
        summary
    }

    /// The analysis results for the current timeline and thresholds.
    ///
    /// The analysis only re-runs when something changed since the last call.
    pub fn results(&mut self) -> Arc<AnalysisResults> {
        match &self.results {
            Some(results) if !self.stale => Arc::clone(results),
            _ => {
                let analyzer = SpanAnalyzer::new(&self.thresholds);
                let samples = self.reconstructor.timeline_mut().samples_mut();
                let results = Arc::new(analyzer.run(samples));
                debug!(
                    "Analyzed {} s: {} connected spans",
                    results.timeline_len,
                    results.spans.len()
                );
                self.results = Some(Arc::clone(&results));
                self.stale = false;
                results
            }
        }
    }

    /// Forget the timeline and any results.
    pub fn reset(&mut self) -> Staleness {
        self.reconstructor.reset();
        self.results = None;
        self.invalidate()
    }

    pub fn set_thresholds(&mut self, thresholds: Thresholds) -> Staleness {
        self.thresholds = thresholds;
        self.invalidate()
    }

    pub fn set_min_loss_ratio(&mut self, value: f64) -> Staleness {
        self.thresholds.set_min_loss_ratio(value);
        self.invalidate()
    }

    pub fn set_min_down_bps(&mut self, value: f64) -> Staleness {
        self.thresholds.set_min_down_bps(value);
        self.invalidate()
    }

    pub fn set_min_up_bps(&mut self, value: f64) -> Staleness {
        self.thresholds.set_min_up_bps(value);
        self.invalidate()
    }

    pub fn set_max_snr(&mut self, value: f64) -> Staleness {
        self.thresholds.set_max_snr(value);
        self.invalidate()
    }

    pub fn set_connected_min_sec(&mut self, value: u64) -> Staleness {
        self.thresholds.set_connected_min_sec(value);
        self.invalidate()
    }

    pub fn set_connected_max_dsec(&mut self, value: u64) -> Staleness {
        self.thresholds.set_connected_max_dsec(value);
        self.invalidate()
    }

    pub fn set_enabled(&mut self, category: Category, enabled: bool) -> Staleness {
        self.thresholds.set_enabled(category, enabled);
        self.invalidate()
    }

    /// Flip whether a category takes part in the accounting.
    pub fn toggle_category(&mut self, category: Category) -> Staleness {
        let enabled = self.thresholds.is_enabled(category);
        self.set_enabled(category, !enabled)
    }

    // Relative adjustments, clamped like the absolute setters.

    pub fn nudge_min_loss_ratio(&mut self, delta: f64) -> Staleness {
        self.set_min_loss_ratio(self.thresholds.min_loss_ratio() + delta)
    }

    pub fn nudge_min_down_bps(&mut self, delta: f64) -> Staleness {
        self.set_min_down_bps(self.thresholds.min_down_bps() + delta)
    }

    pub fn nudge_min_up_bps(&mut self, delta: f64) -> Staleness {
        self.set_min_up_bps(self.thresholds.min_up_bps() + delta)
    }

    pub fn nudge_max_snr(&mut self, delta: f64) -> Staleness {
        self.set_max_snr(self.thresholds.max_snr() + delta)
    }

    pub fn nudge_connected_min_sec(&mut self, delta: i64) -> Staleness {
        let value = self.thresholds.connected_min_sec().saturating_add_signed(delta);
        self.set_connected_min_sec(value)
    }

    pub fn nudge_connected_max_dsec(&mut self, delta: i64) -> Staleness {
        let value = self.thresholds.connected_max_dsec().saturating_add_signed(delta);
        self.set_connected_max_dsec(value)
    }

    /// Export the current results, with the timeline start, as pretty JSON.
    pub fn export_results(&mut self, path: &Path) -> Result<()> {
        use std::io::Write;

        if self.timeline().is_empty() {
            anyhow::bail!("No data to export");
        }

        let results = self.results();
        let export = Export {
            start: self.timeline().start(),
            results: &results,
        };
        let json = serde_json::to_string_pretty(&export)?;
        let mut file = std::fs::File::create(path)?;
        file.write_all(json.as_bytes())?;

        info!("Exported results to {}", path.display());
        Ok(())
    }
}
