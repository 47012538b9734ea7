//! Outage span analysis.
//!
//! One forward pass over the timeline classifies every second and keeps
//! three run-length accumulators going at once:
//!
//! - `connected_len`: the current connected run, which tolerates outages up
//!   to `connected_max_dsec` seconds long
//! - `total_outage_len`: consecutive outage seconds of any type
//! - the open same-type outage run
//!
//! An obstructed second also reclassifies the betadown seconds directly
//! around it, backwards into seconds already visited and forwards into
//! seconds not yet visited. Both scans only ever flip betadown to
//! obstructed, so running them again finds nothing new.

use tracing::debug;

use dishwatch_types::{AnalysisResults, Category, ConnectedSpan, Sample};

use super::classify::{classify, counts_as_outage, is_low_snr, overrule};
use super::thresholds::Thresholds;

/// Runs the analysis pass for one set of thresholds.
#[derive(Debug, Clone, Copy)]
pub struct SpanAnalyzer<'a> {
    thresholds: &'a Thresholds,
}

impl<'a> SpanAnalyzer<'a> {
    pub fn new(thresholds: &'a Thresholds) -> Self {
        Self { thresholds }
    }

    /// Analyze the whole timeline.
    ///
    /// Writes `adjacent_obstructed` on every sample (clearing stale flags
    /// from earlier passes first) and returns a fresh results bundle.
    pub fn run(&self, samples: &mut [Sample]) -> AnalysisResults {
        for sample in samples.iter_mut() {
            sample.adjacent_obstructed = false;
        }

        let mut pass = Pass::new(self.thresholds);
        for i in 0..samples.len() {
            pass.step(samples, i);
        }
        let results = pass.finish(samples.len());

        debug!(
            "Analyzed {} seconds: {} connected spans, {} reclassification events",
            results.timeline_len,
            results.spans.len(),
            results.reclassification.events()
        );
        results
    }
}

/// An outage run of one category that has not been committed yet.
///
/// Adjacencies are held here until the run closes, because a backward scan
/// can still change the run's category.
#[derive(Debug)]
struct OpenRun {
    category: Category,
    len: u64,
    neighbours: Vec<Category>,
}

/// Accumulator state of one pass.
struct Pass<'a> {
    thresholds: &'a Thresholds,
    connected_len: u64,
    total_outage_len: u64,
    run: Option<OpenRun>,
    results: AnalysisResults,
}

impl<'a> Pass<'a> {
    fn new(thresholds: &'a Thresholds) -> Self {
        Self {
            thresholds,
            connected_len: 0,
            total_outage_len: 0,
            run: None,
            results: AnalysisResults::empty(),
        }
    }

    fn step(&mut self, samples: &mut [Sample], i: usize) {
        if is_low_snr(&samples[i], self.thresholds) {
            self.results.low_snr_seconds += 1;
        }

        if !counts_as_outage(&samples[i], self.thresholds) {
            self.tally_overrule(&samples[i]);
            self.close_run(Some(Category::Connected));
            self.total_outage_len = 0;
            self.connected_len += 1;
            self.results.seconds[Category::Connected] += 1;
            return;
        }

        self.total_outage_len += 1;
        if classify(&samples[i]) == Category::Obstructed {
            self.reclassify_around(samples, i);
        }
        let category = classify(&samples[i]);

        match self.run.take() {
            Some(mut run) if run.category == category => {
                run.len += 1;
                self.run = Some(run);
            }
            previous => {
                let mut neighbours = Vec::new();
                if let Some(previous) = previous {
                    neighbours.push(previous.category);
                    self.commit_run(previous, None);
                }
                self.run = Some(OpenRun {
                    category,
                    len: 1,
                    neighbours,
                });
            }
        }

        if self.total_outage_len > self.thresholds.connected_max_dsec() {
            if self.connected_len > 0 {
                self.close_connected(i);
                if let Some(run) = self.run.as_mut() {
                    run.neighbours.push(Category::Connected);
                }
            }
        } else {
            // Short outages do not break a connected span.
            self.connected_len += 1;
        }

        self.results.overrules[category].not_overruled += 1;
        self.results.seconds[category] += 1;
    }

    fn finish(mut self, len: usize) -> AnalysisResults {
        if self.connected_len > 0 {
            self.close_connected(len);
        }
        self.close_run(None);
        self.results.timeline_len = len;
        self.results
    }

    /// Flip the betadown seconds bordering obstructed second `i`.
    fn reclassify_around(&mut self, samples: &mut [Sample], i: usize) {
        let backward = scan_backward(samples, i, self.thresholds);
        let forward = scan_forward(samples, i, self.thresholds);
        self.results.reclassification.record_backward(backward);
        self.results.reclassification.record_forward(forward);

        if backward == 0 {
            return;
        }

        // The backward scan covers exactly the open betadown run, whose
        // seconds were already tallied as betadown.
        let results = &mut self.results;
        results.overrules[Category::Betadown].not_overruled -= backward;
        results.overrules[Category::Obstructed].not_overruled += backward;
        results.seconds[Category::Betadown] -= backward;
        results.seconds[Category::Obstructed] += backward;
        if let Some(run) = self.run.as_mut() {
            if run.category == Category::Betadown {
                run.category = Category::Obstructed;
            }
        }
    }

    fn tally_overrule(&mut self, sample: &Sample) {
        let category = classify(sample);
        if !self.thresholds.is_enabled(category) {
            return;
        }
        if let Some(o) = overrule(sample, self.thresholds) {
            let counts = &mut self.results.overrules[category];
            counts.either += 1;
            if o.down {
                counts.down += 1;
            }
            if o.up {
                counts.up += 1;
            }
        }
    }

    /// Commit the connected run ending just before second `end`.
    fn close_connected(&mut self, end: usize) {
        let len = self.connected_len;
        if self.thresholds.is_enabled(Category::Connected) {
            self.results.histogram.record(Category::Connected, len);
        }
        if len >= self.thresholds.connected_min_sec() {
            self.results.spans.push(ConnectedSpan {
                start: end - len as usize,
                end,
            });
        }
        self.connected_len = 0;
    }

    /// Commit the open outage run, if any, noting what follows it.
    fn close_run(&mut self, followed_by: Option<Category>) {
        if let Some(run) = self.run.take() {
            self.commit_run(run, followed_by);
        }
    }

    fn commit_run(&mut self, run: OpenRun, followed_by: Option<Category>) {
        if self.thresholds.is_enabled(run.category) {
            self.results.histogram.record(run.category, run.len);
        }
        for neighbour in run.neighbours.into_iter().chain(followed_by) {
            self.record_adjacency(run.category, neighbour);
        }
    }

    fn record_adjacency(&mut self, a: Category, b: Category) {
        if a != b && self.thresholds.is_enabled(a) && self.thresholds.is_enabled(b) {
            self.results.adjacency.record(a, b);
        }
    }
}

/// A counted betadown outage that has not been reclassified yet.
fn flippable(sample: &Sample, thresholds: &Thresholds) -> bool {
    classify(sample) == Category::Betadown && counts_as_outage(sample, thresholds)
}

/// Flip betadown seconds before `i`, nearest first, stopping at the first
/// second that is not one. Returns how many were flipped.
fn scan_backward(samples: &mut [Sample], i: usize, thresholds: &Thresholds) -> u64 {
    let mut reach = 0;
    for sample in samples[..i].iter_mut().rev() {
        if !flippable(sample, thresholds) {
            break;
        }
        sample.adjacent_obstructed = true;
        reach += 1;
    }
    reach
}

/// Flip betadown seconds after `i` the same way. The main loop then sees
/// them as obstructed when it gets there.
fn scan_forward(samples: &mut [Sample], i: usize, thresholds: &Thresholds) -> u64 {
    let mut reach = 0;
    for sample in samples[i + 1..].iter_mut() {
        if !flippable(sample, thresholds) {
            break;
        }
        sample.adjacent_obstructed = true;
        reach += 1;
    }
    reach
}
